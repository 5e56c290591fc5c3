use anyhow::{Context, Result};
use clap::Parser;

use partstock_cli::{Config, repl};

fn main() -> Result<()> {
    let config = Config::parse();
    partstock_observability::init(config.log_format);

    let mut session = config
        .open_session()
        .context("failed to load start-up databases")?;

    println!("partstock {}", env!("CARGO_PKG_VERSION"));
    repl::run(&mut session, std::io::stdin().lock(), std::io::stdout().lock())?;
    Ok(())
}
