use std::path::PathBuf;

use clap::Parser;

use partstock_infra::PersistenceError;
use partstock_infra::persistence::file_store;
use partstock_inventory::Session;
use partstock_observability::LogFormat;

/// Command-line configuration of the `partstock` binary.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Electronic component stock keeping", long_about = None)]
pub struct Config {
    /// Stock database loaded at start-up.
    #[arg(long, env = "PARTSTOCK_STOCK")]
    pub stock: Option<PathBuf>,

    /// Project bill of materials loaded at start-up.
    #[arg(long, env = "PARTSTOCK_PROJECT")]
    pub project: Option<PathBuf>,

    /// Log output format (`text` or `json`); verbosity comes from RUST_LOG.
    #[arg(long, env = "PARTSTOCK_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

impl Config {
    /// Build the session, loading whichever databases were configured.
    pub fn open_session(&self) -> Result<Session, PersistenceError> {
        let mut session = Session::new();
        if let Some(path) = &self.stock {
            file_store::load(path, &mut session.stock)?;
        }
        if let Some(path) = &self.project {
            file_store::load(path, &mut session.project)?;
        }
        Ok(session)
    }
}
