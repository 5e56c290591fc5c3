//! Read-eval-print loop over a session.

use std::io::{self, BufRead, Write};

use partstock_inventory::Session;

use crate::dispatcher::{self, Outcome};

const PROMPT: &str = "> ";

/// Read commands from `input` until `q` or end of input.
///
/// Command failures are reported on `output` and the loop goes on; only IO
/// errors on `input`/`output` end it early.
pub fn run<R: BufRead, W: Write>(session: &mut Session, input: R, mut output: W) -> io::Result<()> {
    write!(output, "{PROMPT}")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let line = line.trim();

        if !line.is_empty() {
            match dispatcher::run_line(session, line) {
                Ok(Outcome::Quit) => return Ok(()),
                Ok(Outcome::Continue(text)) if text.is_empty() => {}
                Ok(Outcome::Continue(text)) => writeln!(output, "{text}")?,
                Err(err) => {
                    tracing::debug!(command = %line, error = %err, "command failed");
                    writeln!(output, "Error: {err}")?;
                }
            }
        }

        write!(output, "{PROMPT}")?;
        output.flush()?;
    }
    Ok(())
}
