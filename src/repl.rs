//! Interactive front-end
//!
//! Reads command lines, executes them, prints the responses.

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::network::{Connection, SharedSession};

/// Prompt shown before every line
pub fn prompt_for(peer: &str) -> String {
    format!("RCON {}] ", peer)
}

/// Execute one command and print a non-empty response
///
/// Blank responses are logged instead of printed.
pub fn send_and_print<C: Connection, W: Write>(
    session: &SharedSession<C>,
    command: &str,
    out: &mut W,
) -> Result<()> {
    let output = session.execute(command)?;

    if output.trim().is_empty() {
        tracing::info!("Server response empty");
        return Ok(());
    }

    tracing::info!("Server response:");
    writeln!(out, "{}", output)?;
    Ok(())
}

/// Run the prompt loop until `input` reaches EOF
///
/// Empty lines are ignored. A failed command is logged, any partial output
/// it produced is printed, and the loop goes on.
pub fn run<C, R, W>(session: &SharedSession<C>, input: R, mut out: W) -> Result<()>
where
    C: Connection,
    R: BufRead,
    W: Write,
{
    let prompt = prompt_for(session.peer());
    let mut lines = input.lines();

    loop {
        write!(out, "{}", prompt)?;
        out.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let command = line.trim();
        if command.is_empty() {
            continue;
        }

        if let Err(e) = send_and_print(session, command, &mut out) {
            if let Some(partial) = e.partial_output().filter(|p| !p.trim().is_empty()) {
                writeln!(out, "{}", partial)?;
            }
            tracing::error!("Error sending command: {}", e);
        }
    }

    Ok(())
}
