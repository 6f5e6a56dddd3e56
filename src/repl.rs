//! Line-based command loop
//!
//! Reads one command per line, dispatches it to the session and prints the
//! result. Errors from a single command are printed and the loop carries on.

use std::io::{self, Write};

use crossterm::style::Stylize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::commands::{Command, Flow, Session};
use crate::data::Fetch;

/// Prompt printed before every line is read
pub const PROMPT: &str = "pokedex > ";

/// Splits a line into lowercase words, dropping empty ones
pub fn clean_input(input: &str) -> Vec<String> {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}

/// Runs the command loop until `exit` or end of input
///
/// # Arguments
/// * `session` - Session the commands operate on
/// * `input` - Source of command lines
/// * `out` - Where prompts and command output are written
/// * `color` - Whether to style the prompt and error messages
///
/// The session's cache sweep is stopped when the loop ends.
pub async fn run<F, R, W>(
    session: &mut Session<F>,
    input: R,
    out: &mut W,
    color: bool,
) -> io::Result<()>
where
    F: Fetch,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write_prompt(out, color)?;

        let Some(line) = lines.next_line().await? else {
            debug!("end of input");
            writeln!(out)?;
            break;
        };

        let words = clean_input(&line);
        let Some((name, args)) = words.split_first() else {
            continue;
        };

        let Some(command) = Command::from_str(name) else {
            write_error(out, &format!("Unknown command: {}", name), color)?;
            continue;
        };

        match session.execute(command, args, out).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(e) => write_error(out, &e.to_string(), color)?,
        }
    }

    session.api.dispose();
    Ok(())
}

fn write_prompt<W: Write>(out: &mut W, color: bool) -> io::Result<()> {
    if color {
        write!(out, "{}", PROMPT.cyan())?;
    } else {
        write!(out, "{}", PROMPT)?;
    }
    out.flush()
}

fn write_error<W: Write>(out: &mut W, message: &str, color: bool) -> io::Result<()> {
    if color {
        writeln!(out, "{}", message.red())
    } else {
        writeln!(out, "{}", message)
    }
}
