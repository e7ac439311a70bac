//! Line-oriented operator console.
//!
//! Reads commands from stdin, one per line, and answers on stdout; all
//! diagnostic output stays on stderr via tracing. The command surface is
//! deliberately tiny:
//!
//! - `set <seconds>` or `set <minutes>:<seconds>` — change the refresh rate
//! - `get` — report the configured interval and the time until the next save
//! - `quit` — leave the console (the daemon then shuts the scheduler down)
//!
//! Malformed input is answered with a usage line and changes nothing.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::error::SaveTickError;
use crate::interval::SaveInterval;
use crate::remaining::format_remaining;
use crate::scheduler::SaveScheduler;

/// Usage line answered to a malformed `set`.
pub const SET_USAGE: &str = "usage: set <seconds> | set <minutes>:<seconds>";

/// A parsed operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Change the refresh rate to the given (already normalized) interval.
    Set(SaveInterval),
    /// Report the interval and remaining time.
    Get,
    /// Leave the console.
    Quit,
}

impl Command {
    /// Parse one input line.
    ///
    /// `Ok(None)` for a blank line; `Err` carries the reply text for the
    /// operator (usage or unknown-command), with no state touched.
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            return Ok(None);
        };
        let rest: Vec<&str> = parts.collect();

        match verb {
            "set" => match rest.as_slice() {
                [arg] => arg
                    .parse::<SaveInterval>()
                    .map(|interval| Some(Self::Set(interval)))
                    .map_err(|_| SET_USAGE.to_owned()),
                _ => Err(SET_USAGE.to_owned()),
            },
            "get" if rest.is_empty() => Ok(Some(Self::Get)),
            "get" => Err("usage: get".to_owned()),
            "quit" | "exit" => Ok(Some(Self::Quit)),
            other => Err(format!("unknown command '{other}' (set, get, quit)")),
        }
    }
}

/// Apply a command to the scheduler and produce the operator reply.
pub fn dispatch(scheduler: &SaveScheduler, command: Command) -> String {
    match command {
        Command::Set(interval) => {
            scheduler.reconfigure(interval);
            if interval.is_zero() {
                "automatic saves disabled (interval 0:00)".to_owned()
            } else {
                format!("save interval set to {interval}")
            }
        }
        Command::Get => {
            let interval = scheduler.interval();
            let next = match scheduler.time_until_next_fire() {
                Some(remaining) => format!("next save in {}", format_remaining(remaining)),
                None => "no automatic save scheduled".to_owned(),
            };
            format!("save interval (M:SS): {interval}\n{next}")
        }
        Command::Quit => "shutting down".to_owned(),
    }
}

/// Drive the console until `quit` or stdin EOF.
///
/// # Errors
///
/// Returns [`SaveTickError::Console`] when stdin cannot be read.
pub async fn run_console(scheduler: Arc<SaveScheduler>) -> crate::Result<()> {
    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader
            .read_line(&mut line)
            .await
            .map_err(|e| SaveTickError::Console(format!("cannot read from stdin: {e}")))?;

        // EOF
        if bytes_read == 0 {
            info!("stdin closed (EOF); leaving console");
            break;
        }

        match Command::parse(&line) {
            Ok(None) => {}
            Ok(Some(command)) => {
                println!("{}", dispatch(&scheduler, command));
                if command == Command::Quit {
                    break;
                }
            }
            Err(reply) => println!("{reply}"),
        }
    }

    Ok(())
}
