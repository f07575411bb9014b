//! Line-oriented driver that forwards commands to a [`Scheduler`].

use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::error::{Result, SchedulerError};
use crate::scheduler::{OrderingPolicy, Scheduler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `a <seconds> <priority>`
    Add { service_seconds: i64, priority: i32 },
    /// `f`, `s` or `p`
    SwitchMode(OrderingPolicy),
    /// `m`
    QueryMode,
    /// `q`
    Quit,
}

impl FromStr for Command {
    type Err = SchedulerError;

    fn from_str(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let name = parts
            .next()
            .ok_or_else(|| SchedulerError::InvalidCommand("empty line".to_string()))?
            .to_ascii_lowercase();

        let command = match name.as_str() {
            "a" | "add" => {
                let service_seconds = parts
                    .next()
                    .and_then(|s| s.parse::<i64>().ok())
                    .ok_or_else(|| {
                        SchedulerError::InvalidCommand(
                            "add expects an integer duration in seconds".to_string(),
                        )
                    })?;
                let priority = parts
                    .next()
                    .and_then(|s| s.parse::<i32>().ok())
                    .ok_or_else(|| {
                        SchedulerError::InvalidCommand(
                            "add expects an integer priority".to_string(),
                        )
                    })?;
                Command::Add {
                    service_seconds,
                    priority,
                }
            }
            "m" | "mode" => Command::QueryMode,
            "q" | "quit" => Command::Quit,
            "f" | "fcfs" | "s" | "sjf" | "p" | "priority" => Command::SwitchMode(name.parse()?),
            other => {
                return Err(SchedulerError::InvalidCommand(format!(
                    "unknown command '{}'",
                    other
                )))
            }
        };

        if parts.next().is_some() {
            return Err(SchedulerError::InvalidCommand(format!(
                "unexpected arguments after '{}'",
                name
            )));
        }
        Ok(command)
    }
}

/// Read commands from `input` until `q` or end of input, replying on
/// `output`. Always leaves the scheduler with shutdown requested.
///
/// Lines that fail to parse or jobs the scheduler rejects are reported and
/// skipped.
pub fn run_command_loop<R: BufRead, W: Write>(
    scheduler: &Scheduler,
    input: R,
    mut output: W,
) -> Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                tracing::warn!(line = %line.trim(), error = %e, "Skipping command");
                writeln!(output, "{}", e)?;
                continue;
            }
        };

        match command {
            Command::Add {
                service_seconds,
                priority,
            } => match scheduler.submit(service_seconds, priority) {
                Ok(sequence) => writeln!(output, "Job {} added.", sequence)?,
                Err(e) => writeln!(output, "{}", e)?,
            },
            Command::SwitchMode(policy) => {
                scheduler.switch_mode(policy);
                writeln!(output, "You are now in {} mode.", policy)?;
            }
            Command::QueryMode => {
                writeln!(
                    output,
                    "You are currently in {} mode.",
                    scheduler.current_policy()
                )?;
            }
            Command::Quit => break,
        }
    }

    scheduler.request_shutdown();
    Ok(())
}
