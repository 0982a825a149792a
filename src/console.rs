//! Line-oriented console commands
//!
//! Turns one line of user input into a [`ConsoleCommand`]. Speeds, manual
//! moves and calibration values must be plain positive integers; staged
//! values (step counts, sweep parameters) accept any integer and are checked
//! when they are used.

use crate::runtime::RunnerCommand;
use steplink_communication::{parse_positive, Intent};
use steplink_core::{AxisId, ValidationError, DEFAULT_CALIBRATION_INPUT, DEFAULT_RPM};
use thiserror::Error;

/// Usage summary printed by `help`
pub const HELP_TEXT: &str = "\
Commands:
  ports                              list serial ports
  connect <port>                     open a port (closes the current one)
  disconnect                         close the port
  dir <axis>                         toggle direction
  speed <axis> [rpm]                 set speed (default 100)
  steps <axis> <n>                   stage a step count (updates the angle)
  move <axis> [n]                    move by n or by the staged step count
  stop <axis> | stopall              stop one axis or all of them
  sweep <axis> on [steps delay_ms]   start sweeping
  sweep <axis> off                   stop sweeping
  sweep <axis> steps <n>             change sweep steps per tick
  sweep <axis> delay <ms>            change sweep delay
  spr [value]                        store steps per revolution (default 200)
  query                              ask the board for steps per revolution
  dam on|off                         disable motors after motion
  status                             show session state
  help | quit
Axes: azi | pol | ele (or 1 | 2 | 3)";

/// Errors produced while parsing a console line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// The first word is not a command.
    #[error("Unknown command: {0} (type 'help')")]
    UnknownCommand(String),

    /// A required argument is missing.
    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    /// The axis name is not recognised.
    #[error("Unknown axis: {0}")]
    UnknownAxis(String),

    /// An option word is not one of the accepted values.
    #[error("Expected {expected}, got '{got}'")]
    UnexpectedWord {
        /// Accepted values.
        expected: &'static str,
        /// What was typed.
        got: String,
    },

    /// A numeric argument is invalid.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Print the usage summary
    Help,
    /// Forward to the session runner
    Run(RunnerCommand),
}

/// Parse one line; `Ok(None)` for blank input
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, ConsoleError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let verb = verb.to_ascii_lowercase();

    let run = |command: RunnerCommand| Ok(Some(ConsoleCommand::Run(command)));
    let intent = |intent: Intent| Ok(Some(ConsoleCommand::Run(RunnerCommand::Intent(intent))));

    match verb.as_str() {
        "help" | "?" => Ok(Some(ConsoleCommand::Help)),
        "quit" | "exit" => run(RunnerCommand::Shutdown),
        "ports" => run(RunnerCommand::ListPorts),
        "status" => run(RunnerCommand::Status),
        "connect" => {
            let port = next_word(&mut words, "port")?;
            run(RunnerCommand::Connect(port.to_string()))
        }
        "disconnect" => run(RunnerCommand::Disconnect),
        "dir" => intent(Intent::ToggleDirection(next_axis(&mut words)?)),
        "speed" => {
            let axis = next_axis(&mut words)?;
            let rpm = match words.next() {
                Some(text) => parse_positive("RPM", text)?.get(),
                None => DEFAULT_RPM,
            };
            intent(Intent::SetSpeed {
                axis,
                rpm: i64::from(rpm),
            })
        }
        "steps" => {
            let axis = next_axis(&mut words)?;
            let steps = parse_integer("steps", next_word(&mut words, "steps")?)?;
            run(RunnerCommand::SetSteps { axis, steps })
        }
        "move" => {
            let axis = next_axis(&mut words)?;
            match words.next() {
                Some(text) => {
                    let steps = parse_positive("steps", text)?;
                    intent(Intent::MoveSteps {
                        axis,
                        steps: i64::from(steps.get()),
                    })
                }
                None => run(RunnerCommand::MoveStaged(axis)),
            }
        }
        "stop" => intent(Intent::Stop(next_axis(&mut words)?)),
        "stopall" => intent(Intent::StopAll),
        "sweep" => parse_sweep(next_axis(&mut words)?, &mut words),
        "spr" => {
            let value = match words.next() {
                Some(text) => parse_positive("steps per revolution", text)?.get(),
                None => DEFAULT_CALIBRATION_INPUT,
            };
            intent(Intent::SetCalibration(i64::from(value)))
        }
        "query" => intent(Intent::QueryCalibration),
        "dam" => {
            let on = parse_on_off(next_word(&mut words, "on|off")?)?;
            intent(Intent::SetDisableAfterMotion(on))
        }
        _ => Err(ConsoleError::UnknownCommand(verb)),
    }
}

fn parse_sweep<'a>(
    axis: AxisId,
    words: &mut impl Iterator<Item = &'a str>,
) -> Result<Option<ConsoleCommand>, ConsoleError> {
    let mode = next_word(words, "on|off|steps|delay")?.to_ascii_lowercase();
    let command = match mode.as_str() {
        "on" => match words.next() {
            Some(steps) => {
                let steps_per_tick = parse_integer("sweep steps", steps)?;
                let delay_ms = parse_integer("sweep delay", next_word(words, "delay_ms")?)?;
                RunnerCommand::Intent(Intent::SetSweep {
                    axis,
                    enabled: true,
                    steps_per_tick,
                    delay_ms,
                })
            }
            None => RunnerCommand::StartSweep(axis),
        },
        "off" => RunnerCommand::Intent(Intent::SetSweep {
            axis,
            enabled: false,
            steps_per_tick: 0,
            delay_ms: 0,
        }),
        "steps" => RunnerCommand::SetSweepSteps {
            axis,
            steps_per_tick: parse_integer("sweep steps", next_word(words, "steps")?)?,
        },
        "delay" => RunnerCommand::SetSweepDelay {
            axis,
            delay_ms: parse_integer("sweep delay", next_word(words, "delay_ms")?)?,
        },
        _ => {
            return Err(ConsoleError::UnexpectedWord {
                expected: "on, off, steps or delay",
                got: mode,
            })
        }
    };
    Ok(Some(ConsoleCommand::Run(command)))
}

fn next_word<'a>(
    words: &mut impl Iterator<Item = &'a str>,
    name: &'static str,
) -> Result<&'a str, ConsoleError> {
    words.next().ok_or(ConsoleError::MissingArgument(name))
}

fn next_axis<'a>(words: &mut impl Iterator<Item = &'a str>) -> Result<AxisId, ConsoleError> {
    let word = next_word(words, "axis")?;
    word.parse::<AxisId>()
        .map_err(|_| ConsoleError::UnknownAxis(word.to_string()))
}

fn parse_integer(name: &'static str, text: &str) -> Result<i64, ValidationError> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidArgument {
            name,
            value: text.to_string(),
        })
}

fn parse_on_off(word: &str) -> Result<bool, ConsoleError> {
    match word.to_ascii_lowercase().as_str() {
        "on" | "1" | "true" => Ok(true),
        "off" | "0" | "false" => Ok(false),
        _ => Err(ConsoleError::UnexpectedWord {
            expected: "on or off",
            got: word.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(line: &str) -> RunnerCommand {
        match parse_line(line) {
            Ok(Some(ConsoleCommand::Run(command))) => command,
            other => panic!("unexpected parse of {line:?}: {other:?}"),
        }
    }

    #[test]
    fn test_blank_and_help() {
        assert_eq!(parse_line("   "), Ok(None));
        assert_eq!(parse_line("help"), Ok(Some(ConsoleCommand::Help)));
    }

    #[test]
    fn test_axis_names() {
        assert_eq!(
            run("dir azi"),
            RunnerCommand::Intent(Intent::ToggleDirection(AxisId::Azimuth))
        );
        assert_eq!(
            run("DIR 2"),
            RunnerCommand::Intent(Intent::ToggleDirection(AxisId::Polar))
        );
        assert_eq!(
            parse_line("dir xyz"),
            Err(ConsoleError::UnknownAxis("xyz".to_string()))
        );
    }

    #[test]
    fn test_manual_commands() {
        assert_eq!(
            run("speed ele 120"),
            RunnerCommand::Intent(Intent::SetSpeed {
                axis: AxisId::Elevation,
                rpm: 120,
            })
        );
        assert_eq!(run("move pol"), RunnerCommand::MoveStaged(AxisId::Polar));
        assert_eq!(
            run("steps 1 -20"),
            RunnerCommand::SetSteps {
                axis: AxisId::Azimuth,
                steps: -20,
            }
        );
        assert_eq!(run("stopall"), RunnerCommand::Intent(Intent::StopAll));
    }

    #[test]
    fn test_typed_numbers_must_be_digits() {
        assert_eq!(
            parse_line("speed azi 1.5"),
            Err(ConsoleError::Invalid(ValidationError::InvalidArgument {
                name: "RPM",
                value: "1.5".to_string(),
            }))
        );
        assert!(parse_line("spr -200").is_err());
        assert!(parse_line("move azi abc").is_err());
        assert_eq!(
            parse_line("speed"),
            Err(ConsoleError::MissingArgument("axis"))
        );
    }

    #[test]
    fn test_sweep_forms() {
        assert_eq!(
            run("sweep pol on 50 10"),
            RunnerCommand::Intent(Intent::SetSweep {
                axis: AxisId::Polar,
                enabled: true,
                steps_per_tick: 50,
                delay_ms: 10,
            })
        );
        assert_eq!(run("sweep 3 on"), RunnerCommand::StartSweep(AxisId::Elevation));
        assert_eq!(
            run("sweep azi delay 0"),
            RunnerCommand::SetSweepDelay {
                axis: AxisId::Azimuth,
                delay_ms: 0,
            }
        );
        assert!(matches!(
            parse_line("sweep azi maybe"),
            Err(ConsoleError::UnexpectedWord { .. })
        ));
    }

    #[test]
    fn test_global_commands() {
        assert_eq!(
            run("connect /dev/ttyUSB0"),
            RunnerCommand::Connect("/dev/ttyUSB0".to_string())
        );
        assert_eq!(
            run("spr 400"),
            RunnerCommand::Intent(Intent::SetCalibration(400))
        );
        assert_eq!(
            run("dam off"),
            RunnerCommand::Intent(Intent::SetDisableAfterMotion(false))
        );
        assert_eq!(run("quit"), RunnerCommand::Shutdown);
        assert_eq!(
            run("spr"),
            RunnerCommand::Intent(Intent::SetCalibration(200))
        );
        assert_eq!(
            run("speed pol"),
            RunnerCommand::Intent(Intent::SetSpeed {
                axis: AxisId::Polar,
                rpm: 100,
            })
        );
        assert_eq!(
            parse_line("jog x"),
            Err(ConsoleError::UnknownCommand("jog".to_string()))
        );
    }
}
