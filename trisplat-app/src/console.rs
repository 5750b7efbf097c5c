//! Terminal control source.
//!
//! Reads commands from stdin on a background thread and forwards them to the
//! GUI as widget inputs, so the viewer can be driven without a browser.

use crate::controller::TriangleSplatControls;
use std::io::{self, BufRead};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use thiserror::Error;
use tracing::{debug, warn};
use trisplat_viewer::GuiInput;

pub const USAGE: &str = "Commands:
  sigma <value>    set log-sigma (-15 to 10)
  opacity <pct>    set opacity scale (0 to 100)
  reset            reset every client camera
  help             show this message";

/// A parsed console line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleCommand {
    Sigma(f64),
    Opacity(f64),
    Reset,
    Help,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),

    #[error("'{0}' needs a numeric argument")]
    MissingArgument(&'static str),

    #[error("'{command}' argument '{value}' is not a number")]
    InvalidNumber {
        command: &'static str,
        value: String,
    },

    #[error("'{0}' takes no arguments")]
    UnexpectedArgument(&'static str),
}

impl ConsoleCommand {
    /// Parse one line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseError> {
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Ok(None);
        };
        let name = match word.to_ascii_lowercase().as_str() {
            "sigma" => "sigma",
            "opacity" => "opacity",
            "reset" => "reset",
            "help" | "?" => "help",
            _ => return Err(ParseError::UnknownCommand(word.to_string())),
        };
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(ParseError::UnexpectedArgument(name));
        }

        let command = match name {
            "sigma" => ConsoleCommand::Sigma(number(name, arg)?),
            "opacity" => ConsoleCommand::Opacity(number(name, arg)?),
            "reset" => no_argument(name, arg, ConsoleCommand::Reset)?,
            _ => no_argument(name, arg, ConsoleCommand::Help)?,
        };
        Ok(Some(command))
    }

    /// The widget input this command stands for. `Help` has none.
    pub fn to_input(self, controls: &TriangleSplatControls) -> Option<GuiInput> {
        match self {
            ConsoleCommand::Sigma(value) => Some(GuiInput::SetSlider {
                slider: controls.sigma,
                value,
            }),
            ConsoleCommand::Opacity(value) => Some(GuiInput::SetSlider {
                slider: controls.opacity_scale,
                value,
            }),
            ConsoleCommand::Reset => Some(GuiInput::Click {
                button: controls.reset,
            }),
            ConsoleCommand::Help => None,
        }
    }
}

fn number(command: &'static str, arg: Option<&str>) -> Result<f64, ParseError> {
    let arg = arg.ok_or(ParseError::MissingArgument(command))?;
    arg.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::InvalidNumber {
            command,
            value: arg.to_string(),
        })
}

fn no_argument(
    command: &'static str,
    arg: Option<&str>,
    parsed: ConsoleCommand,
) -> Result<ConsoleCommand, ParseError> {
    match arg {
        Some(_) => Err(ParseError::UnexpectedArgument(command)),
        None => Ok(parsed),
    }
}

/// Forward every command read from `reader` until it ends or the receiver
/// hangs up.
pub fn forward_commands<R: BufRead>(
    reader: R,
    controls: TriangleSplatControls,
    sender: &Sender<GuiInput>,
) {
    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Console read failed: {}", e);
                break;
            }
        };
        match ConsoleCommand::parse(&line) {
            Ok(Some(command)) => {
                debug!("Console command {:?}", command);
                match command.to_input(&controls) {
                    Some(input) => {
                        if sender.send(input).is_err() {
                            break;
                        }
                    }
                    None => println!("{USAGE}"),
                }
            }
            Ok(None) => {}
            Err(e) => warn!("{} (type 'help' for commands)", e),
        }
    }
}

/// Read stdin on a background thread. The sender is dropped when stdin closes.
pub fn spawn_console(
    controls: TriangleSplatControls,
    sender: Sender<GuiInput>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("console".to_string())
        .spawn(move || forward_commands(io::stdin().lock(), controls, &sender))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc;
    use trisplat_viewer::LocalGui;

    fn controls() -> TriangleSplatControls {
        let mut gui = LocalGui::new();
        TriangleSplatControls::build(&mut gui, 0.0)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ConsoleCommand::parse("sigma -2.5").unwrap(),
            Some(ConsoleCommand::Sigma(-2.5))
        );
        assert_eq!(
            ConsoleCommand::parse("  OPACITY 99 ").unwrap(),
            Some(ConsoleCommand::Opacity(99.0))
        );
        assert_eq!(
            ConsoleCommand::parse("reset").unwrap(),
            Some(ConsoleCommand::Reset)
        );
        assert_eq!(ConsoleCommand::parse("?").unwrap(), Some(ConsoleCommand::Help));
        assert_eq!(ConsoleCommand::parse("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ConsoleCommand::parse("zoom 2"),
            Err(ParseError::UnknownCommand("zoom".to_string()))
        );
        assert_eq!(
            ConsoleCommand::parse("sigma"),
            Err(ParseError::MissingArgument("sigma"))
        );
        assert!(matches!(
            ConsoleCommand::parse("opacity lots"),
            Err(ParseError::InvalidNumber { command: "opacity", .. })
        ));
        assert!(matches!(
            ConsoleCommand::parse("sigma NaN"),
            Err(ParseError::InvalidNumber { .. })
        ));
        assert_eq!(
            ConsoleCommand::parse("reset now"),
            Err(ParseError::UnexpectedArgument("reset"))
        );
        assert_eq!(
            ConsoleCommand::parse("sigma 1 2"),
            Err(ParseError::UnexpectedArgument("sigma"))
        );
    }

    #[test]
    fn test_commands_map_to_widgets() {
        let controls = controls();
        assert_eq!(
            ConsoleCommand::Sigma(1.0).to_input(&controls),
            Some(GuiInput::SetSlider {
                slider: controls.sigma,
                value: 1.0
            })
        );
        assert_eq!(
            ConsoleCommand::Opacity(50.0).to_input(&controls),
            Some(GuiInput::SetSlider {
                slider: controls.opacity_scale,
                value: 50.0
            })
        );
        assert_eq!(
            ConsoleCommand::Reset.to_input(&controls),
            Some(GuiInput::Click {
                button: controls.reset
            })
        );
        assert_eq!(ConsoleCommand::Help.to_input(&controls), None);
    }

    #[test]
    fn test_forward_skips_bad_lines() {
        let controls = controls();
        let (tx, rx) = mpsc::channel();
        let input = Cursor::new("sigma 0\nbogus\n\nhelp\nreset\n");

        forward_commands(input, controls, &tx);
        drop(tx);

        let received: Vec<GuiInput> = rx.iter().collect();
        assert_eq!(
            received,
            vec![
                GuiInput::SetSlider {
                    slider: controls.sigma,
                    value: 0.0
                },
                GuiInput::Click {
                    button: controls.reset
                },
            ]
        );
    }

    #[test]
    fn test_forward_stops_when_receiver_gone() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        forward_commands(Cursor::new("reset\nreset\n"), controls(), &tx);
    }
}
