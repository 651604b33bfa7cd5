//! Line-protocol command parsing.

use klikschaak_core::Square;

use crate::error::CliError;

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `new [fen <position string>]` -- start a fresh game.
    New {
        /// Optional position string; the standard start when absent.
        fen: Option<String>,
    },
    /// `show` -- render the board.
    Show,
    /// `fen` -- print the extended position string.
    Fen,
    /// `moves [square]` -- list legal move tokens, optionally from one square.
    Moves {
        /// Restrict the listing to moves from this square.
        from: Option<Square>,
    },
    /// `move <token>` -- submit a move for the side to move.
    Play {
        /// The move token.
        token: String,
    },
    /// `resign` -- the side to move resigns.
    Resign,
    /// `draw offer` -- the side to move offers a draw.
    DrawOffer,
    /// `draw accept` -- the offeree accepts the pending offer.
    DrawAccept,
    /// `draw decline` -- the offeree declines the pending offer.
    DrawDecline,
    /// `quit` -- leave the shell.
    Quit,
    /// Anything unrecognized; echoed back to the user.
    Unknown(String),
}

/// Parse a single input line into a [`Command`].
pub fn parse_command(line: &str) -> Result<Command, CliError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(Command::Unknown(String::new()));
    };
    match head {
        "new" => match tokens.get(1) {
            None => Ok(Command::New { fen: None }),
            Some(&"fen") => {
                if tokens.len() < 3 {
                    return Err(CliError::MissingArgument { command: "new fen" });
                }
                Ok(Command::New {
                    fen: Some(tokens[2..].join(" ")),
                })
            }
            Some(_) => Ok(Command::Unknown(line.to_string())),
        },
        "show" => Ok(Command::Show),
        "fen" => Ok(Command::Fen),
        "moves" => match tokens.get(1) {
            None => Ok(Command::Moves { from: None }),
            Some(text) => {
                let square =
                    Square::from_algebraic(text).ok_or_else(|| CliError::InvalidSquare {
                        text: (*text).to_string(),
                    })?;
                Ok(Command::Moves { from: Some(square) })
            }
        },
        "move" => match tokens.get(1) {
            Some(token) if tokens.len() == 2 => Ok(Command::Play {
                token: (*token).to_string(),
            }),
            _ => Err(CliError::MissingArgument { command: "move" }),
        },
        "resign" => Ok(Command::Resign),
        "draw" => match tokens.get(1) {
            Some(&"offer") => Ok(Command::DrawOffer),
            Some(&"accept") => Ok(Command::DrawAccept),
            Some(&"decline") => Ok(Command::DrawDecline),
            _ => Err(CliError::MissingArgument { command: "draw" }),
        },
        "quit" | "exit" => Ok(Command::Quit),
        _ => Ok(Command::Unknown(head.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_command, Command};
    use klikschaak_core::Square;

    #[test]
    fn parses_basic_commands() {
        assert_eq!(parse_command("new").unwrap(), Command::New { fen: None });
        assert_eq!(parse_command("show").unwrap(), Command::Show);
        assert_eq!(parse_command("fen").unwrap(), Command::Fen);
        assert_eq!(parse_command("quit").unwrap(), Command::Quit);
        assert_eq!(parse_command("resign").unwrap(), Command::Resign);
    }

    #[test]
    fn parses_new_with_fen() {
        let cmd = parse_command("new fen 4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(
            cmd,
            Command::New {
                fen: Some("4k3/8/8/8/8/8/8/4K3 w - - 0 1".to_string())
            }
        );
    }

    #[test]
    fn parses_moves_with_square() {
        assert_eq!(
            parse_command("moves e2").unwrap(),
            Command::Moves {
                from: Some(Square::from_algebraic("e2").unwrap())
            }
        );
        assert!(parse_command("moves e9").is_err());
    }

    #[test]
    fn parses_move_and_draw() {
        assert_eq!(
            parse_command("move e2e4").unwrap(),
            Command::Play {
                token: "e2e4".to_string()
            }
        );
        assert!(parse_command("move").is_err());
        assert_eq!(parse_command("draw offer").unwrap(), Command::DrawOffer);
        assert_eq!(parse_command("draw accept").unwrap(), Command::DrawAccept);
        assert_eq!(parse_command("draw decline").unwrap(), Command::DrawDecline);
        assert!(parse_command("draw").is_err());
    }

    #[test]
    fn unknown_commands_are_echoed() {
        assert_eq!(
            parse_command("frobnicate").unwrap(),
            Command::Unknown("frobnicate".to_string())
        );
    }
}
