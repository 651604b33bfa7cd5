//! Shell errors.

use klikschaak_core::{FenError, TokenError};
use klikschaak_session::GameError;

/// Errors reported back to the user of the line shell.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A command is missing a required argument.
    #[error("missing argument for '{command}'")]
    MissingArgument {
        /// The command name.
        command: &'static str,
    },
    /// A square argument did not parse.
    #[error("invalid square: \"{text}\"")]
    InvalidSquare {
        /// The offending text.
        text: String,
    },
    /// A move token did not parse.
    #[error(transparent)]
    Token(#[from] TokenError),
    /// A position string did not parse.
    #[error(transparent)]
    Fen(#[from] FenError),
    /// The session refused the operation.
    #[error(transparent)]
    Game(#[from] GameError),
    /// A syntactically valid token that matches nothing in the legal set.
    #[error("no legal move matches \"{token}\"")]
    UnresolvedMove {
        /// The offending token.
        token: String,
    },
    /// Reading from stdin failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
