//! Line-oriented shell for driving a local Klikschaak session: the small,
//! transport-free equivalent of the production client.

mod command;
mod error;
mod shell;

pub use command::{Command, parse_command};
pub use error::CliError;
pub use shell::Shell;
