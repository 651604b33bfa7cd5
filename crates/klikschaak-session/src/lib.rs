//! Game-session state machine for Klikschaak: player slots, turn order,
//! verified move submission, termination detection, resignation, and draw
//! agreement on top of `klikschaak-core`.

mod error;
mod session;

pub use error::GameError;
pub use session::{PlayerId, Session, SessionConfig, SessionPhase, SubmitOutcome, Terminal};
