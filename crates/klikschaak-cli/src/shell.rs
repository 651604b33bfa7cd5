//! The interactive shell: one local session, driven line by line.
//!
//! This is the local stand-in for the production transport glue. It seats
//! both players itself, submits for whichever side is on move, and surfaces
//! the two interactive dialogs of the variant (choice candidates and
//! pending promotions) as printed prompts.

use std::io::{self, BufRead, Write};

use tracing::debug;

use klikschaak_core::{Color, Move, MoveToken, Position};
use klikschaak_session::{PlayerId, Session, SessionConfig, SubmitOutcome, Terminal};

use crate::command::{parse_command, Command};
use crate::error::CliError;

const WHITE_SEAT: PlayerId = PlayerId(0);
const BLACK_SEAT: PlayerId = PlayerId(1);

/// The shell state: a single session with both seats filled locally.
pub struct Shell {
    session: Session,
}

impl Shell {
    /// A shell holding a fresh game at the standard starting position.
    pub fn new() -> Shell {
        Shell {
            session: seated_session(Position::starting()),
        }
    }

    /// Handle one input line and return the lines to print.
    ///
    /// `Ok(None)` means the user asked to quit.
    pub fn handle(&mut self, line: &str) -> Result<Option<Vec<String>>, CliError> {
        let command = parse_command(line)?;
        debug!(?command, "handling command");
        match command {
            Command::Quit => return Ok(None),
            Command::New { fen } => {
                let position = match fen {
                    Some(fen) => Position::from_fen(&fen)?,
                    None => Position::starting(),
                };
                self.session = seated_session(position);
                Ok(Some(vec![format!(
                    "new game, {} to move",
                    side_name(self.session.position().side_to_move())
                )]))
            }
            Command::Show => Ok(Some(vec![self.session.position().board().to_string()])),
            Command::Fen => Ok(Some(vec![self.session.position().to_fen_extended()])),
            Command::Moves { from } => {
                let moves = match from {
                    None => self.session.legal_moves(),
                    Some(square) => {
                        let mut moves = self.session.position().legal_moves_from(square);
                        for index in 0..2 {
                            moves.extend(
                                self.session.position().legal_unklik_moves(square, index),
                            );
                        }
                        moves
                    }
                };
                let tokens: Vec<String> = moves.iter().map(Move::to_token).collect();
                Ok(Some(vec![if tokens.is_empty() {
                    "no legal moves".to_string()
                } else {
                    tokens.join(" ")
                }]))
            }
            Command::Play { token } => self.play(&token),
            Command::Resign => {
                let mover = self.seat_on_move();
                self.session.resign(mover)?;
                Ok(Some(self.terminal_lines()))
            }
            Command::DrawOffer => {
                let mover = self.seat_on_move();
                self.session.offer_draw(mover)?;
                Ok(Some(vec![format!(
                    "{} offers a draw",
                    side_name(self.session.position().side_to_move())
                )]))
            }
            Command::DrawAccept => self.respond_draw(true),
            Command::DrawDecline => self.respond_draw(false),
            Command::Unknown(text) => Ok(Some(vec![format!("unknown command: {text}")])),
        }
    }

    /// Run the read-eval-print loop until `quit` or end of input.
    pub fn run(&mut self) -> Result<(), CliError> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match self.handle(&line) {
                Ok(None) => break,
                Ok(Some(output)) => {
                    for text in output {
                        writeln!(stdout, "{text}")?;
                    }
                }
                Err(error) => writeln!(stdout, "error: {error}")?,
            }
        }
        Ok(())
    }

    fn play(&mut self, token: &str) -> Result<Option<Vec<String>>, CliError> {
        let parsed = MoveToken::parse(token)?;
        let legal = self.session.legal_moves();
        let Some(mv) = Move::resolve_token(&parsed, &legal) else {
            return Err(CliError::UnresolvedMove {
                token: token.to_string(),
            });
        };

        if let Some(resolutions) = mv.kind.resolutions() {
            let options: Vec<String> = resolutions
                .into_iter()
                .map(|kind| Move { kind, ..mv }.to_token())
                .collect();
            return Ok(Some(vec![format!(
                "this move needs a choice, pick one of: {}",
                options.join(" | ")
            )]));
        }

        let mover = self.seat_on_move();
        match self.session.submit(mover, mv)? {
            SubmitOutcome::Committed { notation, terminal } => {
                let mut output = vec![notation];
                if terminal.is_some() {
                    output.extend(self.terminal_lines());
                }
                Ok(Some(output))
            }
            SubmitOutcome::PromotionNeeded { square, .. } => Ok(Some(vec![format!(
                "promotion on {square}: resubmit with q, r, b, or n after the squares"
            )])),
        }
    }

    fn respond_draw(&mut self, accept: bool) -> Result<Option<Vec<String>>, CliError> {
        let Some(offerer) = self.session.pending_draw_offer() else {
            return Err(klikschaak_session::GameError::NoPendingDrawOffer.into());
        };
        let responder = self.seat_of(offerer.flip());
        self.session.respond_draw(responder, accept)?;
        if accept {
            Ok(Some(self.terminal_lines()))
        } else {
            Ok(Some(vec!["draw declined".to_string()]))
        }
    }

    fn seat_on_move(&self) -> PlayerId {
        self.seat_of(self.session.position().side_to_move())
    }

    fn seat_of(&self, color: Color) -> PlayerId {
        match color {
            Color::White => WHITE_SEAT,
            Color::Black => BLACK_SEAT,
        }
    }

    fn terminal_lines(&self) -> Vec<String> {
        match self.session.terminal() {
            Some(Terminal::Checkmate { winner }) => {
                vec![format!("checkmate: {} wins", side_name(winner))]
            }
            Some(Terminal::Stalemate) => vec!["stalemate: draw".to_string()],
            Some(Terminal::Resigned { winner }) => {
                vec![format!("resignation: {} wins", side_name(winner))]
            }
            Some(Terminal::DrawAgreed) => vec!["draw agreed".to_string()],
            Some(Terminal::Abandoned { winner }) => {
                vec![format!("abandonment: {} wins", side_name(winner))]
            }
            None => Vec::new(),
        }
    }
}

impl Default for Shell {
    fn default() -> Shell {
        Shell::new()
    }
}

fn seated_session(position: Position) -> Session {
    let mut session = Session::with_position(SessionConfig::default(), position);
    session
        .join(WHITE_SEAT)
        .expect("a fresh session has an open seat");
    session
        .join(BLACK_SEAT)
        .expect("a fresh session has an open seat");
    session.start().expect("both seats are filled");
    session
}

fn side_name(color: Color) -> &'static str {
    match color {
        Color::White => "White",
        Color::Black => "Black",
    }
}
