use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::core::definitions::GameStatus;
use crate::core::engine::{BoardError, Outcome, Token};

pub use uuid::Uuid;

#[allow(unused_imports)]
pub use log::{debug, error, info, trace, warn};

/// Short join code players share to meet in a session.
pub type SessionId = String;

pub type SessionHandle = Arc<Mutex<GameSession>>;
pub type Sessions = RwLock<HashMap<SessionId, SessionHandle>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArbiterError {
    #[error("session '{0}' not found")]
    SessionNotFound(SessionId),
    #[error("game is finished")]
    SessionFinished,
    #[error("player not recognized (invalid secret)")]
    UnknownIdentity,
    #[error("spectators can't play")]
    NotSpectatorAllowed,
    #[error("not your turn")]
    OutOfTurn,
    #[error(transparent)]
    Board(#[from] BoardError),
}

impl ArbiterError {
    /// `OutOfTurn` clears once the opponent moves; the other kinds don't.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ArbiterError::OutOfTurn)
    }
}

/// Opaque per-participant credential.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);

impl Secret {
    pub fn generate() -> Secret {
        Secret(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Secret {
    fn from(value: String) -> Self {
        Secret(value)
    }
}

impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Secret(value.to_string())
    }
}

// secrets never end up in logs
impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seat {
    Player(Token),
    Spectator,
}

impl Seat {
    pub fn token(self) -> Option<Token> {
        match self {
            Seat::Player(token) => Some(token),
            Seat::Spectator => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub name: String,
    pub seat: Seat,
    pub secret: Secret,
}

/// Authoritative state of one online game.
///
/// The move log is the source of truth; the board is always rebuilt from it.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub(crate) id: SessionId,
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) starting: Token,
    pub(crate) current_turn: Token,
    pub(crate) status: GameStatus,
    pub(crate) outcome: Option<Outcome>,
    pub(crate) moves: Vec<usize>,
    pub(crate) participants: Vec<Participant>,
}

/// Handed to a participant when they join. The secret authorizes their moves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinTicket {
    pub session_id: SessionId,
    pub seat: Seat,
    pub secret: Secret,
    pub rows: usize,
    pub cols: usize,
    pub starting: Token,
    pub status: GameStatus,
}

/// Result of an accepted move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub move_index: usize,
    pub token: Token,
    pub column: usize,
    pub row: usize,
    pub next_turn: Token,
    pub status: GameStatus,
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub move_index: usize,
    pub token: Token,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatedPlayer {
    pub name: String,
    pub seat: Seat,
}

/// Read model of a session, safe to hand to observers.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionView {
    pub id: SessionId,
    pub rows: usize,
    pub cols: usize,
    pub starting: Token,
    pub current_turn: Token,
    pub status: GameStatus,
    pub winner: Option<Outcome>,
    pub moves: Vec<MoveRecord>,
    pub players: Vec<SeatedPlayer>,
}

impl GameSession {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn current_turn(&self) -> Token {
        self.current_turn
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn moves(&self) -> &[usize] {
        &self.moves
    }

    pub fn get_player(&self, token: Token) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|participant| participant.seat == Seat::Player(token))
    }

    pub fn find_by_secret(&self, secret: &Secret) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|participant| &participant.secret == secret)
    }
}
