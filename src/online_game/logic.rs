use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::core::definitions::GameStatus;
use crate::core::engine::{Board, Outcome, Token};
use crate::online_game::definitions::*;

const SESSION_ID_LEN: usize = 8;

impl GameSession {
    pub fn new(
        id: SessionId,
        rows: usize,
        cols: usize,
        starting: Token,
    ) -> Result<GameSession, ArbiterError> {
        // validates the dimensions once, every later rebuild relies on it
        Board::new(rows, cols)?;
        Ok(GameSession {
            id,
            rows,
            cols,
            starting,
            current_turn: starting,
            status: GameStatus::Waiting,
            outcome: None,
            moves: Vec::new(),
            participants: Vec::new(),
        })
    }

    fn seats_filled(&self) -> bool {
        self.get_player(Token::Red).is_some() && self.get_player(Token::Yellow).is_some()
    }

    /// Seats `name` on `requested` if free, else on the first free seat (Red
    /// first), else as a spectator.
    pub fn seat(&mut self, name: &str, requested: Option<Token>) -> JoinTicket {
        let free = |token: &Token| self.get_player(*token).is_none();
        let seat = requested
            .into_iter()
            .chain([Token::Red, Token::Yellow])
            .find(free)
            .map(Seat::Player)
            .unwrap_or(Seat::Spectator);
        let secret = Secret::generate();
        self.participants.push(Participant {
            name: name.to_string(),
            seat,
            secret: secret.clone(),
        });
        if self.status == GameStatus::Waiting && self.seats_filled() {
            self.status = GameStatus::Playing;
            info!("Game #{} has both players, starting", self.id);
        }
        trace!("Game #{} seated '{}' as {:?}", self.id, name, seat);
        JoinTicket {
            session_id: self.id.clone(),
            seat,
            secret,
            rows: self.rows,
            cols: self.cols,
            starting: self.starting,
            status: self.status,
        }
    }

    /// Current position, replayed from the move log.
    pub fn board(&self) -> Result<Board, ArbiterError> {
        Ok(Board::rebuild(self.rows, self.cols, &self.moves, self.starting)?)
    }

    /// Validates and commits one move. On error nothing is changed.
    pub fn submit(
        &mut self,
        secret: &Secret,
        column: usize,
    ) -> Result<MoveOutcome, ArbiterError> {
        if self.status == GameStatus::Finished || self.outcome.is_some() {
            return Err(ArbiterError::SessionFinished);
        }
        let participant = self
            .find_by_secret(secret)
            .ok_or(ArbiterError::UnknownIdentity)?;
        let token = participant
            .seat
            .token()
            .ok_or(ArbiterError::NotSpectatorAllowed)?;
        if token != self.current_turn {
            return Err(ArbiterError::OutOfTurn);
        }

        let mut board = self.board()?;
        let row = board.apply_move(column, token)?;

        let move_index = self.moves.len();
        self.moves.push(column);
        // full scan on purpose: the log may come from a restarted store
        self.outcome = board.check_winner();
        match self.outcome {
            Some(outcome) => {
                self.status = GameStatus::Finished;
                info!(
                    "Game #{} finished after {} moves: {}",
                    self.id,
                    self.moves.len(),
                    outcome
                );
            }
            None => {
                self.current_turn = token.opposite();
                if self.seats_filled() {
                    self.status = GameStatus::Playing;
                }
            }
        }
        trace!(
            "Game #{} move #{}: {} -> column {}",
            self.id,
            move_index,
            token,
            column
        );
        Ok(MoveOutcome {
            move_index,
            token,
            column,
            row,
            next_turn: self.current_turn,
            status: self.status,
            outcome: self.outcome,
        })
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            id: self.id.clone(),
            rows: self.rows,
            cols: self.cols,
            starting: self.starting,
            current_turn: self.current_turn,
            status: self.status,
            winner: self.outcome,
            moves: self
                .moves
                .iter()
                .enumerate()
                .map(|(move_index, &column)| MoveRecord {
                    move_index,
                    token: Token::for_index(self.starting, move_index),
                    column,
                })
                .collect(),
            players: self
                .participants
                .iter()
                .map(|participant| SeatedPlayer {
                    name: participant.name.clone(),
                    seat: participant.seat,
                })
                .collect(),
        }
    }
}

// Sessions only change after validation succeeds, so a poisoned lock still
// guards a consistent value.
fn lock(handle: &SessionHandle) -> MutexGuard<'_, GameSession> {
    handle.lock().unwrap_or_else(PoisonError::into_inner)
}

fn generate_session_id() -> SessionId {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LEN)
        .map(|byte| char::from(byte).to_ascii_uppercase())
        .collect()
}

/// Registry of live sessions.
///
/// The map lock is only held to find a session; each session has its own
/// mutex spanning read, validate and append, so different sessions never wait
/// on each other.
#[derive(Default)]
pub struct Arbiter {
    sessions: Sessions,
}

impl Arbiter {
    pub fn new() -> Self {
        Self::default()
    }

    fn session(&self, id: &str) -> Result<SessionHandle, ArbiterError> {
        let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
        sessions
            .get(&normalize_id(id))
            .cloned()
            .ok_or_else(|| ArbiterError::SessionNotFound(id.to_string()))
    }

    pub fn create_session(
        &self,
        rows: usize,
        cols: usize,
        starting: Token,
    ) -> Result<SessionId, ArbiterError> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let id = loop {
            let id = generate_session_id();
            if !sessions.contains_key(&id) {
                break id;
            }
        };
        let session = GameSession::new(id.clone(), rows, cols, starting)?;
        sessions.insert(id.clone(), Arc::new(Mutex::new(session)));
        info!("Created game #{} ({}x{}, {} starts)", id, rows, cols, starting);
        Ok(id)
    }

    pub fn seat_player(
        &self,
        id: &str,
        name: &str,
        requested: Option<Token>,
    ) -> Result<JoinTicket, ArbiterError> {
        let handle = self.session(id)?;
        let mut session = lock(&handle);
        Ok(session.seat(name, requested))
    }

    pub fn submit_move(
        &self,
        id: &str,
        secret: &Secret,
        column: usize,
    ) -> Result<MoveOutcome, ArbiterError> {
        let handle = self.session(id)?;
        let mut session = lock(&handle);
        session.submit(secret, column).map_err(|err| {
            warn!(
                "Game #{} rejected move in column {}: {}",
                session.id, column, err
            );
            err
        })
    }

    pub fn get_state(&self, id: &str) -> Result<SessionView, ArbiterError> {
        let handle = self.session(id)?;
        let session = lock(&handle);
        Ok(session.view())
    }

    /// Position and side to move, for scoring columns outside the lock.
    pub fn snapshot(&self, id: &str) -> Result<(Board, Token, Option<Outcome>), ArbiterError> {
        let handle = self.session(id)?;
        let session = lock(&handle);
        Ok((session.board()?, session.current_turn, session.outcome))
    }

    pub fn remove_session(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let removed = sessions.remove(&normalize_id(id)).is_some();
        if removed {
            info!("Removed game #{}", normalize_id(id));
        }
        removed
    }

    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn normalize_id(id: &str) -> SessionId {
    id.trim().to_ascii_uppercase()
}
