use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::config::{clamp_depth, GameConfig};
use crate::core::algorithms::{Algorithm, MinMaxBot, RandomBot};
use crate::core::definitions::{AiMode, GameMode, GameState};
use crate::core::engine::{Board, BoardError, Outcome, Token, CONNECT_N};
use crate::core::utils::mirror_column;

pub type WinningLine = [(usize, usize); CONNECT_N];

/// Local game with a navigable move history.
///
/// `view_index` is the number of moves applied to `board`; it is below
/// `moves.len()` while the user looks at an earlier position.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    starting: Token,
    current_player: Token,
    moves: Vec<usize>,
    view_index: usize,
    outcome: Option<Outcome>,
    winning_cells: Option<WinningLine>,
    mode: GameMode,
    ai_mode: AiMode,
    ai_depth: u32,
}

impl Game {
    pub fn new(config: &GameConfig) -> Result<Game, BoardError> {
        let mut game = Game::with_player(config.rows, config.cols, config.starting_color)?;
        game.set_mode(config.mode);
        game.set_ai(config.ai_mode, config.search_depth);
        Ok(game)
    }

    pub fn with_player(rows: usize, cols: usize, starting: Token) -> Result<Game, BoardError> {
        Ok(Game {
            board: Board::new(rows, cols)?,
            starting,
            current_player: starting,
            moves: Vec::new(),
            view_index: 0,
            outcome: None,
            winning_cells: None,
            mode: GameMode::default(),
            ai_mode: AiMode::default(),
            ai_depth: GameConfig::default().search_depth,
        })
    }

    /// Restores a game from a move list and shows its last position.
    ///
    /// Illegal moves, and moves played after the game was already decided, fail
    /// with `InvalidReplay`.
    pub fn from_moves(
        rows: usize,
        cols: usize,
        starting: Token,
        moves: &[usize],
    ) -> Result<Game, BoardError> {
        let mut game = Game::with_player(rows, cols, starting)?;
        for (index, &column) in moves.iter().enumerate() {
            let forged = BoardError::InvalidReplay { index, column };
            if game.outcome.is_some() {
                return Err(forged);
            }
            game.play(column).map_err(|_| forged)?;
        }
        Ok(game)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn moves(&self) -> &[usize] {
        &self.moves
    }

    pub fn starting_player(&self) -> Token {
        self.starting
    }

    pub fn current_player(&self) -> Token {
        self.current_player
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn winning_cells(&self) -> Option<WinningLine> {
        self.winning_cells
    }

    pub fn view_index(&self) -> usize {
        self.view_index
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: GameMode) {
        self.mode = mode;
    }

    pub fn ai_mode(&self) -> AiMode {
        self.ai_mode
    }

    pub fn ai_depth(&self) -> u32 {
        self.ai_depth
    }

    pub fn set_ai(&mut self, ai_mode: AiMode, depth: u32) {
        self.ai_mode = ai_mode;
        self.ai_depth = clamp_depth(depth);
    }

    /// Whether the side to move waits for a human. Always false once the game is over.
    pub fn is_human_turn(&self) -> bool {
        self.outcome.is_none() && self.mode.is_human_turn(self.current_player)
    }

    pub fn is_replay_view(&self) -> bool {
        self.view_index < self.moves.len()
    }

    pub fn state(&self) -> GameState {
        match self.outcome {
            Some(outcome) => GameState::Finished(outcome),
            None => GameState::Turn(self.current_player),
        }
    }

    /// Plays `column` for the side to move. Playing from an earlier position of
    /// the timeline drops the moves after it.
    pub fn play(&mut self, column: usize) -> Result<GameState, BoardError> {
        if let Some(outcome) = self.outcome {
            return Ok(GameState::Finished(outcome));
        }
        let row = self.board.apply_move(column, self.current_player)?;
        if self.is_replay_view() {
            trace!(
                "Dropping {} moves after #{}",
                self.moves.len() - self.view_index,
                self.view_index
            );
            self.moves.truncate(self.view_index);
        }
        self.moves.push(column);
        self.view_index = self.moves.len();

        self.winning_cells = self.board.winning_line(row, column);
        self.outcome = self.board.outcome_after(row, column);
        if self.outcome.is_none() {
            self.current_player = self.current_player.opposite();
        }
        Ok(self.state())
    }

    /// Lets `algorithm` pick and play a column for the side to move.
    pub fn ai_move(&mut self, algorithm: &dyn Algorithm) -> Result<GameState, BoardError> {
        if self.outcome.is_some() {
            return Ok(self.state());
        }
        match algorithm.solve(&self.board, self.current_player) {
            Some(column) => {
                debug!("{} bot plays column {}", algorithm.name(), column);
                self.play(column)
            }
            None => Ok(self.state()),
        }
    }

    /// Plays one move with the configured bot, see [`Game::set_ai`].
    pub fn bot_move(&mut self) -> Result<GameState, BoardError> {
        match self.ai_mode {
            AiMode::Random => self.ai_move(&RandomBot),
            AiMode::Minimax => self.ai_move(&MinMaxBot::new(self.ai_depth)),
        }
    }

    /// Shows the position after the first `k` moves (clamped to the history).
    pub fn view(&mut self, k: usize) -> Result<GameState, BoardError> {
        let k = k.min(self.moves.len());
        self.board = Board::rebuild(
            self.board.rows(),
            self.board.cols(),
            &self.moves[..k],
            self.starting,
        )?;
        self.view_index = k;
        self.current_player = Token::for_index(self.starting, k);
        self.winning_cells = None;
        // replayed position, so the full scan decides
        self.outcome = self.board.check_winner();
        if let Some(outcome) = self.outcome {
            let last = k.checked_sub(1).map(|index| {
                let column = self.moves[index];
                (self.board.rows() - self.board.height(column), column)
            });
            self.winning_cells = last
                .and_then(|(row, column)| self.board.winning_line(row, column))
                .or_else(|| self.board.find_line());
            self.current_player = match outcome {
                Outcome::Winner(token) => token,
                Outcome::Draw => Token::for_index(self.starting, k.saturating_sub(1)),
            };
        }
        Ok(self.state())
    }

    /// Save record named `name`, with the move list reduced to its canonical mirror.
    /// Restoring it may therefore give the mirrored board.
    pub fn to_saved(&self, name: &str) -> SavedGame {
        let cols = self.board.cols();
        SavedGame {
            name: name.to_string(),
            rows: self.board.rows(),
            cols,
            starting: self.starting,
            mode: self.mode,
            ai_mode: self.ai_mode,
            ai_depth: self.ai_depth,
            view_index: self.view_index,
            moves: canonical_moves(cols, &self.moves),
            outcome: self.outcome,
        }
    }
}

pub fn mirror_moves(cols: usize, moves: &[usize]) -> Vec<usize> {
    moves.iter().map(|&col| mirror_column(cols, col)).collect()
}

/// The lexicographically smaller of `moves` and its left-right mirror.
pub fn canonical_moves(cols: usize, moves: &[usize]) -> Vec<usize> {
    let mirrored = mirror_moves(cols, moves);
    if moves <= mirrored.as_slice() {
        moves.to_vec()
    } else {
        mirrored
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SavedGameError {
    #[error("failed to encode saved game: {0}")]
    Encode(postcard::Error),
    #[error("failed to decode saved game: {0}")]
    Decode(postcard::Error),
    #[error("saved game history is invalid: {0}")]
    Replay(#[from] BoardError),
}

/// Why two saves count as the same game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplicate {
    Name,
    Moves,
}

/// Persisted form of a game: an ordered move list plus its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedGame {
    pub name: String,
    pub rows: usize,
    pub cols: usize,
    pub starting: Token,
    pub mode: GameMode,
    pub ai_mode: AiMode,
    pub ai_depth: u32,
    pub view_index: usize,
    pub moves: Vec<usize>,
    pub outcome: Option<Outcome>,
}

impl SavedGame {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SavedGameError> {
        postcard::to_allocvec(self).map_err(SavedGameError::Encode)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<SavedGame, SavedGameError> {
        postcard::from_bytes(bytes).map_err(SavedGameError::Decode)
    }

    /// Same name, or same settings and the same game up to a mirror.
    pub fn is_duplicate_of(&self, other: &SavedGame) -> Option<Duplicate> {
        if self.name == other.name {
            return Some(Duplicate::Name);
        }
        let same_game = self.rows == other.rows
            && self.cols == other.cols
            && self.starting == other.starting
            && canonical_moves(self.cols, &self.moves) == canonical_moves(other.cols, &other.moves);
        same_game.then_some(Duplicate::Moves)
    }

    /// Index of the first of `saves` this record duplicates.
    pub fn find_duplicate<'a>(
        &self,
        saves: impl IntoIterator<Item = &'a SavedGame>,
    ) -> Option<(usize, Duplicate)> {
        saves
            .into_iter()
            .enumerate()
            .find_map(|(index, save)| self.is_duplicate_of(save).map(|reason| (index, reason)))
    }

    /// Strength of the opposition on a 0..=5 scale; hot-seat games count as full strength.
    pub fn confidence(&self) -> u8 {
        match (self.mode, self.ai_mode) {
            (GameMode::HotSeat, _) => 5,
            (_, AiMode::Random) => 1,
            (_, AiMode::Minimax) => match clamp_depth(self.ai_depth) {
                1..=2 => 2,
                3..=4 => 3,
                5..=6 => 4,
                _ => 5,
            },
        }
    }

    /// Replays the record. Moves played after the game ended, or a stored
    /// outcome that disagrees with the replay, are treated as forged history.
    pub fn restore(&self) -> Result<Game, SavedGameError> {
        let mut game = Game::from_moves(self.rows, self.cols, self.starting, &self.moves)?;
        if game.outcome != self.outcome {
            let index = self.moves.len().saturating_sub(1);
            let column = self.moves.last().copied().unwrap_or_default();
            return Err(BoardError::InvalidReplay { index, column }.into());
        }
        game.set_mode(self.mode);
        game.set_ai(self.ai_mode, self.ai_depth);
        game.view(self.view_index)?;
        debug!(
            "Restored '{}': {} moves, viewing #{}",
            self.name,
            self.moves.len(),
            game.view_index
        );
        Ok(game)
    }
}
