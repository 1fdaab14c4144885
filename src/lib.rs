pub mod config;
pub mod core;
pub mod online_game;

// module re-exports
pub use crate::core::algorithms::{
    best_move, column_scores, evaluate, score_column, Algorithm, MinMaxBot, RandomBot,
};
pub use crate::core::definitions::{AiMode, GameMode, GameState, GameStatus};
pub use crate::core::engine::{Board, BoardError, Cell, Outcome, Token};
pub use crate::core::game::{Game, SavedGame};
pub use crate::online_game::{Arbiter, ArbiterError};
