use serde::{Deserialize, Serialize};

use crate::core::engine::{Outcome, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Playing,
    Finished,
}

/// What a front end should do next after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Turn(Token),
    Finished(Outcome),
}

impl GameState {
    pub fn is_finished(&self) -> bool {
        matches!(self, GameState::Finished(_))
    }
}

/// Who drives each side of a local game. Stored as 0, 1 and 2 in saved games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GameMode {
    AiVsAi,
    /// Red is the human, Yellow the bot.
    HumanVsAi,
    #[default]
    HotSeat,
}

impl GameMode {
    pub fn is_human_turn(self, current: Token) -> bool {
        match self {
            GameMode::AiVsAi => false,
            GameMode::HumanVsAi => current == Token::Red,
            GameMode::HotSeat => true,
        }
    }
}

impl TryFrom<u8> for GameMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(GameMode::AiVsAi),
            1 => Ok(GameMode::HumanVsAi),
            2 => Ok(GameMode::HotSeat),
            other => Err(format!("unknown game mode {other}")),
        }
    }
}

impl From<GameMode> for u8 {
    fn from(value: GameMode) -> Self {
        match value {
            GameMode::AiVsAi => 0,
            GameMode::HumanVsAi => 1,
            GameMode::HotSeat => 2,
        }
    }
}

/// Bot used for the non-human side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiMode {
    #[default]
    Random,
    Minimax,
}
