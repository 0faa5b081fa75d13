//! Room configuration.

use serde::{Deserialize, Serialize};

use crate::game::constants::{DEFAULT_WIN_SCORE, MAX_WIN_SCORE, MIN_WIN_SCORE};
use crate::game::errors::{GameError, GameResult};

/// Settings a lobby is created with.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomConfig {
    /// Score a player must reach to win the game.
    pub win_score: u32,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            win_score: DEFAULT_WIN_SCORE,
        }
    }
}

impl RoomConfig {
    pub fn new(win_score: u32) -> Self {
        Self { win_score }
    }

    /// Validate configuration before a room is created.
    pub fn validate(&self) -> GameResult<()> {
        if self.win_score < MIN_WIN_SCORE || self.win_score > MAX_WIN_SCORE {
            return Err(GameError::InvalidWinScore);
        }
        Ok(())
    }
}
