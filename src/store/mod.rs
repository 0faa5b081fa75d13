//! Persistence port: the durable mirror of room state.
//!
//! The in-memory `GameState` stays authoritative during active play; after
//! each accepted transition the room actor snapshots it into a
//! [`GameRecord`] and hands it to the store off the critical path. Records
//! are read back in full when a room is re-activated after a process
//! restart or a cold reconnect. The trait keeps the durable backend (a
//! relational database in production) behind a seam the engine never sees.

pub mod memory;

pub use memory::InMemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::game::entities::{CardId, GameCode, GameStatus, PlayerState, Round, UserId};
use crate::game::state::GameState;

/// Snapshot of one room, complete enough to rebuild its `GameState`.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub code: GameCode,
    pub status: GameStatus,
    pub host_id: UserId,
    pub win_score: u32,
    pub players: Vec<PlayerState>,
    pub join_order: Vec<UserId>,
    pub current_round: Option<Round>,
    pub used_black_card_ids: Vec<CardId>,
    pub used_white_card_ids: Vec<CardId>,
    pub czar_order: Vec<UserId>,
    pub czar_cursor: Option<usize>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&GameState> for GameRecord {
    fn from(state: &GameState) -> Self {
        Self {
            code: state.code.clone(),
            status: state.status,
            host_id: state.host_id.clone(),
            win_score: state.win_score,
            players: state
                .join_order
                .iter()
                .filter_map(|id| state.players.get(id).cloned())
                .collect(),
            join_order: state.join_order.clone(),
            current_round: state.current_round.clone(),
            used_black_card_ids: state.used_black_card_ids.clone(),
            used_white_card_ids: state.used_white_card_ids.clone(),
            czar_order: state.czar_order.clone(),
            czar_cursor: state.czar_cursor,
            created_at: state.created_at,
            updated_at: Utc::now(),
        }
    }
}

impl GameRecord {
    /// Rebuilds live room state from a persisted snapshot.
    pub fn into_state(self) -> GameState {
        GameState {
            code: self.code,
            status: self.status,
            host_id: self.host_id,
            win_score: self.win_score,
            players: self
                .players
                .into_iter()
                .map(|p| (p.id.clone(), p))
                .collect(),
            join_order: self.join_order,
            current_round: self.current_round,
            used_black_card_ids: self.used_black_card_ids,
            used_white_card_ids: self.used_white_card_ids,
            czar_order: self.czar_order,
            czar_cursor: self.czar_cursor,
            created_at: self.created_at,
        }
    }
}

/// Durable storage for room snapshots.
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Upserts the snapshot for a room.
    async fn save_game(&self, record: GameRecord) -> anyhow::Result<()>;

    /// Loads the snapshot for a room, if one was ever written.
    async fn load_game(&self, code: &GameCode) -> anyhow::Result<Option<GameRecord>>;

    /// Removes a room's snapshot (room deleted).
    async fn delete_game(&self, code: &GameCode) -> anyhow::Result<()>;
}
