//! In-memory state of a single game room.
//!
//! `GameState` is the canonical copy of a room during active play. It is
//! owned by exactly one room actor, so none of these methods need locking;
//! the actor's inbox serializes every mutation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::constants::MAX_PLAYERS;
use super::entities::{CardId, GameCode, GameStatus, PlayerState, Round, UserId};
use super::errors::{GameError, GameResult};

/// The full state of one room: lobby roster, round lifecycle, card ledgers,
/// and czar rotation.
#[derive(Clone, Debug)]
pub struct GameState {
    pub(crate) code: GameCode,
    pub(crate) status: GameStatus,
    pub(crate) host_id: UserId,
    pub(crate) win_score: u32,
    pub(crate) players: HashMap<UserId, PlayerState>,
    /// Player ids in the order they joined. Drives czar rotation and host
    /// migration deterministically.
    pub(crate) join_order: Vec<UserId>,
    pub(crate) current_round: Option<Round>,
    /// Every black card ever drawn in this room. Never reused.
    pub(crate) used_black_card_ids: Vec<CardId>,
    /// Every white card ever dealt into a hand in this room. Recorded at
    /// draw time, so a card can never reach two players.
    pub(crate) used_white_card_ids: Vec<CardId>,
    /// Fixed once the first round starts: the active players at game start,
    /// in join order. Inactive entries are skipped, not removed.
    pub(crate) czar_order: Vec<UserId>,
    pub(crate) czar_cursor: Option<usize>,
    pub(crate) created_at: DateTime<Utc>,
}

impl GameState {
    /// Creates a fresh lobby. The host joins immediately and is marked
    /// ready, matching lobby-creation semantics.
    pub fn new(code: GameCode, host_id: UserId, host_username: String, win_score: u32) -> Self {
        let mut host = PlayerState::new(host_id.clone(), host_username);
        host.is_ready = true;

        let mut players = HashMap::new();
        players.insert(host_id.clone(), host);

        Self {
            code,
            status: GameStatus::Waiting,
            host_id: host_id.clone(),
            win_score,
            players,
            join_order: vec![host_id],
            current_round: None,
            used_black_card_ids: Vec::new(),
            used_white_card_ids: Vec::new(),
            czar_order: Vec::new(),
            czar_cursor: None,
            created_at: Utc::now(),
        }
    }

    pub fn code(&self) -> &GameCode {
        &self.code
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn host_id(&self) -> &UserId {
        &self.host_id
    }

    pub fn win_score(&self) -> u32 {
        self.win_score
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.current_round.as_ref()
    }

    pub fn player(&self, user_id: &UserId) -> Option<&PlayerState> {
        self.players.get(user_id)
    }

    pub fn contains_player(&self, user_id: &UserId) -> bool {
        self.players.contains_key(user_id)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= MAX_PLAYERS
    }

    pub fn is_host(&self, user_id: &UserId) -> bool {
        &self.host_id == user_id
    }

    /// Players in join order (the stable iteration order used everywhere
    /// player lists are exposed).
    pub fn players_in_join_order(&self) -> impl Iterator<Item = &PlayerState> {
        self.join_order
            .iter()
            .filter_map(|id| self.players.get(id))
    }

    pub fn active_players(&self) -> impl Iterator<Item = &PlayerState> {
        self.players_in_join_order().filter(|p| p.is_active)
    }

    pub fn active_count(&self) -> usize {
        self.active_players().count()
    }

    /// True when every active non-czar player has a recorded submission for
    /// the current round. False when no round is running.
    pub fn all_submitted(&self) -> bool {
        let Some(round) = &self.current_round else {
            return false;
        };
        self.active_players()
            .filter(|p| p.id != round.czar_id)
            .all(|p| p.has_submitted)
    }

    /// First player (in join order) whose score has reached the win
    /// threshold. At most one player can cross it per judged round.
    pub fn winner(&self) -> Option<&PlayerState> {
        self.players_in_join_order()
            .find(|p| p.score >= self.win_score)
    }

    /// Picks the czar for the next round without committing anything.
    ///
    /// The rotation order is frozen on first use; after that the cursor
    /// advances modulo the order length, skipping players who are currently
    /// inactive. One full pass with no active candidate is a failure, never
    /// a spin. A sole remaining active player keeps being selected.
    pub(crate) fn peek_next_czar(&self) -> GameResult<(Vec<UserId>, usize, UserId)> {
        let order = if self.czar_order.is_empty() {
            self.active_players().map(|p| p.id.clone()).collect()
        } else {
            self.czar_order.clone()
        };

        if order.is_empty() {
            return Err(GameError::NoAvailableCzar);
        }

        let start = match self.czar_cursor {
            Some(cursor) => (cursor + 1) % order.len(),
            None => 0,
        };

        for offset in 0..order.len() {
            let idx = (start + offset) % order.len();
            let candidate = &order[idx];
            if self
                .players
                .get(candidate)
                .is_some_and(|p| p.is_active)
            {
                return Ok((order.clone(), idx, candidate.clone()));
            }
        }

        Err(GameError::NoAvailableCzar)
    }

    /// Appends freshly dealt white cards to the room's no-reuse ledger.
    pub(crate) fn record_dealt_whites(&mut self, card_ids: &[CardId]) {
        self.used_white_card_ids
            .extend(card_ids.iter().cloned());
    }

    pub(crate) fn record_drawn_black(&mut self, card_id: CardId) {
        self.used_black_card_ids.push(card_id);
    }
}
