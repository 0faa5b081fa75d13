//! In-memory store implementation, used by tests and in-process wiring.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::game::entities::GameCode;

use super::{GameRecord, GameStore};

/// A `GameStore` backed by a plain map. Provides the port's contract
/// without durability; a process crash loses it, which is the accepted
/// behavior for live room state.
#[derive(Default)]
pub struct InMemoryStore {
    games: Mutex<HashMap<GameCode, GameRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.games.lock().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl GameStore for InMemoryStore {
    async fn save_game(&self, record: GameRecord) -> anyhow::Result<()> {
        let mut games = self.games.lock().expect("store lock poisoned");
        games.insert(record.code.clone(), record);
        Ok(())
    }

    async fn load_game(&self, code: &GameCode) -> anyhow::Result<Option<GameRecord>> {
        let games = self.games.lock().expect("store lock poisoned");
        Ok(games.get(code).cloned())
    }

    async fn delete_game(&self, code: &GameCode) -> anyhow::Result<()> {
        let mut games = self.games.lock().expect("store lock poisoned");
        games.remove(code);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::GameState;

    fn record(code: &str) -> GameRecord {
        let state = GameState::new(GameCode::new(code), "h".into(), "host".into(), 5);
        GameRecord::from(&state)
    }

    #[tokio::test]
    async fn test_save_load_delete_cycle() {
        let store = InMemoryStore::new();
        let code = GameCode::new("ABC123");

        assert!(store.load_game(&code).await.unwrap().is_none());

        store.save_game(record("ABC123")).await.unwrap();
        let loaded = store.load_game(&code).await.unwrap().unwrap();
        assert_eq!(loaded.code, code);
        assert_eq!(loaded.win_score, 5);

        store.delete_game(&code).await.unwrap();
        assert!(store.load_game(&code).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_save_is_an_upsert() {
        let store = InMemoryStore::new();
        let code = GameCode::new("ABC123");

        store.save_game(record("ABC123")).await.unwrap();
        let mut updated = record("ABC123");
        updated.win_score = 9;
        store.save_game(updated).await.unwrap();

        assert_eq!(store.len(), 1);
        let loaded = store.load_game(&code).await.unwrap().unwrap();
        assert_eq!(loaded.win_score, 9);
    }

    #[tokio::test]
    async fn test_codes_are_case_insensitive() {
        let store = InMemoryStore::new();
        store.save_game(record("abc123")).await.unwrap();
        let loaded = store.load_game(&GameCode::new("ABC123")).await.unwrap();
        assert!(loaded.is_some());
    }
}
