//! Room registry: creates, restores, and routes to room actors.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::broadcast::Broadcaster;
use crate::cards::CardCatalog;
use crate::game::engine::LeaveOutcome;
use crate::game::entities::{GameCode, UserId};
use crate::game::errors::{GameError, GameResult};
use crate::game::state::GameState;
use crate::game::views::{GameStateView, project};
use crate::presence::{ConnectionId, Disconnected, EventSender, PresenceTracker, SharedPresence};
use crate::store::{GameRecord, GameStore};

use super::actor::{RoomActor, RoomHandle};
use super::config::RoomConfig;
use super::messages::Reconnected;

/// Owns the mapping from room code to live room actor, plus the shared
/// presence tracker all rooms broadcast through.
pub struct RoomManager {
    rooms: Arc<RwLock<HashMap<GameCode, RoomHandle>>>,
    presence: SharedPresence,
    broadcaster: Broadcaster,
    catalog: Arc<dyn CardCatalog>,
    store: Arc<dyn GameStore>,
}

impl RoomManager {
    pub fn new(catalog: Arc<dyn CardCatalog>, store: Arc<dyn GameStore>) -> Self {
        let presence = PresenceTracker::shared();
        let broadcaster = Broadcaster::new(presence.clone());
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            presence,
            broadcaster,
            catalog,
            store,
        }
    }

    pub fn presence(&self) -> SharedPresence {
        self.presence.clone()
    }

    pub fn broadcaster(&self) -> Broadcaster {
        self.broadcaster.clone()
    }

    /// Registers a freshly authenticated connection.
    pub async fn connect(&self, user_id: UserId, sender: EventSender) -> ConnectionId {
        self.presence.write().await.register(user_id, sender)
    }

    /// Creates a lobby under a freshly generated code and binds the
    /// creating connection to it.
    pub async fn create_room(
        &self,
        user_id: UserId,
        username: String,
        config: RoomConfig,
        conn: ConnectionId,
    ) -> GameResult<GameStateView> {
        config.validate()?;
        let mut rooms = self.rooms.write().await;
        let code = loop {
            let candidate = GameCode::generate();
            if !rooms.contains_key(&candidate) {
                break candidate;
            }
        };
        Ok(self
            .spawn_new(&mut rooms, code, user_id, username, config, conn)
            .await)
    }

    /// Creates a lobby under an explicitly chosen code. Fails when the code
    /// is already taken.
    pub async fn create_room_with_code(
        &self,
        code: GameCode,
        user_id: UserId,
        username: String,
        config: RoomConfig,
        conn: ConnectionId,
    ) -> GameResult<GameStateView> {
        config.validate()?;
        let mut rooms = self.rooms.write().await;
        if rooms.contains_key(&code) {
            return Err(GameError::GameAlreadyExists);
        }
        Ok(self
            .spawn_new(&mut rooms, code, user_id, username, config, conn)
            .await)
    }

    async fn spawn_new(
        &self,
        rooms: &mut HashMap<GameCode, RoomHandle>,
        code: GameCode,
        user_id: UserId,
        username: String,
        config: RoomConfig,
        conn: ConnectionId,
    ) -> GameStateView {
        let state = GameState::new(code.clone(), user_id.clone(), username, config.win_score);
        let view = project(&state, Some(&user_id));
        let record = GameRecord::from(&state);

        self.spawn_room(rooms, state);
        self.presence.write().await.bind_room(conn, code.clone());

        if let Err(e) = self.store.save_game(record).await {
            log::error!("room {code}: initial persist failed: {e:#}");
        }

        view
    }

    fn spawn_room(&self, rooms: &mut HashMap<GameCode, RoomHandle>, state: GameState) -> RoomHandle {
        let code = state.code().clone();
        let (actor, handle) = RoomActor::new(
            state,
            self.catalog.clone(),
            self.store.clone(),
            self.presence.clone(),
        );
        rooms.insert(code.clone(), handle.clone());
        tokio::spawn(actor.run());
        log::info!("room {code} created");
        handle
    }

    pub async fn get_room(&self, code: &GameCode) -> Option<RoomHandle> {
        self.rooms.read().await.get(code).cloned()
    }

    /// Fetches a live room, or re-activates it from the store after a
    /// process restart. Idempotent.
    pub async fn get_or_restore(&self, code: &GameCode) -> GameResult<RoomHandle> {
        if let Some(handle) = self.get_room(code).await {
            return Ok(handle);
        }

        let record = self
            .store
            .load_game(code)
            .await
            .map_err(|e| {
                log::error!("room {code}: load failed: {e:#}");
                GameError::GameNotFound
            })?
            .ok_or(GameError::GameNotFound)?;

        let mut rooms = self.rooms.write().await;
        if let Some(handle) = rooms.get(code) {
            // Another caller restored it while we were loading.
            return Ok(handle.clone());
        }
        log::info!("room {code} restored from store");
        Ok(self.spawn_room(&mut rooms, record.into_state()))
    }

    /// Shuts a room down and deletes its persisted snapshot.
    pub async fn remove_room(&self, code: &GameCode) -> GameResult<()> {
        let handle = self
            .rooms
            .write()
            .await
            .remove(code)
            .ok_or(GameError::GameNotFound)?;
        handle.shutdown().await;
        if let Err(e) = self.store.delete_game(code).await {
            log::error!("room {code}: delete failed: {e:#}");
        }
        log::info!("room {code} removed");
        Ok(())
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    pub async fn join_room(
        &self,
        code: &GameCode,
        user_id: UserId,
        username: String,
        conn: ConnectionId,
    ) -> GameResult<GameStateView> {
        let handle = self.get_room(code).await.ok_or(GameError::GameNotFound)?;
        handle.join(user_id, username, conn).await
    }

    /// Routes a leave and deletes the room when the last player walks out
    /// of an unstarted lobby.
    pub async fn leave_room(
        &self,
        code: &GameCode,
        user_id: UserId,
        conn: ConnectionId,
    ) -> GameResult<LeaveOutcome> {
        let handle = self.get_room(code).await.ok_or(GameError::GameNotFound)?;
        let outcome = handle.leave(user_id, conn).await?;
        if outcome == LeaveOutcome::LobbyEmpty {
            let _ = self.remove_room(code).await;
        }
        Ok(outcome)
    }

    /// Reconnects a player to their room, re-activating the room from the
    /// store first when necessary.
    pub async fn reconnect(
        &self,
        code: &GameCode,
        user_id: UserId,
        conn: ConnectionId,
    ) -> GameResult<Reconnected> {
        let handle = self.get_or_restore(code).await?;
        handle.reconnect(user_id, conn).await
    }

    /// Tears down a closed connection. Only when it was the user's last
    /// connection does their room learn about it.
    pub async fn disconnect_connection(&self, conn: ConnectionId) -> Option<Disconnected> {
        let outcome = self.presence.write().await.drop_connection(conn)?;
        if outcome.last_connection {
            if let Some(code) = &outcome.current_game {
                if let Some(handle) = self.get_room(code).await {
                    handle.connection_lost(outcome.user_id.clone()).await;
                }
            }
        }
        Some(outcome)
    }
}
