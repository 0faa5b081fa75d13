//! Presence tracking: which users are connected, over which connections,
//! and which room each connection currently occupies.
//!
//! A user may hold several connections at once (two browser tabs). A player
//! only counts as gone when their *last* connection closes; until then
//! disconnects of individual connections are invisible to game state.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;

use crate::events::ServerEvent;
use crate::game::entities::{GameCode, UserId};

/// Opaque id for one live connection.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Outbound channel of one connection. The transport layer drains the
/// receiving end and writes frames to the socket.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Shared handle to the tracker, as held by the manager, the broadcaster,
/// and each room actor.
pub type SharedPresence = Arc<RwLock<PresenceTracker>>;

struct Connection {
    user_id: UserId,
    sender: EventSender,
    current_game: Option<GameCode>,
}

/// What dropping a connection meant for its user.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Disconnected {
    pub user_id: UserId,
    /// True when this was the user's last open connection; only then does
    /// the player become inactive in their room.
    pub last_connection: bool,
    /// Room the closed connection was bound to, if any.
    pub current_game: Option<GameCode>,
}

/// Registry of live connections, indexed by user and by room.
#[derive(Default)]
pub struct PresenceTracker {
    connections: HashMap<ConnectionId, Connection>,
    by_user: HashMap<UserId, HashSet<ConnectionId>>,
    by_room: HashMap<GameCode, HashSet<ConnectionId>>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedPresence {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Registers a freshly opened connection for an authenticated user.
    pub fn register(&mut self, user_id: UserId, sender: EventSender) -> ConnectionId {
        let conn = ConnectionId::new();
        self.by_user
            .entry(user_id.clone())
            .or_default()
            .insert(conn);
        self.connections.insert(
            conn,
            Connection {
                user_id: user_id.clone(),
                sender,
                current_game: None,
            },
        );
        log::debug!("connection {conn} registered for user {user_id}");
        conn
    }

    /// Removes a closed connection and reports whether its user is now
    /// fully offline.
    pub fn drop_connection(&mut self, conn: ConnectionId) -> Option<Disconnected> {
        let connection = self.connections.remove(&conn)?;

        if let Some(code) = &connection.current_game {
            if let Some(set) = self.by_room.get_mut(code) {
                set.remove(&conn);
                if set.is_empty() {
                    self.by_room.remove(code);
                }
            }
        }

        let mut last_connection = false;
        if let Some(set) = self.by_user.get_mut(&connection.user_id) {
            set.remove(&conn);
            if set.is_empty() {
                self.by_user.remove(&connection.user_id);
                last_connection = true;
            }
        }

        log::debug!(
            "connection {conn} dropped for user {} (last: {last_connection})",
            connection.user_id
        );

        Some(Disconnected {
            user_id: connection.user_id,
            last_connection,
            current_game: connection.current_game,
        })
    }

    /// Points a connection at a room; broadcasts to that room will reach it
    /// from now on. A connection occupies at most one room.
    pub fn bind_room(&mut self, conn: ConnectionId, code: GameCode) {
        let Some(connection) = self.connections.get_mut(&conn) else {
            return;
        };
        if let Some(previous) = connection.current_game.take() {
            if let Some(set) = self.by_room.get_mut(&previous) {
                set.remove(&conn);
                if set.is_empty() {
                    self.by_room.remove(&previous);
                }
            }
        }
        connection.current_game = Some(code.clone());
        self.by_room.entry(code).or_default().insert(conn);
    }

    pub fn unbind_room(&mut self, conn: ConnectionId) {
        let Some(connection) = self.connections.get_mut(&conn) else {
            return;
        };
        if let Some(code) = connection.current_game.take() {
            if let Some(set) = self.by_room.get_mut(&code) {
                set.remove(&conn);
                if set.is_empty() {
                    self.by_room.remove(&code);
                }
            }
        }
    }

    pub fn user_of(&self, conn: ConnectionId) -> Option<&UserId> {
        self.connections.get(&conn).map(|c| &c.user_id)
    }

    pub fn is_user_connected(&self, user_id: &UserId) -> bool {
        self.by_user.contains_key(user_id)
    }

    pub fn user_connection_count(&self, user_id: &UserId) -> usize {
        self.by_user.get(user_id).map_or(0, HashSet::len)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Senders for every connection bound to a room, optionally skipping
    /// the connection that triggered the event.
    pub(crate) fn room_senders(
        &self,
        code: &GameCode,
        exclude: Option<ConnectionId>,
    ) -> Vec<EventSender> {
        self.by_room
            .get(code)
            .map(|set| {
                set.iter()
                    .filter(|conn| Some(**conn) != exclude)
                    .filter_map(|conn| self.connections.get(conn))
                    .map(|c| c.sender.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Senders for every connection a user currently holds.
    pub(crate) fn user_senders(&self, user_id: &UserId) -> Vec<EventSender> {
        self.by_user
            .get(user_id)
            .map(|set| {
                set.iter()
                    .filter_map(|conn| self.connections.get(conn))
                    .map(|c| c.sender.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}
