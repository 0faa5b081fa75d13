//! Broadcast dispatcher: fans events out to connections.
//!
//! Pure routing over the presence tracker's connection sets. Holds no game
//! state and performs no validation; closed channels are skipped.

use crate::events::ServerEvent;
use crate::game::entities::{GameCode, UserId};
use crate::presence::{ConnectionId, SharedPresence};

#[derive(Clone)]
pub struct Broadcaster {
    presence: SharedPresence,
}

impl Broadcaster {
    pub fn new(presence: SharedPresence) -> Self {
        Self { presence }
    }

    /// Delivers an event to every connection bound to a room, optionally
    /// excluding the connection that triggered it (no echo).
    pub async fn to_room(
        &self,
        code: &GameCode,
        event: ServerEvent,
        exclude: Option<ConnectionId>,
    ) {
        let senders = self.presence.read().await.room_senders(code, exclude);
        for sender in senders {
            if sender.send(event.clone()).is_err() {
                log::debug!("room {code}: dropping event for closed connection");
            }
        }
    }

    /// Delivers an event to every connection a user holds (covers a user
    /// with multiple open tabs).
    pub async fn to_user(&self, user_id: &UserId, event: ServerEvent) {
        let senders = self.presence.read().await.user_senders(user_id);
        for sender in senders {
            if sender.send(event.clone()).is_err() {
                log::debug!("user {user_id}: dropping event for closed connection");
            }
        }
    }
}
