//! # Cartas
//!
//! A game-room engine for a Cards Against Humanity-style party game,
//! built around one actor task per room.
//!
//! Each room walks a five-phase lifecycle:
//!
//! - **Waiting**: lobby formation, ready checks, host migration
//! - **Picking**: active non-czar players submit white cards
//! - **Judging**: the czar picks a winner from anonymous submissions
//! - **RoundEnd**: identities revealed, host advances the round
//! - **GameEnd**: a player reached the win score; the room is locked
//!
//! ## Core Modules
//!
//! - [`game`]: room state machine, entities, errors, and projections
//! - [`room`]: actor-per-room serialization and the room registry
//! - [`presence`]: user-to-connection tracking and reconnect detection
//! - [`broadcast`]: event fan-out over connection sets
//! - [`cards`]: card catalog port (no card ever dealt twice per room)
//! - [`store`]: persistence port mirroring room state after each transition
//!
//! ## Example
//!
//! ```
//! use cartas::game::{GameCode, GameState};
//!
//! // Create a lobby; the host joins ready.
//! let state = GameState::new(GameCode::new("abc123"), "u1".into(), "ana".into(), 7);
//! assert_eq!(state.code().as_str(), "ABC123");
//! ```

pub mod broadcast;
pub mod cards;
pub mod events;
pub mod game;
pub mod presence;
pub mod room;
pub mod store;

pub use broadcast::Broadcaster;
pub use cards::{CardCatalog, InMemoryCatalog};
pub use events::ServerEvent;
pub use game::{ErrorKind, GameCode, GameError, GameState, GameStatus};
pub use presence::{ConnectionId, PresenceTracker};
pub use room::{RoomConfig, RoomHandle, RoomManager};
pub use store::{GameRecord, GameStore, InMemoryStore};
