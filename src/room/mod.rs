//! Room module: actor-per-room serialization and the room registry.
//!
//! Each room runs in its own tokio task with an mpsc inbox; all mutations
//! of one room are applied in the order they are accepted, while separate
//! rooms run fully in parallel. The `RoomManager` owns the code-to-actor
//! mapping and room lifecycle (create, restore, delete).

pub mod actor;
pub mod config;
pub mod manager;
pub mod messages;

pub use actor::{RoomActor, RoomHandle};
pub use config::RoomConfig;
pub use manager::RoomManager;
pub use messages::{Reconnected, RoomMessage};
