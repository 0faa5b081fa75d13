//! The game engine: room state machine, entities, and projections.
//!
//! This module implements:
//! - The room lifecycle FSM (`Waiting → Picking → Judging → RoundEnd →
//!   GameEnd`) with validate-then-mutate operations
//! - Lobby management (join, leave, ready, host migration)
//! - Czar rotation, card ledgers, and win detection
//! - Role- and phase-dependent state projections

pub mod constants;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod state;
pub mod views;

pub use engine::{DisconnectOutcome, JudgeOutcome, LeaveOutcome, RoundStart, SubmitOutcome};
pub use entities::{
    BlackCard, CardId, GameCode, GameStatus, PlayerState, Round, Submission, UserId, WhiteCard,
};
pub use errors::{ErrorKind, GameError, GameResult};
pub use state::GameState;
pub use views::{GameStateView, PlayerView, RoundView, SubmissionView, project};
