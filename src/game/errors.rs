//! Error types for game room operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result alias for round engine operations.
pub type GameResult<T> = Result<T, GameError>;

/// Broad classification of a [`GameError`], mirroring how transport layers
/// map rejections onto status codes.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Room, round, submission, or player absent.
    NotFound,
    /// Action attempted in the wrong lifecycle phase.
    InvalidState,
    /// Actor lacks the required role (not host, not czar).
    Forbidden,
    /// Malformed or inapplicable payload.
    ValidationFailed,
}

/// Everything a player action can be rejected with. Rejections are reported
/// synchronously to the acting player and leave room state untouched.
#[derive(Clone, Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("Game not found")]
    GameNotFound,
    #[error("Player not in game")]
    PlayerNotInGame,
    #[error("Submission not found")]
    SubmissionNotFound,
    #[error("No active round")]
    NoActiveRound,

    #[error("Game has already started")]
    AlreadyStarted,
    #[error("Not in picking phase")]
    NotPicking,
    #[error("Not in judging phase")]
    NotJudging,
    #[error("Not in round end phase")]
    NotRoundEnd,
    #[error("Already submitted cards")]
    AlreadySubmitted,
    #[error("Game has ended")]
    GameEnded,

    #[error("Only the host can do that")]
    NotHost,
    #[error("Czar cannot submit cards")]
    CzarCannotSubmit,
    #[error("Only the czar can judge")]
    NotCzar,

    #[error("Game already exists")]
    GameAlreadyExists,
    #[error("Lobby is full (max 10 players)")]
    LobbyFull,
    #[error("You are not in this lobby")]
    NotInLobby,
    #[error("Need at least 3 players to start")]
    NotEnoughPlayers,
    #[error("Not all players are ready")]
    PlayersNotReady,
    #[error("Must submit exactly {required} card(s)")]
    WrongCardCount { required: u8 },
    #[error("Card not in your hand")]
    CardNotInHand,
    #[error("Player is not active")]
    PlayerInactive,
    #[error("Points to win must be between 3 and 20")]
    InvalidWinScore,
    #[error("No black cards available")]
    NoBlackCards,
    #[error("No available czar")]
    NoAvailableCzar,
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::GameNotFound
            | Self::PlayerNotInGame
            | Self::SubmissionNotFound
            | Self::NoActiveRound => ErrorKind::NotFound,

            Self::AlreadyStarted
            | Self::NotPicking
            | Self::NotJudging
            | Self::NotRoundEnd
            | Self::AlreadySubmitted
            | Self::GameEnded => ErrorKind::InvalidState,

            Self::NotHost | Self::CzarCannotSubmit | Self::NotCzar => ErrorKind::Forbidden,

            Self::GameAlreadyExists
            | Self::LobbyFull
            | Self::NotInLobby
            | Self::NotEnoughPlayers
            | Self::PlayersNotReady
            | Self::WrongCardCount { .. }
            | Self::CardNotInHand
            | Self::PlayerInactive
            | Self::InvalidWinScore
            | Self::NoBlackCards
            | Self::NoAvailableCzar => ErrorKind::ValidationFailed,
        }
    }
}
