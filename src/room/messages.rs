//! Room actor message types.

use tokio::sync::oneshot;

use crate::game::engine::{JudgeOutcome, LeaveOutcome, RoundStart, SubmitOutcome};
use crate::game::entities::{CardId, UserId, WhiteCard};
use crate::game::errors::GameResult;
use crate::game::views::GameStateView;
use crate::presence::ConnectionId;

/// Messages that can be sent to a `RoomActor`. Every player action carries
/// a reply channel so rejections reach the acting player synchronously.
#[derive(Debug)]
pub enum RoomMessage {
    /// Join the lobby (or reactivate an existing seat).
    Join {
        user_id: UserId,
        username: String,
        conn: ConnectionId,
        reply: oneshot::Sender<GameResult<GameStateView>>,
    },

    /// Leave the room.
    Leave {
        user_id: UserId,
        conn: ConnectionId,
        reply: oneshot::Sender<GameResult<LeaveOutcome>>,
    },

    /// Toggle the lobby ready flag.
    SetReady {
        user_id: UserId,
        is_ready: bool,
        reply: oneshot::Sender<GameResult<GameStateView>>,
    },

    /// Start the game (host only).
    Start {
        user_id: UserId,
        reply: oneshot::Sender<GameResult<RoundStart>>,
    },

    /// Submit white cards for the current round.
    SubmitCards {
        user_id: UserId,
        card_ids: Vec<CardId>,
        reply: oneshot::Sender<GameResult<SubmitOutcome>>,
    },

    /// Judge the winning submission (czar only).
    JudgeWinner {
        user_id: UserId,
        submission_id: String,
        reply: oneshot::Sender<GameResult<JudgeOutcome>>,
    },

    /// Advance to the next round (host only).
    NextRound {
        user_id: UserId,
        reply: oneshot::Sender<GameResult<RoundStart>>,
    },

    /// Snapshot the room state, projected for the requester.
    GetState {
        user_id: Option<UserId>,
        reply: oneshot::Sender<GameStateView>,
    },

    /// Resolve the requester's current hand.
    GetHand {
        user_id: UserId,
        reply: oneshot::Sender<GameResult<Vec<WhiteCard>>>,
    },

    /// Re-mark a returning player active and rebind their connection.
    Reconnect {
        user_id: UserId,
        conn: ConnectionId,
        reply: oneshot::Sender<GameResult<Reconnected>>,
    },

    /// A user's last connection closed; flag them inactive.
    ConnectionLost { user_id: UserId },

    /// Stop the actor.
    Shutdown,
}

/// Reply to a successful reconnect: the full room state plus the hand,
/// resent to the returning player only.
#[derive(Clone, Debug, PartialEq)]
pub struct Reconnected {
    pub game_state: GameStateView,
    pub hand: Vec<WhiteCard>,
}
