//! Server-to-client events.
//!
//! Every payload the engine pushes to connections, tagged with the socket
//! event names clients subscribe to. Room-scoped events go through
//! [`crate::broadcast::Broadcaster::to_room`]; user-scoped events (hands)
//! through [`crate::broadcast::Broadcaster::to_user`].

use serde::{Deserialize, Serialize};

use crate::game::engine::RoundStart;
use crate::game::entities::{Submission, UserId, WhiteCard};
use crate::game::views::{GameStateView, PlayerView, SubmissionView};

/// An event pushed to one or more client connections.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// The lobby was created; sent to the creator.
    #[serde(rename = "lobby:created", rename_all = "camelCase")]
    LobbyCreated { lobby: GameStateView },

    /// Roster or ready flags changed; sent to the whole room.
    #[serde(rename = "lobby:updated", rename_all = "camelCase")]
    LobbyUpdated { lobby: GameStateView },

    /// The game started: round 1 plus the full room state.
    #[serde(rename = "game:started", rename_all = "camelCase")]
    GameStarted {
        #[serde(flatten)]
        round: RoundStart,
        game_state: GameStateView,
    },

    /// A new round opened after the host advanced.
    #[serde(rename = "game:new_round", rename_all = "camelCase")]
    NewRound {
        #[serde(flatten)]
        round: RoundStart,
    },

    /// Someone submitted. Only the submitter id travels, never the cards,
    /// so judging stays anonymous.
    #[serde(rename = "game:card_submitted", rename_all = "camelCase")]
    CardSubmitted { player_id: UserId },

    /// Every submission is in; the room moved to judging. Submissions are
    /// projected under the current visibility rules (no owner ids).
    #[serde(rename = "game:all_submitted", rename_all = "camelCase")]
    AllSubmitted { submissions: Vec<SubmissionView> },

    /// The czar judged the round.
    #[serde(rename = "game:round_winner", rename_all = "camelCase")]
    RoundWinner {
        winner_id: UserId,
        winner_username: String,
        winning_submission: Submission,
        game_ended: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        final_winner_id: Option<UserId>,
    },

    /// Someone reached the win threshold; the room is locked.
    #[serde(rename = "game:ended", rename_all = "camelCase")]
    GameEnded {
        winner_id: UserId,
        final_scores: Vec<PlayerView>,
    },

    /// A player's last connection closed mid-game.
    #[serde(rename = "lobby:player_disconnected", rename_all = "camelCase")]
    PlayerDisconnected { player_id: UserId, username: String },

    /// A previously disconnected player came back.
    #[serde(rename = "lobby:player_reconnected", rename_all = "camelCase")]
    PlayerReconnected { player_id: UserId, username: String },

    /// The recipient's current hand. User-scoped only.
    #[serde(rename = "game:hand", rename_all = "camelCase")]
    Hand { hand: Vec<WhiteCard> },

    /// Full room state for the requester.
    #[serde(rename = "game:state", rename_all = "camelCase")]
    State { state: GameStateView },

    /// A rejected action, reported only to the actor that caused it.
    #[serde(rename = "error", rename_all = "camelCase")]
    Error { message: String },
}
