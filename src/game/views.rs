//! Role- and phase-dependent projections of room state.
//!
//! What a player is allowed to see changes with the round lifecycle:
//! submissions stay hidden while picking, appear anonymously while judging,
//! and are revealed with their owners once the round ends. A player's hand
//! only ever travels on per-user deliveries, never in room broadcasts.
//! Projection is pure so it can be tested apart from mutation.

use serde::{Deserialize, Serialize};

use super::entities::{BlackCard, CardId, GameCode, GameStatus, UserId, WhiteCard};
use super::state::GameState;

/// Public view of one player. Hands are reduced to a count.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub id: UserId,
    pub username: String,
    pub score: u32,
    pub is_ready: bool,
    pub is_active: bool,
    pub has_submitted: bool,
    pub hand_count: usize,
}

/// Public view of one submission. `player_id` is only attached once the
/// round has been judged (anonymous judging).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionView {
    pub id: String,
    pub cards: Vec<WhiteCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_id: Option<UserId>,
}

/// Public view of the current round.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub number: u32,
    pub black_card: BlackCard,
    pub czar_id: UserId,
    pub submission_count: usize,
    pub winner_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submissions: Option<Vec<SubmissionView>>,
}

/// Everything a client may know about a room. `my_hand` is only populated
/// for the requesting player and omitted from broadcast payloads.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    pub code: GameCode,
    pub status: GameStatus,
    pub host_id: UserId,
    pub points_to_win: u32,
    pub players: Vec<PlayerView>,
    pub current_round: Option<RoundView>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_hand: Option<Vec<CardId>>,
}

/// Projects a room for one requester (or for broadcast when `for_player`
/// is `None`).
pub fn project(state: &GameState, for_player: Option<&UserId>) -> GameStateView {
    let players = state
        .players_in_join_order()
        .map(|p| PlayerView {
            id: p.id.clone(),
            username: p.username.clone(),
            score: p.score,
            is_ready: p.is_ready,
            is_active: p.is_active,
            has_submitted: p.has_submitted,
            hand_count: p.hand.len(),
        })
        .collect();

    let current_round = state.current_round().map(|round| {
        let submissions = match state.status() {
            GameStatus::Judging | GameStatus::RoundEnd => Some(
                round
                    .submissions
                    .iter()
                    .map(|s| SubmissionView {
                        id: s.id.clone(),
                        cards: s.cards.clone(),
                        player_id: (state.status() == GameStatus::RoundEnd)
                            .then(|| s.player_id.clone()),
                    })
                    .collect(),
            ),
            _ => None,
        };

        RoundView {
            number: round.number,
            black_card: round.black_card.clone(),
            czar_id: round.czar_id.clone(),
            submission_count: round.submissions.len(),
            winner_id: round.winner_id.clone(),
            submissions,
        }
    });

    let my_hand = for_player
        .and_then(|id| state.player(id))
        .map(|p| p.hand.clone());

    GameStateView {
        code: state.code().clone(),
        status: state.status(),
        host_id: state.host_id().clone(),
        points_to_win: state.win_score(),
        players,
        current_round,
        my_hand,
    }
}

/// Projects only the current round's submissions under the current
/// visibility rules (used by the all-submitted broadcast).
pub fn project_submissions(state: &GameState) -> Vec<SubmissionView> {
    project(state, None)
        .current_round
        .and_then(|r| r.submissions)
        .unwrap_or_default()
}
