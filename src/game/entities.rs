use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::constants::{CODE_ALPHABET, CODE_LENGTH, HAND_SIZE};

/// Type alias for externally-issued user identities. Users are registered
/// and authenticated by a separate service; the engine only routes on ids.
pub type UserId = String;

/// Type alias for card identities issued by the card catalog.
pub type CardId = String;

/// A room code: unique, case-insensitive, fixed-length alphanumeric.
///
/// Codes are normalized to uppercase on construction so that lookups can
/// never produce case-duplicate rooms.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct GameCode(String);

impl GameCode {
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_ascii_uppercase())
    }

    /// Generates a fresh random 6-character code.
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let code: String = (0..CODE_LENGTH)
            .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for GameCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<&str> for GameCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Room lifecycle status. Transitions are strictly ordered; nothing skips
/// a phase except room deletion.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Waiting,
    Picking,
    Judging,
    RoundEnd,
    GameEnd,
}

impl GameStatus {
    /// Whether a round is underway (a game has started and not yet ended).
    pub fn is_in_progress(self) -> bool {
        !matches!(self, Self::Waiting | Self::GameEnd)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameEnd)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Waiting => "waiting",
            Self::Picking => "picking",
            Self::Judging => "judging",
            Self::RoundEnd => "round end",
            Self::GameEnd => "game end",
        };
        write!(f, "{repr}")
    }
}

/// A prompt card. `pick` is how many white cards a submission must contain
/// (1 or 2 in the stock deck).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BlackCard {
    pub id: CardId,
    pub text: String,
    pub pick: u8,
}

/// A response card held in a player's hand.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WhiteCard {
    pub id: CardId,
    pub text: String,
}

/// Per-room state of one player. Mutated only by the round engine and the
/// presence layer; survives disconnects intact (only `is_active` flips).
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub id: UserId,
    pub username: String,
    pub score: u32,
    pub hand: Vec<CardId>,
    pub is_ready: bool,
    pub is_active: bool,
    pub has_submitted: bool,
}

impl PlayerState {
    pub fn new(id: UserId, username: String) -> Self {
        Self {
            id,
            username,
            score: 0,
            hand: Vec::with_capacity(HAND_SIZE),
            is_ready: false,
            is_active: true,
            has_submitted: false,
        }
    }

    pub fn holds_card(&self, card_id: &CardId) -> bool {
        self.hand.iter().any(|id| id == card_id)
    }
}

/// One player's answer to the current round's black card. The card order
/// matters for multi-pick prompts.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub id: String,
    pub player_id: UserId,
    pub card_ids: Vec<CardId>,
    pub cards: Vec<WhiteCard>,
}

/// A single round: the drawn black card, the judging czar, and the
/// submissions received so far. Immutable after judging except `winner_id`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub number: u32,
    pub black_card: BlackCard,
    pub czar_id: UserId,
    pub submissions: Vec<Submission>,
    pub winner_id: Option<UserId>,
}

impl Round {
    pub fn new(number: u32, black_card: BlackCard, czar_id: UserId) -> Self {
        Self {
            number,
            black_card,
            czar_id,
            submissions: Vec::new(),
            winner_id: None,
        }
    }

    pub fn submission(&self, submission_id: &str) -> Option<&Submission> {
        self.submissions.iter().find(|s| s.id == submission_id)
    }

    pub fn has_submission_from(&self, player_id: &UserId) -> bool {
        self.submissions.iter().any(|s| &s.player_id == player_id)
    }
}
