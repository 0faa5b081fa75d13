//! Game-wide constants.

/// Number of white cards a player holds outside a submission.
pub const HAND_SIZE: usize = 7;

/// Minimum number of active players required to start a game.
pub const MIN_PLAYERS: usize = 3;

/// Maximum number of players in a single room.
pub const MAX_PLAYERS: usize = 10;

/// Lowest win-score threshold a lobby may be created with.
pub const MIN_WIN_SCORE: u32 = 3;

/// Highest win-score threshold a lobby may be created with.
pub const MAX_WIN_SCORE: u32 = 20;

/// Win-score used when a lobby doesn't specify one.
pub const DEFAULT_WIN_SCORE: u32 = 7;

/// Length of a generated room code.
pub const CODE_LENGTH: usize = 6;

/// Characters a room code is drawn from.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
