//! Game modes with independent statistics.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A key-count variant tracked with its own statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GameMode {
    Keys4,
    Keys7,
}

impl GameMode {
    /// Mode used when a key count is not part of the known set.
    pub const DEFAULT: GameMode = GameMode::Keys4;

    /// Every mode the statistics layer knows about.
    pub const ALL: [GameMode; 2] = [GameMode::Keys4, GameMode::Keys7];

    pub const fn key_count(self) -> u8 {
        match self {
            GameMode::Keys4 => 4,
            GameMode::Keys7 => 7,
        }
    }

    /// Exact lookup, `None` for unknown key counts.
    pub fn try_from_key_count(key_count: u8) -> Option<Self> {
        GameMode::ALL
            .into_iter()
            .find(|mode| mode.key_count() == key_count)
    }

    /// Lenient lookup: unknown key counts degrade to [`GameMode::DEFAULT`].
    pub fn from_key_count(key_count: u8) -> Self {
        Self::try_from_key_count(key_count).unwrap_or_else(|| {
            log::warn!(
                "STATS: Unknown key count {}, using {} statistics",
                key_count,
                GameMode::DEFAULT
            );
            GameMode::DEFAULT
        })
    }
}

impl Default for GameMode {
    fn default() -> Self {
        GameMode::DEFAULT
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.key_count())
    }
}
