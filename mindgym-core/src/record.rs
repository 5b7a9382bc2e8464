//! Score records and the identifiers they are filed under.

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ParseDifficultyError;

/// Difficulty tier a game was played at.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

/// Built-in games shipped with the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameKind {
    MemoryMatch,
    SequenceRecall,
    ColorClash,
    PatternLogic,
    NumberMemory,
    ReactionFocus,
}

impl GameKind {
    pub const ALL: [Self; 6] = [
        Self::MemoryMatch,
        Self::SequenceRecall,
        Self::ColorClash,
        Self::PatternLogic,
        Self::NumberMemory,
        Self::ReactionFocus,
    ];

    /// Stable storage key for the game.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::MemoryMatch => "memory-match",
            Self::SequenceRecall => "sequence-recall",
            Self::ColorClash => "color-clash",
            Self::PatternLogic => "pattern-logic",
            Self::NumberMemory => "number-memory",
            Self::ReactionFocus => "reaction-focus",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::MemoryMatch => "Memory Match",
            Self::SequenceRecall => "Sequence Recall",
            Self::ColorClash => "Color Clash",
            Self::PatternLogic => "Pattern Logic",
            Self::NumberMemory => "Number Memory",
            Self::ReactionFocus => "Reaction Focus",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

/// Identifier a game's records are filed under.
///
/// Ids outside [`GameKind`] are accepted so new games can record results
/// without a core release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id holds no visible characters.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    #[must_use]
    pub fn kind(&self) -> Option<GameKind> {
        GameKind::from_id(&self.0)
    }

    /// Human readable label, falling back to the raw id for unknown games.
    #[must_use]
    pub fn label(&self) -> &str {
        self.kind().map_or(self.as_str(), |kind| kind.display_name())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for GameId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for GameId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GameId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<GameKind> for GameId {
    fn from(kind: GameKind) -> Self {
        Self::new(kind.id())
    }
}

/// One completed game attempt. The game id is the ledger key, not a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub score: u32,
    pub difficulty: Difficulty,
    /// UTC calendar day the attempt was recorded, serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Event emitted by a game when a session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameCompleted {
    pub game: GameId,
    pub score: u32,
    pub difficulty: Difficulty,
}

impl GameCompleted {
    #[must_use]
    pub fn new(game: impl Into<GameId>, score: u32, difficulty: Difficulty) -> Self {
        Self {
            game: game.into(),
            score,
            difficulty,
        }
    }
}

/// A record paired with the game it belongs to, for cross-game listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatedEntry {
    pub game: GameId,
    #[serde(flatten)]
    pub record: ScoreRecord,
}
