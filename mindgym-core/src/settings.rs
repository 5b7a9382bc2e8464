//! Player preferences shared by every game.

use serde::{Deserialize, Serialize};

use crate::record::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Difficulty games start at.
    pub preferred_difficulty: Difficulty,
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preferred_difficulty: Difficulty::Medium,
            sound_enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: Settings = serde_json::from_str(r#"{"preferredDifficulty":"hard"}"#).unwrap();
        assert_eq!(parsed.preferred_difficulty, Difficulty::Hard);
        assert!(parsed.sound_enabled);
    }
}
