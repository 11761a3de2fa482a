use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Player profile as returned by `GET /players`.
/// Only the fields needed to read a skill level are modelled.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct FaceitPlayer {
    #[serde(default)]
    pub player_id: String,
    #[serde(default)]
    pub games: HashMap<String, GameStats>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
pub struct GameStats {
    #[serde(default)]
    pub skill_level: i32,
}

impl FaceitPlayer {
    /// Skill level for `game`, or `None` when the profile has no positive level for it.
    pub fn skill_level(&self, game: &str) -> Option<i32> {
        self.games
            .get(game)
            .map(|stats| stats.skill_level)
            .filter(|level| *level > 0)
    }
}
