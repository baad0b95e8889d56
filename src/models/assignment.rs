use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub assignment_id: String,
    pub game_name: String,
    #[serde(default)]
    pub classroom_id: String,
}

/// Payload for creating an assignment
#[derive(Debug, Serialize)]
pub struct NewAssignment<'a> {
    pub classroom_id: &'a str,
    pub game_name: &'a str,
    pub level_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreatedAssignment {
    #[serde(default)]
    pub assignment_id: Option<String>,
}

/// Games whose assignment ids are kept in the local id cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WellKnownGame {
    #[serde(rename = "GameJump")]
    GameJump,
    #[serde(rename = "QJ_1-1")]
    RioSplash,
}

impl WellKnownGame {
    pub const ALL: [WellKnownGame; 2] = [WellKnownGame::GameJump, WellKnownGame::RioSplash];

    pub fn as_str(&self) -> &'static str {
        match self {
            WellKnownGame::GameJump => "GameJump",
            WellKnownGame::RioSplash => "QJ_1-1",
        }
    }

    pub fn from_game_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|game| game.as_str() == name)
    }
}

impl fmt::Display for WellKnownGame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WellKnownGame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_game_name(s).ok_or_else(|| format!("Unknown game: {}", s))
    }
}
