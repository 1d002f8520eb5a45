use serde::{Deserialize, Serialize};

use crate::*;

/// Probability with which leftover mode pre-reveals each cell.
pub const DEFAULT_REVEAL_CHANCE: f64 = 0.5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Custom(GameConfig),
}

impl Difficulty {
    pub const PRESETS: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub const fn config(self) -> GameConfig {
        match self {
            Self::Easy => GameConfig::new_unchecked(8, 8, 10),
            Self::Medium => GameConfig::new_unchecked(16, 16, 40),
            Self::Hard => GameConfig::new_unchecked(24, 24, 99),
            Self::Custom(config) => config,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Custom(_) => "custom",
        }
    }
}

/// Game mode selected from the menu, carrying its mode-specific parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameMode {
    Classic(Difficulty),
    /// Starts with a random part of the board already revealed.
    Leftover {
        difficulty: Difficulty,
        reveal_chance: f64,
    },
    Ladder(LadderConfig),
}

impl GameMode {
    pub fn leftover(difficulty: Difficulty) -> Self {
        Self::Leftover {
            difficulty,
            reveal_chance: DEFAULT_REVEAL_CHANCE,
        }
    }

    /// Token identifying the mode in history records.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Classic(_) => "classic",
            Self::Leftover { .. } => "leftover",
            Self::Ladder(_) => "ladder",
        }
    }

    pub const fn is_ladder(&self) -> bool {
        matches!(self, Self::Ladder(_))
    }

    /// Board of a round in this mode. `level` only matters for the ladder.
    pub fn board_config(&self, level: u32) -> GameConfig {
        match self {
            Self::Classic(difficulty) | Self::Leftover { difficulty, .. } => difficulty.config(),
            Self::Ladder(ladder) => ladder.level_config(level),
        }
    }

    pub fn start_round(&self, level: u32, seed: u64) -> Round {
        let mut round = Round::generate(self.board_config(level), seed);
        if let Self::Leftover { reveal_chance, .. } = self {
            let disclosed = round.scatter_reveal(*reveal_chance);
            log::debug!("leftover board starts with {} cells revealed", disclosed);
        }
        round
    }
}
