use serde::{Deserialize, Serialize};

/// Fixed content of a board cell, decided at generation time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tile {
    Mine,
    /// Number of mines among the up-to-8 neighbors.
    Count(u8),
}

impl Tile {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::Count(0)
    }
}

/// Player-visible state of a cell, revealed taking precedence over flagged.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellView {
    Hidden,
    Flagged,
    Mine,
    Open(u8),
}
