use serde::{Deserialize, Serialize};

pub use board::*;
pub use error::*;
pub use ladder::*;
pub use mode::*;
pub use placement::*;
pub use round::*;
pub use tile::*;
pub use types::*;

mod board;
mod error;
mod ladder;
mod mode;
mod placement;
mod round;
mod tile;
mod types;

/// Board dimensions and mine count of a single round.
///
/// A value of this type always satisfies `rows > 0`, `cols > 0` and
/// `0 < mines < rows * cols`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameConfig")]
pub struct GameConfig {
    rows: Coord,
    cols: Coord,
    mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(rows: Coord, cols: Coord, mines: CellCount) -> Self {
        Self { rows, cols, mines }
    }

    pub fn new(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        let invalid = GameError::InvalidConfig { rows, cols, mines };
        if rows == 0 || cols == 0 || mines == 0 {
            return Err(invalid);
        }
        let total = rows.checked_mul(cols).ok_or(invalid)?;
        if mines >= total {
            return Err(invalid);
        }
        Ok(Self::new_unchecked(rows, cols, mines))
    }

    /// Like [`GameConfig::new`], but also caps both sides at `max_side`.
    pub fn bounded(rows: Coord, cols: Coord, mines: CellCount, max_side: Coord) -> Result<Self> {
        if rows > max_side || cols > max_side {
            return Err(GameError::TooLarge {
                rows,
                cols,
                max_side,
            });
        }
        Self::new(rows, cols, mines)
    }

    pub const fn rows(&self) -> Coord {
        self.rows
    }

    pub const fn cols(&self) -> Coord {
        self.cols
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn mines(&self) -> CellCount {
        self.mines
    }

    pub const fn total_cells(&self) -> CellCount {
        self.rows * self.cols
    }

    pub const fn safe_cells(&self) -> CellCount {
        self.total_cells() - self.mines
    }

    pub const fn contains(&self, (x, y): Coord2) -> bool {
        x < self.rows && y < self.cols
    }
}

#[derive(Deserialize)]
struct RawGameConfig {
    rows: Coord,
    cols: Coord,
    mines: CellCount,
}

impl TryFrom<RawGameConfig> for GameConfig {
    type Error = GameError;

    fn try_from(raw: RawGameConfig) -> Result<Self> {
        Self::new(raw.rows, raw.cols, raw.mines)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    OutOfBounds,
    Changed,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    OutOfBounds,
    /// Number of cells disclosed by the move, cascade included.
    Revealed(CellCount),
    /// A mine was hit but a revive was consumed; the mine cell is now revealed.
    Revived,
    HitMine,
    Won,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_degenerate_boards() {
        assert!(GameConfig::new(0, 4, 1).is_err());
        assert!(GameConfig::new(4, 0, 1).is_err());
        assert!(GameConfig::new(4, 4, 0).is_err());
        assert_eq!(
            GameConfig::new(4, 4, 16),
            Err(GameError::InvalidConfig {
                rows: 4,
                cols: 4,
                mines: 16
            })
        );
    }

    #[test]
    fn config_accepts_one_safe_cell() {
        let config = GameConfig::new(4, 4, 15).unwrap();
        assert_eq!(config.safe_cells(), 1);
        assert!(config.contains((3, 3)));
        assert!(!config.contains((4, 0)));
    }

    #[test]
    fn bounded_config_caps_sides() {
        assert_eq!(
            GameConfig::bounded(100_000, 100_000, 1, 30),
            Err(GameError::TooLarge {
                rows: 100_000,
                cols: 100_000,
                max_side: 30
            })
        );
        assert!(GameConfig::bounded(8, 31, 1, 30).is_err());
        assert_eq!(GameConfig::bounded(30, 30, 99, 30).unwrap().size(), (30, 30));
        assert!(GameConfig::bounded(2, 2, 4, 30).is_err());
    }

    #[test]
    fn config_deserialization_is_validated() {
        assert!(from_raw(3, 3, 9).is_err());
        assert_eq!(from_raw(3, 3, 2).unwrap().mines(), 2);
    }

    fn from_raw(rows: Coord, cols: Coord, mines: CellCount) -> Result<GameConfig> {
        GameConfig::try_from(RawGameConfig { rows, cols, mines })
    }
}
