use thiserror::Error;

use crate::{CellCount, Coord};

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid board: {rows}x{cols} with {mines} mines")]
    InvalidConfig {
        rows: Coord,
        cols: Coord,
        mines: CellCount,
    },
    #[error("Board too large: {rows}x{cols}, sides are limited to {max_side}")]
    TooLarge {
        rows: Coord,
        cols: Coord,
        max_side: Coord,
    },
    #[error("Round already ended, no new moves are accepted")]
    RoundFinished,
    #[error("Not enough score: need {needed}, have {available}")]
    InsufficientScore { needed: u32, available: u32 },
    #[error("Item already held")]
    ItemAlreadyHeld,
    #[error("No such item in inventory")]
    NoItem,
}

pub type Result<T> = core::result::Result<T, GameError>;
