use ndarray::Array2;
use rand::prelude::*;
use rand::rngs::SmallRng;

use crate::*;

/// Strategy deciding which cells of a fresh board hold mines.
pub trait MinePlacer {
    /// Marks cells of `mines` as mined. Implementations are expected to mark exactly `config.mines()` distinct cells.
    fn place(&mut self, config: GameConfig, mines: &mut Array2<bool>);
}

/// Uniform placement by rejection sampling: pick a random cell, retry if it already holds a mine.
///
/// Terminates with probability 1 because a valid [`GameConfig`] always leaves at least one safe cell.
#[derive(Clone, Debug)]
pub struct RandomPlacer {
    rng: SmallRng,
}

impl RandomPlacer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl MinePlacer for RandomPlacer {
    fn place(&mut self, config: GameConfig, mines: &mut Array2<bool>) {
        let mut placed = 0;
        let mut attempts = 0u64;

        while placed < config.mines() {
            attempts += 1;
            let coords = (
                self.rng.random_range(0..config.rows()),
                self.rng.random_range(0..config.cols()),
            );
            if !mines[coords] {
                mines[coords] = true;
                placed += 1;
            }
        }

        log::trace!(
            "placed {} mines on {}x{} in {} attempts",
            placed,
            config.rows(),
            config.cols(),
            attempts
        );
    }
}

/// Places mines at a predetermined set of coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct FixedPlacer {
    coords: Vec<Coord2>,
}

impl FixedPlacer {
    pub fn new(coords: impl Into<Vec<Coord2>>) -> Self {
        Self {
            coords: coords.into(),
        }
    }
}

impl MinePlacer for FixedPlacer {
    fn place(&mut self, config: GameConfig, mines: &mut Array2<bool>) {
        for &coords in &self.coords {
            if config.contains(coords) {
                mines[coords] = true;
            } else {
                log::warn!("Ignoring mine outside the board at {:?}", coords);
            }
        }
    }
}
