use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Board contents plus the revealed and flagged masks of one round.
///
/// The board is built empty by [`Minefield::new`], then filled with [`Minefield::place_mines`] and numbered with
/// [`Minefield::compute_adjacency`]. [`Minefield::with_mines`] does all three for a known layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Minefield {
    config: GameConfig,
    tiles: Array2<Tile>,
    revealed: Array2<bool>,
    flagged: Array2<bool>,
    revealed_count: CellCount,
}

impl Minefield {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            tiles: Array2::default(config.size()),
            revealed: Array2::default(config.size()),
            flagged: Array2::default(config.size()),
            revealed_count: 0,
        }
    }

    /// Validates the dimensions and allocates an empty board.
    pub fn initialize(rows: Coord, cols: Coord, mines: CellCount) -> Result<Self> {
        Ok(Self::new(GameConfig::new(rows, cols, mines)?))
    }

    /// Builds a numbered board with mines at exactly `mine_coords`.
    pub fn with_mines(rows: Coord, cols: Coord, mine_coords: &[Coord2]) -> Result<Self> {
        let mut unique = mine_coords.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let config = GameConfig::new(rows, cols, unique.len())?;
        if !unique.iter().all(|&coords| config.contains(coords)) {
            return Err(GameError::InvalidConfig {
                rows,
                cols,
                mines: unique.len(),
            });
        }

        let mut minefield = Self::new(config);
        minefield.place_mines(&mut FixedPlacer::new(unique));
        minefield.compute_adjacency();
        Ok(minefield)
    }

    pub fn place_mines(&mut self, placer: &mut impl MinePlacer) {
        let mut mines: Array2<bool> = Array2::default(self.config.size());
        placer.place(self.config, &mut mines);

        // double check mine count
        let count = mines.iter().filter(|&&is_mine| is_mine).count();
        if count != self.config.mines() {
            log::warn!(
                "Placed mine count mismatch, actual: {}, requested: {}",
                count,
                self.config.mines()
            );
        }

        self.tiles.zip_mut_with(&mines, |tile, &is_mine| {
            *tile = if is_mine { Tile::Mine } else { Tile::Count(0) };
        });
    }

    pub fn compute_adjacency(&mut self) {
        let counts = Array2::from_shape_fn(self.config.size(), |coords| match self.tiles[coords] {
            Tile::Mine => Tile::Mine,
            Tile::Count(_) => Tile::Count(self.count_adjacent_mines(coords)),
        });
        self.tiles = counts;
    }

    /// Reveals `coords` and, when it has no adjacent mines, the whole zero region around it together with its
    /// numbered border. Returns the number of newly revealed cells.
    pub fn reveal(&mut self, coords: Coord2) -> CellCount {
        if !self.config.contains(coords) || self.revealed[coords] {
            return 0;
        }

        let mut newly_revealed = 0;
        let mut to_visit = vec![coords];

        while let Some(visit_coords) = to_visit.pop() {
            if self.revealed[visit_coords] {
                continue;
            }
            self.revealed[visit_coords] = true;
            newly_revealed += 1;

            match self.tiles[visit_coords] {
                Tile::Mine => {}
                Tile::Count(count) => {
                    self.revealed_count += 1;
                    if count == 0 {
                        to_visit.extend(
                            self.tiles
                                .iter_neighbors(visit_coords)
                                .filter(|&pos| !self.revealed[pos]),
                        );
                    }
                }
            }
        }

        newly_revealed
    }

    /// Marks a single cell as revealed without cascading. Returns whether anything changed.
    pub fn disclose(&mut self, coords: Coord2) -> bool {
        if !self.config.contains(coords) || self.revealed[coords] {
            return false;
        }
        self.revealed[coords] = true;
        if !self.tiles[coords].is_mine() {
            self.revealed_count += 1;
        }
        true
    }

    /// Flips the flag on `coords`. Returns `false` when out of bounds.
    pub fn toggle_flag(&mut self, coords: Coord2) -> bool {
        if !self.config.contains(coords) {
            return false;
        }
        self.flagged[coords] = !self.flagged[coords];
        true
    }

    pub fn is_mine_hit(&self, coords: Coord2) -> bool {
        self.config.contains(coords) && self.tiles[coords].is_mine()
    }

    pub fn check_win(&self) -> bool {
        self.revealed_count + self.config.mines() == self.config.total_cells()
    }

    /// Discloses the whole board for the end-of-round display. The revealed count is left untouched.
    pub fn reveal_all(&mut self) {
        self.revealed.fill(true);
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size()
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines()
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn tile_at(&self, coords: Coord2) -> Tile {
        self.tiles[coords]
    }

    pub fn is_revealed(&self, coords: Coord2) -> bool {
        self.revealed[coords]
    }

    pub fn is_flagged(&self, coords: Coord2) -> bool {
        self.flagged[coords]
    }

    pub fn view_at(&self, coords: Coord2) -> CellView {
        match (self.revealed[coords], self.flagged[coords], self.tiles[coords]) {
            (true, _, Tile::Mine) => CellView::Mine,
            (true, _, Tile::Count(count)) => CellView::Open(count),
            (false, true, _) => CellView::Flagged,
            (false, false, _) => CellView::Hidden,
        }
    }

    /// Number of flags that sit on mines.
    pub fn correct_flags(&self) -> CellCount {
        self.flagged
            .iter()
            .zip(self.tiles.iter())
            .filter(|&(&flagged, tile)| flagged && tile.is_mine())
            .count()
    }

    /// Mines not revealed yet, in row-major order.
    pub fn hidden_mines(&self) -> Vec<Coord2> {
        self.tiles
            .indexed_iter()
            .filter(|&(coords, tile)| tile.is_mine() && !self.revealed[coords])
            .map(|(coords, _)| coords)
            .collect()
    }

    fn count_adjacent_mines(&self, coords: Coord2) -> u8 {
        let count = self
            .tiles
            .iter_neighbors(coords)
            .filter(|&pos| self.tiles[pos].is_mine())
            .count();
        // at most 8 neighbors
        count as u8
    }
}
