use core::time::Duration;

use rand::prelude::*;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    Uninitialized,
    Placed,
    Playing,
    Won,
    Lost,
}

impl RoundState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

/// Counts of moves that changed the board.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundStats {
    pub reveals: u32,
    pub flags: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Won,
    Lost,
    Abandoned,
}

/// Everything a history store needs to record a round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub config: GameConfig,
    pub revealed: CellCount,
    pub correct_flags: CellCount,
    pub duration: Duration,
    pub outcome: Outcome,
    pub triggered_mine: Option<Coord2>,
    pub stats: RoundStats,
}

impl RoundSummary {
    pub fn duration_secs(&self) -> u64 {
        self.duration.as_secs()
    }
}

/// A single round: the minefield plus its lifecycle, timing and move statistics.
#[derive(Clone, Debug)]
pub struct Round {
    minefield: Minefield,
    state: RoundState,
    stats: RoundStats,
    triggered_mine: Option<Coord2>,
    /// Mines neutralized by a revive. Revealing them again is harmless.
    defused: Vec<Coord2>,
    rng: SmallRng,
    started: Instant,
    finished: Option<Duration>,
}

impl Round {
    /// Wraps an already placed and numbered minefield. `seed` drives in-round randomness such as scanners.
    pub fn new(minefield: Minefield, seed: u64) -> Self {
        log::debug!(
            "round placed: {:?} with {} mines",
            minefield.size(),
            minefield.mine_count()
        );
        Self {
            minefield,
            state: RoundState::Placed,
            stats: RoundStats::default(),
            triggered_mine: None,
            defused: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            started: Instant::now(),
            finished: None,
        }
    }

    /// Builds a round on a randomly mined board.
    pub fn generate(config: GameConfig, seed: u64) -> Self {
        let mut minefield = Minefield::new(config);
        minefield.place_mines(&mut RandomPlacer::new(seed));
        minefield.compute_adjacency();
        Self::new(minefield, seed.wrapping_add(1))
    }

    /// Discloses each cell independently with probability `chance`, mines included, without cascading.
    pub fn scatter_reveal(&mut self, chance: f64) -> CellCount {
        let chance = if chance.is_nan() {
            0.0
        } else {
            chance.clamp(0.0, 1.0)
        };
        let (rows, cols) = self.minefield.size();
        let mut disclosed = 0;
        let mut disclosed_mines = 0;

        for x in 0..rows {
            for y in 0..cols {
                if self.rng.random_bool(chance) && self.minefield.disclose((x, y)) {
                    disclosed += 1;
                    if self.minefield.is_mine_hit((x, y)) {
                        disclosed_mines += 1;
                    }
                }
            }
        }

        if disclosed_mines > 0 {
            log::warn!("scatter reveal disclosed {} mines", disclosed_mines);
        }
        disclosed
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        self.open(coords, None)
    }

    /// Like [`Round::reveal`], but a held revive turns a mine hit into a reveal of that mine cell.
    pub fn reveal_guarded(
        &mut self,
        coords: Coord2,
        inventory: &mut Inventory,
    ) -> Result<RevealOutcome> {
        self.open(coords, Some(inventory))
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        self.check_not_finished()?;

        if !self.minefield.toggle_flag(coords) {
            return Ok(MarkOutcome::OutOfBounds);
        }
        log::trace!("flag toggled at {:?}", coords);
        self.stats.flags += 1;
        self.mark_started();
        self.settle();
        Ok(MarkOutcome::Changed)
    }

    /// Reveals up to `limit` randomly chosen hidden mines. Returns their coordinates.
    pub fn scan_mines(&mut self, limit: usize) -> Result<Vec<Coord2>> {
        self.check_not_finished()?;

        let hidden = self.minefield.hidden_mines();
        let found: Vec<Coord2> = hidden
            .choose_multiple(&mut self.rng, limit)
            .copied()
            .collect();
        for &coords in &found {
            self.minefield.disclose(coords);
        }
        log::debug!("scan disclosed mines at {:?}", found);
        Ok(found)
    }

    /// Stops the clock on a round the player walked away from.
    pub fn abandon(&mut self) {
        if self.finished.is_none() {
            self.finished = Some(self.started.elapsed());
        }
    }

    pub fn is_mine_hit(&self, coords: Coord2) -> bool {
        self.minefield.is_mine_hit(coords)
    }

    pub fn check_win(&self) -> bool {
        self.minefield.check_win()
    }

    pub fn reveal_all(&mut self) {
        self.minefield.reveal_all();
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn minefield(&self) -> &Minefield {
        &self.minefield
    }

    pub fn config(&self) -> GameConfig {
        self.minefield.config()
    }

    pub fn stats(&self) -> RoundStats {
        self.stats
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn elapsed(&self) -> Duration {
        self.finished.unwrap_or_else(|| self.started.elapsed())
    }

    pub fn summary(&self) -> RoundSummary {
        let outcome = match self.state {
            RoundState::Won => Outcome::Won,
            RoundState::Lost => Outcome::Lost,
            _ => Outcome::Abandoned,
        };
        RoundSummary {
            config: self.config(),
            revealed: self.minefield.revealed_count(),
            correct_flags: self.minefield.correct_flags(),
            duration: self.elapsed(),
            outcome,
            triggered_mine: self.triggered_mine,
            stats: self.stats,
        }
    }

    fn open(&mut self, coords: Coord2, inventory: Option<&mut Inventory>) -> Result<RevealOutcome> {
        use RevealOutcome::*;

        self.check_not_finished()?;

        if !self.config().contains(coords) {
            return Ok(OutOfBounds);
        }

        // a mine loses even when already shown by a pre-reveal or a scanner
        if self.minefield.is_mine_hit(coords) && !self.defused.contains(&coords) {
            if inventory.is_some_and(Inventory::take_revive) {
                log::info!("revive consumed on mine at {:?}", coords);
                self.minefield.disclose(coords);
                self.defused.push(coords);
                self.stats.reveals += 1;
                self.mark_started();
                self.settle();
                return Ok(Revived);
            }
            self.minefield.reveal(coords);
            self.triggered_mine = Some(coords);
            self.end_round(false);
            return Ok(HitMine);
        }

        self.stats.reveals += 1;
        self.mark_started();

        if self.minefield.is_revealed(coords) {
            self.settle();
            return Ok(if self.state == RoundState::Won {
                Won
            } else {
                NoChange
            });
        }

        let revealed = self.minefield.reveal(coords);
        log::trace!("revealed {} cells from {:?}", revealed, coords);
        self.settle();
        Ok(if self.state == RoundState::Won {
            Won
        } else {
            Revealed(revealed)
        })
    }

    fn settle(&mut self) {
        if self.minefield.check_win() {
            self.end_round(true);
        }
    }

    fn mark_started(&mut self) {
        if matches!(self.state, RoundState::Placed) {
            self.state = RoundState::Playing;
        }
    }

    fn end_round(&mut self, won: bool) {
        if self.state.is_finished() {
            return;
        }

        self.state = if won { RoundState::Won } else { RoundState::Lost };
        self.finished = Some(self.started.elapsed());
        log::debug!("round ended: {:?} after {:?}", self.state, self.finished);
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state.is_finished() {
            Err(GameError::RoundFinished)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round(size: Coord2, mines: &[Coord2]) -> Round {
        Round::new(Minefield::with_mines(size.0, size.1, mines).unwrap(), 0)
    }

    #[test]
    fn new_round_is_placed() {
        let round = round((3, 3), &[(0, 0)]);
        assert_eq!(round.state(), RoundState::Placed);
        assert!(!round.check_win());
        assert_eq!(RoundState::default(), RoundState::Uninitialized);
    }

    #[test]
    fn first_move_starts_playing() {
        let mut round = round((3, 3), &[(0, 0)]);
        assert_eq!(round.toggle_flag((0, 0)).unwrap(), MarkOutcome::Changed);
        assert_eq!(round.state(), RoundState::Playing);
    }

    #[test]
    fn hitting_mine_loses() {
        let mut round = round((2, 2), &[(0, 0)]);

        assert_eq!(round.reveal((0, 0)).unwrap(), RevealOutcome::HitMine);
        assert_eq!(round.state(), RoundState::Lost);
        assert_eq!(round.triggered_mine(), Some((0, 0)));
        assert_eq!(round.stats().reveals, 0);
        assert_eq!(round.reveal((1, 1)), Err(GameError::RoundFinished));
        assert_eq!(round.summary().outcome, Outcome::Lost);
    }

    #[test]
    fn corner_mine_single_reveal_wins() {
        let mut round = round((4, 4), &[(0, 0)]);

        assert_eq!(round.reveal((3, 3)).unwrap(), RevealOutcome::Won);
        assert!(round.check_win());
        let summary = round.summary();
        assert_eq!(summary.revealed, 15);
        assert_eq!(summary.outcome, Outcome::Won);
        assert_eq!(summary.stats.reveals, 1);
    }

    #[test]
    fn out_of_bounds_changes_nothing() {
        let mut round = round((3, 3), &[(0, 0)]);

        assert_eq!(round.reveal((3, 1)).unwrap(), RevealOutcome::OutOfBounds);
        assert_eq!(round.toggle_flag((1, 9)).unwrap(), MarkOutcome::OutOfBounds);
        assert_eq!(round.state(), RoundState::Placed);
        assert_eq!(round.stats(), RoundStats::default());
    }

    #[test]
    fn repeated_reveal_is_no_change() {
        let mut round = round((3, 3), &[(0, 0)]);

        assert_eq!(round.reveal((1, 1)).unwrap(), RevealOutcome::Revealed(1));
        assert_eq!(round.reveal((1, 1)).unwrap(), RevealOutcome::NoChange);
        // every safe click counts, repeats included
        assert_eq!(round.stats().reveals, 2);
    }

    #[test]
    fn revive_turns_mine_into_reveal() {
        let mut round = round((3, 3), &[(0, 0)]);
        let mut inventory = Inventory::with_score(100);
        inventory.buy(Item::Revive, &ShopPrices::default()).unwrap();

        assert_eq!(
            round.reveal_guarded((0, 0), &mut inventory).unwrap(),
            RevealOutcome::Revived
        );
        assert!(!inventory.has_revive());
        assert_eq!(round.state(), RoundState::Playing);
        assert_eq!(round.minefield().view_at((0, 0)), CellView::Mine);
        assert_eq!(round.minefield().revealed_count(), 0);

        // the revealed mine is no longer a threat
        assert_eq!(
            round.reveal_guarded((0, 0), &mut inventory).unwrap(),
            RevealOutcome::NoChange
        );
        assert_eq!(round.state(), RoundState::Playing);
        assert_eq!(round.stats().reveals, 2);
    }

    #[test]
    fn revive_is_one_shot() {
        let mut round = round((3, 3), &[(0, 0), (2, 2)]);
        let mut inventory = Inventory::with_score(100);
        inventory.buy(Item::Revive, &ShopPrices::default()).unwrap();

        round.reveal_guarded((0, 0), &mut inventory).unwrap();
        assert_eq!(
            round.reveal_guarded((2, 2), &mut inventory).unwrap(),
            RevealOutcome::HitMine
        );
    }

    #[test]
    fn scatter_reveal_with_certainty_discloses_everything() {
        let mut round = round((3, 3), &[(1, 1)]);

        assert_eq!(round.scatter_reveal(1.0), 9);
        assert_eq!(round.minefield().revealed_count(), 8);
        assert_eq!(round.state(), RoundState::Placed);

        // the next accepted move settles the already complete board
        assert_eq!(round.reveal((0, 0)).unwrap(), RevealOutcome::Won);
    }

    #[test]
    fn scatter_revealed_mine_still_loses() {
        let mut round = round((3, 3), &[(0, 0)]);
        round.scatter_reveal(1.0);
        assert_eq!(round.minefield().view_at((0, 0)), CellView::Mine);

        assert_eq!(round.reveal((0, 0)).unwrap(), RevealOutcome::HitMine);
        assert_eq!(round.state(), RoundState::Lost);
        assert_eq!(round.triggered_mine(), Some((0, 0)));
    }

    #[test]
    fn scanned_mine_still_loses() {
        let mut round = round((3, 3), &[(0, 0), (2, 2)]);
        let found = round.scan_mines(1).unwrap();
        assert_eq!(found.len(), 1);

        assert_eq!(round.reveal(found[0]).unwrap(), RevealOutcome::HitMine);
        assert_eq!(round.summary().outcome, Outcome::Lost);
    }

    #[test]
    fn revive_covers_a_scanned_mine() {
        let mut round = round((3, 3), &[(0, 0), (2, 2)]);
        let mut inventory = Inventory::with_score(100);
        inventory.buy(Item::Revive, &ShopPrices::default()).unwrap();
        let found = round.scan_mines(1).unwrap();

        assert_eq!(
            round.reveal_guarded(found[0], &mut inventory).unwrap(),
            RevealOutcome::Revived
        );
        assert_eq!(round.reveal(found[0]).unwrap(), RevealOutcome::NoChange);
        assert_eq!(round.state(), RoundState::Playing);
    }

    #[test]
    fn scatter_reveal_with_zero_chance_discloses_nothing() {
        let mut round = round((3, 3), &[(1, 1)]);
        assert_eq!(round.scatter_reveal(0.0), 0);
    }

    #[test]
    fn scan_reveals_hidden_mines() {
        let mines = [(0, 0), (0, 4), (4, 0), (4, 4)];
        let mut round = round((5, 5), &mines);

        let found = round.scan_mines(2).unwrap();
        assert_eq!(found.len(), 2);
        for coords in &found {
            assert!(mines.contains(coords));
            assert_eq!(round.minefield().view_at(*coords), CellView::Mine);
        }
        assert_eq!(round.minefield().hidden_mines().len(), 2);
        assert_eq!(round.minefield().revealed_count(), 0);
    }

    #[test]
    fn generated_round_has_requested_mines() {
        let config = GameConfig::new(16, 16, 40).unwrap();
        let round = Round::generate(config, 9);
        assert_eq!(round.minefield().hidden_mines().len(), 40);
    }

    #[test]
    fn abandoned_summary() {
        let mut round = round((3, 3), &[(0, 0)]);
        round.abandon();
        assert_eq!(round.summary().outcome, Outcome::Abandoned);
    }
}
