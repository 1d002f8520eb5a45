use core::time::Duration;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::*;

/// Number of mines a single scanner discloses.
pub const SCANNER_REVEALS: usize = 2;

/// Board progression of the ladder mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    pub start_size: Coord,
    pub size_step: Coord,
    pub max_size: Coord,
    pub start_mines: CellCount,
    pub mines_step: CellCount,
    pub max_mines: CellCount,
    /// Score awarded per level number when a level is cleared.
    pub reward_per_level: u32,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            start_size: 8,
            size_step: 2,
            max_size: 24,
            start_mines: 10,
            mines_step: 8,
            max_mines: 99,
            reward_per_level: 10,
        }
    }
}

impl LadderConfig {
    /// Square board of the 1-based `level`, always a valid config.
    pub fn level_config(&self, level: u32) -> GameConfig {
        let steps = level.saturating_sub(1) as usize;
        let size = self
            .start_size
            .saturating_add(steps.saturating_mul(self.size_step))
            .min(self.max_size)
            .max(2);
        let mines = self
            .start_mines
            .saturating_add(steps.saturating_mul(self.mines_step))
            .min(self.max_mines)
            .clamp(1, size.saturating_mul(size) - 1);
        GameConfig::new_unchecked(size, size, mines)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopPrices {
    pub revive: u32,
    pub scanner: u32,
}

impl Default for ShopPrices {
    fn default() -> Self {
        Self {
            revive: 30,
            scanner: 20,
        }
    }
}

impl ShopPrices {
    pub const fn price_of(&self, item: Item) -> u32 {
        match item {
            Item::Revive => self.revive,
            Item::Scanner => self.scanner,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Item {
    Revive,
    Scanner,
}

impl Item {
    pub const ALL: [Item; 2] = [Item::Revive, Item::Scanner];

    pub const fn name(self) -> &'static str {
        match self {
            Item::Revive => "revive",
            Item::Scanner => "scanner",
        }
    }
}

/// Score currency and held items of a ladder run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    score: u32,
    revive: bool,
    scanners: u32,
}

impl Inventory {
    pub fn with_score(score: u32) -> Self {
        Self {
            score,
            ..Default::default()
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn has_revive(&self) -> bool {
        self.revive
    }

    pub fn scanners(&self) -> u32 {
        self.scanners
    }

    pub fn earn(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Spends score on `item`. Only one revive can be held at a time.
    pub fn buy(&mut self, item: Item, prices: &ShopPrices) -> Result<()> {
        if item == Item::Revive && self.revive {
            return Err(GameError::ItemAlreadyHeld);
        }

        let price = prices.price_of(item);
        self.score = self
            .score
            .checked_sub(price)
            .ok_or(GameError::InsufficientScore {
                needed: price,
                available: self.score,
            })?;

        match item {
            Item::Revive => self.revive = true,
            Item::Scanner => self.scanners += 1,
        }
        Ok(())
    }

    /// Consumes the held revive, if any.
    pub fn take_revive(&mut self) -> bool {
        core::mem::take(&mut self.revive)
    }

    pub fn take_scanner(&mut self) -> Result<()> {
        self.scanners = self.scanners.checked_sub(1).ok_or(GameError::NoItem)?;
        Ok(())
    }
}

/// Progress of a ladder run across levels.
#[derive(Clone, Debug)]
pub struct LadderRun {
    config: LadderConfig,
    prices: ShopPrices,
    level: u32,
    inventory: Inventory,
    started: Instant,
}

impl LadderRun {
    pub fn new(config: LadderConfig, prices: ShopPrices) -> Self {
        Self {
            config,
            prices,
            level: 1,
            inventory: Inventory::default(),
            started: Instant::now(),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    pub fn prices(&self) -> &ShopPrices {
        &self.prices
    }

    pub fn level_config(&self) -> GameConfig {
        self.config.level_config(self.level)
    }

    pub fn start_level(&self, seed: u64) -> Round {
        Round::generate(self.level_config(), seed)
    }

    /// Awards the reward for the current level and advances to the next. Returns the points earned.
    pub fn complete_level(&mut self) -> u32 {
        let reward = self.level.saturating_mul(self.config.reward_per_level);
        self.inventory.earn(reward);
        log::info!(
            "ladder level {} cleared, +{} score ({} total)",
            self.level,
            reward,
            self.inventory.score()
        );
        self.level += 1;
        reward
    }

    pub fn buy(&mut self, item: Item) -> Result<()> {
        self.inventory.buy(item, &self.prices)?;
        log::debug!("bought {}, {} score left", item.name(), self.inventory.score());
        Ok(())
    }

    /// Consumes a scanner and discloses up to [`SCANNER_REVEALS`] hidden mines of `round`.
    pub fn use_scanner(&mut self, round: &mut Round) -> Result<Vec<Coord2>> {
        if round.is_finished() {
            return Err(GameError::RoundFinished);
        }
        self.inventory.take_scanner()?;
        round.scan_mines(SCANNER_REVEALS)
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}
