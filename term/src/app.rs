//! Menu-driven game loop: login, mode and difficulty selection, play, reports and history.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use crossterm::style::Color;
use rand::prelude::*;
use rand::rngs::SmallRng;
use thiserror::Error;

use termsweeper_core::{
    Difficulty, GameConfig, GameMode, LadderConfig, LadderRun, MarkOutcome, Outcome,
    RevealOutcome, Round, RoundState,
};

use crate::history::{HistoryRecord, HistoryStore};
use crate::input::{self, InputError, Move};
use crate::render::Renderer;
use crate::settings::Settings;

/// Raised when the input stream ends; unwinds the driver back to [`App::run`].
#[derive(Error, Debug)]
#[error("input closed")]
pub struct EndOfInput;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum MenuExit {
    Logout,
    Quit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum AfterRound {
    Menu,
    Restart,
}

pub struct App<R, W> {
    input: R,
    out: W,
    settings: Settings,
    store: HistoryStore,
    renderer: Renderer,
    seeds: SmallRng,
    preset_user: Option<String>,
    notice: Option<String>,
}

impl<R: BufRead, W: Write> App<R, W> {
    pub fn new(input: R, out: W, settings: Settings, store: HistoryStore) -> Self {
        let renderer = Renderer::new(settings.color);
        Self {
            input,
            out,
            settings,
            store,
            renderer,
            seeds: SmallRng::from_rng(&mut rand::rng()),
            preset_user: None,
            notice: None,
        }
    }

    /// Makes every board of the session reproducible.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if let Some(seed) = seed {
            self.seeds = SmallRng::seed_from_u64(seed);
        }
        self
    }

    /// Skips the first login prompt.
    pub fn with_user(mut self, user: Option<String>) -> Self {
        self.preset_user = user.filter(|name| input::is_valid_username(name));
        self
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs until the player quits or the input ends.
    pub fn run(&mut self) -> Result<()> {
        match self.session() {
            Err(err) if err.is::<EndOfInput>() => {
                log::debug!("input closed, exiting");
                Ok(())
            }
            other => other,
        }
    }

    fn session(&mut self) -> Result<()> {
        loop {
            let user = match self.preset_user.take() {
                Some(user) => user,
                None => self.login()?,
            };
            log::info!("user {} logged in", user);
            writeln!(self.out, "Welcome, {user}!")?;

            match self.main_menu(&user)? {
                MenuExit::Logout => {
                    log::info!("user {} logged out", user);
                    self.clear()?;
                    writeln!(self.out, "Logged out.")?;
                }
                MenuExit::Quit => return Ok(()),
            }
        }
    }

    fn login(&mut self) -> Result<String> {
        loop {
            let name = self.prompt("Username: ")?;
            let name = name.trim();
            if input::is_valid_username(name) {
                return Ok(name.to_owned());
            }
            writeln!(self.out, "Usernames must be non-empty and contain no spaces or slashes.")?;
        }
    }

    fn main_menu(&mut self, user: &str) -> Result<MenuExit> {
        loop {
            self.clear()?;
            writeln!(self.out, "Menu ({user}):")?;
            writeln!(self.out, "1. Start game")?;
            writeln!(self.out, "2. History")?;
            writeln!(self.out, "3. Log out")?;
            writeln!(self.out, "4. Quit")?;
            match self.prompt_choice("> ")? {
                Some(1) => self.play_session(user)?,
                Some(2) => self.show_history(user)?,
                Some(3) => return Ok(MenuExit::Logout),
                Some(4) => return Ok(MenuExit::Quit),
                _ => self.notify("Invalid choice, try again."),
            }
        }
    }

    fn play_session(&mut self, user: &str) -> Result<()> {
        loop {
            let mode = self.select_mode()?;
            let next = match &mode {
                GameMode::Ladder(config) => self.play_ladder(user, *config)?,
                _ => self.play_round(user, &mode)?,
            };
            if next == AfterRound::Menu {
                return Ok(());
            }
        }
    }

    fn select_mode(&mut self) -> Result<GameMode> {
        loop {
            self.clear()?;
            writeln!(self.out, "Select game mode:")?;
            writeln!(self.out, "1. Classic")?;
            writeln!(self.out, "2. Leftover")?;
            writeln!(self.out, "3. Ladder")?;
            match self.prompt_choice("> ")? {
                Some(1) => return Ok(GameMode::Classic(self.select_difficulty()?)),
                Some(2) => {
                    return Ok(GameMode::Leftover {
                        difficulty: self.select_difficulty()?,
                        reveal_chance: self.settings.leftover_reveal_chance,
                    });
                }
                Some(3) => return Ok(GameMode::Ladder(self.settings.ladder)),
                _ => self.notify("Invalid choice, try again."),
            }
        }
    }

    fn select_difficulty(&mut self) -> Result<Difficulty> {
        loop {
            self.clear()?;
            writeln!(self.out, "Select difficulty:")?;
            for (i, difficulty) in Difficulty::PRESETS.into_iter().enumerate() {
                let config = difficulty.config();
                writeln!(
                    self.out,
                    "{}. {} ({}x{}, {} mines)",
                    i + 1,
                    difficulty.name(),
                    config.rows(),
                    config.cols(),
                    config.mines()
                )?;
            }
            writeln!(self.out, "4. custom")?;
            match self.prompt_choice("> ")? {
                Some(choice @ 1..=3) => return Ok(Difficulty::PRESETS[choice as usize - 1]),
                Some(4) => return Ok(Difficulty::Custom(self.custom_config()?)),
                _ => self.notify("Invalid choice, try again."),
            }
        }
    }

    fn custom_config(&mut self) -> Result<GameConfig> {
        loop {
            self.clear()?;
            let rows = self.prompt_dimension("Rows: ")?;
            let cols = self.prompt_dimension("Columns: ")?;
            let mines = self.prompt_dimension("Mines: ")?;
            match (rows, cols, mines) {
                (Some(rows), Some(cols), Some(mines)) => {
                    match GameConfig::bounded(rows, cols, mines, self.settings.max_custom_side) {
                        Ok(config) => return Ok(config),
                        Err(err) => self.notify(format!("{err}, try again.")),
                    }
                }
                _ => self.notify("Invalid input, try again."),
            }
        }
    }

    fn play_round(&mut self, user: &str, mode: &GameMode) -> Result<AfterRound> {
        let seed = self.seeds.random();
        let mut round = mode.start_round(1, seed);

        loop {
            self.clear()?;
            self.renderer.board(&mut self.out, round.minefield())?;
            let line = self.prompt("Enter x y and action (l reveal, r flag), or q to quit: ")?;

            match input::parse_move(&line) {
                Ok(Move::Reveal(coords)) => {
                    if round.reveal(coords)? == RevealOutcome::OutOfBounds {
                        self.notify("Invalid coordinates, try again.");
                    }
                }
                Ok(Move::Flag(coords)) => {
                    if round.toggle_flag(coords)? == MarkOutcome::OutOfBounds {
                        self.notify("Invalid coordinates, try again.");
                    }
                }
                Ok(Move::Quit) => {
                    round.abandon();
                    log::info!("{} round abandoned", mode.name());
                    return Ok(AfterRound::Menu);
                }
                Ok(Move::Buy(_) | Move::Scan) => self.notify("Items are only available in ladder mode."),
                Err(err) => self.notify_input(err),
            }

            if round.is_finished() {
                self.report_round(&mut round)?;
                let summary = round.summary();
                if let Some(record) =
                    HistoryRecord::from_round(mode, &summary, chrono::Local::now().naive_local())
                {
                    self.save_record(user, &record)?;
                }
                return self.after_round();
            }
        }
    }

    fn play_ladder(&mut self, user: &str, config: LadderConfig) -> Result<AfterRound> {
        let mut run = LadderRun::new(config, self.settings.shop);

        loop {
            let seed = self.seeds.random();
            let mut round = run.start_level(seed);

            while !round.is_finished() {
                self.clear()?;
                let inventory = *run.inventory();
                writeln!(
                    self.out,
                    "Level {} | Score {} | Revive {} | Scanners {}",
                    run.level(),
                    inventory.score(),
                    if inventory.has_revive() { "held" } else { "none" },
                    inventory.scanners()
                )?;
                writeln!(
                    self.out,
                    "Shop: buy revive ({}), buy scanner ({})",
                    run.prices().revive,
                    run.prices().scanner
                )?;
                self.renderer.board(&mut self.out, round.minefield())?;
                let line =
                    self.prompt("Enter x y and action (l reveal, r flag), buy <item>, scan, or q to quit: ")?;

                match input::parse_move(&line) {
                    Ok(Move::Reveal(coords)) => {
                        match round.reveal_guarded(coords, run.inventory_mut())? {
                            RevealOutcome::OutOfBounds => self.notify("Invalid coordinates, try again."),
                            RevealOutcome::Revived => self.notify(format!(
                                "Revive used! The mine at ({}, {}) is defused.",
                                coords.0, coords.1
                            )),
                            _ => {}
                        }
                    }
                    Ok(Move::Flag(coords)) => {
                        if round.toggle_flag(coords)? == MarkOutcome::OutOfBounds {
                            self.notify("Invalid coordinates, try again.");
                        }
                    }
                    Ok(Move::Buy(item)) => match run.buy(item) {
                        Ok(()) => self.notify(format!("Bought a {}.", item.name())),
                        Err(err) => self.notify(format!("Cannot buy {}: {err}.", item.name())),
                    },
                    Ok(Move::Scan) => match run.use_scanner(&mut round) {
                        Ok(found) if found.is_empty() => self.notify("The scanner found nothing."),
                        Ok(found) => {
                            let positions: Vec<String> =
                                found.iter().map(|(x, y)| format!("({x}, {y})")).collect();
                            self.notify(format!("Scanner found mines at {}.", positions.join(", ")));
                        }
                        Err(err) => self.notify(format!("Cannot scan: {err}.")),
                    },
                    Ok(Move::Quit) => {
                        round.abandon();
                        self.save_ladder_record(user, &run)?;
                        return Ok(AfterRound::Menu);
                    }
                    Err(err) => self.notify_input(err),
                }
            }

            match round.state() {
                RoundState::Won => {
                    let reward = run.complete_level();
                    self.notify(format!("Level cleared! +{reward} score."));
                }
                _ => {
                    self.report_round(&mut round)?;
                    writeln!(self.out, "Ladder run over at level {}.", run.level())?;
                    self.save_ladder_record(user, &run)?;
                    return self.after_round();
                }
            }
        }
    }

    fn report_round(&mut self, round: &mut Round) -> Result<()> {
        round.reveal_all();
        let summary = round.summary();

        self.clear()?;
        match summary.outcome {
            Outcome::Won => writeln!(self.out, "{}", self.renderer.paint("You win!", Color::Yellow))?,
            _ => {
                writeln!(
                    self.out,
                    "{}",
                    self.renderer.paint("Game over! You hit a mine.", Color::Yellow)
                )?;
                if let Some((x, y)) = summary.triggered_mine {
                    writeln!(self.out, "Mine hit at ({x}, {y})")?;
                }
            }
        }
        writeln!(self.out, "Correctly revealed cells: {}", summary.revealed)?;
        writeln!(self.out, "Correctly flagged mines: {}", summary.correct_flags)?;
        writeln!(self.out, "Full board:")?;
        self.renderer.board(&mut self.out, round.minefield())?;
        writeln!(self.out, "Time: {} s", summary.duration_secs())?;
        writeln!(self.out, "Reveal moves: {}", summary.stats.reveals)?;
        writeln!(self.out, "Flag moves: {}", summary.stats.flags)?;
        Ok(())
    }

    fn after_round(&mut self) -> Result<AfterRound> {
        loop {
            let line = self.prompt("Enter 'm' for the menu or 's' to start again: ")?;
            match line.trim() {
                "m" => return Ok(AfterRound::Menu),
                "s" => return Ok(AfterRound::Restart),
                _ => writeln!(self.out, "Invalid choice, try again.")?,
            }
        }
    }

    fn show_history(&mut self, user: &str) -> Result<()> {
        self.clear()?;
        match self.store.load(user) {
            Ok(records) if records.is_empty() => writeln!(self.out, "No history yet.")?,
            Ok(records) => {
                writeln!(self.out, "History:")?;
                for record in &records {
                    writeln!(self.out, "{}", record.describe())?;
                }
            }
            Err(err) => {
                log::error!("could not load history: {:#}", anyhow::Error::from(err));
                writeln!(self.out, "Could not load history.")?;
            }
        }

        loop {
            let line = self.prompt("Enter 'm' to return to the menu: ")?;
            if line.trim() == "m" {
                return Ok(());
            }
            writeln!(self.out, "Invalid choice, try again.")?;
        }
    }

    fn save_ladder_record(&mut self, user: &str, run: &LadderRun) -> Result<()> {
        let record = HistoryRecord::ladder(
            run.level(),
            run.elapsed().as_secs(),
            chrono::Local::now().naive_local(),
        );
        self.save_record(user, &record)
    }

    /// A failed save is reported but does not end the session.
    fn save_record(&mut self, user: &str, record: &HistoryRecord) -> Result<()> {
        if let Err(err) = self.store.append(user, record) {
            log::error!("could not save record: {:#}", anyhow::Error::from(err));
            writeln!(self.out, "Could not save the game record.")?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.renderer.clear(&mut self.out)?;
        if let Some(notice) = self.notice.take() {
            writeln!(self.out, "{notice}")?;
        }
        Ok(())
    }

    fn notify(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    fn notify_input(&mut self, err: InputError) {
        log::debug!("rejected input: {}", err);
        self.notify(format!("Invalid input ({err}), try again."));
    }

    fn prompt(&mut self, text: &str) -> Result<String> {
        write!(self.out, "{text}")?;
        self.out.flush()?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Could not read input")?;
        if read == 0 {
            return Err(EndOfInput.into());
        }
        Ok(line)
    }

    fn prompt_choice(&mut self, text: &str) -> Result<Option<i64>> {
        let line = self.prompt(text)?;
        Ok(input::parse_number(&line).ok())
    }

    /// Reads a positive board dimension, `None` when malformed or negative.
    fn prompt_dimension(&mut self, text: &str) -> Result<Option<usize>> {
        Ok(self
            .prompt_choice(text)?
            .and_then(|value| usize::try_from(value).ok()))
    }
}
