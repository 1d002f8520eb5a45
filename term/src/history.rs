//! Per-user round history stored as one whitespace-separated line per record.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDateTime;
use thiserror::Error;

use termsweeper_core::{CellCount, Coord, GameMode, Outcome, RoundSummary};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("could not access history file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed history line {0:?}")]
    Malformed(String),
}

/// Mode of a single-board round record.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BoardMode {
    Classic,
    Leftover,
}

impl BoardMode {
    pub const fn token(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Leftover => "leftover",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HistoryRecord {
    Board {
        timestamp: NaiveDateTime,
        mode: BoardMode,
        rows: Coord,
        cols: Coord,
        mines: CellCount,
        duration_secs: u64,
        won: bool,
    },
    Ladder {
        timestamp: NaiveDateTime,
        level: u32,
        duration_secs: u64,
    },
}

impl HistoryRecord {
    /// Record of a finished classic or leftover round. Ladder rounds and abandoned rounds are not recorded this way.
    pub fn from_round(
        mode: &GameMode,
        summary: &RoundSummary,
        timestamp: NaiveDateTime,
    ) -> Option<Self> {
        let mode = match mode {
            GameMode::Classic(_) => BoardMode::Classic,
            GameMode::Leftover { .. } => BoardMode::Leftover,
            GameMode::Ladder(_) => return None,
        };
        let won = match summary.outcome {
            Outcome::Won => true,
            Outcome::Lost => false,
            Outcome::Abandoned => return None,
        };
        Some(Self::Board {
            timestamp,
            mode,
            rows: summary.config.rows(),
            cols: summary.config.cols(),
            mines: summary.config.mines(),
            duration_secs: summary.duration_secs(),
            won,
        })
    }

    pub fn ladder(level: u32, duration_secs: u64, timestamp: NaiveDateTime) -> Self {
        Self::Ladder {
            timestamp,
            level,
            duration_secs,
        }
    }

    /// Human readable line for the history screen.
    pub fn describe(&self) -> String {
        match self {
            Self::Board {
                timestamp,
                mode,
                rows,
                cols,
                mines,
                duration_secs,
                won,
            } => format!(
                "{}  {:<8} {}x{} board, {} mines, {} s, {}",
                timestamp.format("%Y-%m-%d %H:%M:%S"),
                mode.token(),
                rows,
                cols,
                mines,
                duration_secs,
                if *won { "won" } else { "lost" }
            ),
            Self::Ladder {
                timestamp,
                level,
                duration_secs,
            } => format!(
                "{}  {:<8} reached level {}, {} s",
                timestamp.format("%Y-%m-%d %H:%M:%S"),
                "ladder",
                level,
                duration_secs
            ),
        }
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Board {
                timestamp,
                mode,
                rows,
                cols,
                mines,
                duration_secs,
                won,
            } => write!(
                f,
                "{} {} {} {} {} {} {}",
                timestamp.format(TIMESTAMP_FORMAT),
                mode.token(),
                rows,
                cols,
                mines,
                duration_secs,
                if *won { "win" } else { "loss" }
            ),
            Self::Ladder {
                timestamp,
                level,
                duration_secs,
            } => write!(
                f,
                "{} ladder {} {}",
                timestamp.format(TIMESTAMP_FORMAT),
                level,
                duration_secs
            ),
        }
    }
}

impl FromStr for HistoryRecord {
    type Err = HistoryError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let malformed = || HistoryError::Malformed(line.to_owned());
        let fields: Vec<&str> = line.split_whitespace().collect();
        let timestamp = fields
            .first()
            .and_then(|field| NaiveDateTime::parse_from_str(field, TIMESTAMP_FORMAT).ok())
            .ok_or_else(malformed)?;

        fn num<T: FromStr>(field: &str) -> Option<T> {
            field.parse().ok()
        }

        match fields.as_slice() {
            [_, "ladder", level, duration] => Ok(Self::Ladder {
                timestamp,
                level: num(level).ok_or_else(malformed)?,
                duration_secs: num(duration).ok_or_else(malformed)?,
            }),
            [_, mode, rows, cols, mines, duration, result] => {
                let mode = match *mode {
                    "classic" => BoardMode::Classic,
                    "leftover" => BoardMode::Leftover,
                    _ => return Err(malformed()),
                };
                let won = match *result {
                    "win" => true,
                    "loss" => false,
                    _ => return Err(malformed()),
                };
                Ok(Self::Board {
                    timestamp,
                    mode,
                    rows: num(rows).ok_or_else(malformed)?,
                    cols: num(cols).ok_or_else(malformed)?,
                    mines: num(mines).ok_or_else(malformed)?,
                    duration_secs: num(duration).ok_or_else(malformed)?,
                    won,
                })
            }
            _ => Err(malformed()),
        }
    }
}

/// History files live in one directory, one `<user>_history.txt` per user.
#[derive(Clone, Debug)]
pub struct HistoryStore {
    dir: PathBuf,
}

impl HistoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, user: &str) -> PathBuf {
        self.dir.join(format!("{user}_history.txt"))
    }

    pub fn append(&self, user: &str, record: &HistoryRecord) -> Result<(), HistoryError> {
        let path = self.path_for(user);
        let io_err = |source| HistoryError::Io {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_err)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(io_err)?;
        writeln!(file, "{record}").map_err(io_err)?;
        log::debug!("appended history record to {}", path.display());
        Ok(())
    }

    /// Reads all well-formed records of `user`. A missing file means no history.
    pub fn load(&self, user: &str) -> Result<Vec<HistoryRecord>, HistoryError> {
        let path = self.path_for(user);
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(HistoryError::Io { path, source }),
        };
        read_records(BufReader::new(file), &path)
    }
}

fn read_records(reader: impl BufRead, path: &Path) -> Result<Vec<HistoryRecord>, HistoryError> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|source| HistoryError::Io {
            path: path.to_owned(),
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }
        match line.parse() {
            Ok(record) => records.push(record),
            Err(err) => log::warn!("skipping history line in {}: {}", path.display(), err),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::time::Duration;
    use termsweeper_core::{Difficulty, GameConfig, RoundStats};

    fn timestamp() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-05-01T13:45:09", TIMESTAMP_FORMAT).unwrap()
    }

    fn summary(outcome: Outcome) -> RoundSummary {
        RoundSummary {
            config: GameConfig::new(16, 16, 40).unwrap(),
            revealed: 100,
            correct_flags: 3,
            duration: Duration::from_millis(75_900),
            outcome,
            triggered_mine: None,
            stats: RoundStats::default(),
        }
    }

    #[test]
    fn board_record_line() {
        let record = HistoryRecord::from_round(
            &GameMode::Classic(Difficulty::Medium),
            &summary(Outcome::Won),
            timestamp(),
        )
        .unwrap();
        assert_eq!(record.to_string(), "2024-05-01T13:45:09 classic 16 16 40 75 win");
    }

    #[test]
    fn ladder_record_line() {
        let record = HistoryRecord::ladder(4, 310, timestamp());
        assert_eq!(record.to_string(), "2024-05-01T13:45:09 ladder 4 310");
    }

    #[test]
    fn abandoned_and_ladder_rounds_are_not_board_records() {
        let classic = GameMode::Classic(Difficulty::Easy);
        assert!(HistoryRecord::from_round(&classic, &summary(Outcome::Abandoned), timestamp()).is_none());
        let ladder = GameMode::Ladder(Default::default());
        assert!(HistoryRecord::from_round(&ladder, &summary(Outcome::Lost), timestamp()).is_none());
    }

    #[test]
    fn parses_both_record_kinds() {
        let leftover: HistoryRecord = "2024-05-01T13:45:09 leftover 8 8 10 12 loss".parse().unwrap();
        assert_eq!(
            leftover,
            HistoryRecord::Board {
                timestamp: timestamp(),
                mode: BoardMode::Leftover,
                rows: 8,
                cols: 8,
                mines: 10,
                duration_secs: 12,
                won: false,
            }
        );
        let ladder: HistoryRecord = "2024-05-01T13:45:09 ladder 2 99".parse().unwrap();
        assert_eq!(ladder, HistoryRecord::ladder(2, 99, timestamp()));
    }

    #[test]
    fn rejects_malformed_lines() {
        for line in [
            "",
            "yesterday classic 8 8 10 12 win",
            "2024-05-01T13:45:09 classic 8 8 10 12 maybe",
            "2024-05-01T13:45:09 arcade 8 8 10 12 win",
            "2024-05-01T13:45:09 ladder two 12",
            "2024-05-01T13:45:09 classic 8 8",
        ] {
            assert!(line.parse::<HistoryRecord>().is_err(), "{line}");
        }
    }

    #[test]
    fn reader_skips_bad_lines() {
        let text = "2024-05-01T13:45:09 ladder 2 99\ngarbage\n\n2024-05-01T13:45:09 classic 8 8 10 12 win\n";
        let records = read_records(Cursor::new(text), Path::new("mem")).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn store_round_trip_on_disk() {
        let dir = std::env::temp_dir().join(format!("termsweeper-history-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        let store = HistoryStore::new(&dir);

        assert!(store.load("carol").unwrap().is_empty());
        store.append("carol", &HistoryRecord::ladder(3, 40, timestamp())).unwrap();
        store.append("carol", &HistoryRecord::ladder(5, 80, timestamp())).unwrap();

        let records = store.load("carol").unwrap();
        assert_eq!(records, vec![
            HistoryRecord::ladder(3, 40, timestamp()),
            HistoryRecord::ladder(5, 80, timestamp()),
        ]);
        assert!(store.path_for("carol").ends_with("carol_history.txt"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
