use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use termsweeper_core::{Coord, DEFAULT_REVEAL_CHANCE, LadderConfig, ShopPrices};

pub const SETTINGS_FILE: &str = "termsweeper.toml";
pub const DEFAULT_MAX_CUSTOM_SIDE: Coord = 30;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("could not read settings file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("leftover_reveal_chance must be within 0..=1, got {0}")]
    InvalidChance(f64),
    #[error("max_custom_side must be at least 1")]
    InvalidMaxSide,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the per-user history files.
    pub data_dir: PathBuf,
    pub color: bool,
    pub leftover_reveal_chance: f64,
    /// Largest side accepted for a custom board.
    pub max_custom_side: Coord,
    pub ladder: LadderConfig,
    pub shop: ShopPrices,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            color: true,
            leftover_reveal_chance: DEFAULT_REVEAL_CHANCE,
            max_custom_side: DEFAULT_MAX_CUSTOM_SIDE,
            ladder: LadderConfig::default(),
            shop: ShopPrices::default(),
        }
    }
}

impl Settings {
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_owned(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_owned(),
            source,
        })?;
        log::debug!("loading settings from {}", path.display());
        Self::from_toml(&text, path)
    }

    /// Loads `explicit` when given, otherwise [`SETTINGS_FILE`] inside `data_dir` if it exists, otherwise defaults.
    pub fn discover(explicit: Option<&Path>, data_dir: &Path) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidate = data_dir.join(SETTINGS_FILE);
        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            Ok(Self {
                data_dir: data_dir.to_owned(),
                ..Self::default()
            })
        }
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if !(0.0..=1.0).contains(&self.leftover_reveal_chance) {
            return Err(SettingsError::InvalidChance(self.leftover_reveal_chance));
        }
        if self.max_custom_side == 0 {
            return Err(SettingsError::InvalidMaxSide);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::from_toml("", Path::new("t.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let text = r#"
            color = false
            data_dir = "/var/games"

            [ladder]
            start_size = 6
            reward_per_level = 25

            [shop]
            revive = 50
        "#;
        let settings = Settings::from_toml(text, Path::new("t.toml")).unwrap();

        assert!(!settings.color);
        assert_eq!(settings.data_dir, PathBuf::from("/var/games"));
        assert_eq!(settings.ladder.start_size, 6);
        assert_eq!(settings.ladder.max_size, LadderConfig::default().max_size);
        assert_eq!(settings.ladder.reward_per_level, 25);
        assert_eq!(settings.shop.revive, 50);
        assert_eq!(settings.shop.scanner, ShopPrices::default().scanner);
    }

    #[test]
    fn rejects_out_of_range_chance() {
        let err = Settings::from_toml("leftover_reveal_chance = 1.5", Path::new("t.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidChance(_)));
    }

    #[test]
    fn rejects_zero_max_side() {
        let err = Settings::from_toml("max_custom_side = 0", Path::new("t.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidMaxSide));
    }

    #[test]
    fn rejects_wrong_types() {
        let err = Settings::from_toml("color = \"yes\"", Path::new("t.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn discover_without_file_uses_data_dir() {
        let dir = std::env::temp_dir().join(format!("termsweeper-settings-{}", std::process::id()));
        let settings = Settings::discover(None, &dir).unwrap();
        assert_eq!(settings.data_dir, dir);
        assert!(settings.color);
    }
}
