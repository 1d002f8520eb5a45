//! Command-line interface for termsweeper.

use std::path::PathBuf;

use clap::Parser;
use clap_verbosity_flag::Verbosity;

/// Terminal minesweeper with classic, leftover and ladder modes
#[derive(Parser, Debug)]
#[command(name = "termsweeper", version, about, long_about = None)]
pub struct Cli {
    /// Log in as this user instead of being prompted
    #[arg(short, long)]
    pub user: Option<String>,

    /// Directory for history files and the default settings file
    #[arg(short, long)]
    pub data_dir: Option<PathBuf>,

    /// Settings file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Seed for board generation, for reproducible games
    #[arg(long)]
    pub seed: Option<u64>,

    /// Disable colors and screen clearing
    #[arg(long)]
    pub no_color: bool,

    #[command(flatten)]
    pub verbose: Verbosity,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from(["termsweeper", "-u", "alice", "--seed", "7", "--no-color", "-vv"]);
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert_eq!(cli.seed, Some(7));
        assert!(cli.no_color);
        assert!(cli.data_dir.is_none());
    }
}
