//! Terminal frontend for the termsweeper engine: menus, input parsing, board rendering, settings and the per-user
//! history store.

pub mod app;
pub mod cli;
pub mod history;
pub mod input;
pub mod render;
pub mod settings;

pub use app::App;
pub use cli::Cli;
pub use history::{HistoryRecord, HistoryStore};
pub use render::Renderer;
pub use settings::Settings;
