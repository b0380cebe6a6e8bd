//! CLI command handlers. Each command is in its own file.

mod completions;
mod config;
mod run;

pub use completions::{run_completions, run_man};
pub use config::run_show_config;
pub use run::run_batch;
