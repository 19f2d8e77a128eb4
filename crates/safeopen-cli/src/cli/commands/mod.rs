//! CLI command handlers, one per file.

mod checksum;
mod completions;
mod create;
mod exhaust;
mod open;

pub use checksum::run_checksum;
pub use completions::run_completions;
pub use create::run_create;
pub use exhaust::run_exhaust;
pub use open::run_open;
