//! CLI subcommand implementations.

mod animate;
mod snapshot;
mod weather;

pub use animate::{animate, AnimateArgs};
pub use snapshot::{snapshot, SnapshotArgs};
pub use weather::{locate, weather, WeatherArgs};

use std::error::Error;

/// Boxed error type for command results; the CLI only reports and exits.
pub type CommandResult = Result<(), Box<dyn Error>>;
