//! Process-wide `tracing` setup. The filter starts at `info` and is swapped
//! for the configured one once settings are loaded.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
