//! Logging utilities
//!
//! Lightweight structured logging for collector operations: allocation,
//! collection phases, compaction. Uses `tracing` with minimal overhead;
//! everything below the configured level compiles down to a branch.

// Re-export tracing macros for use throughout the crate
pub use tracing::{debug, error, info, trace, warn, Level};

use once_cell::sync::OnceCell;

static LOGGER_INITIALIZED: OnceCell<()> = OnceCell::new();

/// Initialise logging with sensible defaults.
///
/// Honors `RUST_LOG` when set. For release builds only INFO and above are
/// enabled; debug builds also get DEBUG. Idempotent.
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            #[cfg(debug_assertions)]
            {
                EnvFilter::new("cyclerc=debug")
            }
            #[cfg(not(debug_assertions))]
            {
                EnvFilter::new("cyclerc=info")
            }
        });

        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_line_number(cfg!(debug_assertions))
            .init();
    });
}

/// Check if logging is initialised.
pub fn is_initialized() -> bool {
    LOGGER_INITIALIZED.get().is_some()
}
