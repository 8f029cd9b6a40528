//! cyclerc - hybrid garbage collection for cyclic object graphs
//!
//! Design: Two memory-management disciplines layered on one another:
//! 1. Reference counting (fast path, deterministic)
//! 2. Mark-and-sweep over weak observers (rare, cycles only)
//!
//! Dropping the last strong handle frees a payload immediately; payloads
//! trapped in reference cycles survive until a collection cycle clears
//! their outgoing handles, after which reference counting finishes the job.

pub mod collector;
pub mod config;
pub mod handle;
pub mod logging;
pub mod registry;
pub mod trace;


// Re-export core types
pub use collector::{Collector, GcStats};
pub use config::CollectorConfig;
pub use handle::{Ref, WeakRef};
pub use registry::{
    alloc, alloc_root, collect, count_live, maybe_collect, stats, with_collector, Managed,
};
pub use trace::Trace;

/// Crate initialisation.
///
/// Sets up structured logging; safe to call more than once. Collectors
/// themselves are created lazily, one per payload type, on first use.
pub fn init() {
    logging::init_logging();
}
