//! Collector engine
//!
//! Owns two sequences per payload type: weak observers over every
//! allocation (`tracked`) and the strong references tracing starts from
//! (`roots`). A collection cycle bumps the global epoch, stamps every
//! payload reachable from the roots, then clears the outgoing handles of
//! every live-but-unreached payload so reference counting can reclaim it.
//! When too many observers have died, the tracked set is compacted in
//! place.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::config::CollectorConfig;
use crate::handle::{Ref, WeakRef};
use crate::logging::{debug, info, trace};
use crate::trace::Trace;

/// Process-wide mark epoch, shared by every collector instantiation.
/// Bumped once per collection cycle and only ever compared for equality,
/// so collectors of different payload types advancing it for one another
/// is harmless.
static EPOCH: AtomicU64 = AtomicU64::new(0);

#[inline]
fn bump_epoch() -> u64 {
    EPOCH.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
}

/// Collector statistics for monitoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct GcStats {
    /// Observers in the tracked set, dead ones included.
    pub tracked_objects: usize,
    /// Payloads stamped reachable during the most recent cycle.
    pub reachable_objects: usize,
    /// Payloads whose handles were cleared, cumulative.
    pub cycles_collected: usize,
    /// Collection cycles run, cumulative.
    pub collections_run: usize,
    /// Compaction passes run, cumulative.
    pub compactions_run: usize,
}

/// Tracing collector for one payload type.
///
/// Single-threaded: all operations on one collector must be serialised by
/// the caller, and payload graphs must not cross collector instances.
pub struct Collector<T: Trace> {
    /// Weak observer per allocation; order of live entries is preserved
    /// across compaction.
    tracked: Vec<WeakRef<T>>,
    /// Tracing starts here. Slots may be cleared in place.
    roots: Vec<Ref<T>>,
    config: CollectorConfig,
    allocations_since_collection: usize,
    epoch_last_cycle: u64,
    reachable_last_cycle: usize,
    cycles_collected: usize,
    collections_run: usize,
    compactions_run: usize,
}

impl<T: Trace> Collector<T> {
    pub fn new() -> Self {
        Self::with_config(CollectorConfig::default())
    }

    pub fn with_config(config: CollectorConfig) -> Self {
        Self {
            tracked: Vec::new(),
            roots: Vec::new(),
            config: config.validated(),
            allocations_since_collection: 0,
            epoch_last_cycle: 0,
            reachable_last_cycle: 0,
            cycles_collected: 0,
            collections_run: 0,
            compactions_run: 0,
        }
    }

    /// Replace the configuration.
    pub fn set_config(&mut self, config: CollectorConfig) {
        self.config = config.validated();
    }

    /// Allocate a payload and return the owning handle.
    ///
    /// A weak observer is appended to the tracked set; between collections
    /// the payload lives and dies by reference counting alone.
    pub fn add(&mut self, value: T) -> Ref<T> {
        let handle = Ref::new(value);
        self.tracked.push(handle.downgrade());
        self.allocations_since_collection += 1;
        trace!(event = "gc_alloc", tracked = self.tracked.len());
        handle
    }

    /// Allocate a payload that is also a tracing root.
    ///
    /// The root set keeps a clone of the returned handle, so the payload
    /// stays alive independent of host variables until the root is
    /// removed.
    pub fn add_root(&mut self, value: T) -> Ref<T> {
        let handle = self.add(value);
        self.roots.push(handle.clone());
        trace!(event = "gc_root", roots = self.roots.len());
        handle
    }

    /// Re-root an existing handle. Empty handles are ignored.
    pub fn adopt_root(&mut self, handle: &Ref<T>) {
        if !handle.is_empty() {
            self.roots.push(handle.clone());
        }
    }

    /// Drop the first root entry aliasing `handle`, if any.
    pub fn release_root(&mut self, handle: &Ref<T>) {
        if let Some(position) = self.roots.iter().position(|root| Ref::ptr_eq(root, handle)) {
            self.roots.remove(position);
        }
    }

    /// Remove and return the most recently added root.
    pub fn pop_root(&mut self) -> Option<Ref<T>> {
        self.roots.pop()
    }

    /// Clear the root slot at `index` in place, preserving indices of the
    /// other roots. Out-of-range indices are ignored.
    pub fn clear_root(&mut self, index: usize) {
        if let Some(slot) = self.roots.get_mut(index) {
            slot.clear();
        }
    }

    /// Drop every root.
    pub fn clear_roots(&mut self) {
        self.roots.clear();
    }

    /// Run one full collection cycle: mark, sweep, then compact the
    /// tracked set if too many observers have died.
    pub fn mark_and_sweep(&mut self) {
        let epoch = bump_epoch();
        info!(
            event = "gc_start",
            epoch,
            tracked = self.tracked.len(),
            roots = self.roots.len(),
        );

        let marked = self.mark(epoch);
        let swept = self.sweep(epoch);

        // Dead slots are recounted after the sweep so the cascade it
        // triggered is reflected in the compaction decision.
        let dead = self.count_dead();
        if dead as f64 > self.tracked.len() as f64 * self.config.organization_threshold {
            self.organize();
        }

        self.epoch_last_cycle = epoch;
        self.reachable_last_cycle = marked;
        self.cycles_collected += swept;
        self.collections_run += 1;
        self.allocations_since_collection = 0;

        info!(event = "gc_complete", epoch = self.epoch_last_cycle, marked, swept);
    }

    /// Run a collection cycle iff enough allocations have accumulated
    /// since the last one. Returns whether a cycle ran.
    pub fn maybe_collect(&mut self) -> bool {
        if self.allocations_since_collection >= self.config.collection_threshold {
            self.mark_and_sweep();
            return true;
        }
        false
    }

    /// Stamp every payload reachable from the root set with `epoch`.
    pub(crate) fn mark(&mut self, epoch: u64) -> usize {
        let mut marked = 0;
        for root in &mut self.roots {
            mark_reachable(root, epoch, &mut marked);
        }
        debug!(event = "gc_mark", marked);
        marked
    }

    /// Clear the outgoing handles of every live payload not stamped with
    /// `epoch`. Returns how many payloads were cut.
    ///
    /// The upgraded handle is dropped at the end of each iteration; when
    /// the cut released the payload's last external reference, that drop
    /// is what finally frees it.
    pub(crate) fn sweep(&self, epoch: u64) -> usize {
        let mut swept = 0;
        for observer in &self.tracked {
            let Some(node) = observer.upgrade_node() else {
                continue;
            };
            if node.mark() == epoch {
                continue;
            }
            // Alive but unreachable: only a cycle can be keeping it. Cut
            // its outgoing handles and let the refcount cascade run.
            node.payload().borrow_mut().trace(&mut |child| child.clear());
            swept += 1;
        }
        debug!(event = "gc_sweep", swept);
        swept
    }

    /// Observers whose payload is gone.
    pub(crate) fn count_dead(&self) -> usize {
        self.tracked
            .iter()
            .filter(|observer| !observer.is_alive())
            .count()
    }

    /// Compact the tracked set, keeping live observers in their original
    /// relative order.
    pub fn organize(&mut self) {
        let before = self.tracked.len();
        self.tracked.retain(|observer| observer.is_alive());
        self.compactions_run += 1;
        debug!(event = "gc_compact", before, after = self.tracked.len());
    }

    /// Number of tracked payloads still alive. Rooted payloads are
    /// tracked too, so each live payload is counted exactly once.
    pub fn count_live(&self) -> usize {
        self.tracked
            .iter()
            .filter(|observer| observer.is_alive())
            .count()
    }

    /// Observers in the tracked set, dead ones included.
    pub fn tracked_len(&self) -> usize {
        self.tracked.len()
    }

    /// Entries in the root set, cleared slots included.
    pub fn roots_len(&self) -> usize {
        self.roots.len()
    }

    /// Snapshot of collector statistics.
    pub fn stats(&self) -> GcStats {
        GcStats {
            tracked_objects: self.tracked.len(),
            reachable_objects: self.reachable_last_cycle,
            cycles_collected: self.cycles_collected,
            collections_run: self.collections_run,
            compactions_run: self.compactions_run,
        }
    }

    #[cfg(test)]
    pub(crate) fn last_epoch(&self) -> u64 {
        self.epoch_last_cycle
    }

    #[cfg(test)]
    pub(crate) fn observers(&self) -> impl Iterator<Item = &WeakRef<T>> {
        self.tracked.iter()
    }
}

impl<T: Trace> Default for Collector<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Depth-first mark. The stamp is written before descending, so a cycle's
/// back edge terminates on the stamp without re-borrowing the payload.
fn mark_reachable<T: Trace>(handle: &mut Ref<T>, epoch: u64, marked: &mut usize) {
    let Some(node) = handle.node() else {
        return;
    };
    if node.mark() == epoch {
        return;
    }
    node.set_mark(epoch);
    *marked += 1;
    node.payload()
        .borrow_mut()
        .trace(&mut |child| mark_reachable(child, epoch, marked));
}
