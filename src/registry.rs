//! Per-type collector instances
//!
//! Design: one collector per payload type, created lazily in a
//! thread-local registry keyed by `TypeId`. Handles are `Rc`-based and
//! payload graphs never cross threads, so each thread gets its own set of
//! collectors and no locking is needed.

use core::any::{Any, TypeId};
use core::cell::RefCell;

use rustc_hash::FxHashMap;

use crate::collector::{Collector, GcStats};
use crate::handle::Ref;
use crate::trace::Trace;

thread_local! {
    static COLLECTORS: RefCell<FxHashMap<TypeId, Box<dyn Any>>> =
        RefCell::new(FxHashMap::default());
}

/// Run `f` against the collector for payload type `T`, creating it on
/// first use.
///
/// The registry is borrowed for the duration of `f`, so `f` must not
/// re-enter it: allocating or collecting from inside a payload's `trace`
/// or `Drop` is a contract violation and panics.
pub fn with_collector<T, R>(f: impl FnOnce(&mut Collector<T>) -> R) -> R
where
    T: Trace,
{
    COLLECTORS.with(|registry| {
        let mut registry = registry.borrow_mut();
        let entry = registry
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Collector::<T>::new()));
        let collector = entry
            .downcast_mut::<Collector<T>>()
            .expect("registry entry matches its TypeId key");
        f(collector)
    })
}

/// Allocate through `T`'s collector.
pub fn alloc<T: Trace>(value: T) -> Ref<T> {
    with_collector(|collector| collector.add(value))
}

/// Allocate a root through `T`'s collector.
pub fn alloc_root<T: Trace>(value: T) -> Ref<T> {
    with_collector(|collector| collector.add_root(value))
}

/// Run a collection cycle on `T`'s collector.
pub fn collect<T: Trace>() {
    with_collector(|collector: &mut Collector<T>| collector.mark_and_sweep());
}

/// Run a collection cycle on `T`'s collector iff its allocation
/// threshold has been reached.
pub fn maybe_collect<T: Trace>() -> bool {
    with_collector(|collector: &mut Collector<T>| collector.maybe_collect())
}

/// Live payloads tracked by `T`'s collector.
pub fn count_live<T: Trace>() -> usize {
    with_collector(|collector: &mut Collector<T>| collector.count_live())
}

/// Statistics snapshot for `T`'s collector.
pub fn stats<T: Trace>() -> GcStats {
    with_collector(|collector: &mut Collector<T>| collector.stats())
}

/// Convenience wrapper bundling a payload handle.
///
/// Construction routes through `T`'s collector, so a `Managed` value is
/// always tracked; `Default` allocates a default payload.
pub struct Managed<T: Trace> {
    pub handle: Ref<T>,
}

impl<T: Trace> Managed<T> {
    pub fn new(value: T) -> Self {
        Self {
            handle: alloc(value),
        }
    }
}

impl<T: Trace + Default> Default for Managed<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Trace> Clone for Managed<T> {
    fn clone(&self) -> Self {
        Self {
            handle: self.handle.clone(),
        }
    }
}
