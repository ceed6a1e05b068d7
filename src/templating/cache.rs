//! Per-class render cache for compiled views.
//!
//! Each component class owns one [`RenderCache`]. The first render of the
//! class resolves and compiles its view and stores the result; later renders
//! read the slot without taking any lock. Compilation itself runs under a
//! per-class mutex with a second check of the slot, so two threads racing
//! on the first render compile once and share the result. Unrelated classes
//! never contend.
//!
//! The compile mutex is not reentrant. A compile step that reaches back into
//! the same cache on the same thread (a deferred view producer that renders
//! its own component) is refused with [`ReentrantCompile`] instead of
//! waiting on itself.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::thread::{self, ThreadId};

/// The compile step of a [`RenderCache`] asked the same cache for its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReentrantCompile;

impl fmt::Display for ReentrantCompile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("view compilation re-entered its own render cache")
    }
}

impl std::error::Error for ReentrantCompile {}

/// Compile-once slot with hit and miss accounting.
#[derive(Debug)]
pub struct RenderCache<T> {
    slot: OnceLock<Arc<T>>,
    compile_lock: Mutex<()>,
    compiling: Mutex<Option<ThreadId>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
    compilations: AtomicUsize,
}

impl<T> Default for RenderCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RenderCache<T> {
    pub fn new() -> Self {
        Self {
            slot: OnceLock::new(),
            compile_lock: Mutex::new(()),
            compiling: Mutex::new(None),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
            compilations: AtomicUsize::new(0),
        }
    }

    /// The cached value, if any. Does not count as a hit.
    pub fn peek(&self) -> Option<Arc<T>> {
        self.slot.get().cloned()
    }

    pub fn is_populated(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Return the cached value, compiling it first if the slot is empty.
    ///
    /// `compile` runs at most once per successful population. A failed
    /// compilation leaves the slot empty so the next render reports the
    /// same error.
    ///
    /// # Errors
    ///
    /// The error of `compile`, or [`ReentrantCompile`] when `compile` itself
    /// calls back into this cache.
    pub fn get_or_try_init<E>(
        &self,
        compile: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E>
    where
        E: From<ReentrantCompile>,
    {
        if let Some(cached) = self.slot.get() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Arc::clone(cached));
        }

        let current = thread::current().id();
        if *self.compiling.lock().unwrap_or_else(PoisonError::into_inner) == Some(current) {
            return Err(ReentrantCompile.into());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let _guard = self.compile_lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Another thread may have compiled while this one waited.
        if let Some(cached) = self.slot.get() {
            return Ok(Arc::clone(cached));
        }

        *self.compiling.lock().unwrap_or_else(PoisonError::into_inner) = Some(current);
        let result = compile();
        *self.compiling.lock().unwrap_or_else(PoisonError::into_inner) = None;

        let compiled = Arc::new(result?);
        self.compilations.fetch_add(1, Ordering::Relaxed);
        let stored = self.slot.get_or_init(|| compiled);
        Ok(Arc::clone(stored))
    }

    /// Get cache statistics
    pub fn stats(&self) -> RenderCacheStats {
        RenderCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            compilations: self.compilations.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of a [`RenderCache`]'s counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderCacheStats {
    /// Renders served from the populated slot
    pub hits: usize,
    /// Renders that found the slot empty
    pub misses: usize,
    /// Successful compilations; at most one per class
    pub compilations: usize,
}

impl RenderCacheStats {
    /// Calculate hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}
