//! # Debug Mode
//!
//! When debug mode is on, document objects convert themselves to canonical
//! form and validate at construction time. This makes construction slower
//! but reports a bad value where it was introduced instead of at export.
//!
//! The flag is process-wide. Plain reads and writes go straight to an
//! atomic. Scoped toggling goes through [`DebugModeGuard`], which restores
//! the previous value when dropped, including during unwinding. Guards held
//! on different threads are serialized: a second thread's guard waits until
//! the first thread's outermost guard is dropped, so restorations never
//! interleave. Guards nest freely on one thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

static DEBUG_MODE: AtomicBool = AtomicBool::new(true);
static SCOPE: ScopeLock = ScopeLock::new();

/// Whether construction-time validation is currently enabled.
pub fn debug_mode() -> bool {
    DEBUG_MODE.load(Ordering::SeqCst)
}

/// Turn construction-time validation on.
pub fn enable_debug_mode() {
    DEBUG_MODE.store(true, Ordering::SeqCst);
}

/// Turn construction-time validation off.
pub fn disable_debug_mode() {
    DEBUG_MODE.store(false, Ordering::SeqCst);
}

/// Reentrant ownership of the guard scope.
struct ScopeLock {
    state: Mutex<ScopeState>,
    released: Condvar,
}

struct ScopeState {
    owner: Option<ThreadId>,
    depth: usize,
}

impl ScopeLock {
    const fn new() -> Self {
        Self {
            state: Mutex::new(ScopeState { owner: None, depth: 0 }),
            released: Condvar::new(),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ScopeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn acquire(&self) {
        let me = thread::current().id();
        let mut state = self.lock_state();
        while matches!(state.owner, Some(owner) if owner != me) {
            state = self.released.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        state.owner = Some(me);
        state.depth += 1;
    }

    fn release(&self) {
        let mut state = self.lock_state();
        state.depth = state.depth.saturating_sub(1);
        if state.depth == 0 {
            state.owner = None;
            self.released.notify_all();
        }
    }
}

/// Restores the previous debug-mode value on drop.
#[derive(Debug)]
#[must_use = "the previous debug mode is restored as soon as the guard is dropped"]
pub struct DebugModeGuard {
    previous: bool,
}

impl DebugModeGuard {
    /// Set debug mode to `enabled` until the returned guard is dropped.
    pub fn set(enabled: bool) -> Self {
        SCOPE.acquire();
        let previous = DEBUG_MODE.swap(enabled, Ordering::SeqCst);
        tracing::trace!(enabled, previous, "debug mode set");
        Self { previous }
    }

    /// Hold the current value for the guard's lifetime without changing it.
    pub fn pin() -> Self {
        SCOPE.acquire();
        Self { previous: debug_mode() }
    }
}

impl Drop for DebugModeGuard {
    fn drop(&mut self) {
        DEBUG_MODE.store(self.previous, Ordering::SeqCst);
        SCOPE.release();
    }
}

/// Run `f` with debug mode set to `enabled`, then restore the prior value.
pub fn with_debug_mode<T>(enabled: bool, f: impl FnOnce() -> T) -> T {
    let _guard = DebugModeGuard::set(enabled);
    f()
}
