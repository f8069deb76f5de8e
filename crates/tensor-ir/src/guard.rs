//! Scoped-cleanup primitive for multi-step graph edits.
//!
//! A [`ResourceGuard`] carries a cleanup closure that runs exactly once when
//! the guard is dropped, on every exit path, unless the guard was released
//! first. The built-in mutation primitives validate before they mutate and
//! do not need it; passes that batch several edits arm a guard with the
//! restore step before the first one and release it once the whole edit has
//! landed.

/// Runs a cleanup closure on drop unless [`release`](ResourceGuard::release)
/// was called first.
pub struct ResourceGuard<F: FnOnce()> {
    cleanup: Option<F>,
}

impl<F: FnOnce()> ResourceGuard<F> {
    /// Arms the guard with the provided cleanup closure.
    pub fn new(cleanup: F) -> Self {
        ResourceGuard {
            cleanup: Some(cleanup),
        }
    }

    /// Cancels the cleanup. After this the guard is inert.
    pub fn release(&mut self) {
        self.cleanup = None;
    }
}

impl<F: FnOnce()> Drop for ResourceGuard<F> {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}
