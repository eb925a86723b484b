//! Lazy (re)connect-on-demand handle.
//!
//! Grounded on `examples/original_source/src/git_helpers.h`
//! (`git_repository_ptr`): a factory closure held behind a mutex-guarded
//! optional value. `get` populates the value on first use and on any
//! call after [`LazyHandle::disconnect`]; access is serialized so two
//! threads racing to (re)connect never construct the resource twice.

use std::sync::Mutex;

use crate::errors::GitCondDbError;

/// A lazily-constructed, droppable resource shared behind a mutex.
///
/// `factory` must not borrow anything with a shorter lifetime than the
/// `LazyHandle` itself — it is called again every time the handle is
/// repopulated after a `disconnect`.
pub struct LazyHandle<T> {
    factory: Box<dyn Fn() -> Result<T, GitCondDbError> + Send + Sync>,
    inner: Mutex<Option<T>>,
}

impl<T> LazyHandle<T> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Result<T, GitCondDbError> + Send + Sync + 'static,
    {
        LazyHandle {
            factory: Box::new(factory),
            inner: Mutex::new(None),
        }
    }

    /// Run `f` against the held resource, constructing it first if
    /// necessary.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> Result<R, GitCondDbError> {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if guard.is_none() {
            tracing::debug!("LazyHandle reconnecting");
            *guard = Some((self.factory)()?);
        }
        Ok(f(guard.as_ref().expect("just populated")))
    }

    /// Drop the held resource, if any. The next [`LazyHandle::with`]
    /// call transparently repopulates it.
    pub fn disconnect(&self) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    /// Whether the resource is currently populated.
    pub fn connected(&self) -> bool {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.is_some()
    }
}
