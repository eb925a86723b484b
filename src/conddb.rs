//! Public façade (spec §4.7).
//!
//! Grounded on `examples/original_source/include/GitCondDB.h` (`struct
//! CondDB`) and `src/GitCondDB.cpp` (`connect`, `json_dir_converter`).

use std::sync::{Arc, Mutex};

use crate::backend::{ObjectStore, connect_uri};
use crate::errors::GitCondDbError;
use crate::iov::{IOV, TimePoint};
use crate::logger::{DefaultLogger, Level, Logger};
use crate::resolver::{self, DirConverter, Key, default_dir_converter};

/// A connected conditions database. Cheap to hold: the only owned
/// resource is the back-end's connection handle, released on
/// [`CondDB::disconnect`] (or automatically at the end of a
/// [`CondDB::scoped_connection`]) and transparently reopened on the next
/// read.
pub struct CondDB {
    store: Box<dyn ObjectStore>,
    dir_converter: Mutex<Arc<DirConverter>>,
    reduce_iovs: Mutex<bool>,
}

impl CondDB {
    /// Resolve the payload valid for `key` at the unbounded interval.
    pub fn get(&self, key: &Key) -> Result<(String, IOV), GitCondDbError> {
        self.get_bounded(key, IOV::default())
    }

    /// Resolve the payload valid for `key`, restricted to `bounds`.
    pub fn get_bounded(&self, key: &Key, bounds: IOV) -> Result<(String, IOV), GitCondDbError> {
        let converter = Arc::clone(&self.dir_converter.lock().unwrap_or_else(|e| e.into_inner()));
        let reduce = *self.reduce_iovs.lock().unwrap_or_else(|e| e.into_inner());
        resolver::get(self.store.as_ref(), key, bounds, reduce, converter.as_ref())
    }

    /// Every IOV boundary crossed while resolving `tag`/`path` over the
    /// unbounded interval, in traversal order.
    pub fn iov_boundaries(&self, tag: &str, path: &str) -> Result<Vec<TimePoint>, GitCondDbError> {
        self.iov_boundaries_bounded(tag, path, IOV::default())
    }

    /// Same as [`CondDB::iov_boundaries`], restricted to `bounds`.
    pub fn iov_boundaries_bounded(
        &self,
        tag: &str,
        path: &str,
        bounds: IOV,
    ) -> Result<Vec<TimePoint>, GitCondDbError> {
        resolver::iov_boundaries(self.store.as_ref(), tag, path, bounds)
    }

    /// The wall-clock time of a commit/ref. Non-versioned back-ends
    /// return [`IOV::max`].
    pub fn commit_time(&self, commit_id: &str) -> Result<TimePoint, GitCondDbError> {
        self.store.commit_time(commit_id)
    }

    /// Release the back-end's connection. The versioned-store back-end
    /// reopens transparently on the next read; filesystem/document
    /// back-ends treat this as a no-op.
    pub fn disconnect(&self) {
        tracing::debug!("CondDB::disconnect");
        self.store.disconnect();
    }

    pub fn connected(&self) -> bool {
        self.store.connected()
    }

    /// An RAII guard that calls [`CondDB::disconnect`] when dropped. Its
    /// lifetime must not outlive `self`.
    pub fn scoped_connection(&self) -> ScopedConnection<'_> {
        ScopedConnection { db: self }
    }

    /// Replace the directory-listing-to-payload converter, returning the
    /// previous one (swap semantics, as the original C++'s
    /// `std::swap`-based `set_dir_converter`).
    pub fn set_dir_converter(&self, converter: Arc<DirConverter>) -> Arc<DirConverter> {
        let mut slot = self.dir_converter.lock().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *slot, converter)
    }

    pub fn set_logger(&self, logger: Arc<dyn Logger>) {
        self.store.set_logger(logger);
    }

    pub fn logger(&self) -> Arc<dyn Logger> {
        self.store.logger()
    }

    /// Whether consecutive manifest entries sharing a child token are
    /// coalesced into a single wider IOV. Default: `true`.
    pub fn iov_reduction(&self) -> bool {
        *self.reduce_iovs.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_iov_reduction(&self, value: bool) {
        *self.reduce_iovs.lock().unwrap_or_else(|e| e.into_inner()) = value;
    }
}

/// RAII object that disconnects the owning [`CondDB`] when dropped.
pub struct ScopedConnection<'a> {
    db: &'a CondDB,
}

impl Drop for ScopedConnection<'_> {
    fn drop(&mut self) {
        self.db.disconnect();
    }
}

/// Connect to a back-end selected by URI prefix (spec §6):
/// `git:<path>`, `file:<path>`, `json:<path-or-literal>`, or a bare
/// `<path>` (treated as `git:<path>`).
///
/// Defaults to [`DefaultLogger`] at [`Level::Quiet`] when `logger` is
/// `None`, matching the original's `connect` defaulting to
/// `BasicLogger`.
pub fn connect(
    uri: &str,
    logger: Option<Arc<dyn Logger>>,
) -> Result<CondDB, GitCondDbError> {
    let logger = logger.unwrap_or_else(|| Arc::new(DefaultLogger::new(Level::Quiet)));
    let store = connect_uri(uri, logger)?;
    Ok(CondDB {
        store,
        dir_converter: Mutex::new(Arc::new(default_dir_converter)),
        reduce_iovs: Mutex::new(true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::NullLogger;

    fn connect_doc(doc: &str) -> CondDB {
        connect(&format!("json:{doc}"), Some(Arc::new(NullLogger))).unwrap()
    }

    fn key(path: &str, t: TimePoint) -> Key {
        Key { tag: String::new(), path: path.to_string(), time_point: t }
    }

    #[test]
    fn default_iov_reduction_is_true() {
        let db = connect_doc(r#"{"Cond":"x"}"#);
        assert!(db.iov_reduction());
    }

    #[test]
    fn get_resolves_through_the_facade() {
        let db = connect_doc(r#"{"Cond":{"IOVs":"0 v0\n","v0":"data 0"}}"#);
        let (payload, iov) = db.get(&key("Cond", 0)).unwrap();
        assert_eq!(payload, "data 0");
        assert_eq!(iov, IOV { since: 0, until: IOV::max() });
    }

    #[test]
    fn disconnect_then_get_reconnects_and_matches() {
        let db = connect_doc(r#"{"Cond":"data 0"}"#);
        let (before, _) = db.get(&key("Cond", 0)).unwrap();
        db.disconnect();
        assert!(db.connected(), "document back-end treats disconnect as a no-op");
        let (after, _) = db.get(&key("Cond", 0)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn scoped_connection_disconnects_on_drop() {
        let db = connect_doc(r#"{"Cond":"data 0"}"#);
        {
            let _guard = db.scoped_connection();
            db.get(&key("Cond", 0)).unwrap();
        }
        // document back-end is always "connected"; the guard exercising
        // disconnect() without panicking is what this test verifies.
        assert!(db.connected());
    }

    #[test]
    fn set_dir_converter_swap_returns_previous() {
        let db = connect_doc(r#"{"Cond":{"a":"1"}}"#);
        let custom: Arc<DirConverter> = Arc::new(|_content| "custom".to_string());
        let previous = db.set_dir_converter(Arc::clone(&custom));
        let (payload, _) = db.get(&key("Cond", 0)).unwrap();
        assert_eq!(payload, "custom");

        let restored = db.set_dir_converter(previous);
        assert!(Arc::ptr_eq(&restored, &custom));
    }

    #[test]
    fn connect_rejects_unknown_uri_as_git() {
        // a bare path with no scheme is treated as `git:<path>`; a
        // non-existent directory therefore fails to open as a repo.
        let err = connect("/nonexistent/surely", Some(Arc::new(NullLogger)));
        assert!(err.is_err());
    }
}
