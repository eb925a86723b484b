//! GitCondDB is a read-only conditions database: it resolves time-indexed
//! payloads organized as a tree of versioned files backed by a
//! content-addressed store. A client requests the payload valid for a
//! `(tag, logical path, time-point)` triple; [`CondDB::get`] returns the
//! payload string together with the half-open interval of validity (IOV)
//! around that time-point.
//!
//! Three back-ends share one object-reading contract
//! ([`backend::ObjectStore`]): a versioned content store (git, via
//! [`git2`]), a plain filesystem tree, and an in-memory hierarchical
//! document. [`connect`] selects one from a URI.
//!
//! Out of scope: the CLI front-end that writes a resolved subtree into a
//! cache directory, and application-specific directory converters beyond
//! the default JSON-shaped one ([`CondDB::set_dir_converter`] is the hook
//! for supplying your own).
//!
//! Internal diagnostics are emitted through [`tracing`]; set `RUST_LOG` to
//! see them, or call [`testing::init_tracing`] in tests.

pub mod backend;
pub mod conddb;
pub mod errors;
pub mod iov;
pub mod logger;
pub mod manifest;
pub mod path;
pub mod resolver;

pub use conddb::{CondDB, connect};
pub use errors::GitCondDbError;
pub use iov::{IOV, TimePoint};
pub use logger::{DefaultLogger, Level, Logger, NullLogger};

/// Helpers that exist only for tests and downstream integrators who want
/// the crate's own diagnostic output while exercising it.
pub mod testing {
    /// Install a `tracing-subscriber` filtered by `RUST_LOG` (default:
    /// `warn`). Safe to call more than once; later calls are no-ops.
    ///
    /// Mirrors `git-internal`'s own `internal::pack::tests::init_logger`.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_target(false)
            .without_time()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}
