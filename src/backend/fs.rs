//! Filesystem back-end: a plain directory tree, no versioning.
//!
//! Grounded on `examples/original_source/src/DBImpl.h`'s
//! `FilesystemImpl`. The tag in `<tag>:<relpath>` is ignored — this
//! back-end has no notion of a ref/commit, only a root directory.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::backend::{DirContent, Object, ObjectStore, strip_tag};
use crate::errors::GitCondDbError;
use crate::iov::{IOV, TimePoint};
use crate::logger::{Logger, NullLogger};

pub struct FsStore {
    root: PathBuf,
    logger: Mutex<Arc<dyn Logger>>,
}

impl FsStore {
    pub fn new(root: &str, logger: Arc<dyn Logger>) -> Result<Self, GitCondDbError> {
        let root = PathBuf::from(root);
        logger.info(&format!("using files from '{}'", root.display()));
        if !root.is_dir() {
            return Err(GitCondDbError::BackendInitFailure(format!(
                "invalid path {}",
                root.display()
            )));
        }
        Ok(FsStore {
            root,
            logger: Mutex::new(logger),
        })
    }

    fn to_path(&self, object_id: &str) -> PathBuf {
        self.root.join(strip_tag(object_id))
    }

    fn logger_ref(&self) -> Arc<dyn Logger> {
        Arc::clone(&self.logger.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl ObjectStore for FsStore {
    fn exists(&self, object_id: &str) -> bool {
        tracing::trace!("exists? {object_id}");
        if !object_id.contains(':') {
            return true;
        }
        self.to_path(object_id).exists()
    }

    fn get(&self, object_id: &str) -> Result<Object, GitCondDbError> {
        let path = self.to_path(object_id);
        tracing::debug!("get path {}", path.display());
        self.logger_ref().debug(&format!("accessing path {}", path.display()));

        if path.is_dir() {
            self.logger_ref().debug("found directory");
            let mut dirs = Vec::new();
            let mut files = Vec::new();
            for entry in std::fs::read_dir(&path)? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                if entry.path().is_dir() {
                    dirs.push(name);
                } else {
                    files.push(name);
                }
            }
            Ok(Object::Directory(DirContent {
                root: strip_tag(object_id).to_string(),
                dirs,
                files,
            }))
        } else if path.is_file() {
            self.logger_ref().debug("found regular file");
            let data = std::fs::read_to_string(&path)?;
            Ok(Object::Blob(data))
        } else {
            Err(GitCondDbError::UnresolvableObject(object_id.to_string()))
        }
    }

    fn commit_time(&self, _commit_id: &str) -> Result<TimePoint, GitCondDbError> {
        Ok(IOV::max())
    }

    fn disconnect(&self) {}

    fn connected(&self) -> bool {
        true
    }

    fn set_logger(&self, logger: Arc<dyn Logger>) {
        *self.logger.lock().unwrap_or_else(|e| e.into_inner()) = logger;
    }

    fn logger(&self) -> Arc<dyn Logger> {
        self.logger_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store(root: &std::path::Path) -> FsStore {
        FsStore::new(root.to_str().unwrap(), Arc::new(NullLogger)).unwrap()
    }

    #[test]
    fn blob_read_returns_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Cond1"), "data 0").unwrap();
        let s = store(dir.path());
        let obj = s.get("tag:Cond1").unwrap();
        assert_eq!(obj, Object::Blob("data 0".to_string()));
    }

    #[test]
    fn directory_listing_partitions_dirs_and_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("Nested")).unwrap();
        fs::write(dir.path().join("Cond1"), "a").unwrap();
        let s = store(dir.path());
        let Object::Directory(content) = s.get("tag:").unwrap() else {
            panic!("expected directory");
        };
        assert_eq!(content.dirs, vec!["Nested".to_string()]);
        assert_eq!(content.files, vec!["Cond1".to_string()]);
    }

    #[test]
    fn exists_is_true_for_bare_tag() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path());
        assert!(s.exists("anytag"));
    }

    #[test]
    fn exists_checks_real_path_when_tagged() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Cond1"), "a").unwrap();
        let s = store(dir.path());
        assert!(s.exists("tag:Cond1"));
        assert!(!s.exists("tag:Missing"));
    }

    #[test]
    fn commit_time_is_max() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path());
        assert_eq!(s.commit_time("whatever").unwrap(), IOV::max());
    }

    #[test]
    fn disconnect_is_a_no_op_and_stays_connected() {
        let dir = tempfile::tempdir().unwrap();
        let s = store(dir.path());
        s.disconnect();
        assert!(s.connected());
    }
}
