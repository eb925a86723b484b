//! Versioned-store back-end: a local git repository, read through
//! [`git2`] (the real external crate standing in for libgit2, just as
//! the original C++ reached it through `git_helpers.h`). Object lookup
//! resolves `<tag>:<path>`-style ids as git revspecs, since git itself
//! already treats `"<ref>:<path>"` as "the tree/blob at `<path>` inside
//! the tree of `<ref>`" — no extra translation layer needed.
//!
//! Grounded on `examples/original_source/src/DBImpl.h`'s `GitImpl` for
//! control flow, and `git_helpers.h`'s `git_repository_ptr` for the lazy
//! mutex-guarded connection (reimplemented generically in
//! [`crate::backend::handle::LazyHandle`]).

use std::sync::{Arc, Mutex};

use git2::{ObjectType, Repository};

use crate::backend::handle::LazyHandle;
use crate::backend::{DirContent, Object, ObjectStore, strip_tag};
use crate::errors::GitCondDbError;
use crate::iov::TimePoint;
use crate::logger::Logger;

pub struct GitStore {
    repository: LazyHandle<Repository>,
    logger: Mutex<Arc<dyn Logger>>,
}

impl GitStore {
    pub fn new(repository_path: &str, logger: Arc<dyn Logger>) -> Result<Self, GitCondDbError> {
        let path = repository_path.to_string();
        let open_logger = Arc::clone(&logger);
        let repository = LazyHandle::new(move || {
            tracing::debug!("opening Git repository at '{path}'");
            open_logger.info(&format!("opening Git repository '{path}'"));
            Repository::open(&path)
                .map_err(|e| GitCondDbError::BackendInitFailure(format!("invalid Git repository: '{path}': {e}")))
        });

        // Try access during construction, mirroring `GitImpl`'s eager
        // `m_repository.get()` in its constructor.
        repository.with(|_| ())?;

        Ok(GitStore {
            repository,
            logger: Mutex::new(logger),
        })
    }

    fn logger_ref(&self) -> Arc<dyn Logger> {
        Arc::clone(&self.logger.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl ObjectStore for GitStore {
    fn exists(&self, object_id: &str) -> bool {
        tracing::trace!("exists? {object_id}");
        self.repository
            .with(|repo| repo.revparse_single(object_id).is_ok())
            .unwrap_or(false)
    }

    fn get(&self, object_id: &str) -> Result<Object, GitCondDbError> {
        tracing::debug!("get Git object {object_id}");
        self.logger_ref().debug(&format!("get Git object {object_id}"));
        self.repository.with(|repo| -> Result<Object, GitCondDbError> {
            let obj = repo
                .revparse_single(object_id)
                .map_err(|_| GitCondDbError::UnresolvableObject(object_id.to_string()))?;

            match obj.kind() {
                Some(ObjectType::Tree) => {
                    tracing::trace!("{object_id} is a tree");
                    self.logger_ref().debug("found tree object");
                    let tree = obj.peel_to_tree()?;
                    let mut dirs = Vec::new();
                    let mut files = Vec::new();
                    for entry in tree.iter() {
                        let name = entry.name().unwrap_or_default().to_string();
                        if entry.kind() == Some(ObjectType::Tree) {
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
                }
                _ => {
                    tracing::trace!("{object_id} is a blob");
                    self.logger_ref().debug("found blob object");
                    let blob = obj.peel_to_blob()?;
                    let content = String::from_utf8_lossy(blob.content()).into_owned();
                    Ok(Object::Blob(content))
                }
            }
        })?
    }

    fn commit_time(&self, commit_id: &str) -> Result<TimePoint, GitCondDbError> {
        tracing::trace!("commit_time {commit_id}");
        self.repository.with(|repo| -> Result<TimePoint, GitCondDbError> {
            let obj = repo
                .revparse_single(commit_id)
                .map_err(|_| GitCondDbError::UnresolvableObject(commit_id.to_string()))?;
            let commit = obj.peel_to_commit()?;
            let secs = commit.time().seconds();
            Ok(secs.max(0) as TimePoint)
        })?
    }

    fn disconnect(&self) {
        tracing::debug!("disconnecting Git repository handle");
        self.logger_ref().debug("disconnect from Git repository");
        self.repository.disconnect();
    }

    fn connected(&self) -> bool {
        self.repository.connected()
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
    use crate::logger::NullLogger;
    use git2::{Repository, Signature};
    use std::fs;

    fn init_repo_with_file(dir: &std::path::Path, name: &str, content: &str) -> Repository {
        let repo = Repository::init(dir).unwrap();
        fs::write(dir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(std::path::Path::new(name)).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("test", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap();
        repo
    }

    #[test]
    fn opens_existing_repository() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_file(dir.path(), "Cond1", "data 0");
        let store = GitStore::new(dir.path().to_str().unwrap(), Arc::new(NullLogger)).unwrap();
        assert!(store.connected());
    }

    #[test]
    fn blob_lookup_via_revspec() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_file(dir.path(), "Cond1", "data 0");
        let store = GitStore::new(dir.path().to_str().unwrap(), Arc::new(NullLogger)).unwrap();
        let obj = store.get("HEAD:Cond1").unwrap();
        assert_eq!(obj, Object::Blob("data 0".to_string()));
    }

    #[test]
    fn tree_lookup_returns_directory_listing() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_file(dir.path(), "Cond1", "data 0");
        let store = GitStore::new(dir.path().to_str().unwrap(), Arc::new(NullLogger)).unwrap();
        let Object::Directory(content) = store.get("HEAD:").unwrap() else {
            panic!("expected directory");
        };
        assert_eq!(content.files, vec!["Cond1".to_string()]);
    }

    #[test]
    fn disconnect_then_get_reconnects_transparently() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_file(dir.path(), "Cond1", "data 0");
        let store = GitStore::new(dir.path().to_str().unwrap(), Arc::new(NullLogger)).unwrap();
        store.disconnect();
        assert!(!store.connected());
        let obj = store.get("HEAD:Cond1").unwrap();
        assert_eq!(obj, Object::Blob("data 0".to_string()));
        assert!(store.connected());
    }

    #[test]
    fn invalid_repository_path_fails_to_init() {
        let dir = tempfile::tempdir().unwrap();
        assert!(GitStore::new(dir.path().to_str().unwrap(), Arc::new(NullLogger)).is_err());
    }

    #[test]
    fn commit_time_reads_commit_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_file(dir.path(), "Cond1", "data 0");
        let store = GitStore::new(dir.path().to_str().unwrap(), Arc::new(NullLogger)).unwrap();
        assert!(store.commit_time("HEAD").unwrap() > 0);
    }
}
