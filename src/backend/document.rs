//! In-memory hierarchical document back-end.
//!
//! Grounded on `examples/original_source/src/DBImpl.h`'s `JSONImpl`,
//! using `serde_json::Value` where the original walks a
//! `nlohmann::json::json_pointer`.

use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::backend::{DirContent, Object, ObjectStore, strip_tag};
use crate::errors::GitCondDbError;
use crate::iov::{IOV, TimePoint};
use crate::logger::Logger;

pub struct DocumentStore {
    document: Value,
    logger: Mutex<Arc<dyn Logger>>,
}

impl DocumentStore {
    /// `source` is either an inline document (if it contains `{`) or a
    /// path to a file holding one.
    pub fn new(source: &str, logger: Arc<dyn Logger>) -> Result<Self, GitCondDbError> {
        let document = if source.contains('{') {
            logger.info("using JSON data from memory");
            serde_json::from_str(source)?
        } else if std::path::Path::new(source).is_file() {
            logger.info(&format!("loading JSON data from '{source}'"));
            let data = std::fs::read_to_string(source)?;
            serde_json::from_str(&data)?
        } else {
            return Err(GitCondDbError::BackendInitFailure("invalid JSON".to_string()));
        };
        Ok(DocumentStore {
            document,
            logger: Mutex::new(logger),
        })
    }

    fn resolve<'a>(&'a self, object_id: &str) -> Option<&'a Value> {
        let path = strip_tag(object_id);
        if path.is_empty() {
            return Some(&self.document);
        }
        let mut node = &self.document;
        for segment in path.split('/') {
            node = node.as_object()?.get(segment)?;
        }
        Some(node)
    }

    fn logger_ref(&self) -> Arc<dyn Logger> {
        Arc::clone(&self.logger.lock().unwrap_or_else(|e| e.into_inner()))
    }
}

impl ObjectStore for DocumentStore {
    fn exists(&self, object_id: &str) -> bool {
        tracing::trace!("exists? {object_id}");
        !object_id.contains(':') || self.resolve(object_id).is_some()
    }

    fn get(&self, object_id: &str) -> Result<Object, GitCondDbError> {
        let path = strip_tag(object_id);
        tracing::debug!("get entry '{path}'");
        self.logger_ref().debug(&format!("accessing entry '{path}'"));

        let node = self
            .resolve(object_id)
            .ok_or_else(|| GitCondDbError::UnresolvableObject(object_id.to_string()))?;

        match node {
            Value::Object(map) => {
                self.logger_ref().debug("found object");
                let mut dirs = Vec::new();
                let mut files = Vec::new();
                for (key, value) in map {
                    if value.is_object() {
                        dirs.push(key.clone());
                    } else {
                        files.push(key.clone());
                    }
                }
                Ok(Object::Directory(DirContent {
                    root: path.to_string(),
                    dirs,
                    files,
                }))
            }
            Value::String(s) => {
                self.logger_ref().debug("found string");
                Ok(Object::Blob(s.clone()))
            }
            _ => Err(GitCondDbError::InvalidObjectType(object_id.to_string())),
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
    use crate::logger::NullLogger;

    fn store(doc: &str) -> DocumentStore {
        DocumentStore::new(doc, Arc::new(NullLogger)).unwrap()
    }

    #[test]
    fn string_leaf_is_a_blob() {
        let s = store(r#"{"Cond":"data 0"}"#);
        assert_eq!(s.get("tag:Cond").unwrap(), Object::Blob("data 0".to_string()));
    }

    #[test]
    fn object_leaf_is_a_directory_listing() {
        let s = store(r#"{"Cond":{"a":"1","b":{"c":"2"}}}"#);
        let Object::Directory(content) = s.get("tag:Cond").unwrap() else {
            panic!("expected directory");
        };
        assert_eq!(content.files, vec!["a".to_string()]);
        assert_eq!(content.dirs, vec!["b".to_string()]);
        assert_eq!(content.root, "Cond");
    }

    #[test]
    fn non_string_non_object_leaf_is_invalid_type() {
        let s = store(r#"{"Cond":{"n":42}}"#);
        let err = s.get("tag:Cond/n").unwrap_err();
        assert!(matches!(err, GitCondDbError::InvalidObjectType(_)));
    }

    #[test]
    fn missing_node_is_unresolvable() {
        let s = store(r#"{"Cond":"x"}"#);
        let err = s.get("tag:Missing").unwrap_err();
        assert!(matches!(err, GitCondDbError::UnresolvableObject(_)));
    }

    #[test]
    fn exists_true_for_bare_tag() {
        let s = store(r#"{"Cond":"x"}"#);
        assert!(s.exists("anytag"));
    }

    #[test]
    fn empty_path_resolves_to_document_root() {
        let s = store(r#"{"Cond":"x"}"#);
        let Object::Directory(content) = s.get("tag:").unwrap() else {
            panic!("expected directory");
        };
        assert_eq!(content.files, vec!["Cond".to_string()]);
    }
}
