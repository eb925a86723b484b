//! The recursive resolution engine: `get` and `iov_boundaries` (spec
//! §4.5). Drives directory detection, manifest consultation, child
//! descent and dir-converter invocation.
//!
//! Grounded on `examples/original_source/src/GitCondDB.cpp`
//! (`CondDB::get`, `CondDB::iov_boundaries_accumulate`,
//! `CondDB::iov_boundaries`).

use crate::backend::{DirContent, Object, ObjectStore};
use crate::errors::GitCondDbError;
use crate::iov::{IOV, TimePoint};
use crate::manifest;
use crate::path::{join_and_normalize, normalize};

/// A fully-qualified lookup: tag + logical path + query time.
#[derive(Debug, Clone)]
pub struct Key {
    pub tag: String,
    pub path: String,
    pub time_point: TimePoint,
}

/// `"<tag>:<normalized-path>"`.
fn format_object_id(tag: &str, path: &str) -> String {
    format!("{tag}:{}", normalize(path))
}

/// Project a directory listing to a payload string. The default,
/// [`default_dir_converter`], emits the canonical `{"dirs":...,
/// "files":..., "root":...}` document (spec §6).
pub type DirConverter = dyn Fn(&DirContent) -> String + Send + Sync;

/// Canonical JSON rendering of a directory listing (spec §4.5.4, §6).
pub fn default_dir_converter(content: &DirContent) -> String {
    serde_json::json!({
        "dirs": content.dirs,
        "files": content.files,
        "root": content.root,
    })
    .to_string()
}

/// `get(key, bounds) -> (payload, iov)` (spec §4.5).
pub fn get(
    store: &dyn ObjectStore,
    key: &Key,
    bounds: IOV,
    reduce_iovs: bool,
    dir_converter: &DirConverter,
) -> Result<(String, IOV), GitCondDbError> {
    let object_id = format_object_id(&key.tag, &key.path);
    tracing::trace!("get {object_id} at t={}", key.time_point);

    match store.get(&object_id)? {
        Object::Blob(data) => Ok((data, bounds)),
        Object::Directory(mut content) => {
            if content.files.iter().any(|f| f == "IOVs") {
                tracing::debug!("{object_id} is an IOV folder");
                let manifest_id = format!("{object_id}/IOVs");
                let manifest_data = match store.get(&manifest_id)? {
                    Object::Blob(data) => data,
                    Object::Directory(_) => {
                        return Err(GitCondDbError::UnresolvableObject(manifest_id));
                    }
                };

                let (child_token, new_bounds) =
                    manifest::pick_entry(&manifest_data, key.time_point, bounds, reduce_iovs)?;

                if !new_bounds.valid() {
                    return Ok((String::new(), IOV::invalid()));
                }

                let new_key = Key {
                    tag: key.tag.clone(),
                    path: join_and_normalize(&key.path, &child_token),
                    time_point: key.time_point,
                };
                get(store, &new_key, new_bounds, reduce_iovs, dir_converter)
            } else {
                let mut dirs = Vec::new();
                for name in content.dirs.drain(..) {
                    let candidate_iovs = format!("{object_id}/{name}/IOVs");
                    if store.exists(&candidate_iovs) {
                        content.files.push(name);
                    } else {
                        dirs.push(name);
                    }
                }
                dirs.sort();
                content.files.sort();
                content.dirs = dirs;

                Ok((dir_converter(&content), IOV::default()))
            }
        }
    }
}

fn iov_boundaries_accumulate(
    store: &dyn ObjectStore,
    object_id: &str,
    limits: IOV,
    acc: &mut Vec<(IOV, String)>,
) -> Result<(), GitCondDbError> {
    let iovs_id = format!("{object_id}/IOVs");
    if !store.exists(&iovs_id) {
        tracing::trace!("{object_id} is a leaf, limits={limits:?}");
        acc.push((limits, object_id.to_string()));
        return Ok(());
    }

    let manifest_data = match store.get(&iovs_id)? {
        Object::Blob(data) => data,
        Object::Directory(_) => return Err(GitCondDbError::UnresolvableObject(iovs_id)),
    };

    for (entry_iov, child_token) in manifest::parse_entries(&manifest_data)? {
        if limits.overlaps(&entry_iov) {
            let child_id = normalize(&format!("{object_id}/{child_token}"));
            iov_boundaries_accumulate(store, &child_id, limits.intersect(&entry_iov), acc)?;
        }
    }
    Ok(())
}

/// `iov_boundaries(tag, path, bounds) -> [since, ...]` in traversal order
/// (not sorted, not deduplicated — spec §9).
pub fn iov_boundaries(
    store: &dyn ObjectStore,
    tag: &str,
    path: &str,
    bounds: IOV,
) -> Result<Vec<TimePoint>, GitCondDbError> {
    let object_id = format_object_id(tag, path);

    if !bounds.valid() || !store.exists(&object_id) {
        return Ok(Vec::new());
    }

    let mut acc = Vec::new();
    iov_boundaries_accumulate(store, &object_id, bounds, &mut acc)?;
    Ok(acc.into_iter().map(|(iov, _)| iov.since).collect())
}
