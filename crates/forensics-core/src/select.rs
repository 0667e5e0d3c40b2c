//! "Latest artifact" selection and JSON artifact I/O over a `BlobStore`.

use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use forensics_contracts::{
    error::{ForensicsError, ForensicsResult},
    store::{ObjectSummary, PutOptions},
};

use crate::traits::BlobStore;

/// The object with the greatest `last_modified`.
///
/// Ties go to the earliest entry in `objects`. Returns `None` for an empty
/// slice.
pub fn latest(objects: &[ObjectSummary]) -> Option<&ObjectSummary> {
    objects.iter().fold(None, |best: Option<&ObjectSummary>, candidate| match best {
        Some(current) if candidate.last_modified <= current.last_modified => Some(current),
        _ => Some(candidate),
    })
}

/// Key of the most recently modified object under `prefix`.
///
/// Returns `ForensicsError::NotFound` when the prefix is empty.
pub fn latest_key(store: &dyn BlobStore, prefix: &str) -> ForensicsResult<String> {
    let objects = store.list(prefix)?;
    let selected = latest(&objects).ok_or_else(|| ForensicsError::NotFound {
        prefix: prefix.to_string(),
    })?;
    debug!(
        prefix = %prefix,
        candidates = objects.len(),
        key = %selected.key,
        "selected latest artifact"
    );
    Ok(selected.key.clone())
}

/// Fetch `key` and decode it as JSON.
pub fn read_json<T: DeserializeOwned>(store: &dyn BlobStore, key: &str) -> ForensicsResult<T> {
    let body = store.get(key)?;
    serde_json::from_slice(&body).map_err(|e| ForensicsError::corrupt(key, e))
}

/// Fetch and decode the latest artifact under `prefix`, returning its key too.
pub fn read_latest<T: DeserializeOwned>(
    store: &dyn BlobStore,
    prefix: &str,
) -> ForensicsResult<(String, T)> {
    let key = latest_key(store, prefix)?;
    let value = read_json(store, &key)?;
    Ok((key, value))
}

/// Encode `value` as pretty-printed JSON and store it under `key`.
pub fn write_json<T: Serialize>(
    store: &dyn BlobStore,
    key: &str,
    value: &T,
    options: PutOptions,
) -> ForensicsResult<()> {
    let body = serde_json::to_vec_pretty(value).map_err(|e| ForensicsError::corrupt(key, e))?;
    store.put(key, &body, options)
}

/// `key` if nothing is stored under it yet, otherwise the first free
/// `{stem}-{n}.json` with `n >= 2`.
///
/// Artifacts are written at one-second key granularity; this keeps a second
/// write within the same second from replacing the first.
pub fn unique_key(store: &dyn BlobStore, key: &str) -> ForensicsResult<String> {
    let stem = key.strip_suffix(".json").unwrap_or(key);
    let taken: Vec<String> = store
        .list(stem)?
        .into_iter()
        .map(|o| o.key)
        .collect();
    if !taken.iter().any(|k| k == key) {
        return Ok(key.to_string());
    }

    let mut n = 2u32;
    loop {
        let candidate = format!("{}-{}.json", stem, n);
        if !taken.contains(&candidate) {
            debug!(requested = %key, assigned = %candidate, "key already taken");
            return Ok(candidate);
        }
        n += 1;
    }
}
