//! A blob store rooted in a local directory.
//!
//! Keys map to relative paths under the root (`logs/f/f_1.json` becomes
//! `<root>/logs/f/f_1.json`) and `last_modified` is the file's mtime.
//! Writes go to a hidden temporary file that is renamed into place, so a
//! listing never observes a half-written object.

use std::{
    fs,
    io::ErrorKind,
    path::{Component, Path, PathBuf},
};

use chrono::{DateTime, Utc};
use tracing::debug;

use forensics_contracts::{
    error::{ForensicsError, ForensicsResult},
    store::{ObjectSummary, PutOptions},
};
use forensics_core::traits::BlobStore;

const SERVICE: &str = "filesystem store";

/// A `BlobStore` backed by a directory tree.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Open a store at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> ForensicsResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            ForensicsError::upstream(SERVICE, format!("cannot create '{}': {}", root.display(), e))
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> ForensicsResult<PathBuf> {
        let relative = Path::new(key);
        let safe = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(ForensicsError::InvalidInput {
                reason: format!("key '{}' is not a relative object path", key),
            });
        }
        Ok(self.root.join(relative))
    }

    fn walk(&self, dir: &Path, prefix: &str, out: &mut Vec<ObjectSummary>) -> ForensicsResult<()> {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_error(dir, e)),
        };

        for entry in entries {
            let entry = entry.map_err(|e| io_error(dir, e))?;
            let name = entry.file_name();
            if name.to_string_lossy().starts_with('.') {
                continue;
            }
            let path = entry.path();
            let metadata = entry.metadata().map_err(|e| io_error(&path, e))?;
            if metadata.is_dir() {
                self.walk(&path, prefix, out)?;
                continue;
            }

            let key = self.key_for(&path);
            if !key.starts_with(prefix) {
                continue;
            }
            let modified = metadata.modified().map_err(|e| io_error(&path, e))?;
            out.push(ObjectSummary {
                key,
                last_modified: DateTime::<Utc>::from(modified),
            });
        }
        Ok(())
    }

    fn key_for(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn io_error(path: &Path, e: std::io::Error) -> ForensicsError {
    ForensicsError::upstream(SERVICE, format!("'{}': {}", path.display(), e))
}

impl BlobStore for FsBlobStore {
    fn list(&self, prefix: &str) -> ForensicsResult<Vec<ObjectSummary>> {
        // Start the walk at the deepest directory the prefix names.
        let start = match prefix.rfind('/') {
            Some(idx) => self.path_for(&prefix[..idx])?,
            None => self.root.clone(),
        };
        let mut out = Vec::new();
        self.walk(&start, prefix, &mut out)?;
        out.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(out)
    }

    fn get(&self, key: &str) -> ForensicsResult<Vec<u8>> {
        let path = self.path_for(key)?;
        fs::read(&path).map_err(|e| io_error(&path, e))
    }

    fn put(&self, key: &str, body: &[u8], options: PutOptions) -> ForensicsResult<()> {
        let path = self.path_for(key)?;
        let parent = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let staging = parent.join(format!(".{}.tmp", file_name));
        fs::write(&staging, body).map_err(|e| io_error(&staging, e))?;
        fs::rename(&staging, &path).map_err(|e| io_error(&path, e))?;

        if let Some(encryption) = options.encryption {
            debug!(key = %key, ?encryption, "encryption at rest is left to the host filesystem");
        }
        debug!(key = %key, bytes = body.len(), "object stored");
        Ok(())
    }
}
