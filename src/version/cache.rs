//! Persistent record of the last compatible version picked per toolchain and module
//!
//! The document on disk is a pretty-printed JSON object keyed by Go version,
//! whose values map module paths to the selected version:
//!
//! ```json
//! {
//!   "1.21.0": {
//!     "github.com/gin-gonic/gin": "v1.9.1"
//!   }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::version::error::CacheError;

/// Toolchain version -> (module path -> selected version)
pub type CacheDocument = IndexMap<String, IndexMap<String, String>>;

pub struct CompatibilityCache {
    path: PathBuf,
    entries: Mutex<CacheDocument>,
}

impl CompatibilityCache {
    /// Load the cache document at `path`.
    ///
    /// Never fails: a missing, unreadable or malformed document is replaced by
    /// an empty one, which is written back immediately.
    pub fn load(path: &Path) -> Self {
        let entries = match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<CacheDocument>(&content) {
                Ok(entries) => {
                    debug!("Loaded cache with {} toolchain entries from {:?}", entries.len(), path);
                    Some(entries)
                }
                Err(e) => {
                    warn!("Cache document {:?} is corrupt, resetting: {}", path, e);
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No cache document at {:?}, creating an empty one", path);
                None
            }
            Err(e) => {
                warn!("Failed to read cache document {:?}, resetting: {}", path, e);
                None
            }
        };

        let reset = entries.is_none();
        let cache = Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries.unwrap_or_default()),
        };

        if reset {
            let _ = cache
                .persist()
                .inspect_err(|e| warn!("Failed to write empty cache document {:?}: {}", path, e));
        }

        cache
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Acquire the entries lock with proper error handling
    fn lock_entries(&self) -> Result<MutexGuard<'_, CacheDocument>, CacheError> {
        self.entries.lock().map_err(|_| CacheError::LockPoisoned)
    }

    /// Raw cached selection, without checking it against a listing
    pub fn get(&self, toolchain: &str, module: &str) -> Result<Option<String>, CacheError> {
        let entries = self.lock_entries()?;
        Ok(entries
            .get(toolchain)
            .and_then(|modules| modules.get(module))
            .cloned())
    }

    /// Cached selection for `module` under `toolchain`, if it is still in `listing`.
    ///
    /// A cached version the registry no longer lists is reported as a miss.
    pub fn lookup(
        &self,
        toolchain: &str,
        module: &str,
        listing: &[String],
    ) -> Result<Option<String>, CacheError> {
        let Some(version) = self.get(toolchain, module)? else {
            return Ok(None);
        };

        if listing.contains(&version) {
            Ok(Some(version))
        } else {
            debug!(
                "Cached version {} of {} is no longer listed, ignoring",
                version, module
            );
            Ok(None)
        }
    }

    /// Record `version` as the selection for `module` under `toolchain`.
    pub fn store(&self, toolchain: &str, module: &str, version: &str) -> Result<(), CacheError> {
        let mut entries = self.lock_entries()?;
        entries
            .entry(toolchain.to_string())
            .or_default()
            .insert(module.to_string(), version.to_string());
        Ok(())
    }

    /// Atomically write the document to disk (temp file + rename).
    ///
    /// The entries lock is held until the rename completes, so concurrent
    /// writers land on disk in the order they serialized.
    pub fn persist(&self) -> Result<(), CacheError> {
        let entries = self.lock_entries()?;
        let mut buf = serde_json::to_string_pretty(&*entries)?;
        buf.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.temp_path();
        fs::write(&tmp_path, buf)?;
        fs::rename(&tmp_path, &self.path)?;
        drop(entries);

        debug!("Persisted cache document to {:?}", self.path);
        Ok(())
    }

    /// Sibling temp file, unique per process
    fn temp_path(&self) -> PathBuf {
        self.path
            .with_extension(format!("json.{}.tmp", std::process::id()))
    }

    /// Copy of the in-memory document
    pub fn snapshot(&self) -> Result<CacheDocument, CacheError> {
        Ok(self.lock_entries()?.clone())
    }
}
