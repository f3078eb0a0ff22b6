//! `ListStore` — per-scope record files plus per-scope write serialization.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;

use super::record;
use crate::utils;
use crate::ScopeLists;

/// Durable mapping from a scope (channel id) to its named lists.
///
/// Each scope is one file; `load` and `save` move the whole record. Two
/// concurrent mutating commands on the same scope would each load a stale
/// mapping and one would overwrite the other's change, so callers must
/// hold the guard from [`ListStore::lock_scope`] across their whole
/// load→mutate→save cycle. Different scopes never contend.
pub struct ListStore {
    /// Directory where record files are stored.
    records_dir: PathBuf,
    /// One async mutex per scope, created lazily.
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ListStore {
    /// Create a new store.
    ///
    /// `records_dir` defaults to `~/.listkeeper/records/` if `None`.
    /// The directory is created if it doesn't exist.
    pub fn new(records_dir: Option<PathBuf>) -> std::io::Result<Self> {
        let dir = records_dir.unwrap_or_else(utils::get_records_path);
        std::fs::create_dir_all(&dir)?;

        Ok(ListStore {
            records_dir: dir,
            locks: Mutex::new(HashMap::new()),
        })
    }

    /// Acquire the scope's mutual-exclusion guard.
    ///
    /// Hold this across load→mutate→save; drop it after the save.
    pub async fn lock_scope(&self, scope: &str) -> OwnedMutexGuard<()> {
        let mutex = {
            let mut locks = self.locks.lock().unwrap();
            locks
                .entry(scope.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        mutex.lock_owned().await
    }

    /// Load all lists for a scope.
    ///
    /// A missing record is not an error — it yields an empty mapping.
    pub fn load(&self, scope: &str) -> std::io::Result<ScopeLists> {
        let path = self.record_path(scope);
        if !path.exists() {
            return Ok(ScopeLists::new());
        }

        let text = std::fs::read_to_string(&path)?;
        let lists = record::parse_record(&text);
        debug!(scope, lists = lists.len(), "loaded record");
        Ok(lists)
    }

    /// Save all lists for a scope, fully overwriting its record.
    pub fn save(&self, scope: &str, lists: &ScopeLists) -> std::io::Result<()> {
        let path = self.record_path(scope);
        std::fs::write(&path, record::serialize_record(lists))?;
        debug!(scope, lists = lists.len(), path = %path.display(), "saved record");
        Ok(())
    }

    /// Number of scopes with a record on disk (for `status`).
    pub fn scope_count(&self) -> usize {
        std::fs::read_dir(&self.records_dir)
            .map(|entries| {
                entries
                    .flatten()
                    .filter(|e| e.path().extension().is_some_and(|ext| ext == "md"))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Record file path for a scope.
    fn record_path(&self, scope: &str) -> PathBuf {
        self.records_dir
            .join(format!("{}.md", utils::safe_filename(scope)))
    }
}
