//! In-memory implementations of the collaborator traits.
//!
//! Each type keeps its data behind a `Mutex` so a single instance can be
//! shared between stages through an `Arc`. All of them support failure
//! injection so the pipeline's degraded paths can be exercised without a
//! real service.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{Arc, Mutex, MutexGuard},
};

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use forensics_contracts::{
    error::{ForensicsError, ForensicsResult},
    logs::{LogEvent, LogPage},
    snapshot::{FunctionConfiguration, RoleRecord},
    store::{Encryption, ObjectSummary, PutOptions},
};
use forensics_core::traits::{
    BlobStore, Clock, FunctionMetadata, IdentityService, LogStore, SystemClock,
};

fn lock<'a, T>(mutex: &'a Mutex<T>, service: &str) -> ForensicsResult<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|e| ForensicsError::upstream(service, format!("state lock poisoned: {}", e)))
}

// ── Blob store ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct StoredObject {
    body: Vec<u8>,
    last_modified: DateTime<Utc>,
    encryption: Option<Encryption>,
}

#[derive(Debug, Default)]
struct BlobState {
    objects: BTreeMap<String, StoredObject>,
    unavailable: bool,
}

/// A key-ordered in-memory object store.
///
/// `last_modified` is taken from the injected clock at `put` time. Listings
/// are returned in key order.
pub struct InMemoryBlobStore {
    clock: Arc<dyn Clock>,
    state: Mutex<BlobState>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(BlobState::default()),
        }
    }

    /// Store an object with an explicit modification time.
    pub fn insert_at(
        &self,
        key: impl Into<String>,
        body: impl Into<Vec<u8>>,
        last_modified: DateTime<Utc>,
    ) -> ForensicsResult<()> {
        let mut state = lock(&self.state, "blob store")?;
        state.objects.insert(
            key.into(),
            StoredObject {
                body: body.into(),
                last_modified,
                encryption: None,
            },
        );
        Ok(())
    }

    /// Every stored key, in order.
    pub fn keys(&self) -> ForensicsResult<Vec<String>> {
        Ok(lock(&self.state, "blob store")?.objects.keys().cloned().collect())
    }

    /// The encryption option the object under `key` was written with.
    pub fn encryption_of(&self, key: &str) -> ForensicsResult<Option<Encryption>> {
        let state = lock(&self.state, "blob store")?;
        state
            .objects
            .get(key)
            .map(|o| o.encryption)
            .ok_or_else(|| no_such_key(key))
    }

    /// Make every subsequent call fail until reset.
    pub fn set_unavailable(&self, unavailable: bool) -> ForensicsResult<()> {
        lock(&self.state, "blob store")?.unavailable = unavailable;
        Ok(())
    }

    fn available(&self) -> ForensicsResult<MutexGuard<'_, BlobState>> {
        let state = lock(&self.state, "blob store")?;
        if state.unavailable {
            return Err(ForensicsError::upstream("blob store", "service unavailable"));
        }
        Ok(state)
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

fn no_such_key(key: &str) -> ForensicsError {
    ForensicsError::upstream("blob store", format!("NoSuchKey: {}", key))
}

impl BlobStore for InMemoryBlobStore {
    fn list(&self, prefix: &str) -> ForensicsResult<Vec<ObjectSummary>> {
        let state = self.available()?;
        Ok(state
            .objects
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                last_modified: object.last_modified,
            })
            .collect())
    }

    fn get(&self, key: &str) -> ForensicsResult<Vec<u8>> {
        let state = self.available()?;
        state
            .objects
            .get(key)
            .map(|o| o.body.clone())
            .ok_or_else(|| no_such_key(key))
    }

    fn put(&self, key: &str, body: &[u8], options: PutOptions) -> ForensicsResult<()> {
        let mut state = self.available()?;
        let last_modified = self.clock.now();
        debug!(key = %key, bytes = body.len(), encrypted = options.encryption.is_some(), "object stored");
        state.objects.insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                last_modified,
                encryption: options.encryption,
            },
        );
        Ok(())
    }
}

// ── Log store ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct LogState {
    groups: BTreeMap<String, Vec<LogEvent>>,
    failing: BTreeSet<String>,
    queries: usize,
}

/// An in-memory log store that serves events in fixed-size pages.
///
/// Continuation tokens are the decimal offset of the next event within the
/// filtered result.
pub struct InMemoryLogStore {
    page_size: usize,
    state: Mutex<LogState>,
}

impl InMemoryLogStore {
    pub const DEFAULT_PAGE_SIZE: usize = 50;

    pub fn new() -> Self {
        Self::with_page_size(Self::DEFAULT_PAGE_SIZE)
    }

    /// A page size of zero is treated as one.
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            state: Mutex::new(LogState::default()),
        }
    }

    /// Append events to `log_group`.
    pub fn append(
        &self,
        log_group: impl Into<String>,
        events: impl IntoIterator<Item = LogEvent>,
    ) -> ForensicsResult<()> {
        let mut state = lock(&self.state, "log store")?;
        state.groups.entry(log_group.into()).or_default().extend(events);
        Ok(())
    }

    /// Make queries against `log_group` fail.
    pub fn fail_group(&self, log_group: impl Into<String>) -> ForensicsResult<()> {
        lock(&self.state, "log store")?.failing.insert(log_group.into());
        Ok(())
    }

    /// Number of page requests served so far.
    pub fn query_count(&self) -> ForensicsResult<usize> {
        Ok(lock(&self.state, "log store")?.queries)
    }
}

impl Default for InMemoryLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStore for InMemoryLogStore {
    fn query(
        &self,
        log_group: &str,
        start_ms: i64,
        end_ms: i64,
        next_token: Option<&str>,
    ) -> ForensicsResult<LogPage> {
        let mut state = lock(&self.state, "log store")?;
        state.queries += 1;

        if state.failing.contains(log_group) {
            return Err(ForensicsError::upstream(
                "log store",
                format!("query against '{}' failed", log_group),
            ));
        }
        let events = state.groups.get(log_group).ok_or_else(|| {
            ForensicsError::upstream(
                "log store",
                format!("ResourceNotFoundException: log group '{}' does not exist", log_group),
            )
        })?;

        let offset = match next_token {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| {
                ForensicsError::upstream("log store", format!("invalid next token '{}'", token))
            })?,
        };

        let matching: Vec<&LogEvent> = events
            .iter()
            .filter(|e| e.timestamp >= start_ms && e.timestamp <= end_ms)
            .collect();
        let end = (offset + self.page_size).min(matching.len());
        let page: Vec<LogEvent> = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|e| (*e).clone())
            .collect();

        Ok(LogPage {
            events: page,
            next_token: (end < matching.len()).then(|| end.to_string()),
        })
    }
}

// ── Function metadata ─────────────────────────────────────────────────────────

/// In-memory compute-metadata service.
#[derive(Default)]
pub struct InMemoryFunctionMetadata {
    functions: Mutex<BTreeMap<String, (FunctionConfiguration, Value)>>,
}

impl InMemoryFunctionMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a function's configuration and code reference.
    pub fn register(
        &self,
        function_name: impl Into<String>,
        configuration: FunctionConfiguration,
        code: Value,
    ) -> ForensicsResult<()> {
        lock(&self.functions, "function metadata")?
            .insert(function_name.into(), (configuration, code));
        Ok(())
    }

    fn lookup(&self, function_name: &str) -> ForensicsResult<(FunctionConfiguration, Value)> {
        lock(&self.functions, "function metadata")?
            .get(function_name)
            .cloned()
            .ok_or_else(|| {
                ForensicsError::upstream(
                    "function metadata",
                    format!("ResourceNotFoundException: function '{}' not found", function_name),
                )
            })
    }
}

impl FunctionMetadata for InMemoryFunctionMetadata {
    fn get_configuration(&self, function_name: &str) -> ForensicsResult<FunctionConfiguration> {
        Ok(self.lookup(function_name)?.0)
    }

    fn get_code_reference(&self, function_name: &str) -> ForensicsResult<Value> {
        Ok(self.lookup(function_name)?.1)
    }
}

// ── Identity ──────────────────────────────────────────────────────────────────

/// In-memory identity service.
#[derive(Default)]
pub struct InMemoryIdentity {
    roles: Mutex<BTreeMap<String, RoleRecord>>,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, role_name: impl Into<String>, record: RoleRecord) -> ForensicsResult<()> {
        lock(&self.roles, "identity service")?.insert(role_name.into(), record);
        Ok(())
    }
}

impl IdentityService for InMemoryIdentity {
    fn get_role(&self, role_name: &str) -> ForensicsResult<RoleRecord> {
        lock(&self.roles, "identity service")?
            .get(role_name)
            .cloned()
            .ok_or_else(|| {
                ForensicsError::upstream(
                    "identity service",
                    format!("NoSuchEntity: role '{}' cannot be found", role_name),
                )
            })
    }
}
