// crates/ledgerbook-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Ledger Store
// Description: Physical record stores, routing, and record operations.
// Purpose: Own the per-tenant store arena and expose load/save/replace-all
//          primitives with the degraded best-effort failure policy.
// Dependencies: ledgerbook-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Every store is one SQLite database with a single `records` table keyed by
//! (collection, record key); record bodies are JSON text. The global
//! namespace lives in `ledgerbook-global.db`; tenant namespaces live in
//! `ledgerbook-tenant-<id>.db`, discoverable by file-name prefix so full
//! reset and full restore find every tenant store even when the profile
//! registry itself is gone. Handles open lazily and stay cached until a
//! destructive operation closes them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use ledgerbook_core::Collection;
use ledgerbook_core::LedgerRecord;
use ledgerbook_core::ProfileId;
use ledgerbook_core::TenantContext;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::error;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for ledger stores.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Prefix shared by every store file this application creates.
pub const STORE_FILE_PREFIX: &str = "ledgerbook-";
/// File name of the global-namespace store.
pub const GLOBAL_STORE_FILE: &str = "ledgerbook-global.db";
/// File-name prefix of tenant stores; the tenant id follows the prefix.
pub const TENANT_STORE_PREFIX: &str = "ledgerbook-tenant-";
/// File-name suffix of every store database.
const STORE_FILE_SUFFIX: &str = ".db";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteJournalMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteJournalMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the ledger store family.
///
/// # Invariants
/// - `root_dir` must resolve to a directory; store files are created inside
///   it using the `ledgerbook-` naming scheme.
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerStoreConfig {
    /// Directory holding every store database file.
    pub root_dir: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteJournalMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Ledger store errors.
///
/// # Invariants
/// - Error messages avoid embedding full record bodies.
#[derive(Debug, Error, Clone)]
pub enum SqliteLedgerError {
    /// Store I/O error.
    #[error("ledger store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("ledger store db error: {0}")]
    Db(String),
    /// Invalid store data or request.
    #[error("ledger store invalid data: {0}")]
    Invalid(String),
    /// Store schema version mismatch.
    #[error("ledger store version mismatch: {0}")]
    VersionMismatch(String),
    /// A record or entity was not found where one was required.
    #[error("ledger store missing record: {0}")]
    NotFound(String),
}

// ============================================================================
// SECTION: Store Handle
// ============================================================================

/// One open store database (global or tenant).
///
/// # Invariants
/// - Connection access is serialized through a mutex; the caller model is a
///   single logical actor, so there is no writer contention to manage.
pub(crate) struct StoreHandle {
    /// The owned connection.
    connection: Mutex<Connection>,
}

impl StoreHandle {
    /// Opens (creating if necessary) the database at `path`.
    fn open(path: &Path, config: &LedgerStoreConfig) -> Result<Self, SqliteLedgerError> {
        ensure_parent_dir(path)?;
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
        let mut connection = Connection::open_with_flags(path, flags)
            .map_err(|err| SqliteLedgerError::Io(err.to_string()))?;
        apply_pragmas(&connection, config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Locks the connection, recovering from poisoning.
    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Loads every record in `collection`, ordered by record key.
    pub(crate) fn load_collection(
        &self,
        collection: Collection,
    ) -> Result<Vec<Value>, SqliteLedgerError> {
        let connection = self.lock();
        let mut stmt = connection
            .prepare("SELECT body FROM records WHERE collection = ?1 ORDER BY record_key")
            .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
        let rows = stmt
            .query_map(params![collection.name()], |row| row.get::<_, String>(0))
            .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
        let mut records = Vec::new();
        for body in rows {
            let body = body.map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
            let value = serde_json::from_str(&body)
                .map_err(|err| SqliteLedgerError::Invalid(format!("corrupt record body: {err}")))?;
            records.push(value);
        }
        Ok(records)
    }

    /// Upserts `records` by primary key. Records absent from the slice are
    /// left untouched.
    pub(crate) fn upsert(
        &self,
        collection: Collection,
        records: &[Value],
    ) -> Result<(), SqliteLedgerError> {
        let mut connection = self.lock();
        let tx = connection
            .transaction()
            .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
        for record in records {
            let key = record_key_of(collection, record)?;
            let body = serde_json::to_string(record)
                .map_err(|err| SqliteLedgerError::Invalid(err.to_string()))?;
            tx.execute(
                "INSERT OR REPLACE INTO records (collection, record_key, body) VALUES (?1, ?2, ?3)",
                params![collection.name(), key, body],
            )
            .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
        }
        tx.commit().map_err(|err| SqliteLedgerError::Db(err.to_string()))
    }

    /// Clears `collection` and inserts `records` as one transaction. A crash
    /// mid-operation leaves the collection fully pre-call or fully post-call.
    pub(crate) fn replace_all(
        &self,
        collection: Collection,
        records: &[Value],
    ) -> Result<(), SqliteLedgerError> {
        let mut connection = self.lock();
        let tx = connection
            .transaction()
            .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
        tx.execute("DELETE FROM records WHERE collection = ?1", params![collection.name()])
            .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
        for record in records {
            let key = record_key_of(collection, record)?;
            let body = serde_json::to_string(record)
                .map_err(|err| SqliteLedgerError::Invalid(err.to_string()))?;
            tx.execute(
                "INSERT INTO records (collection, record_key, body) VALUES (?1, ?2, ?3)",
                params![collection.name(), key, body],
            )
            .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
        }
        tx.commit().map_err(|err| SqliteLedgerError::Db(err.to_string()))
    }

    /// Deletes one record by key; returns `true` when a row was removed.
    pub(crate) fn delete_key(
        &self,
        collection: Collection,
        key: &str,
    ) -> Result<bool, SqliteLedgerError> {
        let connection = self.lock();
        let removed = connection
            .execute(
                "DELETE FROM records WHERE collection = ?1 AND record_key = ?2",
                params![collection.name(), key],
            )
            .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
        Ok(removed > 0)
    }
}

// ============================================================================
// SECTION: Connection Setup
// ============================================================================

/// Creates the parent directory of `path` when missing.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteLedgerError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|err| SqliteLedgerError::Io(err.to_string()))?;
    }
    Ok(())
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &LedgerStoreConfig,
) -> Result<(), SqliteLedgerError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
    Ok(())
}

/// Creates the schema and verifies the stored schema version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteLedgerError> {
    let tx = connection
        .transaction()
        .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", [], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
        }
        Some(found) if found != SCHEMA_VERSION => {
            return Err(SqliteLedgerError::VersionMismatch(format!(
                "expected schema version {SCHEMA_VERSION}, found {found}"
            )));
        }
        Some(_) => {}
    }
    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS records (
             collection TEXT NOT NULL,
             record_key TEXT NOT NULL,
             body       TEXT NOT NULL,
             PRIMARY KEY (collection, record_key)
         );",
    )
    .map_err(|err| SqliteLedgerError::Db(err.to_string()))?;
    tx.commit().map_err(|err| SqliteLedgerError::Db(err.to_string()))
}

/// Extracts the primary-key value of `record` for `collection`.
///
/// Accepts string and numeric keys; numeric keys serialize to their decimal
/// text form.
pub(crate) fn record_key_of(
    collection: Collection,
    record: &Value,
) -> Result<String, SqliteLedgerError> {
    let field = collection.primary_key();
    match record.get(field) {
        Some(Value::String(key)) if !key.is_empty() => Ok(key.clone()),
        Some(Value::Number(key)) => Ok(key.to_string()),
        Some(_) | None => Err(SqliteLedgerError::Invalid(format!(
            "record in {collection} is missing primary key field {field}"
        ))),
    }
}

// ============================================================================
// SECTION: Ledger Store
// ============================================================================

/// Tenant-partitioned record store family.
///
/// # Invariants
/// - The global handle and each tenant handle open lazily and stay cached
///   until explicitly closed.
/// - Destructive operations close cached handles before touching files, so
///   no stale handle keeps a database locked.
pub struct LedgerStore {
    /// Store configuration.
    config: LedgerStoreConfig,
    /// Cached global-namespace handle.
    global: Mutex<Option<Arc<StoreHandle>>>,
    /// Arena of cached tenant handles, keyed by profile id.
    tenants: Mutex<HashMap<ProfileId, Arc<StoreHandle>>>,
}

impl LedgerStore {
    /// Opens a ledger store family rooted at `config.root_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] when the root directory cannot be
    /// created.
    pub fn new(config: LedgerStoreConfig) -> Result<Self, SqliteLedgerError> {
        fs::create_dir_all(&config.root_dir).map_err(|err| SqliteLedgerError::Io(err.to_string()))?;
        Ok(Self {
            config,
            global: Mutex::new(None),
            tenants: Mutex::new(HashMap::new()),
        })
    }

    /// Returns the configured root directory.
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.config.root_dir
    }

    /// Returns the global store file path.
    pub(crate) fn global_path(&self) -> PathBuf {
        self.config.root_dir.join(GLOBAL_STORE_FILE)
    }

    /// Returns the store file path for `tenant`.
    pub(crate) fn tenant_path(&self, tenant: &ProfileId) -> PathBuf {
        self.config
            .root_dir
            .join(format!("{TENANT_STORE_PREFIX}{}{STORE_FILE_SUFFIX}", tenant.as_str()))
    }

    /// Opens or returns the cached global handle.
    pub(crate) fn global_handle(&self) -> Result<Arc<StoreHandle>, SqliteLedgerError> {
        let mut slot = self.global.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.as_ref() {
            return Ok(Arc::clone(handle));
        }
        let handle = Arc::new(StoreHandle::open(&self.global_path(), &self.config)?);
        *slot = Some(Arc::clone(&handle));
        Ok(handle)
    }

    /// Opens or returns the cached handle for `tenant`.
    pub(crate) fn tenant_handle(
        &self,
        tenant: &ProfileId,
    ) -> Result<Arc<StoreHandle>, SqliteLedgerError> {
        validate_profile_id(tenant)?;
        let mut arena = self.tenants.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = arena.get(tenant) {
            return Ok(Arc::clone(handle));
        }
        let handle = Arc::new(StoreHandle::open(&self.tenant_path(tenant), &self.config)?);
        arena.insert(tenant.clone(), Arc::clone(&handle));
        Ok(handle)
    }

    /// Releases the cached handle for `tenant` so the next access reopens.
    pub fn close_tenant(&self, tenant: &ProfileId) {
        let mut arena = self.tenants.lock().unwrap_or_else(PoisonError::into_inner);
        arena.remove(tenant);
    }

    /// Releases every cached handle (global and tenant). Required before
    /// deleting or wiping underlying files.
    pub fn close_all(&self) {
        let mut slot = self.global.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = None;
        drop(slot);
        let mut arena = self.tenants.lock().unwrap_or_else(PoisonError::into_inner);
        arena.clear();
    }

    /// Routes `collection` to its owning handle. Returns `Ok(None)` when the
    /// collection is tenant-scoped and no tenant is active.
    pub(crate) fn route(
        &self,
        ctx: &TenantContext,
        collection: Collection,
    ) -> Result<Option<Arc<StoreHandle>>, SqliteLedgerError> {
        if collection.is_global() {
            return self.global_handle().map(Some);
        }
        match ctx.current() {
            Some(tenant) => self.tenant_handle(&tenant).map(Some),
            None => Ok(None),
        }
    }

    /// Lists the tenant ids of every store file on disk, including tenants
    /// no longer present in the profile registry.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError::Io`] when the root directory cannot be
    /// read.
    pub fn discover_tenant_stores(&self) -> Result<Vec<ProfileId>, SqliteLedgerError> {
        let mut tenants = Vec::new();
        let entries = fs::read_dir(&self.config.root_dir)
            .map_err(|err| SqliteLedgerError::Io(err.to_string()))?;
        for entry in entries {
            let entry = entry.map_err(|err| SqliteLedgerError::Io(err.to_string()))?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(stem) = name.strip_prefix(TENANT_STORE_PREFIX)
                && let Some(id) = stem.strip_suffix(STORE_FILE_SUFFIX)
                && !id.is_empty()
            {
                tenants.push(ProfileId::from(id));
            }
        }
        tenants.sort();
        Ok(tenants)
    }

    // ------------------------------------------------------------------
    // Record store operations (degraded facade)
    // ------------------------------------------------------------------

    /// Loads every record in `collection`.
    ///
    /// Returns an empty sequence when the collection is tenant-scoped and no
    /// tenant is active, and on storage failures; both cases are logged, not
    /// propagated.
    #[must_use]
    pub fn load(&self, ctx: &TenantContext, collection: Collection) -> Vec<Value> {
        match self.try_load(ctx, collection) {
            Ok(Some(records)) => records,
            Ok(None) => {
                warn!(collection = %collection, "no active tenant; returning empty result");
                Vec::new()
            }
            Err(err) => {
                error!(collection = %collection, error = %err, "load failed; returning empty result");
                Vec::new()
            }
        }
    }

    /// Upserts `records` into `collection` by primary key.
    ///
    /// No-op (logged) when the collection is tenant-scoped and no tenant is
    /// active, or on storage failure.
    pub fn save(&self, ctx: &TenantContext, collection: Collection, records: &[Value]) {
        match self.route(ctx, collection) {
            Ok(Some(handle)) => {
                if let Err(err) = handle.upsert(collection, records) {
                    error!(collection = %collection, error = %err, "save failed; records not persisted");
                }
            }
            Ok(None) => {
                warn!(collection = %collection, "no active tenant; save skipped");
            }
            Err(err) => {
                error!(collection = %collection, error = %err, "save failed; store unavailable");
            }
        }
    }

    /// Clears `collection` then inserts `records`, atomically.
    ///
    /// No-op (logged) when the collection is tenant-scoped and no tenant is
    /// active, or on storage failure.
    pub fn replace_all(&self, ctx: &TenantContext, collection: Collection, records: &[Value]) {
        match self.route(ctx, collection) {
            Ok(Some(handle)) => {
                if let Err(err) = handle.replace_all(collection, records) {
                    error!(collection = %collection, error = %err, "replace-all failed; collection unchanged");
                }
            }
            Ok(None) => {
                warn!(collection = %collection, "no active tenant; replace-all skipped");
            }
            Err(err) => {
                error!(collection = %collection, error = %err, "replace-all failed; store unavailable");
            }
        }
    }

    /// Loads and decodes every record of a typed collection. Records that
    /// fail to decode are logged and skipped.
    #[must_use]
    pub fn load_typed<R: LedgerRecord>(&self, ctx: &TenantContext) -> Vec<R> {
        let mut records = Vec::new();
        for value in self.load(ctx, R::COLLECTION) {
            match serde_json::from_value(value) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(collection = %R::COLLECTION, error = %err, "skipping undecodable record");
                }
            }
        }
        records
    }

    /// Encodes and upserts typed records.
    pub fn save_typed<R: LedgerRecord>(&self, ctx: &TenantContext, records: &[R]) {
        let mut values = Vec::with_capacity(records.len());
        for record in records {
            match serde_json::to_value(record) {
                Ok(value) => values.push(value),
                Err(err) => {
                    error!(collection = %R::COLLECTION, error = %err, "skipping unencodable record");
                }
            }
        }
        self.save(ctx, R::COLLECTION, &values);
    }

    /// Fallible load used by bulk operations. `Ok(None)` means the
    /// collection is tenant-scoped and no tenant is active.
    pub(crate) fn try_load(
        &self,
        ctx: &TenantContext,
        collection: Collection,
    ) -> Result<Option<Vec<Value>>, SqliteLedgerError> {
        match self.route(ctx, collection)? {
            Some(handle) => handle.load_collection(collection).map(Some),
            None => Ok(None),
        }
    }

    // ------------------------------------------------------------------
    // Destructive operations
    // ------------------------------------------------------------------

    /// Closes and deletes one tenant's store file, including WAL sidecars.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError::Io`] when a file cannot be removed.
    pub fn delete_tenant_store(&self, tenant: &ProfileId) -> Result<(), SqliteLedgerError> {
        validate_profile_id(tenant)?;
        self.close_tenant(tenant);
        remove_store_files(&self.tenant_path(tenant))
    }

    /// Wipes every store, global and per-tenant, including orphaned tenant
    /// files no longer referenced by the profile registry. Irreversible;
    /// caller-side confirmation is expected before invoking this.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError::Io`] when the root directory cannot be
    /// read or a store file cannot be removed.
    pub fn hard_reset(&self) -> Result<(), SqliteLedgerError> {
        self.close_all();
        for tenant in self.discover_tenant_stores()? {
            remove_store_files(&self.tenant_path(&tenant))?;
        }
        remove_store_files(&self.global_path())
    }
}

/// Rejects profile ids that cannot form a safe store file name.
fn validate_profile_id(tenant: &ProfileId) -> Result<(), SqliteLedgerError> {
    let id = tenant.as_str();
    if id.is_empty() {
        return Err(SqliteLedgerError::Invalid("profile id is empty".to_string()));
    }
    if id.contains(['/', '\\', '\0']) || id.contains("..") {
        return Err(SqliteLedgerError::Invalid(format!(
            "profile id contains path separators: {id}"
        )));
    }
    Ok(())
}

/// Removes a store database plus its `-wal`/`-shm` sidecar files.
fn remove_store_files(path: &Path) -> Result<(), SqliteLedgerError> {
    remove_if_present(path)?;
    let mut wal = path.as_os_str().to_owned();
    wal.push("-wal");
    remove_if_present(Path::new(&wal))?;
    let mut shm = path.as_os_str().to_owned();
    shm.push("-shm");
    remove_if_present(Path::new(&shm))
}

/// Removes `path` when it exists.
fn remove_if_present(path: &Path) -> Result<(), SqliteLedgerError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(SqliteLedgerError::Io(err.to_string())),
    }
}

// ============================================================================
// SECTION: Time
// ============================================================================

/// Returns the current wall-clock time in unix milliseconds.
pub(crate) fn unix_millis() -> i64 {
    let nanos = time::OffsetDateTime::now_utc().unix_timestamp_nanos();
    i64::try_from(nanos / 1_000_000).unwrap_or(i64::MAX)
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test-only assertions and helpers are permitted."
)]
mod tests {
    use ledgerbook_core::Collection;
    use serde_json::json;

    use super::record_key_of;
    use super::validate_profile_id;

    #[test]
    fn record_key_extraction_honours_collection_schema() {
        let sale = json!({ "invoiceNumber": "INV-1", "grandTotal": 5.0 });
        assert_eq!(record_key_of(Collection::Sales, &sale).expect("key"), "INV-1");
        let customer = json!({ "id": 42 });
        assert_eq!(record_key_of(Collection::Customers, &customer).expect("key"), "42");
        let missing = json!({ "name": "no key" });
        assert!(record_key_of(Collection::Customers, &missing).is_err());
    }

    #[test]
    fn profile_ids_with_separators_are_rejected() {
        assert!(validate_profile_id(&"shop-1".into()).is_ok());
        assert!(validate_profile_id(&"".into()).is_err());
        assert!(validate_profile_id(&"../escape".into()).is_err());
        assert!(validate_profile_id(&"a/b".into()).is_err());
    }
}
