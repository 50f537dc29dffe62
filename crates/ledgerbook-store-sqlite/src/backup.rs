// crates/ledgerbook-store-sqlite/src/backup.rs
// ============================================================================
// Module: Backup and Restore
// Description: Whole-tenant and whole-application snapshot operations.
// Purpose: Serialize storage state into portable documents and reconstruct
//          storage from them, handling id collisions and partial failures.
// Dependencies: ledgerbook-core, serde_json, csv
// ============================================================================

//! ## Overview
//! A single-tenant backup pairs the tenant's registry entry with every
//! tenant collection; a full backup adds the global namespace and one tenant
//! backup per registry entry. Restores follow the best-effort local-cache
//! failure policy: a tenant that cannot be backed up is skipped with a log
//! line, a collection that cannot be written is skipped with a log line, and
//! only malformed documents (caught upstream in `ledgerbook-core`) abort
//! before any destructive step. Full restore is two-phase: wipe, then
//! repopulate, so a second run with the same document is a no-op.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use ledgerbook_core::Collection;
use ledgerbook_core::FullBackup;
use ledgerbook_core::Profile;
use ledgerbook_core::ProfileId;
use ledgerbook_core::TenantBackup;
use serde_json::Value;
use tracing::error;
use tracing::warn;

use crate::store::LedgerStore;
use crate::store::SqliteLedgerError;
use crate::store::record_key_of;
use crate::store::unix_millis;

// ============================================================================
// SECTION: Tenant Backup
// ============================================================================

impl LedgerStore {
    /// Produces a portable snapshot of one tenant: its profile registry
    /// entry plus every tenant-scoped collection.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError::NotFound`] when the profile registry has
    /// no entry for `tenant`, and storage errors from reading collections.
    pub fn backup_tenant(&self, tenant: &ProfileId) -> Result<TenantBackup, SqliteLedgerError> {
        let profile = self.find_profile(tenant)?;
        let handle = self.tenant_handle(tenant)?;
        let mut profile_data = BTreeMap::new();
        for collection in Collection::TENANT {
            let records = handle.load_collection(collection)?;
            profile_data.insert(collection.name().to_string(), records);
        }
        Ok(TenantBackup {
            profile,
            profile_data,
        })
    }

    /// Restores a single-tenant backup. When a tenant with the same id
    /// already exists, the incoming tenant receives a fresh
    /// `{kind}-{unix_millis}` id instead of silently merging into the
    /// existing one. Unknown collection names in the document are skipped;
    /// per-collection write failures are logged and the restore continues.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] when the profile registry or the
    /// destination store cannot be opened or written.
    pub fn restore_tenant(&self, doc: TenantBackup) -> Result<ProfileId, SqliteLedgerError> {
        let TenantBackup {
            mut profile,
            profile_data,
        } = doc;
        let registry = self.global_handle()?;
        let existing = registry.load_collection(Collection::Profiles)?;
        let collides = existing
            .iter()
            .any(|record| matches!(record_key_of(Collection::Profiles, record), Ok(key) if key == profile.id.as_str()));
        if collides {
            let fresh = ProfileId::new(format!("{}-{}", profile.kind.label(), unix_millis()));
            warn!(
                original = %profile.id,
                remapped = %fresh,
                "restore id collision; minting fresh tenant id"
            );
            profile.id = fresh;
        }
        let profile_value = serde_json::to_value(&profile)
            .map_err(|err| SqliteLedgerError::Invalid(err.to_string()))?;
        registry.upsert(Collection::Profiles, &[profile_value])?;
        let handle = self.tenant_handle(&profile.id)?;
        for (name, records) in &profile_data {
            let collection = match Collection::from_name(name) {
                Ok(collection) if !collection.is_global() => collection,
                Ok(_) | Err(_) => {
                    warn!(collection = %name, "skipping unknown collection in tenant backup");
                    continue;
                }
            };
            if let Err(err) = handle.upsert(collection, records) {
                error!(
                    collection = %collection,
                    error = %err,
                    "collection restore failed; continuing with remaining collections"
                );
            }
        }
        Ok(profile.id)
    }

    /// Looks up one profile in the global registry.
    pub(crate) fn find_profile(&self, tenant: &ProfileId) -> Result<Profile, SqliteLedgerError> {
        let registry = self.global_handle()?;
        for record in registry.load_collection(Collection::Profiles)? {
            if matches!(record_key_of(Collection::Profiles, &record), Ok(key) if key == tenant.as_str())
            {
                return serde_json::from_value(record)
                    .map_err(|err| SqliteLedgerError::Invalid(err.to_string()));
            }
        }
        Err(SqliteLedgerError::NotFound(format!("no profile with id {tenant}")))
    }
}

// ============================================================================
// SECTION: Full Backup
// ============================================================================

impl LedgerStore {
    /// Produces a snapshot of the entire application: every global
    /// collection plus a tenant backup per profile registry entry. A tenant
    /// that fails to back up is logged and skipped rather than aborting the
    /// whole export.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] when the global store cannot be read.
    pub fn backup_all(&self) -> Result<FullBackup, SqliteLedgerError> {
        let registry = self.global_handle()?;
        let mut global = BTreeMap::new();
        for collection in Collection::GLOBAL {
            let records = registry.load_collection(collection)?;
            global.insert(collection.name().to_string(), records);
        }
        let mut profiles = BTreeMap::new();
        for record in registry.load_collection(Collection::Profiles)? {
            let Ok(key) = record_key_of(Collection::Profiles, &record) else {
                warn!("skipping profile entry without an id");
                continue;
            };
            let tenant = ProfileId::from(key.as_str());
            match self.backup_tenant(&tenant) {
                Ok(backup) => {
                    profiles.insert(key, backup);
                }
                Err(err) => {
                    error!(tenant = %tenant, error = %err, "tenant backup failed; skipping tenant");
                }
            }
        }
        Ok(FullBackup { global, profiles })
    }

    /// Restores the entire application from a full backup. Two-phase: every
    /// cached handle is closed and every store (global collections plus all
    /// discoverable tenant files) is wiped first, then global collections
    /// and each tenant's collections are repopulated. Running the same
    /// restore twice yields the same final state.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] when the wipe phase cannot complete or
    /// the global store cannot be reopened. Per-collection repopulation
    /// failures are logged and skipped.
    pub fn restore_all(&self, doc: &FullBackup) -> Result<(), SqliteLedgerError> {
        self.close_all();
        for tenant in self.discover_tenant_stores()? {
            self.delete_tenant_store(&tenant)?;
        }
        let registry = self.global_handle()?;
        /// Stand-in for collections the document does not carry.
        static EMPTY: Vec<Value> = Vec::new();
        for collection in Collection::GLOBAL {
            let records = doc.global.get(collection.name()).unwrap_or(&EMPTY);
            if let Err(err) = registry.replace_all(collection, records) {
                error!(
                    collection = %collection,
                    error = %err,
                    "global collection restore failed; continuing"
                );
            }
        }
        for name in doc.global.keys() {
            if Collection::from_name(name).is_err() {
                warn!(collection = %name, "skipping unknown global collection in backup");
            }
        }
        for (key, tenant_doc) in &doc.profiles {
            let tenant = tenant_doc.profile.id.clone();
            if key != tenant.as_str() {
                warn!(
                    key = %key,
                    embedded = %tenant,
                    "tenant backup key differs from embedded profile id; using embedded id"
                );
            }
            let handle = match self.tenant_handle(&tenant) {
                Ok(handle) => handle,
                Err(err) => {
                    error!(tenant = %tenant, error = %err, "cannot open tenant store; skipping tenant");
                    continue;
                }
            };
            for (name, records) in &tenant_doc.profile_data {
                let collection = match Collection::from_name(name) {
                    Ok(collection) if !collection.is_global() => collection,
                    Ok(_) | Err(_) => {
                        warn!(collection = %name, "skipping unknown collection in tenant backup");
                        continue;
                    }
                };
                if let Err(err) = handle.upsert(collection, records) {
                    error!(
                        tenant = %tenant,
                        collection = %collection,
                        error = %err,
                        "collection restore failed; continuing with remaining collections"
                    );
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Tabular Export
// ============================================================================

impl LedgerStore {
    /// Flattens one tenant's backup into delimited text for spreadsheet
    /// consumption. One section per collection: a title row, a header row of
    /// the union of top-level fields, then one row per record. Nested
    /// objects and arrays are embedded as JSON text inside a single cell.
    /// The rendering is one-way and lossy; it is never used for restore.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] when the backup cannot be produced or
    /// the rendering fails.
    pub fn export_tenant_csv(&self, tenant: &ProfileId) -> Result<String, SqliteLedgerError> {
        let backup = self.backup_tenant(tenant)?;
        let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(Vec::new());
        let profile_value = serde_json::to_value(&backup.profile)
            .map_err(|err| SqliteLedgerError::Invalid(err.to_string()))?;
        write_section(&mut writer, "profile", std::slice::from_ref(&profile_value))?;
        for (name, records) in &backup.profile_data {
            write_section(&mut writer, name, records)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| SqliteLedgerError::Io(err.to_string()))?;
        String::from_utf8(bytes).map_err(|err| SqliteLedgerError::Invalid(err.to_string()))
    }
}

/// Writes one collection section: title, header, rows, separator.
fn write_section(
    writer: &mut csv::Writer<Vec<u8>>,
    name: &str,
    records: &[Value],
) -> Result<(), SqliteLedgerError> {
    writer
        .write_record([name])
        .map_err(|err| SqliteLedgerError::Io(err.to_string()))?;
    let mut columns = BTreeSet::new();
    for record in records {
        if let Some(object) = record.as_object() {
            for key in object.keys() {
                columns.insert(key.clone());
            }
        }
    }
    writer
        .write_record(&columns)
        .map_err(|err| SqliteLedgerError::Io(err.to_string()))?;
    for record in records {
        let Some(object) = record.as_object() else {
            warn!(collection = %name, "skipping non-object record in export");
            continue;
        };
        let mut row = Vec::with_capacity(columns.len());
        for column in &columns {
            row.push(render_cell(object.get(column)));
        }
        writer
            .write_record(&row)
            .map_err(|err| SqliteLedgerError::Io(err.to_string()))?;
    }
    writer
        .write_record([""])
        .map_err(|err| SqliteLedgerError::Io(err.to_string()))?;
    Ok(())
}

/// Renders one cell: scalars as plain text, nested values as JSON text.
fn render_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        Some(Value::Bool(flag)) => flag.to_string(),
        Some(nested @ (Value::Array(_) | Value::Object(_))) => {
            serde_json::to_string(nested).unwrap_or_default()
        }
    }
}
