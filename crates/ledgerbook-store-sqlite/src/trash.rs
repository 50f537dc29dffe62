// crates/ledgerbook-store-sqlite/src/trash.rs
// ============================================================================
// Module: Trash Lifecycle
// Description: Soft deletion into the global trash and restoration from it.
// Purpose: Keep deleted registry entries recoverable until an explicit
//          purge, which is the only permanent-delete path besides hard
//          reset.
// Dependencies: ledgerbook-core, serde_json
// ============================================================================

//! ## Overview
//! Soft-deleting a profile moves its registry record into the global `trash`
//! collection with an `originalKey` pointer back to `profiles`; the tenant's
//! store file stays on disk so restoration is lossless. Restoring re-inserts
//! the payload into its original collection and drops the trash entry.
//! Emptying the trash purges entries permanently and deletes the store files
//! of trashed profiles.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ledgerbook_core::Collection;
use ledgerbook_core::ProfileId;
use ledgerbook_core::TenantContext;
use ledgerbook_core::TrashEntry;
use serde_json::Map;
use tracing::warn;

use crate::store::LedgerStore;
use crate::store::SqliteLedgerError;
use crate::store::record_key_of;
use crate::store::unix_millis;

// ============================================================================
// SECTION: Trash Operations
// ============================================================================

impl LedgerStore {
    /// Soft-deletes a profile: removes it from the registry and parks it in
    /// the trash with a pointer back to `profiles`. The tenant's store file
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError::NotFound`] when no such profile exists.
    pub fn trash_profile(&self, tenant: &ProfileId) -> Result<(), SqliteLedgerError> {
        let registry = self.global_handle()?;
        let profiles = registry.load_collection(Collection::Profiles)?;
        let payload = profiles
            .into_iter()
            .find(|record| {
                matches!(record_key_of(Collection::Profiles, record), Ok(key) if key == tenant.as_str())
            })
            .ok_or_else(|| {
                SqliteLedgerError::NotFound(format!("no profile with id {tenant}"))
            })?;
        let entry = TrashEntry {
            id: tenant.as_str().to_string(),
            original_key: Collection::Profiles.name().to_string(),
            payload,
            deleted_at: Some(unix_millis()),
            extra: Map::new(),
        };
        let entry_value = serde_json::to_value(&entry)
            .map_err(|err| SqliteLedgerError::Invalid(err.to_string()))?;
        registry.upsert(Collection::Trash, &[entry_value])?;
        registry.delete_key(Collection::Profiles, tenant.as_str())?;
        Ok(())
    }

    /// Restores one trash entry into its original collection and removes it
    /// from the trash.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError::NotFound`] when the entry is gone,
    /// [`SqliteLedgerError::Invalid`] when its original collection is
    /// unknown or tenant-scoped with no active tenant.
    pub fn restore_trash_entry(
        &self,
        ctx: &TenantContext,
        entry_id: &str,
    ) -> Result<(), SqliteLedgerError> {
        let registry = self.global_handle()?;
        let entries = registry.load_collection(Collection::Trash)?;
        let entry = entries
            .into_iter()
            .find(|record| {
                matches!(record_key_of(Collection::Trash, record), Ok(key) if key == entry_id)
            })
            .ok_or_else(|| {
                SqliteLedgerError::NotFound(format!("no trash entry with id {entry_id}"))
            })?;
        let entry: TrashEntry = serde_json::from_value(entry)
            .map_err(|err| SqliteLedgerError::Invalid(err.to_string()))?;
        let collection = Collection::from_name(&entry.original_key)
            .map_err(|err| SqliteLedgerError::Invalid(err.to_string()))?;
        let Some(handle) = self.route(ctx, collection)? else {
            return Err(SqliteLedgerError::Invalid(format!(
                "cannot restore into {collection} without an active tenant"
            )));
        };
        handle.upsert(collection, std::slice::from_ref(&entry.payload))?;
        registry.delete_key(Collection::Trash, entry_id)?;
        Ok(())
    }

    /// Permanently purges every trash entry. Trashed profiles also lose
    /// their tenant store files. Returns the number of purged entries.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] when the trash cannot be read or a
    /// store file cannot be removed.
    pub fn empty_trash(&self) -> Result<usize, SqliteLedgerError> {
        let registry = self.global_handle()?;
        let entries = registry.load_collection(Collection::Trash)?;
        let purged = entries.len();
        for record in &entries {
            let Ok(entry) = serde_json::from_value::<TrashEntry>(record.clone()) else {
                warn!("purging undecodable trash entry");
                continue;
            };
            if entry.original_key == Collection::Profiles.name() {
                if let Ok(tenant_key) = record_key_of(Collection::Profiles, &entry.payload) {
                    self.delete_tenant_store(&ProfileId::from(tenant_key.as_str()))?;
                }
            }
        }
        registry.replace_all(Collection::Trash, &[])?;
        Ok(purged)
    }
}
