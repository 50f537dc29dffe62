// crates/ledgerbook-core/src/backup.rs
// ============================================================================
// Module: Backup Documents
// Description: Portable snapshot documents for one tenant or the whole app.
// Purpose: Define the backup wire format and validate documents before any
//          destructive restore work begins.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Two portable documents exist: a single-tenant backup
//! (`{ profile, profileData }`) and a full-application backup
//! (`{ global, profiles }`). Collection arrays are kept as raw JSON values
//! so a backup can carry fields and collections this build of the core does
//! not know; validation only checks the document skeleton. Malformed
//! documents are rejected here, before a restore touches storage.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::records::Profile;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Backup document validation errors.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The document is not the expected shape.
    #[error("malformed backup document: {0}")]
    Malformed(String),
}

// ============================================================================
// SECTION: Documents
// ============================================================================

/// Snapshot of one tenant: its registry entry plus every tenant collection.
///
/// # Invariants
/// - `profile_data` keys are collection wire names; unknown keys are
///   carried verbatim and skipped at restore time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantBackup {
    /// The tenant's profile registry entry.
    pub profile: Profile,
    /// Collection wire name -> records.
    pub profile_data: BTreeMap<String, Vec<Value>>,
}

impl TenantBackup {
    /// Parses and validates a single-tenant backup document.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Malformed`] when `profile` or `profileData`
    /// is missing or the wrong shape.
    pub fn from_json(document: Value) -> Result<Self, BackupError> {
        require_object_field(&document, "profile")?;
        require_object_field(&document, "profileData")?;
        serde_json::from_value(document).map_err(|err| BackupError::Malformed(err.to_string()))
    }
}

/// Snapshot of the entire application: global collections plus a tenant
/// backup per profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullBackup {
    /// Collection wire name -> records for the global namespace.
    pub global: BTreeMap<String, Vec<Value>>,
    /// Tenant id -> tenant backup.
    pub profiles: BTreeMap<String, TenantBackup>,
}

impl FullBackup {
    /// Parses and validates a full-application backup document.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Malformed`] when `global` or `profiles` is
    /// missing or the wrong shape.
    pub fn from_json(document: Value) -> Result<Self, BackupError> {
        require_object_field(&document, "global")?;
        require_object_field(&document, "profiles")?;
        serde_json::from_value(document).map_err(|err| BackupError::Malformed(err.to_string()))
    }
}

/// Checks that `document` is an object carrying an object-or-present `field`.
fn require_object_field(document: &Value, field: &str) -> Result<(), BackupError> {
    let Some(object) = document.as_object() else {
        return Err(BackupError::Malformed("document is not a JSON object".to_string()));
    };
    if !object.contains_key(field) {
        return Err(BackupError::Malformed(format!("missing required field: {field}")));
    }
    Ok(())
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
    use serde_json::json;

    use super::FullBackup;
    use super::TenantBackup;

    #[test]
    fn tenant_backup_requires_profile_data() {
        let document = json!({
            "profile": { "id": "shop-1", "name": "Corner Shop", "kind": "business" }
        });
        let err = TenantBackup::from_json(document).expect_err("must reject");
        assert!(err.to_string().contains("profileData"));
    }

    #[test]
    fn tenant_backup_accepts_unknown_collections() {
        let document = json!({
            "profile": { "id": "shop-1", "name": "Corner Shop", "kind": "business" },
            "profileData": {
                "sales": [ { "invoiceNumber": "INV-1" } ],
                "loyalty-points": [ { "id": "lp-1" } ]
            }
        });
        let backup = TenantBackup::from_json(document).expect("valid document");
        assert_eq!(backup.profile_data.len(), 2);
        assert!(backup.profile_data.contains_key("loyalty-points"));
    }

    #[test]
    fn full_backup_requires_global_and_profiles() {
        let err = FullBackup::from_json(json!({ "profiles": {} })).expect_err("must reject");
        assert!(err.to_string().contains("global"));
        let err = FullBackup::from_json(json!({ "global": {} })).expect_err("must reject");
        assert!(err.to_string().contains("profiles"));
    }

    #[test]
    fn documents_round_trip() {
        let document = json!({
            "global": {
                "profiles": [ { "id": "shop-1", "name": "Corner Shop", "kind": "business" } ],
                "accounts": [ { "id": "cash", "name": "Cash", "balance": 10.0 } ]
            },
            "profiles": {
                "shop-1": {
                    "profile": { "id": "shop-1", "name": "Corner Shop", "kind": "business" },
                    "profileData": { "sales": [] }
                }
            }
        });
        let backup = FullBackup::from_json(document.clone()).expect("valid document");
        let encoded = serde_json::to_value(&backup).expect("encode");
        let decoded = FullBackup::from_json(encoded).expect("re-decode");
        assert_eq!(decoded, backup);
    }
}
