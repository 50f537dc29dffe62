// crates/ledgerbook-store-sqlite/src/audit.rs
// ============================================================================
// Module: Audit Orchestration
// Description: Runs the reconciliation engine over stored state and applies
//              corrective fixes.
// Purpose: Bridge the read-only engine in ledgerbook-core to physical
//          storage through the same record store operations collaborators
//          use.
// Dependencies: ledgerbook-core, serde_json
// ============================================================================

//! ## Overview
//! `run_reconciliation` snapshots one tenant's collections (via a scoped
//! context override) plus the shared global accounts and hands them to the
//! pure engine; it performs no writes. `apply_fix` is the separate,
//! explicit corrective step: it overwrites the offending derived field with
//! the recomputed value, or deletes the record and reverses the related
//! account debit for deletion findings.

// ============================================================================
// SECTION: Imports
// ============================================================================

use ledgerbook_core::Collection;
use ledgerbook_core::DerivedField;
use ledgerbook_core::Discrepancy;
use ledgerbook_core::LedgerSnapshot;
use ledgerbook_core::ProfileId;
use ledgerbook_core::TenantContext;
use ledgerbook_core::reconcile;
use serde_json::Value;
use tracing::info;

use crate::store::LedgerStore;
use crate::store::SqliteLedgerError;
use crate::store::record_key_of;

// ============================================================================
// SECTION: Reconciliation
// ============================================================================

impl LedgerStore {
    /// Audits one tenant's derived fields against its event history.
    ///
    /// Read-only; an empty result means no drift was found. Collections
    /// that fail to load degrade to empty per the store's failure policy,
    /// which silences rather than fabricates findings.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError`] when the profile registry has no entry
    /// for `tenant`.
    pub fn run_reconciliation(
        &self,
        ctx: &TenantContext,
        tenant: &ProfileId,
    ) -> Result<Vec<Discrepancy>, SqliteLedgerError> {
        self.find_profile(tenant)?;
        let _scope = ctx.scoped(Some(tenant.clone()));
        let snapshot = LedgerSnapshot {
            customers: self.load_typed(ctx),
            suppliers: self.load_typed(ctx),
            inventory: self.load_typed(ctx),
            accounts: self.load_typed(ctx),
            sales: self.load_typed(ctx),
            purchases: self.load_typed(ctx),
            expenses: self.load_typed(ctx),
            salary_transactions: self.load_typed(ctx),
            production_history: self.load_typed(ctx),
            transfers: self.load_typed(ctx),
            stock_adjustments: self.load_typed(ctx),
        };
        let findings = reconcile(&snapshot);
        info!(tenant = %tenant, findings = findings.len(), "reconciliation finished");
        Ok(findings)
    }

    /// Applies one corrective fix produced by [`Self::run_reconciliation`].
    ///
    /// Value findings overwrite the offending field with the recomputed
    /// value. Deletion findings remove the record and, when a related
    /// account is named, add the recorded amount back to that account's
    /// stored balance.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteLedgerError::Invalid`] when the fix targets a
    /// tenant-scoped collection and no tenant is active, and
    /// [`SqliteLedgerError::NotFound`] when the target record is gone.
    pub fn apply_fix(
        &self,
        ctx: &TenantContext,
        fix: &Discrepancy,
    ) -> Result<(), SqliteLedgerError> {
        let Some(handle) = self.route(ctx, fix.collection)? else {
            return Err(SqliteLedgerError::Invalid(format!(
                "cannot fix {} without an active tenant",
                fix.collection
            )));
        };
        if fix.delete_record {
            let removed = handle.delete_key(fix.collection, &fix.entity_id)?;
            if !removed {
                return Err(SqliteLedgerError::NotFound(format!(
                    "record {} already absent from {}",
                    fix.entity_id, fix.collection
                )));
            }
            if let Some(account_id) = &fix.related_account_id {
                self.reverse_account_debit(account_id, fix.stored)?;
            }
            return Ok(());
        }
        let mut records = handle.load_collection(fix.collection)?;
        let target = records.iter_mut().find(
            |record| matches!(record_key_of(fix.collection, record), Ok(key) if key == fix.entity_id),
        );
        let Some(record) = target else {
            return Err(SqliteLedgerError::NotFound(format!(
                "record {} not found in {}",
                fix.entity_id, fix.collection
            )));
        };
        let Some(object) = record.as_object_mut() else {
            return Err(SqliteLedgerError::Invalid(format!(
                "record {} in {} is not an object",
                fix.entity_id, fix.collection
            )));
        };
        let (field, value) = corrected_field(fix);
        object.insert(field.to_string(), value);
        let patched = record.clone();
        handle.upsert(fix.collection, &[patched])
    }

    /// Adds `amount` back to the stored balance of a global account.
    fn reverse_account_debit(
        &self,
        account_id: &str,
        amount: f64,
    ) -> Result<(), SqliteLedgerError> {
        let registry = self.global_handle()?;
        let mut accounts = registry.load_collection(Collection::Accounts)?;
        let target = accounts.iter_mut().find(
            |record| matches!(record_key_of(Collection::Accounts, record), Ok(key) if key == account_id),
        );
        let Some(record) = target else {
            return Err(SqliteLedgerError::NotFound(format!("no account with id {account_id}")));
        };
        let Some(object) = record.as_object_mut() else {
            return Err(SqliteLedgerError::Invalid(format!(
                "account {account_id} is not an object"
            )));
        };
        let balance = object.get("balance").and_then(Value::as_f64).unwrap_or(0.0);
        object.insert("balance".to_string(), Value::from(balance + amount));
        let patched = record.clone();
        registry.upsert(Collection::Accounts, &[patched])
    }
}

/// Returns the wire field name and corrected JSON value for a fix.
#[allow(
    clippy::cast_possible_truncation,
    reason = "Stock corrections originate from i64 arithmetic and round-trip losslessly."
)]
fn corrected_field(fix: &Discrepancy) -> (&'static str, Value) {
    match fix.field {
        DerivedField::Balance => ("balance", Value::from(fix.correct)),
        DerivedField::Stock => ("stock", Value::from(fix.correct.round() as i64)),
    }
}
