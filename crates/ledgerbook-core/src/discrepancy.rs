// crates/ledgerbook-core/src/discrepancy.rs
// ============================================================================
// Module: Discrepancy Model
// Description: A single reconciliation finding with correction context.
// Purpose: Carry enough detail for a human report or a corrective write.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A discrepancy describes one mismatch between a stored derived value and
//! the value recomputed from event history, or one record flagged for
//! deletion. It names the entity, the offending field, both values, and the
//! owning collection so a corrective writer can apply the fix without
//! re-running the audit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::collections::Collection;

// ============================================================================
// SECTION: Finding Types
// ============================================================================

/// Kind of entity a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A customer master record.
    Customer,
    /// A supplier master record.
    Supplier,
    /// An inventory item master record.
    InventoryItem,
    /// A shared financial account.
    Account,
    /// An expense event record.
    Expense,
}

/// Derived field a finding refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedField {
    /// `customer.balance` or `supplier.balance` or `account.balance`.
    Balance,
    /// `inventory.stock`.
    Stock,
}

/// One reconciliation finding.
///
/// # Invariants
/// - At most one finding exists per (entity, field) per audit run.
/// - The engine that produces findings never mutates stored data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discrepancy {
    /// Entity kind.
    pub entity: EntityKind,
    /// Entity primary-key value.
    pub entity_id: String,
    /// Entity display name (empty when the record carries none).
    pub entity_name: String,
    /// Offending derived field.
    pub field: DerivedField,
    /// Value currently stored.
    pub stored: f64,
    /// Value recomputed from event history.
    pub correct: f64,
    /// Collection owning the offending record.
    pub collection: Collection,
    /// Human-readable explanation.
    pub detail: String,
    /// When set, the record itself should be deleted rather than patched.
    #[serde(default)]
    pub delete_record: bool,
    /// Account whose debit should be reversed alongside a deletion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_account_id: Option<String>,
}
