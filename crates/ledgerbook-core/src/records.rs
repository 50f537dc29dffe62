// crates/ledgerbook-core/src/records.rs
// ============================================================================
// Module: Ledger Records
// Description: Typed records for every ledger collection.
// Purpose: Give each collection a concrete shape with the fields the core
//          interprets, plus an open extension area for everything else.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Each collection stores one record type. The core only interprets the
//! fields that drive routing (primary keys) and reconciliation (balances,
//! stock, transaction amounts); all other business attributes flow through
//! the flattened `extra` map untouched, so round-tripping a record through
//! storage or a backup document preserves fields this crate knows nothing
//! about. Wire format is camelCase to match the portable backup documents.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::collections::Collection;
use crate::context::ProfileId;

// ============================================================================
// SECTION: Record Trait
// ============================================================================

/// A typed record bound to its owning collection.
pub trait LedgerRecord: Serialize + DeserializeOwned {
    /// The collection this record type lives in.
    const COLLECTION: Collection;

    /// Returns the value of the record's primary-key field.
    fn record_key(&self) -> &str;
}

// ============================================================================
// SECTION: Profiles
// ============================================================================

/// Kind of a profile partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// A business ledger partition.
    Business,
    /// A household ledger partition.
    Home,
}

impl ProfileKind {
    /// Returns the lowercase wire label (also used when minting fresh ids).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Home => "home",
        }
    }
}

/// Optional business metadata carried by business profiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessDetails {
    /// Business type label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_type: Option<String>,
    /// Logo reference (path or data URI; opaque to the core).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Display currency code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Founding date, ISO-8601 text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub founded_on: Option<String>,
}

/// A tenant profile entry in the global registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Tenant identifier.
    pub id: ProfileId,
    /// Display name.
    pub name: String,
    /// Partition kind.
    pub kind: ProfileKind,
    /// Optional full-access password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Optional view-only password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_password: Option<String>,
    /// Optional business metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business: Option<BusinessDetails>,
    /// Uninterpreted business attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for Profile {
    const COLLECTION: Collection = Collection::Profiles;

    fn record_key(&self) -> &str {
        self.id.as_str()
    }
}

// ============================================================================
// SECTION: Global Records
// ============================================================================

/// A shared financial account (cash, bank, wallet).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Account identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Balance at account creation.
    #[serde(default)]
    pub opening_balance: f64,
    /// Cached running balance; recomputable from transaction history.
    #[serde(default)]
    pub balance: f64,
    /// Uninterpreted business attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for Account {
    const COLLECTION: Collection = Collection::Accounts;

    fn record_key(&self) -> &str {
        &self.id
    }
}

/// A soft-deleted record parked in the trash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashEntry {
    /// Trash entry identifier.
    pub id: String,
    /// Wire name of the collection the payload came from.
    pub original_key: String,
    /// The deleted record, verbatim.
    pub payload: Value,
    /// Deletion time in unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<i64>,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for TrashEntry {
    const COLLECTION: Collection = Collection::Trash;

    fn record_key(&self) -> &str {
        &self.id
    }
}

/// A simple named lookup entry (categories, types, roles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedEntry {
    /// Entry identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A reminder entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Reminder identifier.
    pub id: String,
    /// Reminder text.
    #[serde(default)]
    pub note: String,
    /// Due date, ISO-8601 text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_on: Option<String>,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for Reminder {
    const COLLECTION: Collection = Collection::Reminders;

    fn record_key(&self) -> &str {
        &self.id
    }
}

// ============================================================================
// SECTION: Tenant Masters
// ============================================================================

/// A customer master record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Customer identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Balance at customer creation.
    #[serde(default)]
    pub opening_balance: f64,
    /// Cached receivable balance; recomputable from sales.
    #[serde(default)]
    pub balance: f64,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for Customer {
    const COLLECTION: Collection = Collection::Customers;

    fn record_key(&self) -> &str {
        &self.id
    }
}

/// A supplier master record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    /// Supplier identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Balance at supplier creation.
    #[serde(default)]
    pub opening_balance: f64,
    /// Cached payable balance; recomputable from purchases.
    #[serde(default)]
    pub balance: f64,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for Supplier {
    const COLLECTION: Collection = Collection::Suppliers;

    fn record_key(&self) -> &str {
        &self.id
    }
}

/// An inventory item master record. Stock is counted in whole units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    /// Item identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Stock level at item creation.
    #[serde(default)]
    pub opening_stock: i64,
    /// Cached stock level; recomputable from movement history.
    #[serde(default)]
    pub stock: i64,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for InventoryItem {
    const COLLECTION: Collection = Collection::Inventory;

    fn record_key(&self) -> &str {
        &self.id
    }
}

/// A worker master record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    /// Worker identifier.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Role label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for Worker {
    const COLLECTION: Collection = Collection::Workers;

    fn record_key(&self) -> &str {
        &self.id
    }
}

// ============================================================================
// SECTION: Tenant Events
// ============================================================================

/// A line item on a sale or purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Inventory item identifier.
    pub item_id: String,
    /// Quantity in whole units.
    #[serde(default)]
    pub quantity: i64,
    /// Uninterpreted attributes (unit price, discounts, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A sale event, keyed by invoice number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Invoice number; primary key.
    pub invoice_number: String,
    /// Customer this sale is booked against, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    /// Invoice total.
    #[serde(default)]
    pub grand_total: f64,
    /// Amount received at or after sale time.
    #[serde(default)]
    pub amount_received: f64,
    /// Account credited with the received amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Items sold.
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for Sale {
    const COLLECTION: Collection = Collection::Sales;

    fn record_key(&self) -> &str {
        &self.invoice_number
    }
}

/// A purchase event, keyed by bill number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    /// Bill number; primary key.
    pub bill_number: String,
    /// Supplier this purchase is booked against, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    /// Bill total.
    #[serde(default)]
    pub grand_total: f64,
    /// Amount paid at or after purchase time.
    #[serde(default)]
    pub amount_paid: f64,
    /// Account debited with the paid amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Items purchased.
    #[serde(default)]
    pub items: Vec<LineItem>,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for Purchase {
    const COLLECTION: Collection = Collection::Purchases;

    fn record_key(&self) -> &str {
        &self.bill_number
    }
}

/// An expense event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Expense identifier.
    pub id: String,
    /// Expense amount.
    #[serde(default)]
    pub amount: f64,
    /// Account the amount was debited from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Free-text note.
    #[serde(default)]
    pub note: String,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for Expense {
    const COLLECTION: Collection = Collection::Expenses;

    fn record_key(&self) -> &str {
        &self.id
    }
}

/// A salary payment transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryTransaction {
    /// Transaction identifier.
    pub id: String,
    /// Worker paid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    /// Amount paid.
    #[serde(default)]
    pub amount: f64,
    /// Account the amount was debited from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for SalaryTransaction {
    const COLLECTION: Collection = Collection::SalaryTransactions;

    fn record_key(&self) -> &str {
        &self.id
    }
}

/// One item line inside a production batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionLine {
    /// Inventory item identifier.
    pub item_id: String,
    /// Quantity in whole units.
    #[serde(default)]
    pub quantity: i64,
}

/// A production batch, keyed by batch code. Finished goods enter stock;
/// raw materials leave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionBatch {
    /// Batch code; primary key.
    pub batch_code: String,
    /// Items produced by this batch.
    #[serde(default)]
    pub finished_goods: Vec<ProductionLine>,
    /// Items consumed by this batch.
    #[serde(default)]
    pub raw_materials: Vec<ProductionLine>,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for ProductionBatch {
    const COLLECTION: Collection = Collection::ProductionHistory;

    fn record_key(&self) -> &str {
        &self.batch_code
    }
}

/// An account-to-account transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    /// Transfer identifier.
    pub id: String,
    /// Source account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_account: Option<String>,
    /// Destination account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account: Option<String>,
    /// Amount moved.
    #[serde(default)]
    pub amount: f64,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for Transfer {
    const COLLECTION: Collection = Collection::Transfers;

    fn record_key(&self) -> &str {
        &self.id
    }
}

/// A worker attendance entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    /// Entry identifier.
    pub id: String,
    /// Worker attended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,
    /// Attendance date, ISO-8601 text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for AttendanceEntry {
    const COLLECTION: Collection = Collection::Attendance;

    fn record_key(&self) -> &str {
        &self.id
    }
}

/// Direction of a manual stock adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentDirection {
    /// Units added to stock.
    Add,
    /// Units removed from stock.
    Subtract,
}

/// A manual stock adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustment {
    /// Adjustment identifier.
    pub id: String,
    /// Inventory item adjusted.
    pub item_id: String,
    /// Quantity in whole units.
    #[serde(default)]
    pub quantity: i64,
    /// Adjustment direction.
    pub direction: AdjustmentDirection,
    /// Uninterpreted attributes.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LedgerRecord for StockAdjustment {
    const COLLECTION: Collection = Collection::StockAdjustments;

    fn record_key(&self) -> &str {
        &self.id
    }
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

    use super::AdjustmentDirection;
    use super::Profile;
    use super::ProfileKind;
    use super::Sale;
    use super::StockAdjustment;

    #[test]
    fn sale_preserves_unknown_fields() {
        let raw = json!({
            "invoiceNumber": "INV-7",
            "customerId": "cust-1",
            "grandTotal": 500.0,
            "amountReceived": 200.0,
            "deliveryNote": "left at the counter"
        });
        let sale: Sale = serde_json::from_value(raw).expect("decode sale");
        assert_eq!(sale.invoice_number, "INV-7");
        assert_eq!(sale.extra.get("deliveryNote").and_then(|v| v.as_str()), Some("left at the counter"));
        let back = serde_json::to_value(&sale).expect("encode sale");
        assert_eq!(back.get("deliveryNote").and_then(|v| v.as_str()), Some("left at the counter"));
    }

    #[test]
    fn profile_kind_wire_labels() {
        let profile: Profile = serde_json::from_value(json!({
            "id": "shop-1",
            "name": "Corner Shop",
            "kind": "business"
        }))
        .expect("decode profile");
        assert_eq!(profile.kind, ProfileKind::Business);
        assert_eq!(ProfileKind::Home.label(), "home");
    }

    #[test]
    fn adjustment_direction_wire_labels() {
        let adjustment: StockAdjustment = serde_json::from_value(json!({
            "id": "adj-1",
            "itemId": "item-1",
            "quantity": 4,
            "direction": "subtract"
        }))
        .expect("decode adjustment");
        assert_eq!(adjustment.direction, AdjustmentDirection::Subtract);
    }
}
