// crates/ledgerbook-core/src/collections.rs
// ============================================================================
// Module: Collection Registry
// Description: Closed enumeration of every ledger collection and its schema.
// Purpose: Provide exhaustive collection -> namespace and collection ->
//          primary-key lookups with fail-fast name parsing.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! The registry is static configuration: two namespaces (global and tenant)
//! and, per collection, a canonical wire name and a primary-key field. The
//! wire name is the key used inside backup documents; the primary-key field
//! is the record field whose value keys the physical row. Unrecognized
//! collection names are rejected at the parse boundary rather than being
//! routed anywhere.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Namespace
// ============================================================================

/// Storage namespace owning a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Shared across all tenants (single physical store).
    Global,
    /// Partitioned per tenant (one physical store per profile).
    Tenant,
}

// ============================================================================
// SECTION: Collection
// ============================================================================

/// A ledger collection known to the storage core.
///
/// # Invariants
/// - The set is closed: every routing and primary-key lookup is an
///   exhaustive match, never a string comparison at a call site.
/// - Wire names are stable; backup documents use them as keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    /// Global profile registry (every tenant, plus the brand profile).
    Profiles,
    /// Shared financial accounts (cash/bank/wallet).
    Accounts,
    /// Soft-deleted records awaiting restore or purge.
    Trash,
    /// Customer classification table.
    CustomerTypes,
    /// Supplier classification table.
    SupplierTypes,
    /// Worker role table.
    WorkerRoles,
    /// Expense categories for business profiles.
    BusinessExpenseCategories,
    /// Expense categories for home profiles.
    HomeExpenseCategories,
    /// Profit split definitions.
    ProfitSplits,
    /// Reminder entries.
    Reminders,
    /// Sales ledger, keyed by invoice number.
    Sales,
    /// Purchases ledger, keyed by bill number.
    Purchases,
    /// Expense ledger.
    Expenses,
    /// Customer master records.
    Customers,
    /// Supplier master records.
    Suppliers,
    /// Inventory master records.
    Inventory,
    /// Worker master records.
    Workers,
    /// Salary payment transactions.
    SalaryTransactions,
    /// Production batch history, keyed by batch code.
    ProductionHistory,
    /// Account-to-account transfers.
    Transfers,
    /// Worker attendance entries.
    Attendance,
    /// Manual stock adjustments.
    StockAdjustments,
}

impl Collection {
    /// Every collection in both namespaces.
    pub const ALL: [Self; 22] = [
        Self::Profiles,
        Self::Accounts,
        Self::Trash,
        Self::CustomerTypes,
        Self::SupplierTypes,
        Self::WorkerRoles,
        Self::BusinessExpenseCategories,
        Self::HomeExpenseCategories,
        Self::ProfitSplits,
        Self::Reminders,
        Self::Sales,
        Self::Purchases,
        Self::Expenses,
        Self::Customers,
        Self::Suppliers,
        Self::Inventory,
        Self::Workers,
        Self::SalaryTransactions,
        Self::ProductionHistory,
        Self::Transfers,
        Self::Attendance,
        Self::StockAdjustments,
    ];

    /// Collections in the global namespace.
    pub const GLOBAL: [Self; 10] = [
        Self::Profiles,
        Self::Accounts,
        Self::Trash,
        Self::CustomerTypes,
        Self::SupplierTypes,
        Self::WorkerRoles,
        Self::BusinessExpenseCategories,
        Self::HomeExpenseCategories,
        Self::ProfitSplits,
        Self::Reminders,
    ];

    /// Collections in the tenant namespace.
    pub const TENANT: [Self; 12] = [
        Self::Sales,
        Self::Purchases,
        Self::Expenses,
        Self::Customers,
        Self::Suppliers,
        Self::Inventory,
        Self::Workers,
        Self::SalaryTransactions,
        Self::ProductionHistory,
        Self::Transfers,
        Self::Attendance,
        Self::StockAdjustments,
    ];

    /// Returns the canonical wire name for this collection.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Profiles => "profiles",
            Self::Accounts => "accounts",
            Self::Trash => "trash",
            Self::CustomerTypes => "customer-types",
            Self::SupplierTypes => "supplier-types",
            Self::WorkerRoles => "worker-roles",
            Self::BusinessExpenseCategories => "business-expense-categories",
            Self::HomeExpenseCategories => "home-expense-categories",
            Self::ProfitSplits => "profit-splits",
            Self::Reminders => "reminders",
            Self::Sales => "sales",
            Self::Purchases => "purchases",
            Self::Expenses => "expenses",
            Self::Customers => "customers",
            Self::Suppliers => "suppliers",
            Self::Inventory => "inventory",
            Self::Workers => "workers",
            Self::SalaryTransactions => "salary-transactions",
            Self::ProductionHistory => "production-history",
            Self::Transfers => "transfers",
            Self::Attendance => "attendance",
            Self::StockAdjustments => "stock-adjustments",
        }
    }

    /// Parses a wire name into a collection.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCollectionError`] for any name outside the closed
    /// registry. Callers routing external documents may choose to skip the
    /// offending key instead of aborting; callers routing programmatic
    /// requests must treat the error as fatal.
    pub fn from_name(name: &str) -> Result<Self, UnknownCollectionError> {
        Self::ALL
            .into_iter()
            .find(|collection| collection.name() == name)
            .ok_or_else(|| UnknownCollectionError {
                name: name.to_string(),
            })
    }

    /// Returns the namespace owning this collection.
    #[must_use]
    pub const fn namespace(self) -> Namespace {
        match self {
            Self::Profiles
            | Self::Accounts
            | Self::Trash
            | Self::CustomerTypes
            | Self::SupplierTypes
            | Self::WorkerRoles
            | Self::BusinessExpenseCategories
            | Self::HomeExpenseCategories
            | Self::ProfitSplits
            | Self::Reminders => Namespace::Global,
            Self::Sales
            | Self::Purchases
            | Self::Expenses
            | Self::Customers
            | Self::Suppliers
            | Self::Inventory
            | Self::Workers
            | Self::SalaryTransactions
            | Self::ProductionHistory
            | Self::Transfers
            | Self::Attendance
            | Self::StockAdjustments => Namespace::Tenant,
        }
    }

    /// Returns `true` when the collection lives in the global namespace.
    #[must_use]
    pub const fn is_global(self) -> bool {
        matches!(self.namespace(), Namespace::Global)
    }

    /// Returns the wire-format field holding each record's primary key.
    #[must_use]
    pub const fn primary_key(self) -> &'static str {
        match self {
            Self::Sales => "invoiceNumber",
            Self::Purchases => "billNumber",
            Self::ProductionHistory => "batchCode",
            _ => "id",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Collection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Collection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::from_name(&name).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Rejection of a collection name outside the closed registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown collection: {name}")]
pub struct UnknownCollectionError {
    /// The rejected name.
    pub name: String,
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
    use super::Collection;
    use super::Namespace;

    #[test]
    fn wire_names_round_trip() {
        for collection in Collection::ALL {
            let parsed = Collection::from_name(collection.name()).expect("known name");
            assert_eq!(parsed, collection);
        }
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = Collection::from_name("ledger-of-doom").expect_err("must reject");
        assert_eq!(err.name, "ledger-of-doom");
    }

    #[test]
    fn namespaces_partition_the_registry() {
        assert_eq!(
            Collection::GLOBAL.len() + Collection::TENANT.len(),
            Collection::ALL.len()
        );
        for collection in Collection::GLOBAL {
            assert_eq!(collection.namespace(), Namespace::Global);
        }
        for collection in Collection::TENANT {
            assert_eq!(collection.namespace(), Namespace::Tenant);
        }
    }

    #[test]
    fn ledger_primary_keys() {
        assert_eq!(Collection::Sales.primary_key(), "invoiceNumber");
        assert_eq!(Collection::Purchases.primary_key(), "billNumber");
        assert_eq!(Collection::ProductionHistory.primary_key(), "batchCode");
        assert_eq!(Collection::Customers.primary_key(), "id");
    }
}
