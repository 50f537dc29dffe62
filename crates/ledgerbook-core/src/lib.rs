// crates/ledgerbook-core/src/lib.rs
// ============================================================================
// Module: Ledgerbook Core
// Description: Domain model for the tenant-partitioned ledger storage core.
// Purpose: Define collections, typed records, tenant context, backup
//          documents, and the ledger reconciliation engine.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `ledgerbook-core` holds everything about the ledger domain that does not
//! touch physical storage: the closed collection registry, per-collection
//! typed records, the explicit tenant context, portable backup documents,
//! and the read-only reconciliation engine that recomputes derived balances
//! and stock levels from event history. Physical persistence lives in
//! `ledgerbook-store-sqlite`.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod backup;
pub mod collections;
pub mod context;
pub mod discrepancy;
pub mod reconcile;
pub mod records;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use backup::BackupError;
pub use backup::FullBackup;
pub use backup::TenantBackup;
pub use collections::Collection;
pub use collections::Namespace;
pub use collections::UnknownCollectionError;
pub use context::ContextScope;
pub use context::GLOBAL_PROFILE_ID;
pub use context::ProfileId;
pub use context::TenantContext;
pub use discrepancy::DerivedField;
pub use discrepancy::Discrepancy;
pub use discrepancy::EntityKind;
pub use reconcile::LedgerSnapshot;
pub use reconcile::MONEY_EPSILON;
pub use reconcile::PRODUCTION_EXPENSE_MARKER;
pub use reconcile::reconcile;
pub use records::Account;
pub use records::AdjustmentDirection;
pub use records::AttendanceEntry;
pub use records::BusinessDetails;
pub use records::Customer;
pub use records::Expense;
pub use records::InventoryItem;
pub use records::LedgerRecord;
pub use records::LineItem;
pub use records::NamedEntry;
pub use records::ProductionBatch;
pub use records::ProductionLine;
pub use records::Profile;
pub use records::ProfileKind;
pub use records::Purchase;
pub use records::Reminder;
pub use records::SalaryTransaction;
pub use records::Sale;
pub use records::StockAdjustment;
pub use records::Supplier;
pub use records::Transfer;
pub use records::TrashEntry;
pub use records::Worker;
