// crates/ledgerbook-store-sqlite/src/lib.rs
// ============================================================================
// Module: Ledgerbook SQLite Store
// Description: Tenant-partitioned local storage backed by SQLite.
// Purpose: Route records to the correct isolated store, serialize/restore
//          whole-tenant and whole-application state, and orchestrate the
//          reconciliation engine over stored snapshots.
// Dependencies: ledgerbook-core, rusqlite, serde, serde_json, thiserror,
//               tracing, csv
// ============================================================================

//! ## Overview
//! One SQLite database holds the global namespace; each tenant owns its own
//! database file, named deterministically from the profile id and opened
//! lazily through an explicit arena. Record operations follow a best-effort
//! local-cache policy: tenant-scoped calls with no active tenant degrade to
//! empty results, and single-operation I/O failures are logged and swallowed
//! at the public facade. Backup, restore, trash, export, and hard reset run
//! over the same primitives.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod audit;
mod backup;
mod store;
mod trash;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use store::GLOBAL_STORE_FILE;
pub use store::LedgerStore;
pub use store::LedgerStoreConfig;
pub use store::STORE_FILE_PREFIX;
pub use store::SqliteJournalMode;
pub use store::SqliteLedgerError;
pub use store::SqliteSyncMode;
pub use store::TENANT_STORE_PREFIX;
