// crates/ledgerbook-store-sqlite/tests/ledger_store_unit.rs
// ============================================================================
// Module: Ledger Store Unit Tests
// Description: Integration tests for tenant-partitioned SQLite storage.
// Purpose: Validate routing/isolation, degraded failure semantics, atomic
//          replace-all, backup/restore round-trips, trash lifecycle,
//          reconciliation orchestration, export, and hard reset.
// ============================================================================

//! ## Overview
//! Store-level tests for the ledger storage invariants:
//! - Tenant isolation and no-active-tenant degradation
//! - Upsert vs replace-all semantics, including rollback on bad records
//! - Lazy handle open/close/reopen lifecycle
//! - Single-tenant and full-application backup round-trips
//! - Id-collision remapping on restore
//! - Trash round-trip and purge
//! - Reconciliation + apply_fix over stored state
//! - Tabular export shape and hard reset

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use ledgerbook_core::Collection;
use ledgerbook_core::ProfileId;
use ledgerbook_core::TenantBackup;
use ledgerbook_core::TenantContext;
use ledgerbook_store_sqlite::LedgerStore;
use ledgerbook_store_sqlite::LedgerStoreConfig;
use ledgerbook_store_sqlite::SqliteJournalMode;
use ledgerbook_store_sqlite::SqliteSyncMode;
use proptest::prelude::*;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn store_in(dir: &TempDir) -> LedgerStore {
    LedgerStore::new(LedgerStoreConfig {
        root_dir: dir.path().to_path_buf(),
        busy_timeout_ms: 1_000,
        journal_mode: SqliteJournalMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    })
    .expect("open store family")
}

fn profile_record(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "kind": "business" })
}

fn seed_profile(store: &LedgerStore, ctx: &TenantContext, id: &str) {
    store.save(ctx, Collection::Profiles, &[profile_record(id, id)]);
}

fn active(id: &str) -> TenantContext {
    let ctx = TenantContext::new();
    ctx.set(Some(ProfileId::from(id)));
    ctx
}

// ============================================================================
// SECTION: Routing and Isolation
// ============================================================================

#[test]
fn tenant_collections_are_isolated() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    store.save(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-A" })]);
    ctx.with_tenant(ProfileId::from("shop-b"), || {
        store.save(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-B" })]);
        let sales_b = store.load(&ctx, Collection::Sales);
        assert_eq!(sales_b.len(), 1);
        assert_eq!(sales_b[0]["invoiceNumber"], "INV-B");
    });
    let sales_a = store.load(&ctx, Collection::Sales);
    assert_eq!(sales_a.len(), 1);
    assert_eq!(sales_a[0]["invoiceNumber"], "INV-A");
}

#[test]
fn tenant_scoped_operations_degrade_without_active_tenant() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = TenantContext::new();
    assert!(store.load(&ctx, Collection::Sales).is_empty());
    store.save(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-1" })]);
    store.replace_all(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-2" })]);
    ctx.set(Some(ProfileId::from("shop-a")));
    assert!(store.load(&ctx, Collection::Sales).is_empty(), "skipped writes left no trace");
}

#[test]
fn global_collections_ignore_tenant_context() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = TenantContext::new();
    store.save(&ctx, Collection::Accounts, &[json!({ "id": "cash", "balance": 5.0 })]);
    assert_eq!(store.load(&ctx, Collection::Accounts).len(), 1);
    ctx.set(Some(ProfileId::from("shop-a")));
    assert_eq!(store.load(&ctx, Collection::Accounts).len(), 1, "same store either way");
}

// ============================================================================
// SECTION: Save and Replace Semantics
// ============================================================================

#[test]
fn save_upserts_without_removing_absent_records() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    store.save(&ctx, Collection::Customers, &[json!({ "id": "c1", "name": "first" })]);
    store.save(&ctx, Collection::Customers, &[json!({ "id": "c2", "name": "second" })]);
    assert_eq!(store.load(&ctx, Collection::Customers).len(), 2);
    store.save(&ctx, Collection::Customers, &[json!({ "id": "c1", "name": "renamed" })]);
    let customers = store.load(&ctx, Collection::Customers);
    assert_eq!(customers.len(), 2);
    let first = customers.iter().find(|c| c["id"] == "c1").expect("c1 present");
    assert_eq!(first["name"], "renamed");
}

#[test]
fn replace_all_clears_then_inserts() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    store.save(
        &ctx,
        Collection::Customers,
        &[json!({ "id": "c1" }), json!({ "id": "c2" })],
    );
    store.replace_all(&ctx, Collection::Customers, &[json!({ "id": "c3" })]);
    let customers = store.load(&ctx, Collection::Customers);
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0]["id"], "c3");
}

#[test]
fn failed_replace_all_leaves_collection_unchanged() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    store.save(
        &ctx,
        Collection::Customers,
        &[json!({ "id": "c1" }), json!({ "id": "c2" })],
    );
    // Second record has no primary key, so the transaction must roll back.
    store.replace_all(
        &ctx,
        Collection::Customers,
        &[json!({ "id": "c3" }), json!({ "name": "keyless" })],
    );
    let customers = store.load(&ctx, Collection::Customers);
    assert_eq!(customers.len(), 2, "pre-call state preserved");
    assert!(customers.iter().any(|c| c["id"] == "c1"));
    assert!(customers.iter().any(|c| c["id"] == "c2"));
}

#[test]
fn closed_tenant_handle_reopens_transparently() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    store.save(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-1" })]);
    store.close_tenant(&ProfileId::from("shop-a"));
    let sales = store.load(&ctx, Collection::Sales);
    assert_eq!(sales.len(), 1, "reopen finds persisted data");
}

// ============================================================================
// SECTION: Backup and Restore
// ============================================================================

#[test]
fn tenant_backup_restores_into_fresh_id_on_collision() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    seed_profile(&store, &ctx, "shop-a");
    store.save(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-1", "grandTotal": 5.0 })]);
    store.save(&ctx, Collection::Customers, &[json!({ "id": "c1", "balance": 5.0 })]);
    let backup = store.backup_tenant(&ProfileId::from("shop-a")).expect("backup");

    let restored = store.restore_tenant(backup).expect("restore");
    assert_ne!(restored.as_str(), "shop-a", "collision must mint a fresh id");
    assert!(restored.as_str().starts_with("business-"));

    // The original tenant is untouched and the clone is fully populated.
    let original_sales = store.load(&ctx, Collection::Sales);
    assert_eq!(original_sales.len(), 1);
    ctx.with_tenant(restored.clone(), || {
        let sales = store.load(&ctx, Collection::Sales);
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0]["invoiceNumber"], "INV-1");
        let customers = store.load(&ctx, Collection::Customers);
        assert_eq!(customers.len(), 1);
    });
    let profiles = store.load(&ctx, Collection::Profiles);
    assert_eq!(profiles.len(), 2, "both tenants registered");
}

#[test]
fn tenant_backup_keeps_id_when_no_collision() {
    let source_dir = TempDir::new().expect("tempdir");
    let source = store_in(&source_dir);
    let ctx = active("shop-a");
    seed_profile(&source, &ctx, "shop-a");
    source.save(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-1" })]);
    let backup = source.backup_tenant(&ProfileId::from("shop-a")).expect("backup");

    let target_dir = TempDir::new().expect("tempdir");
    let target = store_in(&target_dir);
    let restored = target.restore_tenant(backup).expect("restore");
    assert_eq!(restored.as_str(), "shop-a");
}

#[test]
fn restore_skips_unknown_collections() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let doc = TenantBackup::from_json(json!({
        "profile": { "id": "shop-z", "name": "Z", "kind": "home" },
        "profileData": {
            "sales": [ { "invoiceNumber": "INV-1" } ],
            "loyalty-points": [ { "id": "lp-1" } ]
        }
    }))
    .expect("valid document");
    let restored = store.restore_tenant(doc).expect("restore");
    let ctx = TenantContext::new();
    ctx.with_tenant(restored, || {
        assert_eq!(store.load(&ctx, Collection::Sales).len(), 1);
    });
}

#[test]
fn full_backup_restore_is_idempotent() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    seed_profile(&store, &ctx, "shop-a");
    store.save(&ctx, Collection::Accounts, &[json!({ "id": "cash", "balance": 9.0 })]);
    store.save(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-1" })]);
    ctx.with_tenant(ProfileId::from("shop-b"), || {
        seed_profile(&store, &ctx, "shop-b");
        store.save(&ctx, Collection::Expenses, &[json!({ "id": "e1", "amount": 3.0 })]);
    });

    let doc = store.backup_all().expect("backup all");
    store.restore_all(&doc).expect("first restore");
    let after_first = store.backup_all().expect("snapshot");
    store.restore_all(&doc).expect("second restore");
    let after_second = store.backup_all().expect("snapshot");
    assert_eq!(after_first, after_second);
    assert_eq!(after_first.profiles.len(), 2);
}

#[test]
fn full_restore_wipes_orphaned_tenant_stores() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    seed_profile(&store, &ctx, "shop-a");
    store.save(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-1" })]);
    let doc = store.backup_all().expect("backup all");

    // An orphan created after the backup must not survive the restore.
    ctx.with_tenant(ProfileId::from("orphan"), || {
        store.save(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-X" })]);
    });
    store.restore_all(&doc).expect("restore");
    let tenants = store.discover_tenant_stores().expect("discover");
    assert_eq!(tenants, vec![ProfileId::from("shop-a")]);
}

// ============================================================================
// SECTION: Trash Lifecycle
// ============================================================================

#[test]
fn trash_round_trip_preserves_tenant_count() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    seed_profile(&store, &ctx, "shop-a");
    seed_profile(&store, &ctx, "shop-b");
    let before = store.load(&ctx, Collection::Profiles).len();

    store.trash_profile(&ProfileId::from("shop-b")).expect("trash");
    assert_eq!(store.load(&ctx, Collection::Profiles).len(), before - 1);
    let trash = store.load(&ctx, Collection::Trash);
    assert_eq!(trash.len(), 1);
    assert_eq!(trash[0]["originalKey"], "profiles");

    store.restore_trash_entry(&ctx, "shop-b").expect("restore");
    assert_eq!(store.load(&ctx, Collection::Profiles).len(), before);
    assert!(store.load(&ctx, Collection::Trash).is_empty());
}

#[test]
fn empty_trash_purges_profiles_and_their_stores() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    seed_profile(&store, &ctx, "shop-a");
    store.save(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-1" })]);
    assert_eq!(store.discover_tenant_stores().expect("discover").len(), 1);

    store.trash_profile(&ProfileId::from("shop-a")).expect("trash");
    let purged = store.empty_trash().expect("empty trash");
    assert_eq!(purged, 1);
    assert!(store.load(&ctx, Collection::Trash).is_empty());
    assert!(store.discover_tenant_stores().expect("discover").is_empty());
}

// ============================================================================
// SECTION: Reconciliation Orchestration
// ============================================================================

#[test]
fn reconciliation_finds_and_fixes_balance_drift() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    seed_profile(&store, &ctx, "shop-a");
    store.save(
        &ctx,
        Collection::Customers,
        &[json!({ "id": "c1", "name": "Asha", "openingBalance": 0.0, "balance": 500.0 })],
    );
    store.save(
        &ctx,
        Collection::Sales,
        &[json!({
            "invoiceNumber": "INV-1",
            "customerId": "c1",
            "grandTotal": 500.0,
            "amountReceived": 200.0
        })],
    );

    let findings = store
        .run_reconciliation(&ctx, &ProfileId::from("shop-a"))
        .expect("reconcile");
    assert_eq!(findings.len(), 1);
    assert!((findings[0].correct - 300.0).abs() < f64::EPSILON);

    store.apply_fix(&ctx, &findings[0]).expect("apply fix");
    let findings = store
        .run_reconciliation(&ctx, &ProfileId::from("shop-a"))
        .expect("reconcile again");
    assert!(findings.is_empty(), "drift corrected");
}

#[test]
fn deletion_fix_removes_expense_and_reverses_account_debit() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    seed_profile(&store, &ctx, "shop-a");
    store.save(
        &ctx,
        Collection::Accounts,
        &[json!({ "id": "cash", "name": "Cash", "openingBalance": 100.0, "balance": 55.0 })],
    );
    store.save(
        &ctx,
        Collection::Expenses,
        &[json!({
            "id": "e1",
            "amount": 45.0,
            "accountId": "cash",
            "note": "Auto entry for production batch B-1"
        })],
    );

    let findings = store
        .run_reconciliation(&ctx, &ProfileId::from("shop-a"))
        .expect("reconcile");
    let deletion = findings
        .iter()
        .find(|finding| finding.delete_record)
        .expect("deletion finding");
    store.apply_fix(&ctx, deletion).expect("apply fix");

    assert!(store.load(&ctx, Collection::Expenses).is_empty());
    let accounts = store.load(&ctx, Collection::Accounts);
    let balance = accounts[0]["balance"].as_f64().expect("balance");
    assert!((balance - 100.0).abs() < 1e-9, "debit reversed");
}

// ============================================================================
// SECTION: Export and Reset
// ============================================================================

#[test]
fn csv_export_embeds_nested_values_as_json() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    seed_profile(&store, &ctx, "shop-a");
    store.save(
        &ctx,
        Collection::Sales,
        &[json!({
            "invoiceNumber": "INV-1",
            "grandTotal": 12.5,
            "items": [ { "itemId": "tea", "quantity": 2 } ]
        })],
    );
    let rendered = store.export_tenant_csv(&ProfileId::from("shop-a")).expect("export");
    assert!(rendered.contains("sales"));
    assert!(rendered.contains("invoiceNumber"));
    assert!(rendered.contains("12.5"));
    assert!(rendered.contains("\"\"itemId\"\":\"\"tea\"\""), "nested JSON quoted into one cell");
}

#[test]
fn hard_reset_removes_every_store_file() {
    let dir = TempDir::new().expect("tempdir");
    let store = store_in(&dir);
    let ctx = active("shop-a");
    seed_profile(&store, &ctx, "shop-a");
    store.save(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-1" })]);
    ctx.with_tenant(ProfileId::from("shop-b"), || {
        store.save(&ctx, Collection::Sales, &[json!({ "invoiceNumber": "INV-2" })]);
    });

    store.hard_reset().expect("hard reset");
    assert!(store.discover_tenant_stores().expect("discover").is_empty());
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(Result::ok)
        .filter(|entry| {
            entry
                .file_name()
                .to_string_lossy()
                .starts_with("ledgerbook-")
        })
        .collect();
    assert!(leftovers.is_empty(), "no store files survive a hard reset");
    // The store family remains usable after the wipe.
    assert!(store.load(&ctx, Collection::Profiles).is_empty());
}

// ============================================================================
// SECTION: Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn saved_record_keys_survive_round_trip(
        keys in prop::collection::btree_set("[a-z0-9]{1,12}", 1..8)
    ) {
        let dir = TempDir::new().expect("tempdir");
        let store = store_in(&dir);
        let ctx = active("shop-prop");
        let records: Vec<Value> = keys
            .iter()
            .map(|key| json!({ "id": key, "name": format!("record {key}") }))
            .collect();
        store.save(&ctx, Collection::Customers, &records);
        let loaded = store.load(&ctx, Collection::Customers);
        let loaded_keys: std::collections::BTreeSet<String> = loaded
            .iter()
            .filter_map(|record| record["id"].as_str().map(str::to_string))
            .collect();
        prop_assert_eq!(loaded_keys, keys);
    }
}
