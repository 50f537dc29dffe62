// crates/ledgerbook-core/tests/reconcile_unit.rs
// ============================================================================
// Module: Reconciliation Engine Unit Tests
// Description: Scenario tests for derived-field recomputation.
// Purpose: Validate balance/stock formulas, comparison tolerances, and the
//          auto-generated-expense deletion scan.
// ============================================================================

//! ## Overview
//! Scenario-level tests for the reconciliation engine:
//! - Customer/supplier balance drift detection and the silent correct case
//! - Stock recomputation across purchases, sales, production, adjustments
//! - Account balance recomputation across all five event sources
//! - Monetary epsilon handling
//! - Production-batch expense deletion findings

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

use ledgerbook_core::Account;
use ledgerbook_core::AdjustmentDirection;
use ledgerbook_core::Customer;
use ledgerbook_core::DerivedField;
use ledgerbook_core::EntityKind;
use ledgerbook_core::Expense;
use ledgerbook_core::InventoryItem;
use ledgerbook_core::LedgerSnapshot;
use ledgerbook_core::LineItem;
use ledgerbook_core::ProductionBatch;
use ledgerbook_core::ProductionLine;
use ledgerbook_core::Purchase;
use ledgerbook_core::SalaryTransaction;
use ledgerbook_core::Sale;
use ledgerbook_core::StockAdjustment;
use ledgerbook_core::Supplier;
use ledgerbook_core::Transfer;
use ledgerbook_core::reconcile;
use proptest::prelude::*;
use serde_json::Map;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn customer(id: &str, opening: f64, balance: f64) -> Customer {
    Customer {
        id: id.to_string(),
        name: format!("customer {id}"),
        opening_balance: opening,
        balance,
        extra: Map::new(),
    }
}

fn sale(invoice: &str, customer_id: &str, total: f64, received: f64) -> Sale {
    Sale {
        invoice_number: invoice.to_string(),
        customer_id: Some(customer_id.to_string()),
        grand_total: total,
        amount_received: received,
        account_id: None,
        items: Vec::new(),
        extra: Map::new(),
    }
}

fn item_line(item_id: &str, quantity: i64) -> LineItem {
    LineItem {
        item_id: item_id.to_string(),
        quantity,
        extra: Map::new(),
    }
}

fn inventory_item(id: &str, opening: i64, stock: i64) -> InventoryItem {
    InventoryItem {
        id: id.to_string(),
        name: format!("item {id}"),
        opening_stock: opening,
        stock,
        extra: Map::new(),
    }
}

// ============================================================================
// SECTION: Customer Balance
// ============================================================================

#[test]
fn stale_customer_balance_is_flagged_with_correct_value() {
    let snapshot = LedgerSnapshot {
        customers: vec![customer("cust-1", 0.0, 500.0)],
        sales: vec![sale("INV-1", "cust-1", 500.0, 200.0)],
        ..LedgerSnapshot::default()
    };
    let findings = reconcile(&snapshot);
    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.entity, EntityKind::Customer);
    assert_eq!(finding.entity_id, "cust-1");
    assert_eq!(finding.field, DerivedField::Balance);
    assert!((finding.stored - 500.0).abs() < f64::EPSILON);
    assert!((finding.correct - 300.0).abs() < f64::EPSILON);
}

#[test]
fn accurate_customer_balance_is_silent() {
    let snapshot = LedgerSnapshot {
        customers: vec![customer("cust-2", 0.0, 300.0)],
        sales: vec![sale("INV-2", "cust-2", 500.0, 200.0)],
        ..LedgerSnapshot::default()
    };
    assert!(reconcile(&snapshot).is_empty());
}

#[test]
fn balance_within_epsilon_is_silent() {
    let snapshot = LedgerSnapshot {
        customers: vec![customer("cust-3", 0.0, 300.005)],
        sales: vec![sale("INV-3", "cust-3", 500.0, 200.0)],
        ..LedgerSnapshot::default()
    };
    assert!(reconcile(&snapshot).is_empty());
}

#[test]
fn other_customers_sales_are_ignored() {
    let snapshot = LedgerSnapshot {
        customers: vec![customer("cust-4", 10.0, 10.0)],
        sales: vec![sale("INV-4", "someone-else", 900.0, 0.0)],
        ..LedgerSnapshot::default()
    };
    assert!(reconcile(&snapshot).is_empty());
}

// ============================================================================
// SECTION: Supplier Balance
// ============================================================================

#[test]
fn stale_supplier_balance_is_flagged() {
    let snapshot = LedgerSnapshot {
        suppliers: vec![Supplier {
            id: "supp-1".to_string(),
            name: "Mill".to_string(),
            opening_balance: 100.0,
            balance: 100.0,
            extra: Map::new(),
        }],
        purchases: vec![Purchase {
            bill_number: "BILL-1".to_string(),
            supplier_id: Some("supp-1".to_string()),
            grand_total: 250.0,
            amount_paid: 50.0,
            account_id: None,
            items: Vec::new(),
            extra: Map::new(),
        }],
        ..LedgerSnapshot::default()
    };
    let findings = reconcile(&snapshot);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].entity, EntityKind::Supplier);
    assert!((findings[0].correct - 300.0).abs() < f64::EPSILON);
}

// ============================================================================
// SECTION: Inventory Stock
// ============================================================================

#[test]
fn correct_stock_is_not_flagged() {
    // 10 opening + 5 purchased - 3 sold = 12, and 12 is stored.
    let snapshot = LedgerSnapshot {
        inventory: vec![inventory_item("item-1", 10, 12)],
        purchases: vec![Purchase {
            bill_number: "BILL-2".to_string(),
            supplier_id: None,
            grand_total: 0.0,
            amount_paid: 0.0,
            account_id: None,
            items: vec![item_line("item-1", 5)],
            extra: Map::new(),
        }],
        sales: vec![Sale {
            invoice_number: "INV-5".to_string(),
            customer_id: None,
            grand_total: 0.0,
            amount_received: 0.0,
            account_id: None,
            items: vec![item_line("item-1", 3)],
            extra: Map::new(),
        }],
        ..LedgerSnapshot::default()
    };
    assert!(reconcile(&snapshot).is_empty());
}

#[test]
fn off_by_one_stock_is_flagged_exactly() {
    let snapshot = LedgerSnapshot {
        inventory: vec![inventory_item("item-1", 10, 11)],
        purchases: vec![Purchase {
            bill_number: "BILL-3".to_string(),
            supplier_id: None,
            grand_total: 0.0,
            amount_paid: 0.0,
            account_id: None,
            items: vec![item_line("item-1", 5)],
            extra: Map::new(),
        }],
        sales: vec![Sale {
            invoice_number: "INV-6".to_string(),
            customer_id: None,
            grand_total: 0.0,
            amount_received: 0.0,
            account_id: None,
            items: vec![item_line("item-1", 3)],
            extra: Map::new(),
        }],
        ..LedgerSnapshot::default()
    };
    let findings = reconcile(&snapshot);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].field, DerivedField::Stock);
    assert!((findings[0].stored - 11.0).abs() < f64::EPSILON);
    assert!((findings[0].correct - 12.0).abs() < f64::EPSILON);
}

#[test]
fn production_and_adjustments_enter_the_stock_formula() {
    // finished: 10 opening + 7 produced + 2 added - 1 subtracted = 18 (stored, silent).
    // raw: 20 opening - 4 consumed = 16, but 17 is stored (flagged).
    let snapshot = LedgerSnapshot {
        inventory: vec![
            inventory_item("finished", 10, 18),
            inventory_item("raw", 20, 17),
        ],
        production_history: vec![ProductionBatch {
            batch_code: "BATCH-1".to_string(),
            finished_goods: vec![ProductionLine {
                item_id: "finished".to_string(),
                quantity: 7,
            }],
            raw_materials: vec![ProductionLine {
                item_id: "raw".to_string(),
                quantity: 4,
            }],
            extra: Map::new(),
        }],
        stock_adjustments: vec![
            StockAdjustment {
                id: "adj-1".to_string(),
                item_id: "finished".to_string(),
                quantity: 2,
                direction: AdjustmentDirection::Add,
                extra: Map::new(),
            },
            StockAdjustment {
                id: "adj-2".to_string(),
                item_id: "finished".to_string(),
                quantity: 1,
                direction: AdjustmentDirection::Subtract,
                extra: Map::new(),
            },
        ],
        ..LedgerSnapshot::default()
    };
    let findings = reconcile(&snapshot);
    assert_eq!(findings.len(), 1, "only the raw-material item drifted");
    assert_eq!(findings[0].entity_id, "raw");
    assert!((findings[0].stored - 17.0).abs() < f64::EPSILON);
    assert!((findings[0].correct - 16.0).abs() < f64::EPSILON);
}

// ============================================================================
// SECTION: Account Balance
// ============================================================================

#[test]
fn account_balance_uses_all_five_event_sources() {
    // 1000 + 200 received + 50 in - 100 paid - 30 expense - 70 salary - 20 out = 1030.
    let snapshot = LedgerSnapshot {
        accounts: vec![Account {
            id: "cash".to_string(),
            name: "Cash".to_string(),
            opening_balance: 1000.0,
            balance: 999.0,
            extra: Map::new(),
        }],
        sales: vec![Sale {
            invoice_number: "INV-7".to_string(),
            customer_id: None,
            grand_total: 200.0,
            amount_received: 200.0,
            account_id: Some("cash".to_string()),
            items: Vec::new(),
            extra: Map::new(),
        }],
        purchases: vec![Purchase {
            bill_number: "BILL-4".to_string(),
            supplier_id: None,
            grand_total: 100.0,
            amount_paid: 100.0,
            account_id: Some("cash".to_string()),
            items: Vec::new(),
            extra: Map::new(),
        }],
        expenses: vec![Expense {
            id: "exp-1".to_string(),
            amount: 30.0,
            account_id: Some("cash".to_string()),
            note: "tea and snacks".to_string(),
            extra: Map::new(),
        }],
        salary_transactions: vec![SalaryTransaction {
            id: "sal-1".to_string(),
            worker_id: None,
            amount: 70.0,
            account_id: Some("cash".to_string()),
            extra: Map::new(),
        }],
        transfers: vec![
            Transfer {
                id: "tr-1".to_string(),
                from_account: Some("bank".to_string()),
                to_account: Some("cash".to_string()),
                amount: 50.0,
                extra: Map::new(),
            },
            Transfer {
                id: "tr-2".to_string(),
                from_account: Some("cash".to_string()),
                to_account: Some("bank".to_string()),
                amount: 20.0,
                extra: Map::new(),
            },
        ],
        ..LedgerSnapshot::default()
    };
    let findings = reconcile(&snapshot);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].entity, EntityKind::Account);
    assert!((findings[0].correct - 1030.0).abs() < f64::EPSILON);
}

// ============================================================================
// SECTION: Production Expense Scan
// ============================================================================

#[test]
fn auto_generated_production_expense_is_a_deletion_finding() {
    let snapshot = LedgerSnapshot {
        expenses: vec![
            Expense {
                id: "exp-2".to_string(),
                amount: 45.0,
                account_id: Some("cash".to_string()),
                note: "Auto entry for Production Batch BATCH-9".to_string(),
                extra: Map::new(),
            },
            Expense {
                id: "exp-3".to_string(),
                amount: 12.0,
                account_id: None,
                note: "electricity".to_string(),
                extra: Map::new(),
            },
        ],
        ..LedgerSnapshot::default()
    };
    let findings = reconcile(&snapshot);
    assert_eq!(findings.len(), 1);
    let finding = &findings[0];
    assert_eq!(finding.entity, EntityKind::Expense);
    assert_eq!(finding.entity_id, "exp-2");
    assert!(finding.delete_record);
    assert_eq!(finding.related_account_id.as_deref(), Some("cash"));
}

// ============================================================================
// SECTION: Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// A snapshot whose cached balances equal the recomputed values is
    /// always silent, whatever the sales history looks like.
    #[test]
    fn consistent_snapshots_are_silent(
        totals in prop::collection::vec((1.0f64..10_000.0, 0.0f64..10_000.0), 0..12),
        opening in -5_000.0f64..5_000.0,
    ) {
        let mut correct = opening;
        let sales: Vec<Sale> = totals
            .iter()
            .enumerate()
            .map(|(index, (total, received))| {
                let received = received.min(*total);
                correct += total - received;
                sale(&format!("INV-{index}"), "cust-p", *total, received)
            })
            .collect();
        let snapshot = LedgerSnapshot {
            customers: vec![customer("cust-p", opening, correct)],
            sales,
            ..LedgerSnapshot::default()
        };
        prop_assert!(reconcile(&snapshot).is_empty());
    }
}
