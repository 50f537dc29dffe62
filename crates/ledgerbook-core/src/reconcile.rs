// crates/ledgerbook-core/src/reconcile.rs
// ============================================================================
// Module: Reconciliation Engine
// Description: Read-only recomputation of derived balances and stock levels.
// Purpose: Detect drift between cached derived fields and the values implied
//          by the full event history, without mutating any data.
// Dependencies: crate::records, crate::discrepancy
// ============================================================================

//! ## Overview
//! The engine audits one tenant's snapshot (plus the shared global accounts)
//! against the canonical recomputation formulas. Monetary comparisons use a
//! 0.01 epsilon for currency rounding; stock is whole units and compares
//! exactly. Each (entity, field) mismatch yields exactly one
//! [`Discrepancy`]. A separate scan flags expense records auto-generated
//! from production batches, which are deletion findings rather than value
//! patches. The engine performs no writes; applying a fix is the store's
//! `apply_fix` operation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::collections::Collection;
use crate::discrepancy::DerivedField;
use crate::discrepancy::Discrepancy;
use crate::discrepancy::EntityKind;
use crate::records::Account;
use crate::records::AdjustmentDirection;
use crate::records::Customer;
use crate::records::Expense;
use crate::records::InventoryItem;
use crate::records::ProductionBatch;
use crate::records::Purchase;
use crate::records::SalaryTransaction;
use crate::records::Sale;
use crate::records::StockAdjustment;
use crate::records::Supplier;
use crate::records::Transfer;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Tolerance for monetary comparisons (currency rounding).
pub const MONEY_EPSILON: f64 = 0.01;

/// Note marker identifying expenses auto-generated from a production batch.
/// Matched case-insensitively anywhere in the free-text note.
pub const PRODUCTION_EXPENSE_MARKER: &str = "production batch";

// ============================================================================
// SECTION: Snapshot
// ============================================================================

/// One tenant's full collection snapshot plus the shared global accounts.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    /// Customer master records.
    pub customers: Vec<Customer>,
    /// Supplier master records.
    pub suppliers: Vec<Supplier>,
    /// Inventory master records.
    pub inventory: Vec<InventoryItem>,
    /// Shared financial accounts (global namespace).
    pub accounts: Vec<Account>,
    /// Sales ledger.
    pub sales: Vec<Sale>,
    /// Purchases ledger.
    pub purchases: Vec<Purchase>,
    /// Expense ledger.
    pub expenses: Vec<Expense>,
    /// Salary payment transactions.
    pub salary_transactions: Vec<SalaryTransaction>,
    /// Production batch history.
    pub production_history: Vec<ProductionBatch>,
    /// Account-to-account transfers.
    pub transfers: Vec<Transfer>,
    /// Manual stock adjustments.
    pub stock_adjustments: Vec<StockAdjustment>,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Audits the snapshot and returns every detected discrepancy.
///
/// An empty result means no drift was found; it is never an error.
#[must_use]
pub fn reconcile(snapshot: &LedgerSnapshot) -> Vec<Discrepancy> {
    let mut findings = Vec::new();
    audit_customers(snapshot, &mut findings);
    audit_suppliers(snapshot, &mut findings);
    audit_inventory(snapshot, &mut findings);
    audit_accounts(snapshot, &mut findings);
    flag_production_expenses(snapshot, &mut findings);
    findings
}

/// Returns `true` when two monetary values differ beyond tolerance.
fn money_differs(stored: f64, correct: f64) -> bool {
    (stored - correct).abs() > MONEY_EPSILON
}

/// customer.balance = opening + sum(grandTotal) - sum(amountReceived)
/// over this customer's sales.
fn audit_customers(snapshot: &LedgerSnapshot, findings: &mut Vec<Discrepancy>) {
    for customer in &snapshot.customers {
        let mut correct = customer.opening_balance;
        for sale in &snapshot.sales {
            if sale.customer_id.as_deref() == Some(customer.id.as_str()) {
                correct += sale.grand_total - sale.amount_received;
            }
        }
        if money_differs(customer.balance, correct) {
            findings.push(Discrepancy {
                entity: EntityKind::Customer,
                entity_id: customer.id.clone(),
                entity_name: customer.name.clone(),
                field: DerivedField::Balance,
                stored: customer.balance,
                correct,
                collection: Collection::Customers,
                detail: format!(
                    "customer balance {} does not match sales history (expected {})",
                    customer.balance, correct
                ),
                delete_record: false,
                related_account_id: None,
            });
        }
    }
}

/// supplier.balance = opening + sum(grandTotal) - sum(amountPaid)
/// over this supplier's purchases.
fn audit_suppliers(snapshot: &LedgerSnapshot, findings: &mut Vec<Discrepancy>) {
    for supplier in &snapshot.suppliers {
        let mut correct = supplier.opening_balance;
        for purchase in &snapshot.purchases {
            if purchase.supplier_id.as_deref() == Some(supplier.id.as_str()) {
                correct += purchase.grand_total - purchase.amount_paid;
            }
        }
        if money_differs(supplier.balance, correct) {
            findings.push(Discrepancy {
                entity: EntityKind::Supplier,
                entity_id: supplier.id.clone(),
                entity_name: supplier.name.clone(),
                field: DerivedField::Balance,
                stored: supplier.balance,
                correct,
                collection: Collection::Suppliers,
                detail: format!(
                    "supplier balance {} does not match purchase history (expected {})",
                    supplier.balance, correct
                ),
                delete_record: false,
                related_account_id: None,
            });
        }
    }
}

/// inventory.stock = openingStock + purchased + produced + adjusted-in
/// - sold - consumed - adjusted-out, in whole units.
#[allow(clippy::cast_precision_loss, reason = "Stock counts stay far below 2^52.")]
fn audit_inventory(snapshot: &LedgerSnapshot, findings: &mut Vec<Discrepancy>) {
    for item in &snapshot.inventory {
        let mut correct = item.opening_stock;
        for purchase in &snapshot.purchases {
            for line in &purchase.items {
                if line.item_id == item.id {
                    correct += line.quantity;
                }
            }
        }
        for sale in &snapshot.sales {
            for line in &sale.items {
                if line.item_id == item.id {
                    correct -= line.quantity;
                }
            }
        }
        for batch in &snapshot.production_history {
            for line in &batch.finished_goods {
                if line.item_id == item.id {
                    correct += line.quantity;
                }
            }
            for line in &batch.raw_materials {
                if line.item_id == item.id {
                    correct -= line.quantity;
                }
            }
        }
        for adjustment in &snapshot.stock_adjustments {
            if adjustment.item_id == item.id {
                match adjustment.direction {
                    AdjustmentDirection::Add => correct += adjustment.quantity,
                    AdjustmentDirection::Subtract => correct -= adjustment.quantity,
                }
            }
        }
        if item.stock != correct {
            findings.push(Discrepancy {
                entity: EntityKind::InventoryItem,
                entity_id: item.id.clone(),
                entity_name: item.name.clone(),
                field: DerivedField::Stock,
                stored: item.stock as f64,
                correct: correct as f64,
                collection: Collection::Inventory,
                detail: format!(
                    "stock level {} does not match movement history (expected {correct})",
                    item.stock
                ),
                delete_record: false,
                related_account_id: None,
            });
        }
    }
}

/// account.balance = opening + received + transfers-in - paid - expenses
/// - salaries - transfers-out, over this tenant's events.
fn audit_accounts(snapshot: &LedgerSnapshot, findings: &mut Vec<Discrepancy>) {
    for account in &snapshot.accounts {
        let id = account.id.as_str();
        let mut correct = account.opening_balance;
        for sale in &snapshot.sales {
            if sale.account_id.as_deref() == Some(id) {
                correct += sale.amount_received;
            }
        }
        for purchase in &snapshot.purchases {
            if purchase.account_id.as_deref() == Some(id) {
                correct -= purchase.amount_paid;
            }
        }
        for expense in &snapshot.expenses {
            if expense.account_id.as_deref() == Some(id) {
                correct -= expense.amount;
            }
        }
        for salary in &snapshot.salary_transactions {
            if salary.account_id.as_deref() == Some(id) {
                correct -= salary.amount;
            }
        }
        for transfer in &snapshot.transfers {
            if transfer.to_account.as_deref() == Some(id) {
                correct += transfer.amount;
            }
            if transfer.from_account.as_deref() == Some(id) {
                correct -= transfer.amount;
            }
        }
        if money_differs(account.balance, correct) {
            findings.push(Discrepancy {
                entity: EntityKind::Account,
                entity_id: account.id.clone(),
                entity_name: account.name.clone(),
                field: DerivedField::Balance,
                stored: account.balance,
                correct,
                collection: Collection::Accounts,
                detail: format!(
                    "account balance {} does not match transaction history (expected {})",
                    account.balance, correct
                ),
                delete_record: false,
                related_account_id: None,
            });
        }
    }
}

/// Flags expenses whose note marks them as auto-generated from a production
/// batch. These are deletion findings; the related account id tells the
/// corrective writer which debit to reverse.
fn flag_production_expenses(snapshot: &LedgerSnapshot, findings: &mut Vec<Discrepancy>) {
    for expense in &snapshot.expenses {
        if expense.note.to_lowercase().contains(PRODUCTION_EXPENSE_MARKER) {
            findings.push(Discrepancy {
                entity: EntityKind::Expense,
                entity_id: expense.id.clone(),
                entity_name: expense.note.clone(),
                field: DerivedField::Balance,
                stored: expense.amount,
                correct: 0.0,
                collection: Collection::Expenses,
                detail: format!(
                    "expense {} was auto-generated from a production batch and should be deleted",
                    expense.id
                ),
                delete_record: true,
                related_account_id: expense.account_id.clone(),
            });
        }
    }
}
