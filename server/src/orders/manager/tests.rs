//! Manager-level tests: full command flows against in-memory storage
//!
//! 覆盖核心不变量：账单恒等式、桌台互斥、移桌守恒、状态机幂等、
//! 终态锁定、结算现金流。

use shared::models::PaymentCategory;
use shared::order::{
    CustomerChange, DiscountKind, DiscountSnapshot, ItemChanges, ItemInput, OrderStatus, StaffRole,
};
use shared::util::now_millis;

use crate::orders::actions::SettleOrderAction;
use crate::orders::manager::OrdersManager;
use crate::orders::storage::OrderStorage;
use crate::orders::traits::{CommandMetadata, OrderError};

fn manager() -> OrdersManager {
    OrdersManager::with_storage(OrderStorage::open_in_memory().unwrap())
}

fn meta(role: StaffRole) -> CommandMetadata {
    CommandMetadata {
        operator_id: 7,
        operator_name: "Ana".to_string(),
        role,
        timestamp: now_millis(),
    }
}

fn admin() -> CommandMetadata {
    meta(StaffRole::Admin)
}

fn cashier() -> CommandMetadata {
    meta(StaffRole::Cashier)
}

fn waiter() -> CommandMetadata {
    meta(StaffRole::Waiter)
}

fn item(name: &str, price: f64, quantity: i64, tax_rate: f64) -> ItemInput {
    ItemInput {
        product_id: 1,
        base_product_id: None,
        name: name.to_string(),
        price,
        original_price: None,
        tax_rate,
        discount: None,
        quantity,
        note: None,
    }
}

fn settle_action(order_id: &str, category: PaymentCategory) -> SettleOrderAction {
    SettleOrderAction {
        order_id: order_id.to_string(),
        payment_method_id: 1,
        payment_method_name: match category {
            PaymentCategory::Cash => "Efectivo".to_string(),
            PaymentCategory::Card => "Datafono".to_string(),
            PaymentCategory::Transfer => "Transferencia".to_string(),
        },
        payment_category: category,
        cash_amount: None,
        tip_amount: 0.0,
        customer: None,
        cuadre_id: 1,
    }
}

fn assert_bills_invariant(snapshot: &shared::order::OrderSnapshot) {
    assert_eq!(
        snapshot.bills.total,
        snapshot.bills.subtotal + snapshot.bills.tax,
        "bills.total must equal subtotal + tax"
    );
}

// ========== Creation & ledger ==========

#[test]
fn test_open_order_with_items() {
    let m = manager();
    let order = m
        .open_order(
            None,
            vec![item("Bandeja", 25000.0, 1, 8.0), item("Jugo", 5000.0, 2, 0.0)],
            None,
            &waiter(),
        )
        .unwrap();

    assert_eq!(order.status, OrderStatus::PorAprobar);
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.bills.total, 35000.0);
    assert_bills_invariant(&order);
    assert_eq!(order.cashier_name, "Ana");
}

#[test]
fn test_bills_invariant_after_every_mutation() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Arepa", 4500.0, 2, 8.0)], Some(3), &waiter())
        .unwrap();
    assert_bills_invariant(&order);

    let order = m
        .add_item(&order.order_id, item("Gaseosa", 3800.0, 1, 19.0), &waiter())
        .unwrap();
    assert_bills_invariant(&order);

    let target = order.items[0].id.clone();
    let order = m
        .update_item(
            &order.order_id,
            &target,
            ItemChanges {
                quantity: Some(5),
                note: None,
            },
            &waiter(),
        )
        .unwrap();
    assert_bills_invariant(&order);
    assert_eq!(order.items[0].quantity, 5);

    let gone = order.items[1].id.clone();
    let order = m.remove_item(&order.order_id, &gone, &waiter()).unwrap();
    assert_bills_invariant(&order);
    assert_eq!(order.items.len(), 1);
}

#[test]
fn test_add_item_to_table_creates_shell_order() {
    let m = manager();
    let order = m
        .add_item_to_table(4, item("Tinto", 2000.0, 1, 0.0), &waiter())
        .unwrap();

    assert_eq!(order.table_id, Some(4));
    assert_eq!(order.status, OrderStatus::PorAprobar);
    assert_eq!(order.items.len(), 1);

    // Second add lands on the same order (idempotent resolution)
    let again = m
        .add_item_to_table(4, item("Pandebono", 3000.0, 1, 8.0), &waiter())
        .unwrap();
    assert_eq!(again.order_id, order.order_id);
    assert_eq!(again.items.len(), 2);
    assert_bills_invariant(&again);

    let occupancy = m.table_occupancy().unwrap();
    assert_eq!(occupancy.get(&4).unwrap().order_id, order.order_id);
}

#[test]
fn test_discounted_item_is_priced_once() {
    let m = manager();
    let discount = DiscountSnapshot {
        discount_id: Some(10),
        kind: DiscountKind::Percent,
        value: 20.0,
        name: Some("Promo".to_string()),
    };
    let mut input = item("Pizza", 10000.0, 1, 8.0);
    input.discount = Some(discount);

    let order = m.open_order(None, vec![input], None, &waiter()).unwrap();
    let line = &order.items[0];
    assert_eq!(line.unit_price, 8000.0);
    assert_eq!(line.original_price, 10000.0);
    assert_eq!(order.bills.total, 8000.0);
    assert_bills_invariant(&order);
}

#[test]
fn test_update_item_zero_quantity_removes() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Empanada", 2500.0, 3, 8.0)], None, &waiter())
        .unwrap();
    let target = order.items[0].id.clone();

    let order = m
        .update_item(
            &order.order_id,
            &target,
            ItemChanges {
                quantity: Some(0),
                note: None,
            },
            &waiter(),
        )
        .unwrap();

    assert!(order.items.is_empty());
    assert_eq!(order.bills.total, 0.0);
}

#[test]
fn test_remove_item_role_guard() {
    let m = manager();

    // While POR_APROBAR any role can remove
    let order = m
        .open_order(None, vec![item("Cerveza", 6000.0, 2, 19.0)], Some(1), &waiter())
        .unwrap();
    let target = order.items[0].id.clone();
    m.remove_item(&order.order_id, &target, &waiter()).unwrap();

    // Once confirmed, a waiter can no longer remove
    let order = m
        .add_item(&order.order_id, item("Cerveza", 6000.0, 2, 19.0), &waiter())
        .unwrap();
    m.update_status(&order.order_id, OrderStatus::Pendiente, None, &cashier())
        .unwrap();

    let target = m.get_order(&order.order_id).unwrap().unwrap().items[0].id.clone();
    let err = m
        .remove_item(&order.order_id, &target, &waiter())
        .unwrap_err();
    assert!(matches!(err, OrderError::PermissionDenied(_)));

    // ...but an admin can
    m.remove_item(&order.order_id, &target, &admin()).unwrap();
}

#[test]
fn test_item_not_found() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Café", 2500.0, 1, 0.0)], None, &waiter())
        .unwrap();

    let err = m
        .remove_item(&order.order_id, "missing", &admin())
        .unwrap_err();
    assert!(matches!(err, OrderError::ItemNotFound(_)));

    let err = m.get_order("missing").unwrap();
    assert!(err.is_none());
}

// ========== Table registry ==========

#[test]
fn test_table_conflict_on_second_order() {
    let m = manager();
    let first = m.open_order(None, vec![], Some(2), &waiter()).unwrap();

    let err = m
        .open_order(None, vec![], Some(2), &waiter())
        .unwrap_err();
    assert!(matches!(err, OrderError::TableConflict(_)));

    // The losing create left nothing behind
    let occupancy = m.table_occupancy().unwrap();
    assert_eq!(occupancy.len(), 1);
    assert_eq!(occupancy.get(&2).unwrap().order_id, first.order_id);
    assert_eq!(m.list_active().unwrap().len(), 1);
}

#[test]
fn test_concurrent_assignment_single_winner() {
    let m = manager();

    // Ten orders with no table yet
    let ids: Vec<String> = (0..10)
        .map(|_| {
            m.open_order(None, vec![item("Plato", 10000.0, 1, 8.0)], None, &waiter())
                .unwrap()
                .order_id
        })
        .collect();

    // All race to confirm onto table 9
    let results: Vec<Result<_, _>> = std::thread::scope(|s| {
        let handles: Vec<_> = ids
            .iter()
            .map(|id| {
                let m = &m;
                s.spawn(move || {
                    m.update_status(id, OrderStatus::Pendiente, Some(9), &cashier())
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(OrderError::TableConflict(_))))
        .count();
    assert_eq!(winners, 1, "exactly one writer may claim the table");
    assert_eq!(conflicts, 9);

    let occupancy = m.table_occupancy().unwrap();
    assert_eq!(occupancy.get(&9).unwrap().status, OrderStatus::Pendiente);
}

#[test]
fn test_table_released_only_by_owner() {
    let m = manager();
    let order = m.open_order(None, vec![], Some(5), &waiter()).unwrap();

    // A different order closing must not free table 5
    let other = m
        .open_order(None, vec![item("Plato", 8000.0, 1, 8.0)], Some(6), &waiter())
        .unwrap();
    m.update_status(&other.order_id, OrderStatus::Cerrado, None, &admin())
        .unwrap();

    let occupancy = m.table_occupancy().unwrap();
    assert_eq!(occupancy.get(&5).unwrap().order_id, order.order_id);
    assert!(!occupancy.contains_key(&6));
}

// ========== State machine ==========

#[test]
fn test_status_flow_happy_path() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Plato", 12000.0, 1, 8.0)], Some(1), &waiter())
        .unwrap();

    let order = m
        .update_status(&order.order_id, OrderStatus::Pendiente, None, &cashier())
        .unwrap();
    assert_eq!(order.status, OrderStatus::Pendiente);

    let order = m
        .update_status(&order.order_id, OrderStatus::Listo, None, &cashier())
        .unwrap();
    assert_eq!(order.status, OrderStatus::Listo);

    // Kitchen readiness is a toggle
    let order = m
        .update_status(&order.order_id, OrderStatus::Pendiente, None, &cashier())
        .unwrap();
    let order = m
        .update_status(&order.order_id, OrderStatus::Listo, None, &cashier())
        .unwrap();

    let order = m
        .update_status(&order.order_id, OrderStatus::Entregado, None, &cashier())
        .unwrap();
    assert_eq!(order.status, OrderStatus::Entregado);
}

#[test]
fn test_status_update_is_idempotent() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Plato", 12000.0, 1, 8.0)], Some(1), &waiter())
        .unwrap();

    let first = m
        .update_status(&order.order_id, OrderStatus::Pendiente, None, &cashier())
        .unwrap();
    let second = m
        .update_status(&order.order_id, OrderStatus::Pendiente, None, &cashier())
        .unwrap();

    // Identical observable state, no error, no version bump
    assert_eq!(first, second);
}

#[test]
fn test_missing_table_guard() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Plato", 12000.0, 1, 8.0)], None, &waiter())
        .unwrap();

    let err = m
        .update_status(&order.order_id, OrderStatus::Pendiente, None, &cashier())
        .unwrap_err();
    assert!(matches!(err, OrderError::MissingTable(_)));

    // Supplying the table in the same call resolves it
    let order = m
        .update_status(&order.order_id, OrderStatus::Pendiente, Some(8), &cashier())
        .unwrap();
    assert_eq!(order.table_id, Some(8));

    let occupancy = m.table_occupancy().unwrap();
    assert_eq!(occupancy.get(&8).unwrap().status, OrderStatus::Pendiente);
}

#[test]
fn test_confirm_onto_occupied_table_conflicts() {
    let m = manager();
    let holder = m.open_order(None, vec![], Some(3), &waiter()).unwrap();

    let order = m
        .open_order(None, vec![item("Plato", 12000.0, 1, 8.0)], None, &waiter())
        .unwrap();
    let err = m
        .update_status(&order.order_id, OrderStatus::Pendiente, Some(3), &cashier())
        .unwrap_err();
    assert!(matches!(err, OrderError::TableConflict(_)));

    // Loser keeps its previous state
    let unchanged = m.get_order(&order.order_id).unwrap().unwrap();
    assert_eq!(unchanged.status, OrderStatus::PorAprobar);
    assert_eq!(
        m.table_occupancy().unwrap().get(&3).unwrap().order_id,
        holder.order_id
    );
}

#[test]
fn test_invalid_transitions_rejected() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Plato", 12000.0, 1, 8.0)], Some(1), &waiter())
        .unwrap();

    // POR_APROBAR cannot jump straight to LISTO or ENTREGADO
    let err = m
        .update_status(&order.order_id, OrderStatus::Listo, None, &cashier())
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidOperation(_)));
    let err = m
        .update_status(&order.order_id, OrderStatus::Entregado, None, &cashier())
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidOperation(_)));

    // PAGADO is never settable directly
    let err = m
        .update_status(&order.order_id, OrderStatus::Pagado, None, &admin())
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidOperation(_)));
}

#[test]
fn test_status_role_guards() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Plato", 12000.0, 1, 8.0)], Some(1), &waiter())
        .unwrap();

    // Waiters cannot drive the state machine
    let err = m
        .update_status(&order.order_id, OrderStatus::Pendiente, None, &waiter())
        .unwrap_err();
    assert!(matches!(err, OrderError::PermissionDenied(_)));

    // Cashiers cannot close
    let err = m
        .update_status(&order.order_id, OrderStatus::Cerrado, None, &cashier())
        .unwrap_err();
    assert!(matches!(err, OrderError::PermissionDenied(_)));

    // Admins can close from any non-terminal state, releasing the table
    let order = m
        .update_status(&order.order_id, OrderStatus::Cerrado, None, &admin())
        .unwrap();
    assert_eq!(order.status, OrderStatus::Cerrado);
    assert!(m.table_occupancy().unwrap().is_empty());
    assert!(m.list_active().unwrap().is_empty());
}

#[test]
fn test_terminal_orders_are_locked() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Plato", 12000.0, 1, 8.0)], Some(1), &waiter())
        .unwrap();
    m.update_status(&order.order_id, OrderStatus::Cerrado, None, &admin())
        .unwrap();

    let err = m
        .add_item(&order.order_id, item("Postre", 4000.0, 1, 8.0), &admin())
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderLocked(_)));

    let err = m
        .remove_item(&order.order_id, "whatever", &admin())
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderLocked(_)));

    let err = m
        .update_status(&order.order_id, OrderStatus::Pendiente, None, &admin())
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderLocked(_)));

    let err = m
        .mark_printed(&order.order_id, vec!["x".to_string()], &admin())
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderLocked(_)));

    // Even re-applying the terminal status itself is locked out
    let err = m
        .update_status(&order.order_id, OrderStatus::Cerrado, None, &admin())
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderLocked(_)));
}

// ========== Customer ==========

#[test]
fn test_set_and_clear_customer() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Plato", 12000.0, 1, 8.0)], None, &waiter())
        .unwrap();

    let order = m
        .set_customer(
            &order.order_id,
            CustomerChange {
                name: Some("Marta".to_string()),
                phone: Some("3001234567".to_string()),
                document: None,
                user_id: None,
                clear: false,
            },
            &waiter(),
        )
        .unwrap();
    assert_eq!(order.customer.as_ref().unwrap().name.as_deref(), Some("Marta"));

    let order = m
        .set_customer(
            &order.order_id,
            CustomerChange {
                name: None,
                phone: None,
                document: None,
                user_id: Some(42),
                clear: false,
            },
            &waiter(),
        )
        .unwrap();
    assert_eq!(order.customer.as_ref().unwrap().user_id, Some(42));

    let order = m
        .set_customer(
            &order.order_id,
            CustomerChange {
                name: None,
                phone: None,
                document: None,
                user_id: None,
                clear: true,
            },
            &waiter(),
        )
        .unwrap();
    assert!(order.customer.is_none());
}

// ========== Kitchen printing ==========

#[test]
fn test_mark_printed_flow() {
    let m = manager();
    let order = m
        .open_order(
            None,
            vec![item("Plato", 12000.0, 2, 8.0), item("Jugo", 4000.0, 3, 0.0)],
            Some(1),
            &waiter(),
        )
        .unwrap();
    assert_eq!(order.pending_print_quantity(), 5);

    let ids: Vec<String> = order.items.iter().map(|i| i.id.clone()).collect();
    let order = m.mark_printed(&order.order_id, ids.clone(), &waiter()).unwrap();

    // Printing implicitly confirmed the order
    assert_eq!(order.status, OrderStatus::Pendiente);
    assert_eq!(order.pending_print_quantity(), 0);
    assert_eq!(order.print_runs.len(), 1);
    assert_eq!(order.print_runs[0].run, 1);
    assert_eq!(
        order.print_runs[0].lines.iter().map(|l| l.quantity).sum::<i64>(),
        5
    );

    // Nothing pending → second run is rejected
    let err = m.mark_printed(&order.order_id, ids.clone(), &waiter()).unwrap_err();
    assert!(matches!(err, OrderError::InvalidOperation(_)));

    // Quantity bump re-opens the pending window; run number is monotonic
    let order = m
        .update_item(
            &order.order_id,
            &ids[0],
            ItemChanges {
                quantity: Some(4),
                note: None,
            },
            &cashier(),
        )
        .unwrap();
    assert_eq!(order.pending_print_quantity(), 2);

    let order = m.mark_printed(&order.order_id, ids, &waiter()).unwrap();
    assert_eq!(order.print_runs.len(), 2);
    assert_eq!(order.print_runs[1].run, 2);
    assert_eq!(order.print_runs[1].lines[0].quantity, 2);
}

#[test]
fn test_mark_printed_without_table_fails() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Plato", 12000.0, 1, 8.0)], None, &waiter())
        .unwrap();
    let ids = vec![order.items[0].id.clone()];

    let err = m.mark_printed(&order.order_id, ids, &waiter()).unwrap_err();
    assert!(matches!(err, OrderError::MissingTable(_)));
}

// ========== Moving items ==========

#[test]
fn test_move_item_conserves_counts() {
    let m = manager();
    let source = m
        .open_order(
            None,
            vec![item("Plato", 12000.0, 1, 8.0), item("Jugo", 4000.0, 2, 0.0)],
            Some(1),
            &waiter(),
        )
        .unwrap();
    let moved_id = source.items[1].id.clone();

    let outcome = m
        .move_item(&source.order_id, &moved_id, 2, &waiter())
        .unwrap();

    assert_eq!(outcome.source.items.len(), 1);
    assert_eq!(outcome.destination.items.len(), 1);
    // Transferred by reference: same item id on the destination
    assert_eq!(outcome.destination.items[0].id, moved_id);
    assert_eq!(outcome.destination.table_id, Some(2));
    assert_bills_invariant(&outcome.source);
    assert_bills_invariant(&outcome.destination);
    assert_eq!(outcome.source.bills.total, 12000.0);
    assert_eq!(outcome.destination.bills.total, 8000.0);

    // Destination shell order claimed its table
    let occupancy = m.table_occupancy().unwrap();
    assert_eq!(occupancy.get(&2).unwrap().order_id, outcome.destination.order_id);
}

#[test]
fn test_move_item_to_occupied_table_joins_existing_order() {
    let m = manager();
    let dest = m
        .add_item_to_table(2, item("Tinto", 2000.0, 1, 0.0), &waiter())
        .unwrap();
    let source = m
        .open_order(None, vec![item("Plato", 12000.0, 1, 8.0)], Some(1), &waiter())
        .unwrap();

    let outcome = m
        .move_item(&source.order_id, &source.items[0].id, 2, &waiter())
        .unwrap();

    assert_eq!(outcome.destination.order_id, dest.order_id);
    assert_eq!(outcome.destination.items.len(), 2);
    assert!(outcome.source.items.is_empty());
}

#[test]
fn test_move_item_same_table_is_noop() {
    let m = manager();
    let source = m
        .open_order(None, vec![item("Plato", 12000.0, 1, 8.0)], Some(1), &waiter())
        .unwrap();

    let outcome = m
        .move_item(&source.order_id, &source.items[0].id, 1, &waiter())
        .unwrap();
    assert_eq!(outcome.source, outcome.destination);
    assert_eq!(outcome.source.items.len(), 1);
}

// ========== Settlement ==========

#[test]
fn test_cash_settlement_with_change() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Parrillada", 45000.0, 1, 19.0)], Some(1), &waiter())
        .unwrap();
    assert_eq!(order.bills.total, 45000.0);

    let mut action = settle_action(&order.order_id, PaymentCategory::Cash);
    action.tip_amount = 5000.0;
    action.cash_amount = Some(60000.0);

    let (order, invoice) = m.settle_order(action, &cashier()).unwrap();

    assert_eq!(order.status, OrderStatus::Pagado);
    assert_eq!(invoice.totals.total, 50000.0);
    assert_eq!(invoice.totals.tip, 5000.0);
    assert_eq!(invoice.change, 10000.0);
    assert_eq!(invoice.cash_amount, Some(60000.0));
    assert_eq!(invoice.invoice_number, 1);
    // Tip is untaxed: tax stays the order's tax
    assert_eq!(invoice.totals.tax, order.bills.tax);

    // Table released, order no longer live
    assert!(m.table_occupancy().unwrap().is_empty());
    assert!(m.list_active().unwrap().is_empty());
}

#[test]
fn test_cash_settlement_insufficient() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Parrillada", 45000.0, 1, 19.0)], Some(1), &waiter())
        .unwrap();

    let mut action = settle_action(&order.order_id, PaymentCategory::Cash);
    action.tip_amount = 5000.0;
    action.cash_amount = Some(40000.0);

    let err = m.settle_order(action, &cashier()).unwrap_err();
    match err {
        OrderError::InsufficientPayment { required, tendered } => {
            assert_eq!(required, 50000.0);
            assert_eq!(tendered, 40000.0);
        }
        other => panic!("Expected InsufficientPayment, got {other:?}"),
    }

    // Failed settlement leaves the order untouched
    let unchanged = m.get_order(&order.order_id).unwrap().unwrap();
    assert_eq!(unchanged.status, OrderStatus::PorAprobar);
    assert!(unchanged.invoice.is_none());
    assert!(!m.table_occupancy().unwrap().is_empty());
}

#[test]
fn test_cash_settlement_requires_amount() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Plato", 10000.0, 1, 8.0)], None, &waiter())
        .unwrap();

    let action = settle_action(&order.order_id, PaymentCategory::Cash);
    let err = m.settle_order(action, &cashier()).unwrap_err();
    assert!(matches!(err, OrderError::InvalidOperation(_)));
}

#[test]
fn test_card_settlement_has_no_change() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Plato", 10000.0, 1, 8.0)], None, &waiter())
        .unwrap();

    let mut action = settle_action(&order.order_id, PaymentCategory::Card);
    action.cash_amount = Some(999999.0); // ignored for non-cash

    let (_, invoice) = m.settle_order(action, &cashier()).unwrap();
    assert_eq!(invoice.change, 0.0);
    assert_eq!(invoice.cash_amount, None);
    assert_eq!(invoice.payment_category, "card");
}

#[test]
fn test_invoice_numbers_strictly_increase() {
    let m = manager();
    let mut numbers = Vec::new();
    for _ in 0..3 {
        let order = m
            .open_order(None, vec![item("Plato", 10000.0, 1, 8.0)], None, &waiter())
            .unwrap();
        let (_, invoice) = m
            .settle_order(
                settle_action(&order.order_id, PaymentCategory::Transfer),
                &cashier(),
            )
            .unwrap();
        numbers.push(invoice.invoice_number);
    }
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn test_settlement_guards() {
    let m = manager();

    // Empty order cannot be invoiced
    let empty = m.open_order(None, vec![], Some(1), &waiter()).unwrap();
    let err = m
        .settle_order(settle_action(&empty.order_id, PaymentCategory::Transfer), &cashier())
        .unwrap_err();
    assert!(matches!(err, OrderError::InvalidOperation(_)));

    // Waiters cannot settle
    let order = m
        .open_order(None, vec![item("Plato", 10000.0, 1, 8.0)], None, &waiter())
        .unwrap();
    let err = m
        .settle_order(settle_action(&order.order_id, PaymentCategory::Transfer), &waiter())
        .unwrap_err();
    assert!(matches!(err, OrderError::PermissionDenied(_)));

    // Settling twice hits the terminal lock
    m.settle_order(settle_action(&order.order_id, PaymentCategory::Transfer), &cashier())
        .unwrap();
    let err = m
        .settle_order(settle_action(&order.order_id, PaymentCategory::Transfer), &cashier())
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderLocked(_)));

    // PAGADO locks the ledger just like CERRADO
    let err = m
        .add_item(&order.order_id, item("Postre", 4000.0, 1, 8.0), &admin())
        .unwrap_err();
    assert!(matches!(err, OrderError::OrderLocked(_)));
}

#[test]
fn test_purge_archived() {
    let m = manager();
    let order = m
        .open_order(None, vec![item("Plato", 10000.0, 1, 8.0)], None, &waiter())
        .unwrap();

    // Still active → refuse to purge
    let err = m.purge_archived(&order.order_id).unwrap_err();
    assert!(matches!(err, OrderError::InvalidOperation(_)));

    m.settle_order(settle_action(&order.order_id, PaymentCategory::Transfer), &cashier())
        .unwrap();
    m.purge_archived(&order.order_id).unwrap();
    assert!(m.get_order(&order.order_id).unwrap().is_none());
}
