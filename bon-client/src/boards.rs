//! Staff boards
//!
//! Projections of the branch order list for the kitchen, cashier, queue
//! display and admin order screens, plus the status transitions they push.

use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderStatus, UpdateOrderStatus};

use crate::ClientResult;
use crate::api::OrderApi;

/// Next kitchen status: pending|paid → preparing → ready → completed
pub fn next_status(status: &OrderStatus) -> Option<OrderStatus> {
    match status {
        OrderStatus::Pending | OrderStatus::Paid => Some(OrderStatus::Preparing),
        OrderStatus::Preparing => Some(OrderStatus::Ready),
        OrderStatus::Ready => Some(OrderStatus::Completed),
        _ => None,
    }
}

/// Button caption for the next kitchen action
pub fn next_action_label(status: &OrderStatus) -> Option<&'static str> {
    match status {
        OrderStatus::Pending | OrderStatus::Paid => Some("Start Preparing"),
        OrderStatus::Preparing => Some("Mark Ready"),
        OrderStatus::Ready => Some("Complete Order"),
        _ => None,
    }
}

/// Orders the kitchen still has to work on
pub fn kitchen_orders(orders: &[Order]) -> Vec<&Order> {
    orders
        .iter()
        .filter(|o| {
            !o.status.is_terminal()
                && !matches!(
                    o.status,
                    OrderStatus::AwaitingPayment | OrderStatus::WaitingForCash
                )
        })
        .collect()
}

/// Orders waiting for an in-person payment, oldest first
pub fn cashier_queue(orders: &[Order]) -> Vec<&Order> {
    let mut queue: Vec<&Order> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::WaitingForCash)
        .collect();
    // 无时间戳的排在最后
    queue.sort_by_key(|o| (o.created_at.is_none(), o.created_at));
    queue
}

/// Order numbers shown on the customer-facing queue screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueBoard {
    pub preparing: Vec<String>,
    pub ready: Vec<String>,
}

pub fn queue_board(orders: &[Order]) -> QueueBoard {
    let mut board = QueueBoard::default();
    for order in orders {
        match order.status {
            OrderStatus::Preparing => board.preparing.push(order.order_number.clone()),
            OrderStatus::Ready => board.ready.push(order.order_number.clone()),
            _ => {}
        }
    }
    board
}

fn status_priority(status: &OrderStatus) -> u8 {
    match status {
        OrderStatus::Pending => 0,
        OrderStatus::Preparing => 1,
        OrderStatus::Ready => 2,
        OrderStatus::Completed => 3,
        OrderStatus::Cancelled => 4,
        _ => 5,
    }
}

/// Admin order list: by status priority, then newest first
pub fn admin_orders(orders: &[Order]) -> Vec<&Order> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| {
        status_priority(&a.status)
            .cmp(&status_priority(&b.status))
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    sorted
}

/// Push the next kitchen transition for an order
pub async fn advance_order(api: &dyn OrderApi, order: &Order) -> ClientResult<Order> {
    let next = next_status(&order.status).ok_or_else(|| {
        AppError::with_message(
            ErrorCode::OrderInvalidTransition,
            format!("Order {} cannot advance from {}", order.order_number, order.status),
        )
    })?;
    tracing::info!(order_id = %order.id, from = %order.status, to = %next, "Advancing order");
    api.update_order(&order.id, &UpdateOrderStatus::status(next)).await
}

/// Cashier confirmation of an in-person payment
pub async fn confirm_cash_payment(api: &dyn OrderApi, order: &Order) -> ClientResult<Order> {
    if order.status != OrderStatus::WaitingForCash {
        return Err(AppError::with_message(
            ErrorCode::OrderInvalidTransition,
            format!("Order {} is not waiting for cash", order.order_number),
        )
        .into());
    }
    tracing::info!(order_id = %order.id, "Cash payment confirmed");
    api.update_order(&order.id, &UpdateOrderStatus::cash_received()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, number: u32, status: &str, created_at: Option<&str>) -> Order {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "orderNumber": number,
            "status": status,
            "createdAt": created_at,
        }))
        .unwrap()
    }

    #[test]
    fn test_kitchen_transition_chain() {
        let mut status = OrderStatus::Pending;
        let mut seen = vec![];
        while let Some(next) = next_status(&status) {
            seen.push(next.clone());
            status = next;
        }
        assert_eq!(
            seen,
            vec![OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Completed]
        );
        assert_eq!(next_status(&OrderStatus::Paid), Some(OrderStatus::Preparing));
        assert_eq!(next_status(&OrderStatus::WaitingForCash), None);
        assert_eq!(next_action_label(&OrderStatus::Preparing), Some("Mark Ready"));
    }

    #[test]
    fn test_kitchen_filter() {
        let orders = vec![
            order("a", 1, "pending", None),
            order("b", 2, "completed", None),
            order("c", 3, "awaiting_payment", None),
            order("d", 4, "waiting_for_cash", None),
            order("e", 5, "ready", None),
            order("f", 6, "cancelled", None),
        ];
        let ids: Vec<&str> = kitchen_orders(&orders).iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "e"]);
    }

    #[test]
    fn test_cashier_queue_oldest_first() {
        let orders = vec![
            order("late", 1, "waiting_for_cash", Some("2025-03-01T10:00:00Z")),
            order("paid", 2, "paid", Some("2025-03-01T08:00:00Z")),
            order("early", 3, "waiting_for_cash", Some("2025-03-01T09:00:00Z")),
            order("undated", 4, "waiting_for_cash", None),
        ];
        let ids: Vec<&str> = cashier_queue(&orders).iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "late", "undated"]);
    }

    #[test]
    fn test_queue_board() {
        let orders = vec![
            order("a", 11, "preparing", None),
            order("b", 12, "ready", None),
            order("c", 13, "pending", None),
            order("d", 14, "preparing", None),
        ];
        let board = queue_board(&orders);
        assert_eq!(board.preparing, vec!["11", "14"]);
        assert_eq!(board.ready, vec!["12"]);
    }

    #[test]
    fn test_admin_order_sort() {
        let orders = vec![
            order("done", 1, "completed", Some("2025-03-01T12:00:00Z")),
            order("p-old", 2, "pending", Some("2025-03-01T08:00:00Z")),
            order("odd", 3, "waiting_for_cash", Some("2025-03-01T13:00:00Z")),
            order("p-new", 4, "pending", Some("2025-03-01T09:00:00Z")),
            order("prep", 5, "preparing", Some("2025-03-01T07:00:00Z")),
        ];
        let ids: Vec<&str> = admin_orders(&orders).iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["p-new", "p-old", "prep", "done", "odd"]);
    }
}
