//! My-orders tracker
//!
//! Refreshes every locally registered order as one best-effort batch.

use std::sync::Arc;

use futures::future::join_all;
use shared::models::Order;
use tokio::sync::Mutex;

use crate::api::OrderApi;
use crate::registry::OrderRegistry;

/// Result of one refresh
#[derive(Debug, Clone, Default)]
pub struct RefreshReport {
    /// Fetched orders, newest first
    pub orders: Vec<Order>,
    /// Ids the backend no longer knows; already removed from the registry
    pub pruned: Vec<String>,
    /// Ids whose fetch failed for another reason (kept for the next cycle)
    pub failed: Vec<String>,
}

pub struct OrderTracker {
    api: Arc<dyn OrderApi>,
    registry: Arc<Mutex<OrderRegistry>>,
}

impl OrderTracker {
    pub fn new(api: Arc<dyn OrderApi>, registry: Arc<Mutex<OrderRegistry>>) -> Self {
        Self { api, registry }
    }

    /// Fetch all registered orders concurrently.
    ///
    /// No request is made while the registry is empty. Not-found ids are
    /// pruned in a single registry write; other failures are logged and
    /// skipped without affecting the rest of the batch.
    pub async fn refresh(&self) -> RefreshReport {
        let ids = self.registry.lock().await.load_all();
        if ids.is_empty() {
            return RefreshReport::default();
        }

        let results = join_all(ids.iter().map(|id| self.api.get_order(id))).await;

        let mut report = RefreshReport::default();
        for (id, result) in ids.into_iter().zip(results) {
            match result {
                Ok(order) => report.orders.push(order),
                Err(e) if e.is_not_found() => {
                    tracing::debug!(order_id = %id, "Order no longer exists");
                    report.pruned.push(id);
                }
                Err(e) => {
                    tracing::warn!(order_id = %id, error = %e, "Failed to refresh order");
                    report.failed.push(id);
                }
            }
        }

        if !report.pruned.is_empty() {
            tracing::warn!(
                count = report.pruned.len(),
                "Cleaning up deleted orders from history"
            );
            self.registry.lock().await.forget_many(&report.pruned);
        }

        sort_newest_first(&mut report.orders);
        report
    }
}

/// Newest first; orders without a timestamp go last
pub fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

impl std::fmt::Debug for OrderTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderTracker").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(id: &str, created_at: Option<&str>) -> Order {
        serde_json::from_value(serde_json::json!({
            "_id": id,
            "createdAt": created_at,
        }))
        .unwrap()
    }

    #[test]
    fn test_sort_newest_first() {
        let mut orders = vec![
            order("old", Some("2025-03-01T08:00:00Z")),
            order("none", None),
            order("new", Some("2025-03-01T09:00:00Z")),
        ];
        sort_newest_first(&mut orders);
        let ids: Vec<&str> = orders.iter().map(|o| o.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old", "none"]);
    }
}
