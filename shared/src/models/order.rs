//! Order Model
//!
//! Orders are owned by the backend; the client only reads them, creates
//! them from a cart, and pushes status changes from staff screens.

use super::drink::{Customizations, Size};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Order status as reported by the backend
///
/// Unrecognised values are kept verbatim in [`OrderStatus::Unknown`] so a
/// newer backend never breaks deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Preparing,
    Ready,
    Completed,
    Cancelled,
    /// Electronic payment started, gateway has not confirmed yet
    AwaitingPayment,
    /// Customer must pay a cashier before the kitchen starts
    WaitingForCash,
    Unknown(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::AwaitingPayment => "awaiting_payment",
            OrderStatus::WaitingForCash => "waiting_for_cash",
            OrderStatus::Unknown(s) => s.as_str(),
        }
    }

    /// Completed or cancelled
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// Translation key used by the order list
    pub fn label_key(&self) -> String {
        match self {
            OrderStatus::AwaitingPayment | OrderStatus::WaitingForCash | OrderStatus::Unknown(_) => {
                self.as_str().to_string()
            }
            other => format!("status.{}", other.as_str()),
        }
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "pending" => OrderStatus::Pending,
            "paid" => OrderStatus::Paid,
            "preparing" => OrderStatus::Preparing,
            "ready" => OrderStatus::Ready,
            "completed" => OrderStatus::Completed,
            "cancelled" => OrderStatus::Cancelled,
            "awaiting_payment" => OrderStatus::AwaitingPayment,
            "waiting_for_cash" => OrderStatus::WaitingForCash,
            _ => OrderStatus::Unknown(value),
        }
    }
}

impl From<&str> for OrderStatus {
    fn from(value: &str) -> Self {
        OrderStatus::from(value.to_string())
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Payment method chosen at checkout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Cash,
    /// Card payment through the Paymob gateway (redirect flow)
    Paymob,
    /// Mobile wallet transfer
    Wallet,
    #[serde(other)]
    Other,
}

/// Payment status of an order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
    Failed,
    #[serde(other)]
    Other,
}

/// Order line as stored by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drink_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Unit price in EGP
    #[serde(default, with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub customizations: Customizations,
}

fn default_quantity() -> u32 {
    1
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Order as fetched from the API (read-only projection)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    /// Short number shown on the queue screen
    #[serde(default, deserialize_with = "deserialize_order_number")]
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    /// Total in EGP
    #[serde(default, with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// The backend has sent the order number both as a number and a string
fn deserialize_order_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
        Missing(()),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
        Raw::Missing(()) => String::new(),
    })
}

impl Order {
    /// Number of cups in the order
    pub fn cup_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// ============================================================================
// Request payloads
// ============================================================================

/// One line of a new order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub drink_id: String,
    pub size: Size,
    pub quantity: u32,
    pub customizations: Customizations,
}

/// `POST /order/create` body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLineRequest>,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<String>,
}

/// Gateway redirect returned instead of an order for electronic payments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRedirectResponse {
    pub payment_url: String,
    #[serde(default, alias = "_id", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
}

/// `POST /order/create` response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum CreateOrderResponse {
    PaymentRedirect(PaymentRedirectResponse),
    Created(Box<Order>),
}

/// `PUT /order/{id}` body
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

impl UpdateOrderStatus {
    pub fn status(status: OrderStatus) -> Self {
        Self {
            status: Some(status),
            payment_status: None,
        }
    }

    /// Cashier confirmation of an in-person payment
    pub fn cash_received() -> Self {
        Self {
            status: Some(OrderStatus::Paid),
            payment_status: Some(PaymentStatus::Paid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::drink::Sugar;

    #[test]
    fn test_order_from_api_json() {
        let json = r#"{
            "_id": "abc123",
            "orderNumber": 42,
            "status": "waiting_for_cash",
            "paymentMethod": "cash",
            "paymentStatus": "unpaid",
            "totalPrice": 110,
            "items": [
                {"drinkId": "d1", "title": "Latte", "size": "medium", "quantity": 2, "price": 45,
                 "customizations": {"sugar": "no_sugar", "spiced": false}},
                {"title": "Tea", "size": "small", "price": 20, "customizations": {"sugar": true}}
            ],
            "createdAt": "2025-03-01T10:15:00.000Z",
            "institutionId": "inst-1"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.id, "abc123");
        assert_eq!(order.order_number, "42");
        assert_eq!(order.status, OrderStatus::WaitingForCash);
        assert_eq!(order.total_price, Decimal::from(110));
        assert_eq!(order.items[1].quantity, 1);
        assert_eq!(order.items[1].customizations.sugar, Sugar::OneShot);
        assert_eq!(order.cup_count(), 3);
        assert_eq!(order.items[0].line_total(), Decimal::from(90));
        assert!(order.created_at.is_some());
    }

    #[test]
    fn test_order_minimal_json_uses_defaults() {
        let order: Order = serde_json::from_str(r#"{"_id":"x","orderNumber":"A-7"}"#).unwrap();
        assert_eq!(order.order_number, "A-7");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_method, PaymentMethod::Cash);
        assert_eq!(order.payment_status, PaymentStatus::Unpaid);
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let order: Order = serde_json::from_str(r#"{"_id":"x","status":"refunded"}"#).unwrap();
        assert_eq!(order.status, OrderStatus::Unknown("refunded".into()));
        assert_eq!(serde_json::to_string(&order.status).unwrap(), r#""refunded""#);
    }

    #[test]
    fn test_status_label_key() {
        assert_eq!(OrderStatus::Ready.label_key(), "status.ready");
        assert_eq!(OrderStatus::WaitingForCash.label_key(), "waiting_for_cash");
    }

    #[test]
    fn test_create_order_response_variants() {
        let redirect: CreateOrderResponse =
            serde_json::from_str(r#"{"paymentUrl":"https://pay.example/x","orderId":"o9"}"#).unwrap();
        assert_eq!(
            redirect,
            CreateOrderResponse::PaymentRedirect(PaymentRedirectResponse {
                payment_url: "https://pay.example/x".into(),
                order_id: Some("o9".into()),
            })
        );

        let created: CreateOrderResponse =
            serde_json::from_str(r#"{"_id":"o1","status":"waiting_for_cash"}"#).unwrap();
        match created {
            CreateOrderResponse::Created(order) => assert_eq!(order.id, "o1"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_update_status_body() {
        let body = serde_json::to_value(UpdateOrderStatus::cash_received()).unwrap();
        assert_eq!(body, serde_json::json!({"status": "paid", "paymentStatus": "paid"}));

        let body = serde_json::to_value(UpdateOrderStatus::status(OrderStatus::Preparing)).unwrap();
        assert_eq!(body, serde_json::json!({"status": "preparing"}));
    }
}
