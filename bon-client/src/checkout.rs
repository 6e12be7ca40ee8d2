//! Checkout: turn the cart into a backend order

use shared::error::{AppError, ErrorCode};
use shared::models::{CreateOrderRequest, CreateOrderResponse, PaymentMethod};
use shared::validation::{MAX_NOTE_LEN, validate_optional_text};

use crate::api::OrderApi;
use crate::cart::CartStore;
use crate::registry::OrderRegistry;
use crate::storage::LocalStore;
use crate::{ClientResult, reconciler};

/// Checkout form input
#[derive(Debug, Clone, Default)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    pub notes: String,
    pub institution_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Order created; its id is now in the registry
    Placed { order_id: String },
    /// Electronic payment: send the customer to the gateway
    RedirectToPayment {
        url: String,
        order_id: Option<String>,
    },
}

/// Build the create-order body from the current cart
pub fn build_order_request(
    cart: &CartStore,
    request: &CheckoutRequest,
) -> ClientResult<CreateOrderRequest> {
    if cart.is_empty() {
        return Err(AppError::with_message(ErrorCode::CartEmpty, "Your cart is empty").into());
    }
    let notes = request.notes.trim().to_string();
    validate_optional_text(&Some(notes.clone()), "notes", MAX_NOTE_LEN)?;

    Ok(CreateOrderRequest {
        items: cart.to_order_lines(),
        payment_method: request.payment_method,
        notes,
        institution_id: request.institution_id.clone().filter(|id| !id.is_empty()),
    })
}

/// Apply a successful create-order response to local state
pub fn apply_order_response(
    response: CreateOrderResponse,
    cart: &mut CartStore,
    registry: &mut OrderRegistry,
    store: &dyn LocalStore,
) -> CheckoutOutcome {
    let outcome = match response {
        CreateOrderResponse::Created(order) => {
            registry.register_order(&order.id);
            tracing::info!(order_id = %order.id, order_number = %order.order_number, "Order placed");
            CheckoutOutcome::Placed { order_id: order.id }
        }
        CreateOrderResponse::PaymentRedirect(redirect) => {
            match &redirect.order_id {
                Some(order_id) => reconciler::set_pending_order(store, order_id),
                None => tracing::warn!("Payment redirect without order id, nothing to track"),
            }
            tracing::info!(order_id = ?redirect.order_id, "Redirecting to payment gateway");
            CheckoutOutcome::RedirectToPayment {
                url: redirect.payment_url,
                order_id: redirect.order_id,
            }
        }
    };
    cart.clear();
    outcome
}

/// Place an order for the cart contents.
///
/// On API failure the cart is left untouched and the error is returned.
pub async fn checkout(
    cart: &mut CartStore,
    registry: &mut OrderRegistry,
    store: &dyn LocalStore,
    api: &dyn OrderApi,
    request: CheckoutRequest,
) -> ClientResult<CheckoutOutcome> {
    let body = build_order_request(cart, &request)?;
    let response = api.create_order(&body).await.inspect_err(|e| {
        tracing::error!(error = %e, "Failed to place order");
    })?;
    Ok(apply_order_response(response, cart, registry, store))
}
