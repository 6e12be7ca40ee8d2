//! Payment redirect reconciliation
//!
//! After an electronic payment the gateway sends the customer back to the
//! my-orders view with `hmac` and `success` query parameters. The order id
//! was parked under `pendingPaymobOrder` at checkout; it is promoted into the
//! registry only once the backend has verified the redirect.

use std::collections::HashSet;
use std::sync::Arc;

use url::Url;

use crate::api::OrderApi;
use crate::registry::OrderRegistry;
use crate::storage::{LocalStore, keys};

/// Parsed redirect query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRedirect {
    query: String,
    hmac: Option<String>,
    success: Option<String>,
}

impl PaymentRedirect {
    /// Parse a raw query string (leading `?` optional)
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?').to_string();
        let mut hmac = None;
        let mut success = None;
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "hmac" if !value.is_empty() => hmac = Some(value.into_owned()),
                "success" => success = Some(value.into_owned()),
                _ => {}
            }
        }
        Self {
            query,
            hmac,
            success,
        }
    }

    pub fn from_url(url: &Url) -> Self {
        Self::from_query(url.query().unwrap_or_default())
    }

    /// The full query, forwarded verbatim to the verification endpoint
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_success(&self) -> bool {
        self.hmac.is_some() && self.success.as_deref() == Some("true")
    }

    pub fn is_failure(&self) -> bool {
        self.success.as_deref() == Some("false")
    }

    pub fn is_applicable(&self) -> bool {
        self.is_success() || self.is_failure()
    }
}

/// Result of reconciling one redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectOutcome {
    /// No payment parameters on this page load
    NotApplicable,
    /// Backend confirmed the payment; `registered` is the promoted id, if any
    Verified { registered: Option<String> },
    /// Verification call failed; the pending marker was dropped
    VerificationFailed { reason: String },
    /// Customer cancelled or the payment failed at the gateway
    Cancelled,
    /// This exact redirect was already reconciled in this session
    AlreadyHandled,
}

impl RedirectOutcome {
    /// Whether the view should replace its location with [`clean_location`]
    pub fn should_replace_location(&self) -> bool {
        matches!(
            self,
            RedirectOutcome::Verified { .. } | RedirectOutcome::Cancelled
        )
    }

    /// User-visible notice for failed payments
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            RedirectOutcome::Cancelled => Some("Payment was cancelled or failed."),
            RedirectOutcome::VerificationFailed { .. } => Some("Payment verification failed."),
            _ => None,
        }
    }
}

/// Outcome of the network half of reconciliation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    NotApplicable,
    AlreadyHandled,
    Verified,
    Failed(String),
    Cancelled,
}

/// The same location without query or fragment
pub fn clean_location(url: &Url) -> Url {
    let mut clean = url.clone();
    clean.set_query(None);
    clean.set_fragment(None);
    clean
}

// ── Pending marker ──────────────────────────────────────────────────

pub fn pending_order(store: &dyn LocalStore) -> Option<String> {
    match store.get(keys::PENDING_PAYMOB_ORDER) {
        Ok(id) => id.filter(|id| !id.is_empty()),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read pending payment marker");
            None
        }
    }
}

pub fn set_pending_order(store: &dyn LocalStore, order_id: &str) {
    if let Err(e) = store.set(keys::PENDING_PAYMOB_ORDER, order_id) {
        tracing::warn!(error = %e, order_id = %order_id, "Failed to park pending payment order");
    }
}

pub fn clear_pending_order(store: &dyn LocalStore) {
    if let Err(e) = store.remove(keys::PENDING_PAYMOB_ORDER) {
        tracing::warn!(error = %e, "Failed to clear pending payment marker");
    }
}

/// Payment redirect reconciler
///
/// Keeps the set of redirect queries already handled so a repeated call in
/// the same session neither verifies twice nor registers twice.
pub struct Reconciler {
    api: Arc<dyn OrderApi>,
    handled: HashSet<String>,
}

impl Reconciler {
    pub fn new(api: Arc<dyn OrderApi>) -> Self {
        Self {
            api,
            handled: HashSet::new(),
        }
    }

    /// Verify and apply in one step.
    pub async fn reconcile(
        &mut self,
        redirect: &PaymentRedirect,
        registry: &mut OrderRegistry,
        store: &dyn LocalStore,
    ) -> RedirectOutcome {
        let verification = self.verify(redirect).await;
        Self::apply(verification, registry, store)
    }

    /// Network half: calls the verification endpoint for success redirects.
    ///
    /// Touches no local state, so callers can run it without holding the
    /// registry lock.
    pub async fn verify(&mut self, redirect: &PaymentRedirect) -> Verification {
        if !redirect.is_applicable() {
            return Verification::NotApplicable;
        }
        if !self.handled.insert(redirect.query().to_string()) {
            tracing::debug!("Payment redirect already reconciled");
            return Verification::AlreadyHandled;
        }

        if redirect.is_failure() {
            tracing::warn!("Payment cancelled by user or failed at gateway");
            return Verification::Cancelled;
        }

        tracing::info!("Verifying payment redirect");
        match self.api.verify_payment(redirect.query()).await {
            Ok(()) => {
                tracing::info!("Payment verified");
                Verification::Verified
            }
            Err(e) => {
                tracing::error!(error = %e, "Payment verification failed");
                Verification::Failed(e.to_string())
            }
        }
    }

    /// Local half: promotes or drops the pending marker.
    pub fn apply(
        verification: Verification,
        registry: &mut OrderRegistry,
        store: &dyn LocalStore,
    ) -> RedirectOutcome {
        match verification {
            Verification::NotApplicable => RedirectOutcome::NotApplicable,
            Verification::AlreadyHandled => RedirectOutcome::AlreadyHandled,
            Verification::Verified => {
                let registered = pending_order(store).and_then(|id| {
                    let inserted = registry.register_order(&id);
                    clear_pending_order(store);
                    inserted.then_some(id)
                });
                RedirectOutcome::Verified { registered }
            }
            Verification::Failed(reason) => {
                clear_pending_order(store);
                RedirectOutcome::VerificationFailed { reason }
            }
            Verification::Cancelled => {
                clear_pending_order(store);
                RedirectOutcome::Cancelled
            }
        }
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("handled", &self.handled.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_success_redirect() {
        let redirect = PaymentRedirect::from_query("?id=1&success=true&hmac=abc");
        assert!(redirect.is_success());
        assert!(!redirect.is_failure());
        assert_eq!(redirect.query(), "id=1&success=true&hmac=abc");
    }

    #[test]
    fn test_success_requires_hmac() {
        assert!(!PaymentRedirect::from_query("success=true").is_applicable());
        assert!(!PaymentRedirect::from_query("success=true&hmac=").is_success());
    }

    #[test]
    fn test_parse_failure_and_plain_urls() {
        assert!(PaymentRedirect::from_query("success=false&hmac=x").is_failure());
        let url = Url::parse("https://shop.example/orders").unwrap();
        assert!(!PaymentRedirect::from_url(&url).is_applicable());
    }

    #[test]
    fn test_clean_location() {
        let url = Url::parse("https://shop.example/orders?success=true&hmac=abc#top").unwrap();
        assert_eq!(clean_location(&url).as_str(), "https://shop.example/orders");
    }

    #[test]
    fn test_outcome_flags() {
        assert!(RedirectOutcome::Cancelled.should_replace_location());
        assert!(RedirectOutcome::Verified { registered: None }.should_replace_location());
        assert!(!RedirectOutcome::AlreadyHandled.should_replace_location());
        assert!(
            !RedirectOutcome::VerificationFailed { reason: "x".into() }.should_replace_location()
        );
        assert!(RedirectOutcome::Cancelled.notice().is_some());
    }
}
