//! Client session
//!
//! Owns the stores of one device session and wires them to the API. Created
//! once at start-up and passed to whatever drives the views; there is no
//! global state.

use std::sync::Arc;

use shared::models::Order;
use tokio::sync::Mutex;
use url::Url;

use crate::api::{ApiClient, OrderApi, SettingsApi};
use crate::cart::CartStore;
use crate::checkout::{self, CheckoutOutcome, CheckoutRequest};
use crate::guard::AccessGuard;
use crate::poller::{PollWaker, Poller};
use crate::preferences::{Preferences, Screen};
use crate::reconciler::{PaymentRedirect, Reconciler, RedirectOutcome};
use crate::registry::OrderRegistry;
use crate::storage::{FileStore, SharedStore};
use crate::tracker::{OrderTracker, RefreshReport};
use crate::{ClientConfig, ClientResult};

pub struct Session {
    config: ClientConfig,
    store: SharedStore,
    orders: Arc<dyn OrderApi>,
    cart: Arc<Mutex<CartStore>>,
    registry: Arc<Mutex<OrderRegistry>>,
    reconciler: Mutex<Reconciler>,
    guard: AccessGuard,
    preferences: Preferences,
    my_orders_waker: std::sync::Mutex<Option<PollWaker>>,
}

impl Session {
    /// Build a session over an explicit store and API
    pub fn new<A>(config: ClientConfig, store: SharedStore, api: Arc<A>) -> Self
    where
        A: OrderApi + SettingsApi + 'static,
    {
        let orders: Arc<dyn OrderApi> = api.clone();
        let settings: Arc<dyn SettingsApi> = api;

        let cart = CartStore::load(store.clone());
        let registry = OrderRegistry::load(store.clone());
        tracing::info!(
            cart_lines = cart.items().len(),
            my_orders = registry.len(),
            "Session restored"
        );

        Self {
            reconciler: Mutex::new(Reconciler::new(orders.clone())),
            guard: AccessGuard::new(settings, store.clone()),
            preferences: Preferences::new(store.clone()),
            cart: Arc::new(Mutex::new(cart)),
            registry: Arc::new(Mutex::new(registry)),
            my_orders_waker: std::sync::Mutex::new(None),
            config,
            store,
            orders,
        }
    }

    /// File-backed session talking to the configured API
    pub fn open(config: ClientConfig) -> ClientResult<Self> {
        let api = Arc::new(ApiClient::from_config(&config)?);
        let store: SharedStore = Arc::new(FileStore::new(&config.data_dir));
        Ok(Self::new(config, store, api))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn cart(&self) -> Arc<Mutex<CartStore>> {
        self.cart.clone()
    }

    pub fn registry(&self) -> Arc<Mutex<OrderRegistry>> {
        self.registry.clone()
    }

    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn tracker(&self) -> OrderTracker {
        OrderTracker::new(self.orders.clone(), self.registry.clone())
    }

    /// Remember an order id; a running my-orders watch refreshes immediately.
    pub async fn register_order(&self, order_id: &str) -> bool {
        let inserted = self.registry.lock().await.register_order(order_id);
        if inserted {
            self.wake_my_orders();
        }
        inserted
    }

    /// Place an order for the cart; stores are not locked during the request.
    pub async fn checkout(&self, request: CheckoutRequest) -> ClientResult<CheckoutOutcome> {
        let body = {
            let cart = self.cart.lock().await;
            checkout::build_order_request(&cart, &request)?
        };

        let response = self.orders.create_order(&body).await.inspect_err(|e| {
            tracing::error!(error = %e, "Failed to place order");
        })?;

        let outcome = {
            let mut cart = self.cart.lock().await;
            let mut registry = self.registry.lock().await;
            checkout::apply_order_response(response, &mut cart, &mut registry, &*self.store)
        };
        if matches!(outcome, CheckoutOutcome::Placed { .. }) {
            self.wake_my_orders();
        }
        Ok(outcome)
    }

    /// Reconcile a payment redirect landing on the my-orders view
    pub async fn handle_redirect(&self, location: &Url) -> RedirectOutcome {
        let redirect = PaymentRedirect::from_url(location);
        // The reconciler lock serialises concurrent landings on the same query
        let verification = self.reconciler.lock().await.verify(&redirect).await;

        let outcome = {
            let mut registry = self.registry.lock().await;
            Reconciler::apply(verification, &mut registry, &*self.store)
        };
        if matches!(outcome, RedirectOutcome::Verified { registered: Some(_) }) {
            self.wake_my_orders();
        }
        outcome
    }

    /// Poll the registered orders on the my-orders interval.
    ///
    /// No request is made while the registry is empty; registering an order
    /// through this session wakes the watch at once.
    pub fn watch_my_orders<F>(&self, on_update: F) -> Poller
    where
        F: Fn(RefreshReport) + Send + Sync + 'static,
    {
        let tracker = Arc::new(self.tracker());
        let on_update = Arc::new(on_update);
        let poller = Poller::spawn("my_orders", self.config.order_poll_interval(), move || {
            let tracker = tracker.clone();
            let on_update = on_update.clone();
            async move {
                on_update(tracker.refresh().await);
            }
        });

        *self
            .my_orders_waker
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(poller.waker());
        poller
    }

    /// Poll one order on the single-order view interval
    pub fn watch_order<F>(&self, order_id: &str, on_update: F) -> Poller
    where
        F: Fn(ClientResult<Order>) + Send + Sync + 'static,
    {
        let api = self.orders.clone();
        let order_id = order_id.to_string();
        let on_update = Arc::new(on_update);
        Poller::spawn("order", self.config.board_poll_interval(), move || {
            let api = api.clone();
            let order_id = order_id.clone();
            let on_update = on_update.clone();
            async move {
                on_update(api.get_order(&order_id).await);
            }
        })
    }

    /// Poll the order list for a staff screen's selected branch.
    ///
    /// Returns `None` when the screen still needs a branch; the kitchen
    /// falls back to all branches.
    pub fn watch_branch_orders<F>(&self, screen: Screen, on_update: F) -> Option<Poller>
    where
        F: Fn(ClientResult<Vec<Order>>) + Send + Sync + 'static,
    {
        let selection = self.preferences.branch(screen);
        if !selection.is_selected() && screen != Screen::Kitchen {
            tracing::debug!(?screen, "No branch selected, not polling");
            return None;
        }

        let interval = match screen {
            Screen::Cashier | Screen::Queue => self.config.board_poll_interval(),
            Screen::Kitchen | Screen::AdminOrders => self.config.order_poll_interval(),
        };
        let name = match screen {
            Screen::Cashier => "cashier",
            Screen::Queue => "queue",
            Screen::Kitchen => "kitchen",
            Screen::AdminOrders => "admin_orders",
        };

        let api = self.orders.clone();
        let institution_id = selection.institution_id;
        let on_update = Arc::new(on_update);
        Some(Poller::spawn(name, interval, move || {
            let api = api.clone();
            let institution_id = institution_id.clone();
            let on_update = on_update.clone();
            async move {
                on_update(api.list_orders(institution_id.as_deref()).await);
            }
        }))
    }

    fn wake_my_orders(&self) {
        if let Some(waker) = self
            .my_orders_waker
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            waker.wake();
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_url", &self.config.api_url)
            .finish_non_exhaustive()
    }
}
