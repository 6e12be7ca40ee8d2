//! Bon Client - ordering client core for the Bet El Bon coffee shop
//!
//! Talks to the ordering backend over HTTP and keeps the device-local state
//! (cart, my-orders registry, preferences, access flags) that the kiosk,
//! cashier, queue, kitchen and admin views are driven from.

pub mod api;
pub mod boards;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod guard;
pub mod http;
pub mod logger;
pub mod menu;
pub mod poller;
pub mod preferences;
pub mod projector;
pub mod reconciler;
pub mod registry;
pub mod session;
pub mod storage;
pub mod tracker;

pub use api::{ApiClient, InstitutionApi, MenuApi, OrderApi, SettingsApi};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use http::{HttpClient, NetworkHttpClient};
pub use session::Session;
pub use storage::{FileStore, LocalStore, MemoryStore, SharedStore};

// Re-export shared types for convenience
pub use shared::models::{Drink, Institution, Order, OrderStatus, PaymentMethod};
