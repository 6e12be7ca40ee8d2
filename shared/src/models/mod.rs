//! Data models
//!
//! Wire shapes of the ordering API. Ids are the backend's string object ids,
//! money is `Decimal` (sent as JSON numbers).

pub mod drink;
pub mod institution;
pub mod order;
pub mod settings;

// Re-exports
pub use drink::*;
pub use institution::*;
pub use order::*;
pub use settings::*;
