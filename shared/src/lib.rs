//! Shared types for the Bet El Bon ordering client
//!
//! Wire models, error codes and validation helpers used by the client core
//! and anything else that talks to the ordering API.

pub mod error;
pub mod models;
pub mod validation;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCode};
