//! Institution Model
//!
//! An institution is one branch of the shop. Orders and the staff screens
//! can be scoped to a single branch.

use crate::error::AppResult;
use crate::validation::{MAX_CODE_LEN, MAX_NAME_LEN, validate_required_text};
use serde::{Deserialize, Serialize};

/// Branch entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Short branch code printed on receipts
    #[serde(default)]
    pub code: String,
}

/// Create branch payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionCreate {
    pub name: String,
    pub code: String,
}

impl InstitutionCreate {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            code: code.into().trim().to_string(),
        }
    }

    /// Both fields are required.
    pub fn validate(&self) -> AppResult<()> {
        validate_required_text(&self.name, "name", MAX_NAME_LEN)?;
        validate_required_text(&self.code, "code", MAX_CODE_LEN)?;
        Ok(())
    }
}
