//! Settings / access gate payloads

use serde::{Deserialize, Serialize};
use std::fmt;

/// Staff access level guarded by a password
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Menu, branches and order management
    Admin,
    /// Sales dashboard
    Owner,
}

impl AccessLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessLevel::Admin => "admin",
            AccessLevel::Owner => "owner",
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `POST /settings/verify` body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub password: String,
    #[serde(rename = "type")]
    pub level: AccessLevel,
}

/// `POST /settings/verify` response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_request_uses_type_field() {
        let body = serde_json::to_value(VerifyRequest {
            password: "1234".into(),
            level: AccessLevel::Owner,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"password": "1234", "type": "owner"}));
    }

    #[test]
    fn test_verify_response_defaults_to_failure() {
        let resp: VerifyResponse = serde_json::from_str("{}").unwrap();
        assert!(!resp.success);
    }
}
