//! Session options

use serde::{Deserialize, Serialize};

use crate::derived::DerivedRule;
use crate::error::{SessionError, SessionResult};

/// Options for a review session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Largest accepted upload in bytes (default: 10 MiB)
    pub max_upload_bytes: u64,
    /// Column compared against the identity filter (default: "Operator")
    pub identity_column: String,
    /// Sole entry of an empty option list (default: "No options available")
    pub no_options_placeholder: String,
    /// Worksheet part read for validations when a sheet's own part is unknown
    pub fallback_worksheet_part: String,
    /// Derived-field rules, applied in order
    pub derived_rules: Vec<DerivedRule>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_upload_bytes: 10 * 1024 * 1024,
            identity_column: "Operator".into(),
            no_options_placeholder: "No options available".into(),
            fallback_worksheet_part: "sheet1.xml".into(),
            derived_rules: DerivedRule::defaults(),
        }
    }
}

impl SessionOptions {
    /// Parse options from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> SessionResult<Self> {
        serde_json::from_str(json).map_err(|e| SessionError::Config(e.to_string()))
    }
}
