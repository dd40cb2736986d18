use std::path::Path;

use fundflow_core::constants::SEED_GACHA_TOKENS;
use fundflow_core::error::FundflowError;
use serde::{Deserialize, Serialize};

/// Who the session belongs to and what they start with.
///
/// Every field has a default, so a params file only needs the fields it
/// overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedParams {
    pub user_id: String,
    pub display_name: String,
    pub tagline: String,
    pub gacha_tokens: u32,
}

impl Default for SeedParams {
    fn default() -> Self {
        Self {
            user_id: "jane".into(),
            display_name: "Jane Doe".into(),
            tagline: "Community Builder & Project Creator".into(),
            gacha_tokens: SEED_GACHA_TOKENS,
        }
    }
}

impl SeedParams {
    /// Load params from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, FundflowError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FundflowError::Storage(format!("read {}: {e}", path.display())))?;
        serde_json::from_str(&raw)
            .map_err(|e| FundflowError::Storage(format!("parse {}: {e}", path.display())))
    }
}
