//! Ledger settings model.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_RECENT_LIMIT, DEFAULT_TEMP_ID_PREFIX};
use crate::errors::{Error, Result, ValidationError};
use crate::ledger::SortDirection;

/// Tunables for record stores and the cost aggregator.
///
/// Missing keys fall back to their defaults when loading from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LedgerSettings {
    /// Order in which the aggregator serves entries (default: newest first)
    pub default_sort: SortDirection,

    /// Prefix of client-generated ids for unconfirmed inserts (default: "tmp-")
    pub temp_id_prefix: String,

    /// Length of the recent expenses view (default: 10)
    pub recent_limit: usize,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            default_sort: SortDirection::Desc,
            temp_id_prefix: DEFAULT_TEMP_ID_PREFIX.to_string(),
            recent_limit: DEFAULT_RECENT_LIMIT,
        }
    }
}

impl LedgerSettings {
    /// Parses settings from JSON and validates them.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: LedgerSettings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.temp_id_prefix.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Temporary id prefix cannot be empty".to_string(),
            )));
        }
        if self.recent_limit == 0 {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Recent limit must be at least 1".to_string(),
            )));
        }
        Ok(())
    }
}
