//! Validator configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ValidatorError, ValidatorResult};

/// Switches applied by [`ZoneValidator`](crate::ZoneValidator).
///
/// The per-type `validate_*` functions always run their fixed pipelines and
/// ignore these options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidatorOptions {
    /// Promote every warning to an error. Info diagnostics are left alone.
    pub strict: bool,
    /// Run the TTL checks and the SOA serial-format advisory.
    pub check_best_practices: bool,
}

impl ValidatorOptions {
    /// Load options from a JSON document; missing keys fall back to defaults.
    pub fn from_json(json: &str) -> ValidatorResult<Self> {
        serde_json::from_str(json).map_err(|e| ValidatorError::InvalidOptions(e.to_string()))
    }

    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    #[must_use]
    pub fn check_best_practices(mut self, enabled: bool) -> Self {
        self.check_best_practices = enabled;
        self
    }
}
