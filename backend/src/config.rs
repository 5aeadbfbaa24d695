//! Recipe cascade configuration loaded via OrthoConfig.

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::IntegrityPolicy;

/// Settings for the recipe-removal cascade and its CLI.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RECIPE_CASCADE")]
pub struct CascadeSettings {
    /// Abort the pass when the store returns a non-recipe message.
    #[ortho_config(default = false)]
    pub fail_on_integrity_violation: bool,
    /// Pretty-print the surviving message snapshot.
    #[ortho_config(default = false)]
    pub pretty_output: bool,
}

impl CascadeSettings {
    /// Integrity policy selected by these settings.
    pub fn integrity_policy(&self) -> IntegrityPolicy {
        if self.fail_on_integrity_violation {
            IntegrityPolicy::FailFast
        } else {
            IntegrityPolicy::SkipAndLog
        }
    }
}
