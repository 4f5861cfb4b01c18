use crate::config::{DEFAULT_CONFIRM_DISCARD_UNSAVED, default_confirm_discard_unsaved};

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Require a second `start` before discarding a clip that was never
    /// saved.
    #[serde(default = "default_confirm_discard_unsaved")]
    pub confirm_discard_unsaved: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            confirm_discard_unsaved: DEFAULT_CONFIRM_DISCARD_UNSAVED,
        }
    }
}
