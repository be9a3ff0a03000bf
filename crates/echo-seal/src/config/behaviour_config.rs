use crate::config::{default_copy_decoded, default_open_seal};

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Copy decoded messages to the clipboard.
    #[serde(default = "default_copy_decoded")]
    pub copy_decoded_to_clipboard: bool,

    /// Open each new seal in the default image viewer.
    #[serde(default = "default_open_seal")]
    pub open_seal_after_create: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            copy_decoded_to_clipboard: default_copy_decoded(),
            open_seal_after_create: default_open_seal(),
        }
    }
}
