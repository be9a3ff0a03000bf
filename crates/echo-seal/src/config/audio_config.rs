use crate::config::default_max_recording_secs;

use serde::{Deserialize, Serialize};

/// Audio device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Selected input device name (None = default device).
    #[serde(default)]
    pub selected_device: Option<String>,

    /// Recordings stop on their own after this many seconds (0 = no cap).
    #[serde(default = "default_max_recording_secs")]
    pub max_recording_secs: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            selected_device: None,
            max_recording_secs: default_max_recording_secs(),
        }
    }
}
