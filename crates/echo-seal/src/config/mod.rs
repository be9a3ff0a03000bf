mod audio_config;
mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;
mod service_config;

pub(crate) use {
    audio_config::AudioConfig, behaviour_config::BehaviourConfig, config::Config,
    service_config::ServiceConfig,
};

pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub(crate) const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub(crate) const DEFAULT_MAX_RECORDING_SECS: u64 = echo_seal_core::DEFAULT_MAX_RECORDING_SECS;
pub(crate) const DEFAULT_COPY_DECODED: bool = true;
pub(crate) const DEFAULT_OPEN_SEAL: bool = false;

pub(crate) fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

pub(crate) fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

pub(crate) fn default_max_recording_secs() -> u64 {
    DEFAULT_MAX_RECORDING_SECS
}

pub(crate) fn default_copy_decoded() -> bool {
    DEFAULT_COPY_DECODED
}

pub(crate) fn default_open_seal() -> bool {
    DEFAULT_OPEN_SEAL
}
