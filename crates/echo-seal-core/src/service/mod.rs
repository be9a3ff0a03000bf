pub(crate) mod client;
mod credential;
mod seal;
mod unseal;

pub use {
    client::{DEFAULT_TIMEOUT, SEAL_PATH, ServiceClient, UNSEAL_PATH},
    credential::Credential,
    seal::SealPipeline,
    unseal::{DecodePipeline, check_image_format},
};
