use crate::{
    DecodeError,
    error::NOTICE_DECODE_FAILED,
    service::client::{IMAGE_FIELD, PASSWORD_FIELD, ServiceClient, UNSEAL_PATH, error_reason},
};

use std::panic::Location;

use error_location::ErrorLocation;
use image::ImageFormat;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Body of an unsealing response.
#[derive(Debug, Deserialize)]
struct UnsealBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Confirm `bytes` look like an image before anything is sent.
///
/// # Errors
///
/// Returns [`DecodeError::UnsupportedFormat`] when the magic bytes match no
/// known image format.
#[track_caller]
pub fn check_image_format(bytes: &[u8]) -> Result<ImageFormat, DecodeError> {
    image::guess_format(bytes).map_err(|_| DecodeError::UnsupportedFormat {
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Recovers the message hidden in a seal image.
#[derive(Debug, Clone)]
pub struct DecodePipeline {
    client: ServiceClient,
}

impl DecodePipeline {
    /// Create a pipeline talking to `client`'s service.
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    /// Send `image` and `credential` to the unsealing service.
    ///
    /// The format check runs first, then the credential check; neither
    /// failure touches the network.
    ///
    /// # Errors
    ///
    /// See [`DecodeError`]. A success status whose body carries `error`
    /// instead of `message` is reported as [`DecodeError::ServiceRejected`].
    #[instrument(skip(self, image, credential), fields(image_bytes = image.len()))]
    pub async fn decode(&self, image: Vec<u8>, credential: &str) -> Result<String, DecodeError> {
        let caller = Location::caller();

        let format = check_image_format(&image)?;

        if credential.trim().is_empty() {
            return Err(DecodeError::EmptyCredential {
                location: ErrorLocation::from(caller),
            });
        }

        let extension = format.extensions_str().first().copied().unwrap_or("img");
        let part = Part::bytes(image)
            .file_name(format!("seal.{}", extension))
            .mime_str(format.to_mime_type())
            .map_err(|source| DecodeError::InvalidRequest {
                source,
                location: ErrorLocation::from(caller),
            })?;

        let form = Form::new()
            .part(IMAGE_FIELD, part)
            .text(PASSWORD_FIELD, credential.to_owned());

        let response = self
            .client
            .post_form(UNSEAL_PATH, form)
            .await
            .map_err(|source| DecodeError::NetworkUnreachable {
                source,
                location: ErrorLocation::from(caller),
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| DecodeError::NetworkUnreachable {
                source,
                location: ErrorLocation::from(caller),
            })?;

        if !status.is_success() {
            let reason = error_reason(&body).unwrap_or_else(|| NOTICE_DECODE_FAILED.to_string());
            warn!(status = status.as_u16(), reason = %reason, "Unsealing service rejected request");
            return Err(DecodeError::ServiceRejected {
                status: status.as_u16(),
                reason,
                location: ErrorLocation::from(caller),
            });
        }

        let parsed: UnsealBody =
            serde_json::from_slice(&body).map_err(|e| DecodeError::InvalidResponse {
                reason: e.to_string(),
                location: ErrorLocation::from(caller),
            })?;

        match parsed {
            UnsealBody {
                message: Some(message),
                ..
            } => {
                info!(message_len = message.len(), "Seal decoded");
                Ok(message)
            }
            UnsealBody {
                error: Some(reason),
                ..
            } => Err(DecodeError::ServiceRejected {
                status: status.as_u16(),
                reason,
                location: ErrorLocation::from(caller),
            }),
            UnsealBody { .. } => Err(DecodeError::InvalidResponse {
                reason: "Response has neither message nor error".to_string(),
                location: ErrorLocation::from(caller),
            }),
        }
    }
}
