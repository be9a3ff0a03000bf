//! Clipboard integration.
//!
//! Copies decoded messages as text and stored seals as images.

use crate::{AppError, AppResult};

use std::{borrow::Cow, panic::Location};

use arboard::{Clipboard, ImageData};
use error_location::ErrorLocation;
use tracing::{debug, info, instrument};

/// Output handler for clipboard operations.
pub struct OutputHandler {
    pub(crate) clipboard: Clipboard,
}

impl OutputHandler {
    /// Create a new output handler.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let clipboard = Clipboard::new().map_err(|e| AppError::ClipboardError {
            reason: format!("Failed to initialize clipboard: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        info!("OutputHandler initialized");

        Ok(Self { clipboard })
    }

    /// Put `text` on the clipboard.
    #[track_caller]
    #[instrument(skip(self, text))]
    pub fn copy_text(&mut self, text: &str) -> AppResult<()> {
        self.clipboard
            .set_text(text)
            .map_err(|e| AppError::ClipboardError {
                reason: format!("Failed to set clipboard: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(text_len = text.len(), "Text copied to clipboard");
        Ok(())
    }

    /// Decode encoded image bytes and put the pixels on the clipboard.
    #[track_caller]
    #[instrument(skip(self, encoded), fields(encoded_bytes = encoded.len()))]
    pub fn copy_image(&mut self, encoded: &[u8]) -> AppResult<()> {
        let rgba = image::load_from_memory(encoded)
            .map_err(|e| AppError::ClipboardError {
                reason: format!("Failed to decode seal image: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?
            .to_rgba8();

        let (width, height) = rgba.dimensions();
        let data = ImageData {
            width: width as usize,
            height: height as usize,
            bytes: Cow::Owned(rgba.into_raw()),
        };

        self.clipboard
            .set_image(data)
            .map_err(|e| AppError::ClipboardError {
                reason: format!("Failed to set clipboard image: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        debug!(width, height, "Image copied to clipboard");
        Ok(())
    }
}
