//! Image intake: validates a candidate file and turns it into something the
//! page can display without another network fetch.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("Please upload an image file (JPEG, PNG, ...)")]
    NotAnImage,
    #[error("The selected image could not be read")]
    DecodeFailed,
}

/// A user supplied file. The browser build wraps `gloo_file::File`.
#[async_trait(?Send)]
pub trait ImageFile: Clone {
    fn name(&self) -> String;
    fn mime_type(&self) -> String;
    fn size(&self) -> u64;
    async fn read_bytes(&self) -> Result<Vec<u8>, String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage<F> {
    /// Self-contained `data:` URL.
    pub display_data: String,
    pub raw_file: Option<F>,
}

pub fn is_image_type(mime_type: &str) -> bool {
    mime_type.trim().to_ascii_lowercase().starts_with("image/")
}

pub fn check_media_type<F: ImageFile>(file: &F) -> Result<(), RejectionReason> {
    if is_image_type(&file.mime_type()) {
        Ok(())
    } else {
        log::warn!(
            "Rejecting non-image file {} ({})",
            file.name(),
            file.mime_type()
        );
        Err(RejectionReason::NotAnImage)
    }
}

pub async fn submit<F: ImageFile>(file: F) -> Result<UploadedImage<F>, RejectionReason> {
    check_media_type(&file)?;

    let bytes = file.read_bytes().await.map_err(|e| {
        log::error!("Failed to read {}: {}", file.name(), e);
        RejectionReason::DecodeFailed
    })?;
    if bytes.is_empty() {
        log::error!("{} is empty", file.name());
        return Err(RejectionReason::DecodeFailed);
    }

    log::debug!("Accepted {} ({} bytes)", file.name(), bytes.len());
    Ok(UploadedImage {
        display_data: encode_data_url(&file.mime_type(), &bytes),
        raw_file: Some(file),
    })
}

pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type.trim(), STANDARD.encode(bytes))
}
