//! Image encoding: page JPEG on disk → base64 `ImageData`.
//!
//! The rasteriser already produces JPEG, so the file bytes are forwarded
//! untouched. Re-encoding would only cost CPU and add artefacts.

use crate::error::ExtractError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use std::path::Path;
use tracing::debug;

/// MIME type of every page image the rasteriser writes.
pub const PAGE_MIME: &str = "image/jpeg";

/// Base64-encode raw image bytes.
pub fn encode_bytes(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Read a rasterised page and wrap it for the vision API.
pub async fn encode_page(path: &Path) -> Result<ImageData, ExtractError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ExtractError::workspace(path, e))?;
    let b64 = encode_bytes(&bytes);
    debug!("Encoded {} → {} bytes base64", path.display(), b64.len());
    Ok(ImageData::new(b64, PAGE_MIME))
}
