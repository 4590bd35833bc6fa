//! Source document loading and PDF sanity checks.
//!
//! The source PDF is read fresh on every request so it can be replaced on
//! disk without restarting the service. Both the source and the document the
//! splitting service sends back are checked for the `%PDF` magic bytes so a
//! misconfigured path or a ZIP reply fails with a readable error instead of a
//! rasteriser crash.

use crate::error::ExtractError;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Read the source PDF, mapping I/O failures to descriptive errors.
pub async fn load_source(path: &Path) -> Result<Vec<u8>, ExtractError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => ExtractError::SourceNotFound {
            path: path.to_path_buf(),
        },
        ErrorKind::PermissionDenied => ExtractError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => ExtractError::workspace(path, e),
    })?;

    if let Some(magic) = bad_magic(&bytes) {
        return Err(ExtractError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    debug!("Loaded source PDF {} ({} bytes)", path.display(), bytes.len());
    Ok(bytes)
}

/// Returns the first four bytes when they are not `%PDF`.
///
/// Inputs shorter than four bytes are zero-padded.
pub fn bad_magic(bytes: &[u8]) -> Option<[u8; 4]> {
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    if &magic == PDF_MAGIC {
        None
    } else {
        Some(magic)
    }
}
