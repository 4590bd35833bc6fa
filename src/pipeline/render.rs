//! Rasterisation: split PDF → one JPEG per page via an external tool.
//!
//! The default implementation shells out to poppler's `pdftoppm`:
//!
//! ```text
//! pdftoppm -jpeg -r 150 <workspace>/splitted.pdf <workspace>/page
//! ```
//!
//! which writes `page-1.jpg`, `page-2.jpg`, … (zero-padded once the document
//! has ten or more pages). The child runs with `kill_on_drop`, so a timeout
//! or a dropped request future also terminates the process.

use crate::config::ServiceConfig;
use crate::error::ExtractError;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// Turns a PDF into page images sharing a filename prefix.
#[async_trait]
pub trait Rasterizer: Send + Sync {
    /// Render every page of `document` to `<output_prefix>-<n>.jpg`.
    async fn rasterize(&self, document: &Path, output_prefix: &Path) -> Result<(), ExtractError>;
}

/// [`Rasterizer`] backed by a `pdftoppm`-compatible executable.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    program: String,
    dpi: u32,
    timeout_secs: u64,
}

impl PdftoppmRasterizer {
    pub fn new(program: impl Into<String>, dpi: u32, timeout_secs: u64) -> Self {
        Self {
            program: program.into(),
            dpi,
            timeout_secs,
        }
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(&config.rasterizer, config.dpi, config.rasterize_timeout_secs)
    }

    /// Command-line arguments for one invocation.
    pub fn args(&self, document: &Path, output_prefix: &Path) -> Vec<OsString> {
        vec![
            "-jpeg".into(),
            "-r".into(),
            self.dpi.to_string().into(),
            document.as_os_str().to_owned(),
            output_prefix.as_os_str().to_owned(),
        ]
    }
}

#[async_trait]
impl Rasterizer for PdftoppmRasterizer {
    async fn rasterize(&self, document: &Path, output_prefix: &Path) -> Result<(), ExtractError> {
        debug!(
            "Running {} at {} DPI on {}",
            self.program,
            self.dpi,
            document.display()
        );

        let child = Command::new(&self.program)
            .args(self.args(document, output_prefix))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ExtractError::RasterizerSpawn {
                program: self.program.clone(),
                source: e,
            })?;

        let output = match timeout(Duration::from_secs(self.timeout_secs), child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ExtractError::RasterizerSpawn {
                    program: self.program.clone(),
                    source: e,
                })
            }
            Err(_) => {
                warn!("{} exceeded {}s, killing it", self.program, self.timeout_secs);
                return Err(ExtractError::RasterizerTimeout {
                    program: self.program.clone(),
                    secs: self.timeout_secs,
                });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(ExtractError::RasterizerFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr,
            });
        }

        Ok(())
    }
}
