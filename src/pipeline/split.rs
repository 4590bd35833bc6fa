//! Split stage: cut a page range out of the source PDF via iLovePDF.
//!
//! ## Request sequence
//!
//! ```text
//! GET  {base}/v1/start/split            → { server, task }
//! POST https://{server}/v1/upload       multipart(task, file) → { server_filename }
//! POST https://{server}/v1/process      { task, tool: "split", files, ranges, merge_after }
//! GET  https://{server}/v1/download/{task}  → split PDF bytes
//! ```
//!
//! Every call carries a self-signed HS256 token built from the project key
//! pair. `merge_after` is always set so a multi-range request such as
//! `"1-3,7"` still yields one PDF instead of a ZIP archive. Range syntax is
//! left entirely to the service; its validation message is passed through.

use crate::config::ServiceConfig;
use crate::error::ExtractError;
use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info};

/// Issuer claim expected by the iLovePDF API.
const TOKEN_ISSUER: &str = "api.ilovepdf.com";

/// Lifetime of a signed token.
const TOKEN_TTL_SECS: u64 = 2 * 60 * 60;

/// Produces a single PDF holding the requested page range.
#[async_trait]
pub trait DocumentSplitter: Send + Sync {
    /// `file_name` is the name reported to the service; `pdf` the source bytes.
    async fn split(&self, file_name: &str, pdf: Vec<u8>, ranges: &str) -> Result<Vec<u8>, ExtractError>;
}

/// [`DocumentSplitter`] talking to the iLovePDF REST API.
#[derive(Debug, Clone)]
pub struct ILovePdfSplitter {
    client: reqwest::Client,
    base_url: String,
    public_key: Option<String>,
    secret_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StartResponse {
    server: String,
    task: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    server_filename: String,
}

#[derive(Debug, Default, Deserialize)]
struct ProcessResponse {
    #[serde(default)]
    download_filename: Option<String>,
    #[serde(default)]
    output_filenumber: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ProcessRequest<'a> {
    task: &'a str,
    tool: &'static str,
    files: Vec<ProcessFile<'a>>,
    split_mode: &'static str,
    ranges: &'a str,
    merge_after: bool,
}

#[derive(Debug, Serialize)]
struct ProcessFile<'a> {
    server_filename: &'a str,
    filename: &'a str,
}

impl ILovePdfSplitter {
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| ExtractError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.ilovepdf_base_url.clone(),
            public_key: config.ilovepdf_public_key.clone(),
            secret_key: config.ilovepdf_secret_key.clone(),
        })
    }

    fn auth_token(&self) -> Result<String, ExtractError> {
        let (Some(public_key), Some(secret_key)) = (&self.public_key, &self.secret_key) else {
            return Err(ExtractError::SplitNotConfigured {
                hint: "set ILOVEPDF_PUBLIC_KEY and ILOVEPDF_SECRET_KEY".into(),
            });
        };
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| ExtractError::Internal(format!("System clock before epoch: {e}")))?
            .as_secs();
        sign_token(public_key, secret_key, now)
    }

    async fn start(&self, token: &str) -> Result<StartResponse, ExtractError> {
        let url = format!("{}/v1/start/split", self.base_url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| request_failed("start", e))?;
        check_status("start", response)
            .await?
            .json()
            .await
            .map_err(|e| request_failed("start", e))
    }

    async fn upload(
        &self,
        server: &str,
        token: &str,
        task: &str,
        file_name: &str,
        pdf: Vec<u8>,
    ) -> Result<UploadResponse, ExtractError> {
        let part = reqwest::multipart::Part::bytes(pdf)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| request_failed("upload", e))?;
        let form = reqwest::multipart::Form::new()
            .text("task", task.to_string())
            .part("file", part);

        let response = self
            .client
            .post(format!("{server}/v1/upload"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_failed("upload", e))?;
        check_status("upload", response)
            .await?
            .json()
            .await
            .map_err(|e| request_failed("upload", e))
    }

    async fn process(
        &self,
        server: &str,
        token: &str,
        task: &str,
        server_filename: &str,
        file_name: &str,
        ranges: &str,
    ) -> Result<ProcessResponse, ExtractError> {
        let body = ProcessRequest {
            task,
            tool: "split",
            files: vec![ProcessFile {
                server_filename,
                filename: file_name,
            }],
            split_mode: "ranges",
            ranges,
            merge_after: true,
        };

        let response = self
            .client
            .post(format!("{server}/v1/process"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| request_failed("process", e))?;
        let response = check_status("process", response).await?;
        let text = response.text().await.map_err(|e| request_failed("process", e))?;
        Ok(parse_process_response(&text))
    }

    async fn download(&self, server: &str, token: &str, task: &str) -> Result<Vec<u8>, ExtractError> {
        let response = self
            .client
            .get(format!("{server}/v1/download/{task}"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| request_failed("download", e))?;
        let bytes = check_status("download", response)
            .await?
            .bytes()
            .await
            .map_err(|e| request_failed("download", e))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl DocumentSplitter for ILovePdfSplitter {
    async fn split(&self, file_name: &str, pdf: Vec<u8>, ranges: &str) -> Result<Vec<u8>, ExtractError> {
        let token = self.auth_token()?;

        let started = self.start(&token).await?;
        let server = server_url(&started.server);
        debug!("Split task {} assigned to {}", started.task, server);

        let uploaded = self
            .upload(&server, &token, &started.task, file_name, pdf)
            .await?;

        let processed = self
            .process(
                &server,
                &token,
                &started.task,
                &uploaded.server_filename,
                file_name,
                ranges,
            )
            .await?;
        debug!(
            "Split task {} processed: {:?} file(s), download name {:?}",
            started.task, processed.output_filenumber, processed.download_filename
        );

        let bytes = self.download(&server, &token, &started.task).await?;
        info!(
            "Split task {} for ranges \"{}\" returned {} bytes",
            started.task,
            ranges,
            bytes.len()
        );
        Ok(bytes)
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────

fn request_failed(step: &'static str, e: reqwest::Error) -> ExtractError {
    ExtractError::SplitRequestFailed {
        step,
        reason: e.to_string(),
    }
}

/// Pass successful responses through; turn anything else into `SplitRejected`.
async fn check_status(
    step: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ExtractError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ExtractError::SplitRejected {
        step,
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// The process reply is only used for logging, so a malformed one is not fatal.
fn parse_process_response(body: &str) -> ProcessResponse {
    serde_json::from_str(body).unwrap_or_else(|e| {
        debug!("Ignoring unparsable process response ({}): {}", e, body.trim());
        ProcessResponse::default()
    })
}

/// Pull the human-readable message out of an iLovePDF error body.
pub fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for pointer in ["/error/message", "/message", "/error", "/name"] {
            if let Some(msg) = value.pointer(pointer).and_then(|v| v.as_str()) {
                return msg.to_string();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "empty response body".to_string()
    } else {
        trimmed.to_string()
    }
}

/// The `server` field is a bare hostname in production.
fn server_url(server: &str) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        server.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", server.trim_end_matches('/'))
    }
}

/// Build the HS256 JWT iLovePDF accepts in place of an `/auth` round trip.
pub fn sign_token(public_key: &str, secret_key: &str, issued_at: u64) -> Result<String, ExtractError> {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let claims = serde_json::json!({
        "iss": TOKEN_ISSUER,
        "iat": issued_at,
        "nbf": issued_at,
        "exp": issued_at + TOKEN_TTL_SECS,
        "jti": public_key,
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    let signing_input = format!("{header}.{payload}");
    let signature = URL_SAFE_NO_PAD.encode(hmac_sha256(secret_key.as_bytes(), signing_input.as_bytes())?);
    Ok(format!("{signing_input}.{signature}"))
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>, ExtractError> {
    let mut mac = Hmac::<Sha256>::new_from_slice(key)
        .map_err(|e| ExtractError::Internal(format!("Invalid HMAC key: {e}")))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}
