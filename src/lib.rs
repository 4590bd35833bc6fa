//! # rangescribe
//!
//! Extract the text of a page range of a PDF over HTTP, using a Vision
//! Language Model to read each page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! GET /extract?ranges=2-8
//!  │
//!  ├─ 1. Split      iLovePDF cuts pages 2–8 out of the source PDF
//!  ├─ 2. Workspace  write the split PDF into a fresh pdf-process-* temp dir
//!  ├─ 3. Render     pdftoppm -jpeg -r 150 → page-1.jpg, page-2.jpg, …
//!  ├─ 4. VLM        one completion call per page, in page order
//!  ├─ 5. Assemble   "\n--- Page page-1 ---\n<text>\n" per page
//!  └─ 6. Cleanup    temp dir removed on every exit path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rangescribe::{Extractor, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // The LLM provider reads OPENAI_API_KEY on first use.
//!     let config = ServiceConfig::builder()
//!         .source_pdf("Student Book.pdf")
//!         .ilovepdf_keys("project_public_…", "secret_key_…")
//!         .build()?;
//!     let extractor = Extractor::new(config)?;
//!     let output = extractor.extract("2-8").await?;
//!     println!("{}", output.text);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `rangescribe` server binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod prompts;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use error::ExtractError;
pub use extract::Extractor;
pub use output::{ExtractionOutput, ExtractionStats, PageText};
pub use pipeline::llm::{LlmVisionModel, VisionModel};
pub use pipeline::render::{PdftoppmRasterizer, Rasterizer};
pub use pipeline::split::{DocumentSplitter, ILovePdfSplitter};
