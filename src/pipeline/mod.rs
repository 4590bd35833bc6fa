//! Pipeline stages for page-range text extraction.
//!
//! Each submodule implements one step. The three that talk to the outside
//! world ([`split`], [`render`], [`llm`]) expose a trait so the orchestrator
//! in [`crate::extract`] can be driven by fakes in tests.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ split ──▶ workspace ──▶ render ──▶ encode ──▶ llm
//! (%PDF)   (iLovePDF)  (tempdir)   (pdftoppm)  (base64)   (VLM)
//! ```
//!
//! 1. [`input`]     - read the source PDF and check the `%PDF` magic
//! 2. [`split`]     - cut the requested page range out remotely
//! 3. [`workspace`] - per-request temp directory, page-image listing
//! 4. [`render`]    - rasterise the split PDF to one JPEG per page
//! 5. [`encode`]    - base64-wrap each JPEG for the multimodal request
//! 6. [`llm`]       - one completion call per page

pub mod encode;
pub mod input;
pub mod llm;
pub mod render;
pub mod split;
pub mod workspace;
