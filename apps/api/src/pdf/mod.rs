//! HTML → PDF rendering with the payment watermark gate.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::store::{PaymentStore, StoreError};

pub mod wkhtmltopdf;

pub use wkhtmltopdf::WkHtmlToPdf;

/// Overlay injected into unpaid exports.
pub const WATERMARK_HTML: &str = r#"
<div style="position: fixed; top: 50%; left: 50%;
  transform: translate(-50%, -50%); font-size: 24px;
  color: rgba(150, 150, 150, 0.5); z-index: 9999;">
  Watermark - Pay to Remove
</div>"#;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("renderer exited with {status}: {stderr}")]
    Renderer { status: String, stderr: String },

    #[error("payment lookup failed: {0}")]
    PaymentLookup(#[from] StoreError),
}

#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Writes `resume-<id>.pdf` to the output directory and returns it.
    /// Concurrent renders of one resume overwrite each other.
    async fn render(&self, html: &str, resume_id: Uuid) -> Result<RenderedPdf, RenderError>;
}

/// Appends the watermark unless `paid`.
pub fn apply_watermark(html: &str, paid: bool) -> String {
    if paid {
        html.to_string()
    } else {
        format!("{html}{WATERMARK_HTML}")
    }
}

/// Renders a resume export, watermarking it when no completed payment exists.
pub async fn render_resume_pdf(
    renderer: &dyn PdfRenderer,
    payments: &dyn PaymentStore,
    user_id: Uuid,
    resume_id: Uuid,
    html: &str,
) -> Result<RenderedPdf, RenderError> {
    let paid = payments.has_completed_payment(user_id, resume_id).await?;
    info!("Rendering PDF for resume {resume_id} (paid={paid})");
    renderer.render(&apply_watermark(html, paid), resume_id).await
}
