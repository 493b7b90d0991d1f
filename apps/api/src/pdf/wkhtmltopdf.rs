use std::io::Write;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error};
use uuid::Uuid;

use crate::pdf::{PdfRenderer, RenderError, RenderedPdf};

const PAGE_SIZE: &str = "Letter";
const ORIENTATION: &str = "Portrait";
const MARGIN: &str = "0.5in";

/// Renders through the `wkhtmltopdf` binary.
#[derive(Debug, Clone)]
pub struct WkHtmlToPdf {
    binary: String,
    output_dir: PathBuf,
}

impl WkHtmlToPdf {
    pub fn new(binary: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_path(&self, resume_id: Uuid) -> PathBuf {
        self.output_dir.join(format!("resume-{resume_id}.pdf"))
    }

    fn args(&self, input: &str, output: &str) -> Vec<String> {
        vec![
            "--quiet".to_string(),
            "--page-size".to_string(),
            PAGE_SIZE.to_string(),
            "--orientation".to_string(),
            ORIENTATION.to_string(),
            "--margin-top".to_string(),
            MARGIN.to_string(),
            "--margin-right".to_string(),
            MARGIN.to_string(),
            "--margin-bottom".to_string(),
            MARGIN.to_string(),
            "--margin-left".to_string(),
            MARGIN.to_string(),
            input.to_string(),
            output.to_string(),
        ]
    }
}

#[async_trait]
impl PdfRenderer for WkHtmlToPdf {
    async fn render(&self, html: &str, resume_id: Uuid) -> Result<RenderedPdf, RenderError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        // wkhtmltopdf picks the input format from the extension.
        let mut input = tempfile::Builder::new().suffix(".html").tempfile()?;
        input.write_all(html.as_bytes())?;
        input.flush()?;

        let output_path = self.output_path(resume_id);
        let args = self.args(
            &input.path().to_string_lossy(),
            &output_path.to_string_lossy(),
        );
        debug!("Running {} {:?}", self.binary, args);

        let output = Command::new(&self.binary).args(&args).output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            error!("wkhtmltopdf failed for resume {resume_id}: {stderr}");
            return Err(RenderError::Renderer {
                status: output.status.to_string(),
                stderr,
            });
        }

        let bytes = tokio::fs::read(&output_path).await?;
        Ok(RenderedPdf {
            path: output_path,
            bytes,
        })
    }
}
