//! Document upload for agent training.
//!
//! A [`TrainingDocument`] is validated entirely on the local side (extension,
//! PDF signature, size ceiling) before [`TrainingUploader::upload`] is allowed
//! to send anything.

use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use crate::error::{AthenaError, AthenaResult};
use crate::http::ApiClient;
use crate::models::{AgentId, TrainingReceipt};

pub const MAX_UPLOAD_MB: u64 = 10;
pub const MAX_UPLOAD_BYTES: u64 = MAX_UPLOAD_MB * 1024 * 1024;
const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// A local PDF that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingDocument {
    path: PathBuf,
    file_name: String,
    size: u64,
}

impl TrainingDocument {
    pub async fn from_path(path: impl AsRef<Path>) -> AthenaResult<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if !is_pdf {
            return Err(AthenaError::UnsupportedFileType(file_name));
        }

        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AthenaError::validation(format!("File not found: {}", path.display()))
            } else {
                AthenaError::from(e)
            }
        })?;
        if !metadata.is_file() {
            return Err(AthenaError::validation(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        let size = metadata.len();
        if size > MAX_UPLOAD_BYTES {
            return Err(AthenaError::FileTooLarge {
                size,
                limit_mb: MAX_UPLOAD_MB,
            });
        }

        let mut header = [0u8; 5];
        let mut file = tokio::fs::File::open(path).await?;
        let read = read_prefix(&mut file, &mut header).await?;
        if &header[..read] != PDF_SIGNATURE {
            return Err(AthenaError::UnsupportedFileType(file_name));
        }

        debug!(file = %file_name, size, "Training document validated");
        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}

async fn read_prefix(file: &mut tokio::fs::File, buf: &mut [u8]) -> AthenaResult<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = file.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

#[derive(Debug, Clone)]
pub struct TrainingUploader {
    http: Arc<ApiClient>,
    url: String,
}

impl TrainingUploader {
    pub fn new(http: Arc<ApiClient>, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
        }
    }

    /// Post the document with its target agent. One attempt, no resume.
    pub async fn upload(
        &self,
        document: &TrainingDocument,
        agent_id: &AgentId,
    ) -> AthenaResult<TrainingReceipt> {
        let bytes = tokio::fs::read(&document.path).await?;
        let part = Part::bytes(bytes)
            .file_name(document.file_name.clone())
            .mime_str("application/pdf")
            .map_err(|e| AthenaError::Internal(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("agent_id", agent_id.to_string());

        info!(
            %agent_id,
            file = %document.file_name,
            size = %format_file_size(document.size),
            "Uploading training document"
        );
        let response = self.http.post_multipart(&self.url, form).await?;

        if !response.is_success() {
            let message = response.server_message().unwrap_or_else(|| {
                format!("Upload failed! status: {}", response.status.as_u16())
            });
            warn!(%agent_id, status = response.status.as_u16(), "Upload rejected: {}", message);
            return Err(AthenaError::UploadFailed(message));
        }

        let receipt: TrainingReceipt = response.json()?;
        if !receipt.success {
            let message = receipt
                .message
                .clone()
                .unwrap_or_else(|| "Failed to upload document".to_string());
            return Err(AthenaError::UploadFailed(message));
        }
        info!(%agent_id, document_id = ?receipt.document_id, "Training document accepted");
        Ok(receipt)
    }
}

/// Human-readable size: `Bytes`, `KB` or `MB` with two decimals.
pub fn format_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let value = bytes as f64;
    if bytes == 0 {
        "0 Bytes".to_string()
    } else if value < KB {
        format!("{} Bytes", bytes)
    } else if value < KB * KB {
        format!("{:.2} KB", value / KB)
    } else {
        format!("{:.2} MB", value / (KB * KB))
    }
}
