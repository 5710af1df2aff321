//! Input resolution: turn a user-supplied path or URL into PDF bytes.
//!
//! The same upload rules apply to both sources: the bytes must start with
//! the `%PDF` magic and must not exceed the configured size limit. Checking
//! here gives callers a meaningful error instead of a pdfium failure.

use crate::error::DemosError;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// A workout plan ready for text extraction.
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    /// Display name: the file path or URL the bytes came from.
    pub source_name: String,
    pub bytes: Vec<u8>,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to validated PDF bytes.
///
/// If the input is a URL, download it. If it is a local file, read it.
pub async fn resolve_input(
    input: &str,
    max_bytes: u64,
    timeout_secs: u64,
) -> Result<ResolvedInput, DemosError> {
    if input.trim().is_empty() {
        return Err(DemosError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, max_bytes, timeout_secs).await
    } else {
        resolve_local(input, max_bytes).await
    }
}

/// Validate bytes already in memory (uploads, database blobs).
pub fn validate_pdf_bytes(source_name: &str, bytes: &[u8], max_bytes: u64) -> Result<(), DemosError> {
    let size = bytes.len() as u64;
    if size > max_bytes {
        return Err(DemosError::FileTooLarge {
            source_name: source_name.to_string(),
            size,
            limit: max_bytes,
        });
    }
    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(DemosError::NotAPdf {
            source_name: source_name.to_string(),
            magic,
        });
    }
    Ok(())
}

/// Read a local file, checking size before loading it.
async fn resolve_local(path_str: &str, max_bytes: u64) -> Result<ResolvedInput, DemosError> {
    let path = PathBuf::from(path_str);

    let meta = match tokio::fs::metadata(&path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(DemosError::PermissionDenied { path });
        }
        Err(_) => return Err(DemosError::FileNotFound { path }),
    };
    if !meta.is_file() {
        return Err(DemosError::InvalidInput {
            input: path_str.to_string(),
        });
    }
    if meta.len() > max_bytes {
        return Err(DemosError::FileTooLarge {
            source_name: path_str.to_string(),
            size: meta.len(),
            limit: max_bytes,
        });
    }

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => DemosError::PermissionDenied { path: path.clone() },
        _ => DemosError::FileNotFound { path: path.clone() },
    })?;

    validate_pdf_bytes(path_str, &bytes, max_bytes)?;
    debug!("Resolved local PDF: {} ({} bytes)", path.display(), bytes.len());

    Ok(ResolvedInput {
        source_name: path_str.to_string(),
        bytes,
    })
}

/// Download a URL into memory.
async fn download_url(url: &str, max_bytes: u64, timeout_secs: u64) -> Result<ResolvedInput, DemosError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DemosError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            DemosError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            DemosError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(DemosError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    if let Some(len) = response.content_length() {
        if len > max_bytes {
            return Err(DemosError::FileTooLarge {
                source_name: url.to_string(),
                size: len,
                limit: max_bytes,
            });
        }
    }

    // Content-Length is optional (chunked responses); count while reading.
    let mut bytes: Vec<u8> = Vec::new();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        let chunk = chunk.map_err(|e| {
            if e.is_timeout() {
                DemosError::DownloadTimeout {
                    url: url.to_string(),
                    secs: timeout_secs,
                }
            } else {
                DemosError::DownloadFailed {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;
        let size = (bytes.len() + chunk.len()) as u64;
        if size > max_bytes {
            debug!("Aborting download of {} after {} bytes", url, size);
            return Err(DemosError::FileTooLarge {
                source_name: url.to_string(),
                size,
                limit: max_bytes,
            });
        }
        bytes.extend_from_slice(&chunk);
    }

    validate_pdf_bytes(url, &bytes, max_bytes)?;
    info!("Downloaded {} bytes", bytes.len());

    Ok(ResolvedInput {
        source_name: url.to_string(),
        bytes,
    })
}
