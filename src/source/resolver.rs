//! Turning an upload specification into PDF bytes

use crate::error::{Error, Result};
use base64::Engine;
use futures_util::StreamExt;
use std::net::IpAddr;
use std::path::Path;
use std::time::Duration;

/// Raw bytes of an uploaded PDF and a display name for its origin
pub struct ResolvedPdf {
    pub data: Vec<u8>,
    pub source_name: String,
}

/// Limits applied to URL uploads
#[derive(Debug, Clone, Copy)]
pub struct DownloadPolicy {
    /// Allow hosts that resolve to private/reserved addresses
    pub allow_private_urls: bool,
    /// Abort once the body grows past this many bytes
    pub max_download_bytes: u64,
    pub timeout: Duration,
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        Self {
            allow_private_urls: false,
            max_download_bytes: 100 * 1024 * 1024,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Reject anything that does not start with the `%PDF` magic
fn check_pdf_header(data: &[u8], origin: &str) -> Result<()> {
    if data.starts_with(b"%PDF") {
        Ok(())
    } else {
        Err(Error::DocumentParse {
            reason: format!("{} is not a PDF file", origin),
        })
    }
}

/// Read an uploaded file from disk
pub fn resolve_path<P: AsRef<Path>>(path: P) -> Result<ResolvedPdf> {
    let path = path.as_ref();
    let source_name = path.display().to_string();

    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::PdfNotFound { path: source_name })
        }
        Err(e) => return Err(Error::Io(e)),
    };
    check_pdf_header(&data, &source_name)?;

    Ok(ResolvedPdf { data, source_name })
}

/// Decode an upload sent inline as standard base64
pub fn resolve_base64(encoded: &str) -> Result<ResolvedPdf> {
    let data = base64::engine::general_purpose::STANDARD.decode(encoded.trim())?;
    check_pdf_header(&data, "Decoded upload")?;

    Ok(ResolvedPdf {
        data,
        source_name: "<base64>".to_string(),
    })
}

/// Loopback, private, link-local, CGNAT, broadcast, unspecified and ULA ranges
fn is_private_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, ..] = v4.octets();
            v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_broadcast()
                || v4.is_unspecified()
                || (a == 100 && (b & 0xC0) == 64)
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            v6.is_loopback()
                || v6.is_unspecified()
                || (first & 0xFE00) == 0xFC00
                || (first & 0xFFC0) == 0xFE80
        }
    }
}

/// Resolve the URL's host and refuse it if any address is private
async fn ensure_public_host(url: &url::Url) -> Result<()> {
    let host = url.host_str().ok_or_else(|| Error::SourceResolution {
        reason: "URL has no host".to_string(),
    })?;
    let port = url.port_or_known_default().unwrap_or(443);

    let mut addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|e| Error::SourceResolution {
            reason: format!("DNS lookup for {} failed: {}", host, e),
        })?;

    if addrs.any(|addr| is_private_ip(&addr.ip())) {
        return Err(Error::SsrfBlocked {
            url: url.to_string(),
        });
    }
    Ok(())
}

/// Download an upload from a URL, streaming with a size cap
pub async fn resolve_url(url: &str, policy: &DownloadPolicy) -> Result<ResolvedPdf> {
    let parsed = url::Url::parse(url).map_err(|e| Error::SourceResolution {
        reason: format!("Invalid URL: {}", e),
    })?;
    if !policy.allow_private_urls {
        ensure_public_host(&parsed).await?;
    }

    // Redirect targets never pass through the host check, so they are refused.
    let client = reqwest::Client::builder()
        .timeout(policy.timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()?;
    let response = client.get(parsed).send().await?;

    let status = response.status();
    if status.is_redirection() {
        return Err(Error::SourceResolution {
            reason: format!("Download redirected with status {}, not followed", status),
        });
    }
    if !status.is_success() {
        return Err(Error::SourceResolution {
            reason: format!("Download failed with status {}", status),
        });
    }

    let too_large = |size: u64| Error::DownloadTooLarge {
        size,
        max_size: policy.max_download_bytes,
    };
    if let Some(declared) = response.content_length() {
        if declared > policy.max_download_bytes {
            return Err(too_large(declared));
        }
    }

    let mut data = Vec::new();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        data.extend_from_slice(&chunk?);
        if data.len() as u64 > policy.max_download_bytes {
            return Err(too_large(data.len() as u64));
        }
    }
    check_pdf_header(&data, "Downloaded file")?;

    Ok(ResolvedPdf {
        data,
        source_name: url.to_string(),
    })
}
