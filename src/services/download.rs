//! Streaming download of provider/blob URLs into the temp directory.

use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Content types we expect when the URL path carries no extension.
const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("video/mp4", ".mp4"),
    ("video/mpeg", ".mp4"),
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
];

/// Downloader for clip and image URLs (signed provider URLs included).
pub struct Downloader {
    http: reqwest::Client,
}

impl Downloader {
    pub fn new() -> Result<Self, DownloadError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(600))
            .user_agent(concat!("wedding-video-gen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(DownloadError::Http)?;
        Ok(Self { http })
    }

    /// Stream `url` into `dest_dir` and return the file path.
    ///
    /// The extension comes from the URL path when present, otherwise from
    /// the response `Content-Type`. Non-2xx responses are errors carrying
    /// the status and a snippet of the body.
    pub async fn download_to_dir(&self, url: &str, dest_dir: &Path) -> Result<PathBuf, DownloadError> {
        let response = self.http.get(url).send().await.map_err(DownloadError::Http)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let snippet = String::from_utf8_lossy(&body[..body.len().min(1024)]).into_owned();
            return Err(DownloadError::Status {
                status: status.as_u16(),
                snippet,
            });
        }

        let ext = url_extension(url).or_else(|| {
            response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .and_then(content_type_extension)
        });

        let filename = format!("input_{}{}", Uuid::new_v4(), ext.unwrap_or_default());
        let out_path = dest_dir.join(filename);

        let mut file = tokio::fs::File::create(&out_path)
            .await
            .map_err(|e| DownloadError::Io(out_path.display().to_string(), e))?;

        let mut total_bytes: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(DownloadError::Http)?;
            file.write_all(&chunk)
                .await
                .map_err(|e| DownloadError::Io(out_path.display().to_string(), e))?;
            total_bytes += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| DownloadError::Io(out_path.display().to_string(), e))?;

        tracing::info!(path = %out_path.display(), total_bytes, "download complete");
        Ok(out_path)
    }
}

/// Extension from the URL path, query string excluded.
fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next()?;
    let dot = name.rfind('.')?;
    let ext = &name[dot..];
    // Bare trailing dots or absurdly long "extensions" are noise.
    if ext.len() > 1 && ext.len() <= 5 {
        Some(ext.to_string())
    } else {
        None
    }
}

fn content_type_extension(content_type: &str) -> Option<String> {
    let ct = content_type.split(';').next().unwrap_or("").trim().to_lowercase();
    MIME_EXTENSIONS
        .iter()
        .find(|(mime, _)| *mime == ct)
        .map(|(_, ext)| (*ext).to_string())
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("HTTP download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed with HTTP {status}: {snippet}")]
    Status { status: u16, snippet: String },

    #[error("Failed writing {0}: {1}")]
    Io(String, #[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_from_url_path() {
        assert_eq!(
            url_extension("https://cdn.example.com/abc/clip.mp4?_jwt=xyz"),
            Some(".mp4".to_string())
        );
        assert_eq!(url_extension("https://cdn.example.com/abc/clip"), None);
    }

    #[test]
    fn extension_from_content_type() {
        assert_eq!(
            content_type_extension("video/mp4; charset=binary"),
            Some(".mp4".to_string())
        );
        assert_eq!(content_type_extension("application/x-unknown"), None);
    }
}
