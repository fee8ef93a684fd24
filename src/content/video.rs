use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::process::Stdio;
use tokio::process::Command;

use crate::error::ContentError;

/// Metadata as reported by the extractor. A field that is missing, null or
/// of an unexpected type is `None`; it never spoils the other fields.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawVideoInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub uploader: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub view_count: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub upload_date: Option<String>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Looks up video metadata by URL without fetching any media.
#[async_trait]
pub trait VideoInfoSource: Send + Sync {
    async fn fetch_info(&self, url: &str) -> Result<RawVideoInfo, ContentError>;
}

/// `yt-dlp` in metadata-only mode.
pub struct YtDlpSource {
    binary: String,
}

impl YtDlpSource {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// `--` keeps a caller-supplied URL from being parsed as an option.
    fn args(url: &str) -> [&str; 7] {
        [
            "--skip-download",
            "--dump-single-json",
            "--no-warnings",
            "--quiet",
            "--no-playlist",
            "--",
            url,
        ]
    }
}

#[async_trait]
impl VideoInfoSource for YtDlpSource {
    async fn fetch_info(&self, url: &str) -> Result<RawVideoInfo, ContentError> {
        let output = Command::new(&self.binary)
            .args(Self::args(url))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                let reason = format!("Failed to start {}: {}", self.binary, e);
                ContentError::VideoInfoUnavailable(reason)
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ContentError::VideoInfoUnavailable(format!(
                "yt-dlp exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        parse_info(&output.stdout)
    }
}

/// Anything other than a JSON object counts as "no extractable info".
pub fn parse_info(stdout: &[u8]) -> Result<RawVideoInfo, ContentError> {
    let value: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| ContentError::VideoInfoUnavailable(format!("Unreadable metadata: {}", e)))?;

    if !value.is_object() {
        return Err(ContentError::VideoInfoUnavailable(
            "Extractor returned no information".to_string(),
        ));
    }

    serde_json::from_value(value).map_err(|e| {
        ContentError::VideoInfoUnavailable(format!("Unexpected metadata shape: {}", e))
    })
}
