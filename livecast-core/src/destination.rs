//! Stream destination helpers
//!
//! Protocol detection and stream-key masking for logs and status output.

use serde::{Deserialize, Serialize};

/// Streaming protocol of a destination URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamProtocol {
    /// RTMP or RTMPS
    Rtmp,
    /// SRT
    Srt,
}

impl StreamProtocol {
    /// Detect protocol from URL
    pub fn from_url(url: &str) -> Option<Self> {
        let lower = url.to_lowercase();
        if lower.starts_with("rtmp://") || lower.starts_with("rtmps://") {
            Some(Self::Rtmp)
        } else if lower.starts_with("srt://") {
            Some(Self::Srt)
        } else {
            None
        }
    }
}

impl std::fmt::Display for StreamProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rtmp => write!(f, "RTMP"),
            Self::Srt => write!(f, "SRT"),
        }
    }
}

const SECRET_QUERY_KEYS: [&str; 3] = ["streamid", "passphrase", "key"];

/// Mask the stream key in a URL for safe logging
///
/// RTMP keys are the last path segment; SRT carries secrets in the query.
pub fn mask_stream_url(url: &str) -> String {
    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (url, None),
    };

    let mut masked = match base.rfind('/') {
        Some(idx) if !base[..idx].ends_with('/') => {
            let (head, key) = base.split_at(idx + 1);
            if !key.is_empty() && !key.contains(':') {
                format!("{}****", head)
            } else {
                base.to_string()
            }
        }
        _ => base.to_string(),
    };

    if let Some(query) = query {
        let params: Vec<String> = query
            .split('&')
            .map(|param| match param.split_once('=') {
                Some((k, _)) if SECRET_QUERY_KEYS.contains(&k.to_lowercase().as_str()) => {
                    format!("{}=****", k)
                }
                _ => param.to_string(),
            })
            .collect();
        masked.push('?');
        masked.push_str(&params.join("&"));
    }

    masked
}
