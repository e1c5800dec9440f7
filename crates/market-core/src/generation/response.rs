//! Generation results and long-running operation handles.

use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

use crate::markdown;

/// Binary media returned by the service.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaAsset {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl MediaAsset {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// `data:` URL suitable for inline display.
    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            BASE64_STANDARD.encode(&self.bytes)
        )
    }
}

impl std::fmt::Debug for MediaAsset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaAsset")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Normalized result of a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutput {
    /// Free text, possibly using the Markdown subset.
    Text(String),
    /// Structured response parsed into named string fields.
    Fields(BTreeMap<String, String>),
    Image(MediaAsset),
    Video(MediaAsset),
}

impl GenerationOutput {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Fields(_) => "fields",
            Self::Image(_) => "image",
            Self::Video(_) => "video",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn media(&self) -> Option<&MediaAsset> {
        match self {
            Self::Image(asset) | Self::Video(asset) => Some(asset),
            _ => None,
        }
    }

    /// Plain text for the clipboard, with Markdown markers removed.
    ///
    /// Media results have nothing to copy.
    pub fn copy_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(markdown::to_plain_text(text)),
            Self::Fields(fields) => Some(
                fields
                    .iter()
                    .map(|(name, value)| format!("{name}: {value}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Self::Image(_) | Self::Video(_) => None,
        }
    }
}

/// Handle of a long-running generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOperation {
    /// Resource name used to re-fetch the status.
    pub name: String,
    pub done: bool,
    /// URI of the finished asset.
    pub result_uri: Option<String>,
    /// Error reported by the service for a finished operation.
    pub error: Option<String>,
}

impl GenerationOperation {
    pub fn pending(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: false,
            result_uri: None,
            error: None,
        }
    }

    pub fn completed(name: impl Into<String>, result_uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            result_uri: Some(result_uri.into()),
            error: None,
        }
    }
}

/// What the service returns for a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResponse {
    Completed(GenerationOutput),
    Pending(GenerationOperation),
}
