//! Job submission input
//!
//! A [`NewJob`] can only be built from a non-empty video payload and at least
//! one audio source, so anything handed to the transport is already valid.

use thiserror::Error;

/// Rejected submission input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("no background video selected")]
    EmptyAsset,

    #[error("no audio sources given")]
    NoSources,
}

/// Background video to be looped under the audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoAsset {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl VideoAsset {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Validated job submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewJob {
    asset: VideoAsset,
    sources: Vec<String>,
}

impl NewJob {
    /// Validates the input; sources are trimmed and blank entries dropped
    pub fn new(asset: VideoAsset, sources: Vec<String>) -> Result<Self, ValidationError> {
        if asset.is_empty() {
            return Err(ValidationError::EmptyAsset);
        }

        let sources: Vec<String> = sources
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if sources.is_empty() {
            return Err(ValidationError::NoSources);
        }

        Ok(Self { asset, sources })
    }

    pub fn asset(&self) -> &VideoAsset {
        &self.asset
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Sources as the comma separated form field the service expects
    pub fn sources_field(&self) -> String {
        self.sources.join(",")
    }
}

/// Splits a comma separated source list, dropping blank entries
pub fn parse_sources(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
