//! Error types for decoding, layout and assembly.
//!
//! Every error here is a plain value handed back to the caller. Nothing in the
//! decode or layout path aborts; the orchestrator decides whether a failing mip
//! is skipped, substituted or fatal for the whole asset.

use thiserror::Error;

use crate::data_structures::format::TextureFormat;

/// Lookup failures in the format catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The format name is not one of `bc1`..`bc7`.
    #[error("unknown texture format `{0}`")]
    UnknownFormat(String),
}

/// Rejections of a texture description document.
#[derive(Debug, Error)]
pub enum DescriptionError {
    #[error("invalid texture description: {0}")]
    InvalidDescription(String),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("malformed description document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the block decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("cannot decode a {width}x{height} mip: zero dimension")]
    ZeroDimension { width: u32, height: u32 },
    #[error("truncated payload: expected at least {expected} bytes, got {actual}")]
    TruncatedPayload { expected: usize, actual: usize },
    #[error("a {width}x{height} mip is too large to decode in memory")]
    TooLarge { width: u32, height: u32 },
    /// Software decode was requested for a format that only supports native upload.
    #[error("software decode of {0} is not supported")]
    Unsupported(TextureFormat),
}

/// Failures of the layout engine and the geometry emitter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("invalid mip chain: at least one mip is required")]
    InvalidMipChain,
}

/// Failures while assembling a renderable texture from storage.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("could not read the description of texture `{texture_id}`: {source}")]
    MissingDescription {
        texture_id: String,
        source: anyhow::Error,
    },
    #[error("could not read mip {mip} of texture `{texture_id}`: {source}")]
    MissingPayload {
        texture_id: String,
        mip: usize,
        source: anyhow::Error,
    },
    #[error(transparent)]
    Description(#[from] DescriptionError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("mip {mip}: {source}")]
    Decode { mip: usize, source: DecodeError },
}
