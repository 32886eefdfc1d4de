//! Decode and parse error types.

use thiserror::Error;

/// Errors decoding a binary tile envelope.
///
/// Any of these means the whole tile has no usable content; the cache
/// boundary converts them into an empty cached collection rather than
/// surfacing them to callers.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Envelope does not start with the expected magic
    #[error("tile envelope has unknown magic")]
    BadMagic,

    /// Envelope ended before a declared field
    #[error("tile envelope truncated reading {context}")]
    Truncated { context: &'static str },

    /// Feature id bytes are not UTF-8
    #[error("tile feature id is not valid UTF-8")]
    InvalidId,

    /// Property bag is not a JSON object
    #[error("feature '{id}' has malformed properties: {message}")]
    Properties { id: String, message: String },

    /// Geometry blob is not decodable by the codec (including geometry
    /// kinds the codec does not implement)
    #[error("feature '{id}' geometry not decodable: {message}")]
    Geometry { id: String, message: String },

    /// Bytes remain after the declared feature count
    #[error("tile envelope has {0} trailing bytes")]
    TrailingData(usize),
}

/// Errors parsing a region boundary document.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Document is not valid JSON at all
    #[error("region document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Top-level shape is neither a FeatureCollection nor a flat
    /// id-to-feature mapping
    #[error("region document has unrecognized top-level shape")]
    UnrecognizedShape,
}
