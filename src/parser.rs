//! JSON decoding of upstream feed documents.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{PipelineError, Result};

/// The outer shape shared by both feeds: a `features` array.
///
/// Features are kept as raw JSON so each record can be decoded (and fail)
/// on its own.
#[derive(Debug, Deserialize)]
pub struct FeedDocument {
    pub features: Vec<Value>,
}

/// Decodes a feed document from raw bytes.
///
/// # Errors
///
/// Returns [`PipelineError::UnexpectedFailure`] if the bytes are not JSON or
/// lack a `features` array.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedDocument> {
    serde_json::from_slice(bytes)
        .map_err(|e| PipelineError::unexpected(format!("malformed feed document: {e}")))
}
