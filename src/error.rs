//! Failures of fetching and decoding graph snapshots.

use thiserror::Error;

/// Errors raised while fetching or decoding a graph snapshot.
#[derive(Debug, Error)]
pub enum GraphError {
	/// The body was not a graph payload.
	#[error("invalid graph payload: {0}")]
	Json(#[from] serde_json::Error),
	/// The browser refused or failed the request.
	#[error("request failed: {0}")]
	Request(String),
	/// The backend answered with a non-success status.
	#[error("backend returned HTTP {0}")]
	Status(u16),
	/// The response body could not be read as text.
	#[error("response body is not text")]
	Body,
}
