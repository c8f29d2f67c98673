//! Errors for the few fallible host-side operations.

use thiserror::Error;

/// Failure loading the publication corpus or vocabulary.
#[derive(Error, Debug)]
pub enum CorpusError {
	#[error("no element with id `{0}` in the document")]
	MissingElement(String),

	#[error("invalid embedded JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("corpus request failed: {0}")]
	Http(#[from] gloo_net::Error),

	#[error("corpus request returned status {0}")]
	Status(u16),
}

/// Failure setting up the graph canvas.
#[derive(Error, Debug)]
pub enum SurfaceError {
	#[error("no browser window available")]
	NoWindow,

	#[error("canvas 2d context unavailable")]
	NoContext,
}
