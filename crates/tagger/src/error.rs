use thiserror::Error;

/// Failure reported by a [`crate::TagSource`] for one background chunk.
///
/// The tagger never surfaces these to consumers: a failed chunk degrades to an
/// empty tag list and processing moves on to the next chunk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
	/// The source observed the cancellation token and stopped early.
	#[error("tag computation cancelled")]
	Cancelled,
	#[error("tag source failed: {0}")]
	Failed(String),
}

impl SourceError {
	pub fn failed(msg: impl Into<String>) -> Self {
		Self::Failed(msg.into())
	}
}

/// Errors from loading a [`crate::TaggerCfg`].
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("invalid tagger config: {0}")]
	Parse(#[from] toml::de::Error),
}
