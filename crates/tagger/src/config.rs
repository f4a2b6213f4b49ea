use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Default maximum number of lines handed to the source in one call.
pub const DEFAULT_CHUNK_LINES: usize = 1000;

/// Tagger configuration.
///
/// Can be built in code or read from TOML:
///
/// ```toml
/// delay_ms = 120
/// chunk_lines = 500
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TaggerCfg {
	/// Quiet period before a background request starts calling the source.
	///
	/// Superseding the request during the delay cancels it without any work.
	pub delay_ms: Option<u64>,
	/// Maximum lines per background chunk. Zero is treated as one.
	pub chunk_lines: usize,
}

impl Default for TaggerCfg {
	fn default() -> Self {
		Self {
			delay_ms: None,
			chunk_lines: DEFAULT_CHUNK_LINES,
		}
	}
}

impl TaggerCfg {
	pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	pub fn with_delay(mut self, delay: Duration) -> Self {
		self.delay_ms = Some(delay.as_millis() as u64);
		self
	}

	pub fn with_chunk_lines(mut self, lines: usize) -> Self {
		self.chunk_lines = lines;
		self
	}

	/// Returns the coalescing delay, or `None` when unset or zero.
	pub fn delay(&self) -> Option<Duration> {
		self.delay_ms.filter(|ms| *ms > 0).map(Duration::from_millis)
	}

	pub fn chunk_lines(&self) -> usize {
		self.chunk_lines.max(1)
	}
}
