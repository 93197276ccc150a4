//! Engine configuration.
//!
//! Scoring weights and the context radius have no derivation beyond "larger
//! score wins"; they are exposed as tunables rather than baked-in constants.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Weights used by the best-position resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
	/// Preceding text equals the captured `text_before`.
	pub exact_before: u32,
	/// Preceding text contains the tail probe of `text_before`.
	pub partial_before: u32,
	/// Following text equals the captured `text_after`.
	pub exact_after: u32,
	/// Following text contains the head probe of `text_after`.
	pub partial_after: u32,
	/// Occurrence sits in the captured block.
	pub same_block: u32,
	/// Occurrence sits within `near_block_distance` blocks of the captured block.
	pub near_block: u32,
	/// Block distance that still counts as near.
	pub near_block_distance: usize,
	/// Length of the partial-match probes, in characters.
	pub probe_len: usize,
}

impl Default for ScoreWeights {
	fn default() -> Self {
		Self {
			exact_before: 50,
			partial_before: 20,
			exact_after: 50,
			partial_after: 20,
			same_block: 30,
			near_block: 15,
			near_block_distance: 2,
			probe_len: 10,
		}
	}
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorConfig {
	/// Characters captured on each side of an anchor.
	pub context_radius: usize,
	/// Best-position scoring weights.
	pub weights: ScoreWeights,
	/// Quiet period required before the first orphan/recovery pass, in milliseconds.
	pub stability_window_ms: u64,
	/// Quiet period after a selection change before offering "add comment", in milliseconds.
	pub selection_debounce_ms: u64,
}

impl Default for AnchorConfig {
	fn default() -> Self {
		Self {
			context_radius: 30,
			weights: ScoreWeights::default(),
			stability_window_ms: 500,
			selection_debounce_ms: 300,
		}
	}
}

impl AnchorConfig {
	/// Parses configuration from TOML. Missing keys take their defaults.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Reads and parses a TOML configuration file.
	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let input = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
			path: path.to_path_buf(),
			error,
		})?;
		Self::from_toml_str(&input)
	}

	/// Quiet period required before the first lifecycle pass.
	pub fn stability_window(&self) -> Duration {
		Duration::from_millis(self.stability_window_ms)
	}

	/// Quiet period before a settled selection is surfaced.
	pub fn selection_debounce(&self) -> Duration {
		Duration::from_millis(self.selection_debounce_ms)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.context_radius == 0 {
			return Err(ConfigError::InvalidValue {
				option: "context_radius",
				reason: "must be at least 1".into(),
			});
		}
		if self.weights.probe_len == 0 {
			return Err(ConfigError::InvalidValue {
				option: "weights.probe_len",
				reason: "must be at least 1".into(),
			});
		}
		Ok(())
	}
}
