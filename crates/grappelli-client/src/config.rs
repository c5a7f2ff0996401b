//! Query engine settings
//!
//! Settings deserialize from whatever configuration source the application
//! uses; everything has a default so a bare `QueryConfig::default()` is a
//! working setup.

use grappelli_core::{Error, Result};
use serde::{Deserialize, Serialize};

fn default_batch_size() -> u64 {
	50
}

/// Tuning knobs for view materialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
	/// Records fetched per list request during lazy iteration.
	pub batch_size: u64,
}

impl Default for QueryConfig {
	fn default() -> Self {
		QueryConfig {
			batch_size: default_batch_size(),
		}
	}
}

impl QueryConfig {
	/// Build a config with an explicit batch size.
	///
	/// The backend contract requires `limit > 0`, so a zero batch size is
	/// rejected here instead of failing on the first request.
	pub fn with_batch_size(batch_size: u64) -> Result<Self> {
		if batch_size == 0 {
			return Err(Error::validation("batch_size", "batch size must be positive"));
		}
		Ok(QueryConfig { batch_size })
	}
}
