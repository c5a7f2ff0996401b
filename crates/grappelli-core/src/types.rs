//! Wire-level value aliases and ordering primitives
//!
//! Raw records travel as flat JSON mappings from wire key to primitive value;
//! everything above the executor speaks these aliases instead of naming
//! serde_json types directly.

use serde::{Deserialize, Serialize};

/// A single wire value
pub type JsonValue = serde_json::Value;

/// A raw wire record: flat mapping from wire key to primitive value
pub type JsonMap = serde_json::Map<String, JsonValue>;

/// Direction of a server-side ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
	#[serde(rename = "asc")]
	Ascending,
	#[serde(rename = "desc")]
	Descending,
}

impl SortDirection {
	pub fn flipped(self) -> Self {
		match self {
			SortDirection::Ascending => SortDirection::Descending,
			SortDirection::Descending => SortDirection::Ascending,
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			SortDirection::Ascending => "asc",
			SortDirection::Descending => "desc",
		}
	}
}

/// Server-side ordering: one field plus a direction
///
/// The field is addressed by its wire key, not its model name; views resolve
/// that mapping before a request is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
	pub field: String,
	pub direction: SortDirection,
}

impl OrderBy {
	pub fn ascending(field: impl Into<String>) -> Self {
		OrderBy {
			field: field.into(),
			direction: SortDirection::Ascending,
		}
	}

	pub fn descending(field: impl Into<String>) -> Self {
		OrderBy {
			field: field.into(),
			direction: SortDirection::Descending,
		}
	}

	/// Same field, opposite direction
	pub fn flipped(&self) -> Self {
		OrderBy {
			field: self.field.clone(),
			direction: self.direction.flipped(),
		}
	}
}
