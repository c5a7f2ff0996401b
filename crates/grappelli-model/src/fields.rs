//! Field descriptors and the native↔wire codec seam
//!
//! A field declaration is an immutable descriptor: model-side name, wire key,
//! kind, nullability and mutability. Typed descriptors ([`scalars`]) pair a
//! descriptor with a [`FieldCodec`] and expose the filter builders their kind
//! supports; schemas own plain [`FieldDef`]s resolved from those descriptors
//! at registration time.

use grappelli_core::{Error, JsonValue, Result};

pub mod scalars;

/// Bidirectional native↔wire conversion for one field kind
///
/// Both directions are pure. `decode(encode(x)) == x` holds for every value
/// inside the native domain; `encode` rejects values outside it with a
/// validation error and `decode` rejects malformed wire input with a decode
/// error.
pub trait FieldCodec {
	type Native;

	fn encode(&self, field: &str, value: &Self::Native) -> Result<JsonValue>;

	fn decode(&self, field: &str, wire: &JsonValue) -> Result<Self::Native>;
}

/// The scalar kinds the wire shape supports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
	String,
	Integer,
	Float,
	Boolean,
	Id,
	DateTime,
}

/// Immutable field declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
	pub name: String,
	pub wire_key: String,
	pub kind: FieldKind,
	pub nullable: bool,
	pub mutable: bool,
}

impl FieldDef {
	pub(crate) fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		let name = name.into();
		FieldDef {
			wire_key: name.clone(),
			name,
			kind,
			nullable: false,
			mutable: !matches!(kind, FieldKind::Id),
		}
	}

	pub(crate) fn check_mutable(&self) -> Result<()> {
		if !self.mutable {
			return Err(Error::validation(&self.name, "field is read-only"));
		}
		Ok(())
	}
}

/// Anything a schema can register: a typed descriptor exposing its declaration
pub trait SchemaField {
	fn def(&self) -> &FieldDef;
}
