//! Module schemas
//!
//! A schema is the owned result of explicit field registration: an ordered
//! list of field declarations resolved once when the module is constructed.
//! Schemas are shared via `Arc`; field descriptors keep their own copies of
//! the declaration data and never own the schema.

use std::sync::Arc;

use grappelli_core::{Error, Result};

use crate::fields::{FieldDef, FieldKind, SchemaField};

/// Owned, ordered description of one remote module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSchema {
	name: String,
	fields: Vec<FieldDef>,
	id_index: usize,
}

impl ModuleSchema {
	pub fn builder(name: impl Into<String>) -> SchemaBuilder {
		SchemaBuilder {
			name: name.into(),
			fields: Vec::new(),
		}
	}

	/// The module's wire name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Field declarations in registration order.
	pub fn fields(&self) -> &[FieldDef] {
		&self.fields
	}

	pub fn field(&self, name: &str) -> Option<&FieldDef> {
		self.fields.iter().find(|field| field.name == name)
	}

	pub fn field_by_wire_key(&self, wire_key: &str) -> Option<&FieldDef> {
		self.fields.iter().find(|field| field.wire_key == wire_key)
	}

	/// The identifier field's declaration.
	pub fn id_field(&self) -> &FieldDef {
		&self.fields[self.id_index]
	}

	/// Wire key records are addressed by in get/update/delete calls.
	pub fn id_wire_key(&self) -> &str {
		&self.id_field().wire_key
	}
}

/// Ordered field registration, resolved by [`SchemaBuilder::build`]
pub struct SchemaBuilder {
	name: String,
	fields: Vec<FieldDef>,
}

impl SchemaBuilder {
	/// Register a field; declaration order is preserved.
	pub fn field(mut self, field: &impl SchemaField) -> Self {
		self.fields.push(field.def().clone());
		self
	}

	/// Resolve the registration into an owned schema.
	///
	/// Rejects empty module names, duplicate field names or wire keys, and
	/// registrations without exactly one identifier field.
	pub fn build(self) -> Result<Arc<ModuleSchema>> {
		if self.name.is_empty() {
			return Err(Error::validation("module", "module name cannot be empty"));
		}
		for (index, field) in self.fields.iter().enumerate() {
			let earlier = &self.fields[..index];
			if earlier.iter().any(|other| other.name == field.name) {
				return Err(Error::validation(
					&field.name,
					"field name registered twice",
				));
			}
			if earlier.iter().any(|other| other.wire_key == field.wire_key) {
				return Err(Error::validation(
					&field.name,
					format!("wire key `{}` registered twice", field.wire_key),
				));
			}
		}

		let mut id_fields = self
			.fields
			.iter()
			.enumerate()
			.filter(|(_, field)| field.kind == FieldKind::Id);
		let id_index = match (id_fields.next(), id_fields.next()) {
			(Some((index, _)), None) => index,
			(None, _) => {
				return Err(Error::validation(
					"module",
					"schema must register an identifier field",
				));
			}
			(Some(_), Some((_, duplicate))) => {
				return Err(Error::validation(
					&duplicate.name,
					"schema may only register one identifier field",
				));
			}
		};

		Ok(Arc::new(ModuleSchema {
			name: self.name,
			fields: self.fields,
			id_index,
		}))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fields::scalars::{IdField, IntegerField, StringField};

	#[test]
	fn test_registration_order_preserved() {
		let schema = ModuleSchema::builder("contacts")
			.field(&IdField::new("id"))
			.field(&StringField::new("name"))
			.field(&IntegerField::new("age"))
			.build()
			.unwrap();
		let names: Vec<&str> = schema.fields().iter().map(|f| f.name.as_str()).collect();
		assert_eq!(names, vec!["id", "name", "age"]);
		assert_eq!(schema.id_wire_key(), "id");
	}

	#[test]
	fn test_duplicate_names_rejected() {
		let result = ModuleSchema::builder("contacts")
			.field(&IdField::new("id"))
			.field(&StringField::new("name"))
			.field(&StringField::new("name"))
			.build();
		assert!(result.is_err());
	}

	#[test]
	fn test_duplicate_wire_keys_rejected() {
		let result = ModuleSchema::builder("contacts")
			.field(&IdField::new("id"))
			.field(&StringField::new("first").wire_key("n"))
			.field(&StringField::new("second").wire_key("n"))
			.build();
		assert!(result.is_err());
	}

	#[test]
	fn test_identifier_field_required() {
		let result = ModuleSchema::builder("contacts")
			.field(&StringField::new("name"))
			.build();
		assert!(result.is_err());

		let result = ModuleSchema::builder("contacts")
			.field(&IdField::new("id"))
			.field(&IdField::new("other_id"))
			.build();
		assert!(result.is_err());
	}

	#[test]
	fn test_lookup_by_name_and_wire_key() {
		let schema = ModuleSchema::builder("contacts")
			.field(&IdField::new("id"))
			.field(&StringField::new("last_name").wire_key("lastName"))
			.build()
			.unwrap();
		assert!(schema.field("last_name").is_some());
		assert!(schema.field("lastName").is_none());
		assert!(schema.field_by_wire_key("lastName").is_some());
	}
}
