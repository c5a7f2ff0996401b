//! Records and the wire mapper
//!
//! A record is a mutable typed object bound to one server-side row by its
//! stable identifier. It keeps the pristine wire snapshot it was materialized
//! from plus a dirty overlay of writes; typed access goes through the field
//! descriptors, which encode and decode against the raw maps lazily. Records
//! are never cached — repeated fetches yield independent instances.

use std::sync::Arc;

use grappelli_core::{Error, JsonMap, JsonValue, Result};

use crate::schema::ModuleSchema;

/// What a save has to send, computed without I/O
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SavePlan {
	/// No identifier yet: create from the full payload.
	Create(JsonMap),
	/// Existing row: send only the dirty overlay.
	Update { id: String, payload: JsonMap },
	/// Nothing dirty: no request at all.
	Clean,
}

/// Materialized typed object representing one remote row
#[derive(Debug, Clone)]
pub struct Record {
	schema: Arc<ModuleSchema>,
	original: JsonMap,
	updated: JsonMap,
}

impl Record {
	pub(crate) fn new(schema: Arc<ModuleSchema>) -> Self {
		Record {
			schema,
			original: JsonMap::new(),
			updated: JsonMap::new(),
		}
	}

	/// Map a raw wire record into a typed record.
	///
	/// Field values stay raw and decode lazily on access; only the identifier
	/// is checked here because everything downstream addresses the row by it.
	pub(crate) fn from_wire(schema: Arc<ModuleSchema>, raw: JsonMap) -> Result<Self> {
		if let Some(id) = raw.get(schema.id_wire_key())
			&& !id.is_string()
			&& !id.is_null()
		{
			return Err(Error::InvalidResponse(format!(
				"record identifier must be a string, got {id}"
			)));
		}
		Ok(Record {
			schema,
			original: raw,
			updated: JsonMap::new(),
		})
	}

	pub fn schema(&self) -> &Arc<ModuleSchema> {
		&self.schema
	}

	pub fn module_name(&self) -> &str {
		self.schema.name()
	}

	/// The server-side identifier, if this record has been saved.
	pub fn id(&self) -> Option<&str> {
		self.raw(self.schema.id_wire_key()).and_then(JsonValue::as_str)
	}

	/// Current raw value under a wire key; the dirty overlay shadows the snapshot.
	pub fn raw(&self, wire_key: &str) -> Option<&JsonValue> {
		self.updated.get(wire_key).or_else(|| self.original.get(wire_key))
	}

	pub(crate) fn set_raw(&mut self, wire_key: String, value: JsonValue) {
		self.updated.insert(wire_key, value);
	}

	pub fn is_dirty(&self) -> bool {
		!self.updated.is_empty()
	}

	/// The record's full wire image: snapshot overlaid with dirty writes.
	pub fn to_wire(&self) -> JsonMap {
		let mut merged = self.original.clone();
		for (key, value) in &self.updated {
			merged.insert(key.clone(), value.clone());
		}
		merged
	}

	pub(crate) fn prepare_save(&self) -> Result<SavePlan> {
		match self.id() {
			None => Ok(SavePlan::Create(self.to_wire())),
			Some(id) => {
				if self.updated.contains_key(self.schema.id_wire_key()) {
					return Err(Error::validation(
						self.schema.id_wire_key(),
						"record identifier cannot be changed",
					));
				}
				if self.updated.is_empty() {
					return Ok(SavePlan::Clean);
				}
				Ok(SavePlan::Update {
					id: id.to_string(),
					payload: self.updated.clone(),
				})
			}
		}
	}

	pub(crate) fn finalize_save(&mut self, raw: JsonMap) {
		self.original = raw;
		self.updated.clear();
	}

	/// The identifier an operation needs, or a validation error naming it.
	pub(crate) fn require_id(&self, operation: &str) -> Result<String> {
		self.id().map(str::to_string).ok_or_else(|| {
			Error::validation(
				self.schema.id_wire_key(),
				format!("cannot {operation} an unsaved record"),
			)
		})
	}

	pub(crate) fn prepare_delete(&self) -> Result<String> {
		self.require_id("delete")
	}

	/// Merge pending writes into the snapshot and drop the identifier so a
	/// later save re-creates the row.
	pub(crate) fn finalize_delete(&mut self) {
		let merged = self.to_wire();
		self.original = merged;
		self.original.remove(self.schema.id_wire_key());
		self.updated.clear();
	}

	pub(crate) fn finalize_refresh(&mut self, raw: JsonMap) {
		self.original = raw;
		self.updated.clear();
	}
}

/// Records compare by module and identifier, the way row references do;
/// unsaved records never compare equal.
impl PartialEq for Record {
	fn eq(&self, other: &Self) -> bool {
		if self.module_name() != other.module_name() {
			return false;
		}
		match (self.id(), other.id()) {
			(Some(a), Some(b)) => a == b,
			_ => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fields::scalars::{IdField, IntegerField, StringField};
	use serde_json::json;

	fn schema() -> Arc<ModuleSchema> {
		ModuleSchema::builder("contacts")
			.field(&IdField::new("id"))
			.field(&StringField::new("name"))
			.field(&IntegerField::new("age"))
			.build()
			.unwrap()
	}

	fn raw(value: serde_json::Value) -> JsonMap {
		value.as_object().unwrap().clone()
	}

	#[test]
	fn test_overlay_shadows_snapshot() {
		let mut record =
			Record::from_wire(schema(), raw(json!({"id": "r1", "name": "Ada", "age": 36})))
				.unwrap();
		assert!(!record.is_dirty());

		let age = IntegerField::new("age");
		age.set(&mut record, 37).unwrap();
		assert!(record.is_dirty());
		assert_eq!(age.get(&record).unwrap(), 37);
		assert_eq!(record.to_wire().get("age"), Some(&json!(37)));
	}

	#[test]
	fn test_fresh_record_saves_full_payload() {
		let mut record = Record::new(schema());
		StringField::new("name").set(&mut record, "Alan".to_string()).unwrap();

		match record.prepare_save().unwrap() {
			SavePlan::Create(payload) => {
				assert_eq!(payload.get("name"), Some(&json!("Alan")));
				assert!(!payload.contains_key("id"));
			}
			other => panic!("expected a create plan, got {other:?}"),
		}
	}

	#[test]
	fn test_saved_record_sends_only_dirty_keys() {
		let mut record =
			Record::from_wire(schema(), raw(json!({"id": "r1", "name": "Ada", "age": 36})))
				.unwrap();
		IntegerField::new("age").set(&mut record, 37).unwrap();

		match record.prepare_save().unwrap() {
			SavePlan::Update { id, payload } => {
				assert_eq!(id, "r1");
				assert_eq!(payload.len(), 1);
				assert_eq!(payload.get("age"), Some(&json!(37)));
			}
			other => panic!("expected an update plan, got {other:?}"),
		}
	}

	#[test]
	fn test_clean_record_plans_no_request() {
		let record =
			Record::from_wire(schema(), raw(json!({"id": "r1", "name": "Ada"}))).unwrap();
		assert_eq!(record.prepare_save().unwrap(), SavePlan::Clean);
	}

	#[test]
	fn test_finalize_save_reseeds_snapshot() {
		let mut record = Record::new(schema());
		StringField::new("name").set(&mut record, "Alan".to_string()).unwrap();
		record.finalize_save(raw(json!({"id": "r9", "name": "Alan", "age": 41})));

		assert!(!record.is_dirty());
		assert_eq!(record.id(), Some("r9"));
		assert_eq!(IntegerField::new("age").get(&record).unwrap(), 41);
	}

	#[test]
	fn test_delete_clears_identifier() {
		let mut record =
			Record::from_wire(schema(), raw(json!({"id": "r1", "name": "Ada"}))).unwrap();
		assert_eq!(record.prepare_delete().unwrap(), "r1");
		record.finalize_delete();

		assert_eq!(record.id(), None);
		assert_eq!(record.raw("name"), Some(&json!("Ada")));
		assert!(matches!(
			record.prepare_save().unwrap(),
			SavePlan::Create(_)
		));
	}

	#[test]
	fn test_unsaved_record_cannot_be_deleted() {
		let record = Record::new(schema());
		assert!(record.prepare_delete().is_err());
	}

	#[test]
	fn test_identifier_is_immutable() {
		let record =
			Record::from_wire(schema(), raw(json!({"id": "r1"}))).unwrap();
		let mut tampered = record.clone();
		tampered.set_raw("id".to_string(), json!("r2"));
		assert!(tampered.prepare_save().is_err());
	}

	#[test]
	fn test_equality_by_module_and_identifier() {
		let a = Record::from_wire(schema(), raw(json!({"id": "r1", "age": 1}))).unwrap();
		let b = Record::from_wire(schema(), raw(json!({"id": "r1", "age": 2}))).unwrap();
		let c = Record::from_wire(schema(), raw(json!({"id": "r2"}))).unwrap();
		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_ne!(Record::new(schema()), Record::new(schema()));
	}

	#[test]
	fn test_invalid_identifier_rejected_by_mapper() {
		let result = Record::from_wire(schema(), raw(json!({"id": 42})));
		assert!(matches!(result, Err(Error::InvalidResponse(_))));
	}
}
