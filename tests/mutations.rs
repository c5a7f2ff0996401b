//! Record mutation flows: save, delete, refresh.

use std::sync::Arc;

use grappelli::prelude::*;
use grappelli::{Error, IssuedRequest, JsonMap};
use serde_json::json;

fn row(value: serde_json::Value) -> JsonMap {
	value.as_object().unwrap().clone()
}

struct Fixture {
	backend: Arc<MemoryBackend>,
	contacts: SyncModule,
	name: StringField,
	age: IntegerField,
}

fn fixture() -> Fixture {
	let name = StringField::new("name");
	let age = IntegerField::new("age").nullable();
	let schema = ModuleSchema::builder("contacts")
		.field(&IdField::new("id"))
		.field(&name)
		.field(&age)
		.build()
		.unwrap();

	let backend = Arc::new(MemoryBackend::new());
	backend.seed(
		"contacts",
		[row(json!({"id": "r0", "name": "Ada", "age": 36}))],
	);

	let contacts = SyncModule::new(schema, backend.clone());
	Fixture {
		backend,
		contacts,
		name,
		age,
	}
}

#[test]
fn test_fresh_record_saves_via_create() {
	let fx = fixture();

	let mut record = fx.contacts.new_record();
	fx.name.set(&mut record, "Alan".to_string()).unwrap();
	assert_eq!(record.id(), None);

	fx.contacts.save(&mut record).unwrap();

	// One create, identifier assigned by the backend, overlay flushed.
	assert_eq!(fx.backend.requests().len(), 1);
	assert!(matches!(
		fx.backend.requests()[0],
		IssuedRequest::Create { .. }
	));
	assert!(record.id().is_some());
	assert!(!record.is_dirty());
}

#[test]
fn test_saved_record_updates_only_dirty_keys() {
	let fx = fixture();

	let mut record = fx.contacts.get_by_id("r0").unwrap();
	fx.backend.clear_requests();

	fx.age.set(&mut record, 37).unwrap();
	fx.contacts.save(&mut record).unwrap();

	assert_eq!(fx.backend.requests().len(), 1);
	assert!(matches!(
		fx.backend.requests()[0],
		IssuedRequest::Update { .. }
	));

	let stored = fx.contacts.get_by_id("r0").unwrap();
	assert_eq!(fx.age.get(&stored).unwrap(), 37);
	assert_eq!(fx.name.get(&stored).unwrap(), "Ada");
}

#[test]
fn test_clean_save_issues_no_request() {
	let fx = fixture();

	let mut record = fx.contacts.get_by_id("r0").unwrap();
	fx.backend.clear_requests();

	fx.contacts.save(&mut record).unwrap();
	assert!(fx.backend.requests().is_empty());
}

#[test]
fn test_delete_then_save_recreates_the_row() {
	let fx = fixture();

	let mut record = fx.contacts.get_by_id("r0").unwrap();
	fx.contacts.delete(&mut record).unwrap();

	assert_eq!(record.id(), None);
	assert!(matches!(
		fx.contacts.get_by_id("r0"),
		Err(Error::NotFound(_))
	));

	// The data survived client-side; saving creates a new row.
	fx.contacts.save(&mut record).unwrap();
	let new_id = record.id().unwrap().to_string();
	assert_ne!(new_id, "r0");
	let fetched = fx.contacts.get_by_id(&new_id).unwrap();
	assert_eq!(fx.name.get(&fetched).unwrap(), "Ada");
}

#[test]
fn test_deleting_an_unsaved_record_is_a_validation_error() {
	let fx = fixture();

	let mut record = fx.contacts.new_record();
	assert!(matches!(
		fx.contacts.delete(&mut record),
		Err(Error::Validation { .. })
	));
	assert!(fx.backend.requests().is_empty());
}

#[test]
fn test_refresh_discards_unsaved_writes() {
	let fx = fixture();

	let mut record = fx.contacts.get_by_id("r0").unwrap();
	fx.age.set(&mut record, 99).unwrap();
	assert!(record.is_dirty());

	fx.contacts.refresh(&mut record).unwrap();
	assert!(!record.is_dirty());
	assert_eq!(fx.age.get(&record).unwrap(), 36);
}

#[test]
fn test_refresh_of_a_vanished_row_is_not_found() {
	let fx = fixture();

	let mut record = fx.contacts.get_by_id("r0").unwrap();
	let mut other = fx.contacts.get_by_id("r0").unwrap();
	fx.contacts.delete(&mut other).unwrap();

	assert!(matches!(
		fx.contacts.refresh(&mut record),
		Err(Error::NotFound(_))
	));
}

#[test]
fn test_nullable_writes_round_trip() {
	let fx = fixture();

	let mut record = fx.contacts.get_by_id("r0").unwrap();
	fx.age.set_null(&mut record).unwrap();
	fx.contacts.save(&mut record).unwrap();

	let stored = fx.contacts.get_by_id("r0").unwrap();
	assert_eq!(fx.age.get_opt(&stored).unwrap(), None);

	// The name field is not nullable.
	assert!(matches!(
		fx.name.set_null(&mut record),
		Err(Error::Validation { .. })
	));
}

#[test]
fn test_records_from_repeated_fetches_are_independent() {
	let fx = fixture();

	let mut first = fx.contacts.get_by_id("r0").unwrap();
	let second = fx.contacts.get_by_id("r0").unwrap();

	fx.age.set(&mut first, 50).unwrap();
	assert_eq!(fx.age.get(&second).unwrap(), 36);

	// They still reference the same row.
	assert_eq!(first, second);
}

#[test]
fn test_foreign_records_are_rejected() {
	let fx = fixture();

	let other_schema = ModuleSchema::builder("leads")
		.field(&IdField::new("id"))
		.build()
		.unwrap();
	let leads = SyncModule::new(other_schema, fx.backend.clone());
	let mut foreign = leads.new_record();

	assert!(matches!(
		fx.contacts.save(&mut foreign),
		Err(Error::Validation { .. })
	));
}
