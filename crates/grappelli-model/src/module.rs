//! Module bindings
//!
//! A binding associates an owned schema with a concrete record source and a
//! query configuration, and is the factory for views and records under one
//! execution discipline. [`SyncModule`] and [`AsyncModule`] carry the same
//! surface; the record-mutation operations live here rather than on the
//! record so records themselves stay discipline-agnostic.

use std::sync::Arc;

use grappelli_client::{AsyncRecordSource, QueryConfig, RecordSource};
use grappelli_core::{Error, Result};
use tracing::debug;

use crate::filtering::Predicate;
use crate::query::{AsyncQuerySet, SyncQuerySet};
use crate::record::{Record, SavePlan};
use crate::schema::ModuleSchema;
use crate::view::QuerySet;

fn check_same_module(schema: &ModuleSchema, record: &Record) -> Result<()> {
	if record.module_name() != schema.name() {
		return Err(Error::validation(
			schema.name(),
			format!(
				"record belongs to module `{}`, not `{}`",
				record.module_name(),
				schema.name()
			),
		));
	}
	Ok(())
}

/// Module bound to a blocking record source
#[derive(Clone)]
pub struct SyncModule {
	schema: Arc<ModuleSchema>,
	source: Arc<dyn RecordSource>,
	config: QueryConfig,
}

impl SyncModule {
	pub fn new(schema: Arc<ModuleSchema>, source: Arc<dyn RecordSource>) -> Self {
		SyncModule::with_config(schema, source, QueryConfig::default())
	}

	pub fn with_config(
		schema: Arc<ModuleSchema>,
		source: Arc<dyn RecordSource>,
		config: QueryConfig,
	) -> Self {
		SyncModule {
			schema,
			source,
			config,
		}
	}

	pub fn schema(&self) -> &Arc<ModuleSchema> {
		&self.schema
	}

	/// A view over the whole module.
	pub fn find(&self) -> SyncQuerySet {
		SyncQuerySet::new(
			QuerySet::new(self.schema.clone(), &self.config),
			self.source.clone(),
		)
	}

	/// A view filtered by the given predicate.
	pub fn find_where(&self, predicate: Predicate) -> SyncQuerySet {
		self.find().filtered(predicate)
	}

	pub fn get_by_id(&self, id: &str) -> Result<Record> {
		self.find().get_by_id(id)
	}

	/// A fresh, unsaved record for this module.
	pub fn new_record(&self) -> Record {
		Record::new(self.schema.clone())
	}

	/// Persist the record: create when it has no identifier, otherwise send
	/// only the dirty keys. A clean record issues no request.
	pub fn save(&self, record: &mut Record) -> Result<()> {
		check_same_module(&self.schema, record)?;
		match record.prepare_save()? {
			SavePlan::Clean => Ok(()),
			SavePlan::Create(payload) => {
				debug!(module = %self.schema.name(), "creating record");
				let raw = self.source.create(self.schema.name(), &payload)?;
				record.finalize_save(raw);
				Ok(())
			}
			SavePlan::Update { id, payload } => {
				debug!(module = %self.schema.name(), id = %id, "updating record");
				let raw = self.source.update(self.schema.name(), &id, &payload)?;
				record.finalize_save(raw);
				Ok(())
			}
		}
	}

	/// Delete the server-side row and clear the record's identifier; a later
	/// save re-creates it.
	pub fn delete(&self, record: &mut Record) -> Result<()> {
		check_same_module(&self.schema, record)?;
		let id = record.prepare_delete()?;
		debug!(module = %self.schema.name(), id = %id, "deleting record");
		self.source.delete(self.schema.name(), &id)?;
		record.finalize_delete();
		Ok(())
	}

	/// Re-fetch the record's row, dropping any unsaved writes.
	pub fn refresh(&self, record: &mut Record) -> Result<()> {
		check_same_module(&self.schema, record)?;
		let id = record.require_id("refresh")?;
		match self.source.get(self.schema.name(), &id)? {
			Some(raw) => {
				record.finalize_refresh(raw);
				Ok(())
			}
			None => Err(Error::NotFound(id)),
		}
	}
}

/// Module bound to a suspending record source
#[derive(Clone)]
pub struct AsyncModule {
	schema: Arc<ModuleSchema>,
	source: Arc<dyn AsyncRecordSource>,
	config: QueryConfig,
}

impl AsyncModule {
	pub fn new(schema: Arc<ModuleSchema>, source: Arc<dyn AsyncRecordSource>) -> Self {
		AsyncModule::with_config(schema, source, QueryConfig::default())
	}

	pub fn with_config(
		schema: Arc<ModuleSchema>,
		source: Arc<dyn AsyncRecordSource>,
		config: QueryConfig,
	) -> Self {
		AsyncModule {
			schema,
			source,
			config,
		}
	}

	pub fn schema(&self) -> &Arc<ModuleSchema> {
		&self.schema
	}

	/// A view over the whole module.
	pub fn find(&self) -> AsyncQuerySet {
		AsyncQuerySet::new(
			QuerySet::new(self.schema.clone(), &self.config),
			self.source.clone(),
		)
	}

	/// A view filtered by the given predicate.
	pub fn find_where(&self, predicate: Predicate) -> AsyncQuerySet {
		self.find().filtered(predicate)
	}

	pub async fn get_by_id(&self, id: &str) -> Result<Record> {
		self.find().get_by_id(id).await
	}

	/// A fresh, unsaved record for this module.
	pub fn new_record(&self) -> Record {
		Record::new(self.schema.clone())
	}

	/// Persist the record: create when it has no identifier, otherwise send
	/// only the dirty keys. A clean record issues no request.
	pub async fn save(&self, record: &mut Record) -> Result<()> {
		check_same_module(&self.schema, record)?;
		match record.prepare_save()? {
			SavePlan::Clean => Ok(()),
			SavePlan::Create(payload) => {
				debug!(module = %self.schema.name(), "creating record");
				let raw = self.source.create(self.schema.name(), &payload).await?;
				record.finalize_save(raw);
				Ok(())
			}
			SavePlan::Update { id, payload } => {
				debug!(module = %self.schema.name(), id = %id, "updating record");
				let raw = self.source.update(self.schema.name(), &id, &payload).await?;
				record.finalize_save(raw);
				Ok(())
			}
		}
	}

	/// Delete the server-side row and clear the record's identifier; a later
	/// save re-creates it.
	pub async fn delete(&self, record: &mut Record) -> Result<()> {
		check_same_module(&self.schema, record)?;
		let id = record.prepare_delete()?;
		debug!(module = %self.schema.name(), id = %id, "deleting record");
		self.source.delete(self.schema.name(), &id).await?;
		record.finalize_delete();
		Ok(())
	}

	/// Re-fetch the record's row, dropping any unsaved writes.
	pub async fn refresh(&self, record: &mut Record) -> Result<()> {
		check_same_module(&self.schema, record)?;
		let id = record.require_id("refresh")?;
		match self.source.get(self.schema.name(), &id).await? {
			Some(raw) => {
				record.finalize_refresh(raw);
				Ok(())
			}
			None => Err(Error::NotFound(id)),
		}
	}
}
