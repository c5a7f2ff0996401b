//! # Grappelli
//!
//! Lazy, typed data access for remote record APIs, in the spirit of Django
//! querysets.
//!
//! Grappelli talks to backends that expose exactly two read endpoints — a
//! paginated, filter-capable list and a get-by-identifier — and turns them
//! into composable, immutable views: filter with typed field descriptors,
//! slice and reverse without touching the network, then materialize under
//! either a blocking or a suspending execution discipline. One query engine
//! serves both; only the I/O primitive differs.
//!
//! ## Crates
//!
//! - `grappelli-core` — error taxonomy and wire value types
//! - `grappelli-client` — the record source capability and backends
//! - `grappelli-model` — fields, filters, schemas, records and views
//!
//! ## Quick start
//!
//! ```rust
//! use std::sync::Arc;
//! use grappelli::prelude::*;
//!
//! # fn main() -> grappelli::Result<()> {
//! let name = StringField::new("name");
//! let age = IntegerField::new("age");
//! let schema = ModuleSchema::builder("contacts")
//!     .field(&IdField::new("id"))
//!     .field(&name)
//!     .field(&age)
//!     .build()?;
//!
//! let backend = Arc::new(MemoryBackend::new());
//! let contacts = SyncModule::new(schema, backend);
//!
//! let adults = contacts.find_where(age.gt(30)).slice(0..10);
//! for record in adults.iter() {
//!     let record = record?;
//!     let _ = name.get(&record)?;
//! }
//! # Ok(())
//! # }
//! ```

pub use grappelli_core::{Error, JsonMap, JsonValue, OrderBy, Result, SortDirection};

pub use grappelli_client::{
	AsyncRecordSource, IssuedRequest, ListRequest, ListResponse, MemoryBackend, QueryConfig,
	RecordSource,
};

pub use grappelli_model::{
	AsyncModule, AsyncQuerySet, AsyncRecords, BooleanField, DateTimeField, FieldCodec, FieldDef,
	FieldKind, Filter, FilterOperator, FloatField, IdField, IntegerField, ModuleSchema, Predicate,
	QuerySet, Record, Records, SchemaBuilder, SchemaField, StringField, SyncModule, SyncQuerySet,
	Window,
};

/// Everything an application normally imports
pub mod prelude {
	pub use grappelli_client::{
		AsyncRecordSource, MemoryBackend, QueryConfig, RecordSource,
	};
	pub use grappelli_core::{Error, OrderBy, Result, SortDirection};
	pub use grappelli_model::{
		AsyncModule, BooleanField, DateTimeField, FloatField, IdField, IntegerField, ModuleSchema,
		Predicate, Record, SchemaField, StringField, SyncModule,
	};
}
