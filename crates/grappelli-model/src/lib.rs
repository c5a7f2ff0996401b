//! Typed models over remote record APIs
//!
//! This crate is the heart of grappelli: field descriptors with their codecs,
//! the predicate algebra and its wire-query compiler, explicit schema
//! registration, records with lazy typed access, and the lazy view engine
//! shared by the blocking and suspending execution disciplines.
//!
//! A minimal setup registers a schema, binds it to a record source and
//! queries through views:
//!
//! ```rust,ignore
//! let age = IntegerField::new("age");
//! let schema = ModuleSchema::builder("contacts")
//!     .field(&IdField::new("id"))
//!     .field(&age)
//!     .build()?;
//! let contacts = SyncModule::new(schema, source);
//! for record in contacts.find_where(age.gt(30)).slice(0..10).iter() {
//!     let record = record?;
//!     // ...
//! }
//! ```

pub mod fields;
pub mod filtering;
pub mod module;
pub mod query;
pub mod record;
pub mod schema;
pub mod view;

pub use fields::scalars::{
	BooleanField, DateTimeField, FloatField, IdField, IntegerField, StringField,
};
pub use fields::{FieldCodec, FieldDef, FieldKind, SchemaField};
pub use filtering::{Filter, FilterOperator, Predicate};
pub use module::{AsyncModule, SyncModule};
pub use query::{AsyncQuerySet, AsyncRecords, Records, SyncQuerySet};
pub use record::Record;
pub use schema::{ModuleSchema, SchemaBuilder};
pub use view::QuerySet;
pub use view::window::Window;
