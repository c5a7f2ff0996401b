//! Core types for the grappelli data-access layer
//!
//! This crate carries the pieces every other grappelli crate agrees on: the
//! unified error taxonomy and the wire-level value aliases. It has no I/O and
//! no knowledge of schemas or views.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{JsonMap, JsonValue, OrderBy, SortDirection};
