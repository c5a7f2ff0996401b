//! Executor capability for the grappelli data-access layer
//!
//! The view engine never performs I/O itself; it plans requests against the
//! narrow capability defined here and lets an executor carry them out. Two
//! traits express the same capability under the two execution disciplines:
//! [`RecordSource`] blocks the calling thread, [`AsyncRecordSource`] suspends
//! at the same boundaries. Transport, authentication and connection handling
//! live entirely inside implementations of these traits.

pub mod backends;
pub mod config;
pub mod executor;

pub use backends::memory::{IssuedRequest, MemoryBackend};
pub use config::QueryConfig;
pub use executor::{AsyncRecordSource, ListRequest, ListResponse, RecordSource};
