//! Backend implementations of the record source capability
//!
//! Real deployments implement [`crate::executor::RecordSource`] or its
//! suspending twin over their transport of choice; this module ships the
//! in-process backend used by tests, demos and offline fixtures.

pub mod memory;
