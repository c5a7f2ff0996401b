//! Record source traits and request/response value types
//!
//! A source exposes exactly what the remote backend exposes: a paginated,
//! filter-capable list endpoint, a single-record get by identifier, and the
//! mutation trio used when records are saved. The blocking and suspending
//! traits mirror each other method for method so the view engine can be
//! written once against either.

use async_trait::async_trait;
use grappelli_core::{JsonMap, OrderBy, Result};

/// One bounded list call against a module
///
/// `filter` is the compiled wire query object ([`crate::executor`] does not
/// interpret it); an empty mapping selects everything. `offset`/`limit`
/// address the server-side enumeration under `order_by`.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRequest {
	pub module: String,
	pub filter: JsonMap,
	pub order_by: Option<OrderBy>,
	pub offset: u64,
	pub limit: u64,
}

impl ListRequest {
	pub fn new(module: impl Into<String>) -> Self {
		ListRequest {
			module: module.into(),
			filter: JsonMap::new(),
			order_by: None,
			offset: 0,
			limit: 1,
		}
	}
}

/// Ordered raw records plus the backend's optional total-count hint
///
/// `total_count`, when present, is the size of the whole filtered set — not
/// of this page. Backends that cannot count cheaply simply omit it; the
/// engine degrades the operations that need it.
#[derive(Debug, Clone, Default)]
pub struct ListResponse {
	pub records: Vec<JsonMap>,
	pub total_count: Option<u64>,
}

/// Blocking record source
///
/// Operations run on the calling thread and return materialized results;
/// suspension is the network call blocking the thread.
pub trait RecordSource: Send + Sync {
	/// List up to `limit` records from `offset` under the request's filter and order.
	fn list(&self, request: &ListRequest) -> Result<ListResponse>;

	/// Fetch one record by identifier; `None` when absent.
	fn get(&self, module: &str, id: &str) -> Result<Option<JsonMap>>;

	/// Create a record from a full payload; returns the stored wire record.
	fn create(&self, module: &str, payload: &JsonMap) -> Result<JsonMap>;

	/// Apply a sparse payload to an existing record; returns the stored wire record.
	fn update(&self, module: &str, id: &str, payload: &JsonMap) -> Result<JsonMap>;

	/// Delete a record by identifier.
	fn delete(&self, module: &str, id: &str) -> Result<()>;
}

/// Suspending record source
///
/// Operations return futures the caller must await; suspension occurs at the
/// same I/O boundary, yielding to the cooperative scheduler instead of
/// blocking. A dropped in-flight call yields no partial records.
#[async_trait]
pub trait AsyncRecordSource: Send + Sync {
	/// List up to `limit` records from `offset` under the request's filter and order.
	async fn list(&self, request: &ListRequest) -> Result<ListResponse>;

	/// Fetch one record by identifier; `None` when absent.
	async fn get(&self, module: &str, id: &str) -> Result<Option<JsonMap>>;

	/// Create a record from a full payload; returns the stored wire record.
	async fn create(&self, module: &str, payload: &JsonMap) -> Result<JsonMap>;

	/// Apply a sparse payload to an existing record; returns the stored wire record.
	async fn update(&self, module: &str, id: &str, payload: &JsonMap) -> Result<JsonMap>;

	/// Delete a record by identifier.
	async fn delete(&self, module: &str, id: &str) -> Result<()>;
}
