//! Discipline drivers: blocking and suspending materialization
//!
//! Both drivers are thin loops over the pure plans in [`crate::view`]: they
//! bind a [`QuerySet`] descriptor to a record source, carry out the planned
//! requests and hand the responses straight back to the plan for folding.
//! The logical step sequence — compile predicate, resolve window, issue
//! list/get, map records — is identical in both; only the I/O primitive
//! differs.

use std::collections::VecDeque;
use std::sync::Arc;

use futures::Stream;
use grappelli_client::{AsyncRecordSource, RecordSource};
use grappelli_core::{Error, JsonMap, Result, SortDirection};
use tracing::debug;

use crate::fields::SchemaField;
use crate::filtering::Predicate;
use crate::record::Record;
use crate::view::QuerySet;
use crate::view::plan::BatchCursor;

fn check_record_key(key: &str) -> Result<()> {
	if key.is_empty() || key.contains('/') || key.contains(' ') {
		return Err(Error::validation(
			"id",
			"record keys cannot be empty or contain slashes or spaces",
		));
	}
	Ok(())
}

fn missing_count_hint() -> Error {
	Error::Unsupported("length query requires a total-count hint from the backend".to_string())
}

/// Blocking view over a remote module
#[derive(Clone)]
pub struct SyncQuerySet {
	query: QuerySet,
	source: Arc<dyn RecordSource>,
}

impl SyncQuerySet {
	pub(crate) fn new(query: QuerySet, source: Arc<dyn RecordSource>) -> Self {
		SyncQuerySet { query, source }
	}

	/// The underlying descriptor; composition and equality live there.
	pub fn query(&self) -> &QuerySet {
		&self.query
	}

	pub fn filtered(&self, predicate: Predicate) -> Self {
		SyncQuerySet::new(self.query.filtered(predicate), self.source.clone())
	}

	pub fn order_by(&self, field: &impl SchemaField, direction: SortDirection) -> Result<Self> {
		Ok(SyncQuerySet::new(
			self.query.order_by(field, direction)?,
			self.source.clone(),
		))
	}

	pub fn slice(&self, range: impl std::ops::RangeBounds<u64>) -> Self {
		SyncQuerySet::new(self.query.slice(range), self.source.clone())
	}

	pub fn step_by(&self, step: i64) -> Result<Self> {
		Ok(SyncQuerySet::new(self.query.step_by(step)?, self.source.clone()))
	}

	pub fn reversed(&self) -> Result<Self> {
		Ok(SyncQuerySet::new(self.query.reversed()?, self.source.clone()))
	}

	/// Fetch the record at a view index. Negative indexes resolve only on
	/// bounded views.
	pub fn get(&self, index: i64) -> Result<Record> {
		let request = self.query.item_request(index)?;
		debug!(module = %request.module, offset = request.offset, "fetching view item");
		let response = self.source.list(&request)?;
		self.query.single_record(index, response)
	}

	/// The first record, or `None` on an empty view.
	pub fn first(&self) -> Result<Option<Record>> {
		match self.get(0) {
			Ok(record) => Ok(Some(record)),
			Err(Error::OutOfBounds { .. }) => Ok(None),
			Err(err) => Err(err),
		}
	}

	/// Direct get-by-identifier, bypassing the window machinery.
	///
	/// The view's active filter is not combined into the lookup; the fetched
	/// record may not satisfy it.
	pub fn get_by_id(&self, id: &str) -> Result<Record> {
		check_record_key(id)?;
		debug!(module = %self.query.module_name(), id, "fetching record by id");
		match self.source.get(self.query.module_name(), id)? {
			Some(raw) => self.query.record_from_wire(raw),
			None => Err(Error::NotFound(id.to_string())),
		}
	}

	/// Number of records this view resolves to.
	///
	/// Issues one probe request and requires the backend's total-count hint.
	pub fn len(&self) -> Result<u64> {
		if self.query.window().count() == Some(0) {
			return Ok(0);
		}
		let response = self.source.list(&self.query.probe_request())?;
		let total = response.total_count.ok_or_else(missing_count_hint)?;
		Ok(self.query.clamped_len(total))
	}

	/// Lazily iterate the view in fixed-size batches.
	///
	/// Each call starts over from the window start; nothing is memoized
	/// between iterations.
	pub fn iter(&self) -> Records {
		Records {
			query: self.query.clone(),
			source: self.source.clone(),
			cursor: self.query.cursor(),
			buffer: VecDeque::new(),
			halted: false,
		}
	}

	/// Materialize the whole view.
	pub fn all(&self) -> Result<Vec<Record>> {
		self.iter().collect()
	}
}

/// Blocking lazy record iterator; requests the next batch only after the
/// current one is exhausted
pub struct Records {
	query: QuerySet,
	source: Arc<dyn RecordSource>,
	cursor: BatchCursor,
	buffer: VecDeque<JsonMap>,
	halted: bool,
}

impl Iterator for Records {
	type Item = Result<Record>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.halted {
			return None;
		}
		loop {
			if let Some(raw) = self.buffer.pop_front() {
				return Some(self.query.record_from_wire(raw));
			}
			let request = self.cursor.next_request()?;
			let response = match self.source.list(&request) {
				Ok(response) => response,
				Err(err) => {
					self.halted = true;
					return Some(Err(err));
				}
			};
			match self.cursor.absorb(&request, response) {
				Ok(batch) => self.buffer.extend(batch),
				Err(err) => {
					self.halted = true;
					return Some(Err(err));
				}
			}
		}
	}
}

/// Suspending view over a remote module
#[derive(Clone)]
pub struct AsyncQuerySet {
	query: QuerySet,
	source: Arc<dyn AsyncRecordSource>,
}

impl AsyncQuerySet {
	pub(crate) fn new(query: QuerySet, source: Arc<dyn AsyncRecordSource>) -> Self {
		AsyncQuerySet { query, source }
	}

	pub fn query(&self) -> &QuerySet {
		&self.query
	}

	pub fn filtered(&self, predicate: Predicate) -> Self {
		AsyncQuerySet::new(self.query.filtered(predicate), self.source.clone())
	}

	pub fn order_by(&self, field: &impl SchemaField, direction: SortDirection) -> Result<Self> {
		Ok(AsyncQuerySet::new(
			self.query.order_by(field, direction)?,
			self.source.clone(),
		))
	}

	pub fn slice(&self, range: impl std::ops::RangeBounds<u64>) -> Self {
		AsyncQuerySet::new(self.query.slice(range), self.source.clone())
	}

	pub fn step_by(&self, step: i64) -> Result<Self> {
		Ok(AsyncQuerySet::new(self.query.step_by(step)?, self.source.clone()))
	}

	pub fn reversed(&self) -> Result<Self> {
		Ok(AsyncQuerySet::new(self.query.reversed()?, self.source.clone()))
	}

	/// Fetch the record at a view index. Negative indexes resolve only on
	/// bounded views.
	pub async fn get(&self, index: i64) -> Result<Record> {
		let request = self.query.item_request(index)?;
		debug!(module = %request.module, offset = request.offset, "fetching view item");
		let response = self.source.list(&request).await?;
		self.query.single_record(index, response)
	}

	/// The first record, or `None` on an empty view.
	pub async fn first(&self) -> Result<Option<Record>> {
		match self.get(0).await {
			Ok(record) => Ok(Some(record)),
			Err(Error::OutOfBounds { .. }) => Ok(None),
			Err(err) => Err(err),
		}
	}

	/// Direct get-by-identifier, bypassing the window machinery.
	///
	/// The view's active filter is not combined into the lookup; the fetched
	/// record may not satisfy it.
	pub async fn get_by_id(&self, id: &str) -> Result<Record> {
		check_record_key(id)?;
		debug!(module = %self.query.module_name(), id, "fetching record by id");
		match self.source.get(self.query.module_name(), id).await? {
			Some(raw) => self.query.record_from_wire(raw),
			None => Err(Error::NotFound(id.to_string())),
		}
	}

	/// Number of records this view resolves to.
	///
	/// Issues one probe request and requires the backend's total-count hint.
	pub async fn len(&self) -> Result<u64> {
		if self.query.window().count() == Some(0) {
			return Ok(0);
		}
		let response = self.source.list(&self.query.probe_request()).await?;
		let total = response.total_count.ok_or_else(missing_count_hint)?;
		Ok(self.query.clamped_len(total))
	}

	/// Lazily iterate the view in fixed-size batches; the caller awaits each
	/// pull explicitly.
	pub fn iter(&self) -> AsyncRecords {
		AsyncRecords {
			query: self.query.clone(),
			source: self.source.clone(),
			cursor: self.query.cursor(),
			buffer: VecDeque::new(),
			halted: false,
		}
	}

	/// Materialize the whole view.
	pub async fn all(&self) -> Result<Vec<Record>> {
		let mut records = Vec::new();
		let mut iter = self.iter();
		while let Some(item) = iter.next().await {
			records.push(item?);
		}
		Ok(records)
	}
}

/// Suspending lazy record iterator
///
/// A batch fetch is atomic from the view's perspective: dropping the future
/// between awaits leaves no partially-yielded batch behind.
pub struct AsyncRecords {
	query: QuerySet,
	source: Arc<dyn AsyncRecordSource>,
	cursor: BatchCursor,
	buffer: VecDeque<JsonMap>,
	halted: bool,
}

impl AsyncRecords {
	pub async fn next(&mut self) -> Option<Result<Record>> {
		if self.halted {
			return None;
		}
		loop {
			if let Some(raw) = self.buffer.pop_front() {
				return Some(self.query.record_from_wire(raw));
			}
			let request = self.cursor.next_request()?;
			let response = match self.source.list(&request).await {
				Ok(response) => response,
				Err(err) => {
					self.halted = true;
					return Some(Err(err));
				}
			};
			match self.cursor.absorb(&request, response) {
				Ok(batch) => self.buffer.extend(batch),
				Err(err) => {
					self.halted = true;
					return Some(Err(err));
				}
			}
		}
	}

	/// Adapt the puller into a `futures` stream.
	pub fn into_stream(self) -> impl Stream<Item = Result<Record>> {
		futures::stream::unfold(self, |mut iter| async move {
			iter.next().await.map(|item| (item, iter))
		})
	}
}
