//! In-memory record backend
//!
//! A complete implementation of both source traits over an in-process store:
//! evaluates the wire-query operator algebra, orders on any field, pages by
//! offset/limit and reports the optional total-count hint. Every call is
//! appended to a request log so tests can assert exact request sequences.
//! The suspending trait delegates to the blocking implementation — the store
//! never waits on I/O.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use grappelli_core::{Error, JsonMap, JsonValue, Result, SortDirection};
use parking_lot::RwLock;
use tracing::debug;

use crate::executor::{AsyncRecordSource, ListRequest, ListResponse, RecordSource};

/// One request observed by the backend, in issue order
#[derive(Debug, Clone, PartialEq)]
pub enum IssuedRequest {
	List(ListRequest),
	Get { module: String, id: String },
	Create { module: String },
	Update { module: String, id: String },
	Delete { module: String, id: String },
}

/// In-process record store implementing both execution disciplines
pub struct MemoryBackend {
	store: RwLock<HashMap<String, Vec<JsonMap>>>,
	log: RwLock<Vec<IssuedRequest>>,
	count_hint: bool,
}

impl MemoryBackend {
	pub fn new() -> Self {
		MemoryBackend {
			store: RwLock::new(HashMap::new()),
			log: RwLock::new(Vec::new()),
			count_hint: true,
		}
	}

	/// Stop reporting the total-count hint on list responses.
	///
	/// Mirrors backend profiles that cannot count cheaply; operations that
	/// need the hint will fail with `Unsupported` against such a backend.
	pub fn without_count_hint(mut self) -> Self {
		self.count_hint = false;
		self
	}

	/// Append rows to a module's collection.
	pub fn seed(&self, module: &str, rows: impl IntoIterator<Item = JsonMap>) {
		self.store
			.write()
			.entry(module.to_string())
			.or_default()
			.extend(rows);
	}

	/// Requests issued so far, in order.
	pub fn requests(&self) -> Vec<IssuedRequest> {
		self.log.read().clone()
	}

	pub fn clear_requests(&self) {
		self.log.write().clear();
	}

	fn find_index(rows: &[JsonMap], id: &str) -> Option<usize> {
		rows.iter()
			.position(|row| row.get("id").and_then(JsonValue::as_str) == Some(id))
	}
}

impl Default for MemoryBackend {
	fn default() -> Self {
		MemoryBackend::new()
	}
}

impl RecordSource for MemoryBackend {
	fn list(&self, request: &ListRequest) -> Result<ListResponse> {
		debug!(
			module = %request.module,
			offset = request.offset,
			limit = request.limit,
			"memory backend list"
		);
		self.log.write().push(IssuedRequest::List(request.clone()));

		let store = self.store.read();
		let rows = store.get(&request.module).map(Vec::as_slice).unwrap_or(&[]);

		let mut matched: Vec<&JsonMap> = rows
			.iter()
			.filter(|row| matches_filter(&request.filter, row))
			.collect();
		if let Some(order) = &request.order_by {
			matched.sort_by(|a, b| {
				let ordering = compare_values(
					a.get(&order.field).unwrap_or(&JsonValue::Null),
					b.get(&order.field).unwrap_or(&JsonValue::Null),
				);
				match order.direction {
					SortDirection::Ascending => ordering,
					SortDirection::Descending => ordering.reverse(),
				}
			});
		}

		let total = matched.len() as u64;
		let records = matched
			.into_iter()
			.skip(request.offset as usize)
			.take(request.limit as usize)
			.cloned()
			.collect();

		Ok(ListResponse {
			records,
			total_count: self.count_hint.then_some(total),
		})
	}

	fn get(&self, module: &str, id: &str) -> Result<Option<JsonMap>> {
		debug!(module, id, "memory backend get");
		self.log.write().push(IssuedRequest::Get {
			module: module.to_string(),
			id: id.to_string(),
		});

		let store = self.store.read();
		let rows = store.get(module).map(Vec::as_slice).unwrap_or(&[]);
		Ok(Self::find_index(rows, id).map(|index| rows[index].clone()))
	}

	fn create(&self, module: &str, payload: &JsonMap) -> Result<JsonMap> {
		debug!(module, "memory backend create");
		self.log.write().push(IssuedRequest::Create {
			module: module.to_string(),
		});

		let mut row = payload.clone();
		if !row.get("id").is_some_and(JsonValue::is_string) {
			row.insert(
				"id".to_string(),
				JsonValue::String(uuid::Uuid::new_v4().to_string()),
			);
		}
		self.store
			.write()
			.entry(module.to_string())
			.or_default()
			.push(row.clone());
		Ok(row)
	}

	fn update(&self, module: &str, id: &str, payload: &JsonMap) -> Result<JsonMap> {
		debug!(module, id, "memory backend update");
		self.log.write().push(IssuedRequest::Update {
			module: module.to_string(),
			id: id.to_string(),
		});

		let mut store = self.store.write();
		let rows = store
			.get_mut(module)
			.ok_or_else(|| Error::NotFound(id.to_string()))?;
		let index =
			Self::find_index(rows, id).ok_or_else(|| Error::NotFound(id.to_string()))?;
		for (key, value) in payload {
			rows[index].insert(key.clone(), value.clone());
		}
		Ok(rows[index].clone())
	}

	fn delete(&self, module: &str, id: &str) -> Result<()> {
		debug!(module, id, "memory backend delete");
		self.log.write().push(IssuedRequest::Delete {
			module: module.to_string(),
			id: id.to_string(),
		});

		let mut store = self.store.write();
		let rows = store
			.get_mut(module)
			.ok_or_else(|| Error::NotFound(id.to_string()))?;
		let index =
			Self::find_index(rows, id).ok_or_else(|| Error::NotFound(id.to_string()))?;
		rows.remove(index);
		Ok(())
	}
}

#[async_trait]
impl AsyncRecordSource for MemoryBackend {
	async fn list(&self, request: &ListRequest) -> Result<ListResponse> {
		RecordSource::list(self, request)
	}

	async fn get(&self, module: &str, id: &str) -> Result<Option<JsonMap>> {
		RecordSource::get(self, module, id)
	}

	async fn create(&self, module: &str, payload: &JsonMap) -> Result<JsonMap> {
		RecordSource::create(self, module, payload)
	}

	async fn update(&self, module: &str, id: &str, payload: &JsonMap) -> Result<JsonMap> {
		RecordSource::update(self, module, id, payload)
	}

	async fn delete(&self, module: &str, id: &str) -> Result<()> {
		RecordSource::delete(self, module, id)
	}
}

/// Evaluate a compiled wire query object against one row.
///
/// Conjunction is multiple keys in one mapping; `$or`, `$and` and `$not` are
/// the wrapper keys; everything else is a field key carrying either a bare
/// equality literal or an operator sub-object.
fn matches_filter(filter: &JsonMap, row: &JsonMap) -> bool {
	filter.iter().all(|(key, condition)| match key.as_str() {
		"$or" => condition.as_array().is_some_and(|parts| {
			parts
				.iter()
				.any(|part| part.as_object().is_some_and(|map| matches_filter(map, row)))
		}),
		"$and" => condition.as_array().is_some_and(|parts| {
			parts
				.iter()
				.all(|part| part.as_object().is_some_and(|map| matches_filter(map, row)))
		}),
		"$not" => condition
			.as_object()
			.is_some_and(|map| !matches_filter(map, row)),
		field => match condition {
			JsonValue::Object(operators) => operators
				.iter()
				.all(|(op, operand)| operator_matches(row.get(field), op, operand)),
			literal => row.get(field) == Some(literal),
		},
	})
}

fn operator_matches(value: Option<&JsonValue>, op: &str, operand: &JsonValue) -> bool {
	let is_null = value.is_none_or(JsonValue::is_null);
	match op {
		"$is_null" => is_null,
		"$not_null" => !is_null,
		"$eq" => value == Some(operand),
		"$ne" => value != Some(operand),
		"$gt" => ordered(value, operand).is_some_and(Ordering::is_gt),
		"$gte" => ordered(value, operand).is_some_and(Ordering::is_ge),
		"$lt" => ordered(value, operand).is_some_and(Ordering::is_lt),
		"$lte" => ordered(value, operand).is_some_and(Ordering::is_le),
		"$in" => operand
			.as_array()
			.is_some_and(|set| value.is_some_and(|v| set.contains(v))),
		"$not_in" => operand
			.as_array()
			.is_some_and(|set| value.is_none_or(|v| !set.contains(v))),
		"$starts" => with_strings(value, operand, |v, needle| v.starts_with(needle)),
		"$ends" => with_strings(value, operand, |v, needle| v.ends_with(needle)),
		"$contains" => with_strings(value, operand, |v, needle| v.contains(needle)),
		// Unknown operators match nothing rather than everything.
		_ => false,
	}
}

fn with_strings(
	value: Option<&JsonValue>,
	operand: &JsonValue,
	test: impl Fn(&str, &str) -> bool,
) -> bool {
	match (value.and_then(JsonValue::as_str), operand.as_str()) {
		(Some(v), Some(needle)) => test(v, needle),
		_ => false,
	}
}

fn ordered(value: Option<&JsonValue>, operand: &JsonValue) -> Option<Ordering> {
	let value = value?;
	match (value, operand) {
		(JsonValue::Number(a), JsonValue::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
		(JsonValue::String(a), JsonValue::String(b)) => Some(a.as_str().cmp(b)),
		_ => None,
	}
}

/// Total order over wire values used for sorting: null, then booleans, then
/// numbers, then strings; arrays and objects sort last by their JSON text.
fn compare_values(a: &JsonValue, b: &JsonValue) -> Ordering {
	fn rank(value: &JsonValue) -> u8 {
		match value {
			JsonValue::Null => 0,
			JsonValue::Bool(_) => 1,
			JsonValue::Number(_) => 2,
			JsonValue::String(_) => 3,
			_ => 4,
		}
	}

	match (a, b) {
		(JsonValue::Bool(a), JsonValue::Bool(b)) => a.cmp(b),
		(JsonValue::Number(a), JsonValue::Number(b)) => a
			.as_f64()
			.partial_cmp(&b.as_f64())
			.unwrap_or(Ordering::Equal),
		(JsonValue::String(a), JsonValue::String(b)) => a.cmp(b),
		_ if rank(a) != rank(b) => rank(a).cmp(&rank(b)),
		_ => a.to_string().cmp(&b.to_string()),
	}
}
