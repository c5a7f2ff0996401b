//! Lazy view descriptors
//!
//! A [`QuerySet`] is an immutable recipe: module identity, predicate,
//! ordering and window. Building, composing and comparing one never touches
//! the network, and no resolved state is kept — every materialization
//! re-issues its requests, so descriptors stay safe to share and reuse. The
//! discipline drivers in [`crate::query`] bind a descriptor to a record
//! source and perform the actual I/O.

use std::fmt;
use std::ops::{Bound, RangeBounds};
use std::sync::Arc;

use grappelli_client::{ListRequest, ListResponse, QueryConfig};
use grappelli_core::{Error, JsonMap, OrderBy, Result, SortDirection};

use crate::fields::SchemaField;
use crate::filtering::Predicate;
use crate::record::Record;
use crate::schema::ModuleSchema;
use crate::view::plan::BatchCursor;
use crate::view::window::Window;

pub mod plan;
pub mod window;

/// Immutable lazy query descriptor over a remote record collection
#[derive(Debug, Clone)]
pub struct QuerySet {
	schema: Arc<ModuleSchema>,
	predicate: Option<Predicate>,
	order_by: OrderBy,
	window: Window,
	batch_size: u64,
}

impl QuerySet {
	pub(crate) fn new(schema: Arc<ModuleSchema>, config: &QueryConfig) -> Self {
		let order_by = OrderBy::ascending(schema.id_wire_key());
		QuerySet {
			schema,
			predicate: None,
			order_by,
			window: Window::unbounded(),
			batch_size: config.batch_size.max(1),
		}
	}

	pub fn schema(&self) -> &Arc<ModuleSchema> {
		&self.schema
	}

	pub fn module_name(&self) -> &str {
		self.schema.name()
	}

	pub fn predicate(&self) -> Option<&Predicate> {
		self.predicate.as_ref()
	}

	/// The declared ordering; reversal flips it at request time.
	pub fn ordering(&self) -> &OrderBy {
		&self.order_by
	}

	pub fn window(&self) -> &Window {
		&self.window
	}

	/// A new view with the predicate AND-ed onto the existing one.
	pub fn filtered(&self, predicate: Predicate) -> Self {
		let mut next = self.clone();
		next.predicate = Some(match &self.predicate {
			None => predicate,
			Some(existing) => existing.clone().and(predicate),
		});
		next
	}

	/// A new view ordered by the given field.
	pub fn order_by(&self, field: &impl SchemaField, direction: SortDirection) -> Result<Self> {
		let def = field.def();
		if self.schema.field(&def.name) != Some(def) {
			return Err(Error::validation(
				&def.name,
				format!("field is not part of module `{}`", self.module_name()),
			));
		}
		let mut next = self.clone();
		next.order_by = OrderBy {
			field: def.wire_key.clone(),
			direction,
		};
		Ok(next)
	}

	/// A sub-view over items of this view, step 1.
	pub fn slice(&self, range: impl RangeBounds<u64>) -> Self {
		let from = match range.start_bound() {
			Bound::Included(&from) => from,
			Bound::Excluded(&from) => from + 1,
			Bound::Unbounded => 0,
		};
		let to = match range.end_bound() {
			Bound::Included(&to) => Some(to + 1),
			Bound::Excluded(&to) => Some(to),
			Bound::Unbounded => None,
		};
		let mut next = self.clone();
		next.window = self.window.slice(from, to);
		next
	}

	/// A view keeping every `step`-th item; negative steps reverse.
	pub fn step_by(&self, step: i64) -> Result<Self> {
		let mut next = self.clone();
		next.window = self.window.step_by(step)?;
		Ok(next)
	}

	/// The same items in reverse order.
	pub fn reversed(&self) -> Result<Self> {
		let mut next = self.clone();
		next.window = self.window.reversed()?;
		Ok(next)
	}

	// Request planning. Everything below is pure; the discipline drivers
	// perform the I/O and feed responses back in.

	pub(crate) fn compiled_filter(&self) -> JsonMap {
		self.predicate
			.as_ref()
			.map(Predicate::compile)
			.unwrap_or_default()
	}

	/// The ordering actually sent: the declared one, flipped when the window
	/// reversed the whole enumeration.
	pub(crate) fn effective_order(&self) -> OrderBy {
		if self.window.is_flipped() {
			self.order_by.flipped()
		} else {
			self.order_by.clone()
		}
	}

	/// Single-record window at the indexed position.
	pub(crate) fn item_request(&self, index: i64) -> Result<ListRequest> {
		let offset = self.window.position(index)?;
		Ok(ListRequest {
			module: self.module_name().to_string(),
			filter: self.compiled_filter(),
			order_by: Some(self.effective_order()),
			offset,
			limit: 1,
		})
	}

	/// Minimal request whose response carries the total-count hint.
	pub(crate) fn probe_request(&self) -> ListRequest {
		ListRequest {
			module: self.module_name().to_string(),
			filter: self.compiled_filter(),
			order_by: Some(self.effective_order()),
			offset: 0,
			limit: 1,
		}
	}

	pub(crate) fn clamped_len(&self, total: u64) -> u64 {
		self.window.clamped_len(total)
	}

	pub(crate) fn cursor(&self) -> BatchCursor {
		BatchCursor::new(
			self.module_name().to_string(),
			self.compiled_filter(),
			self.effective_order(),
			self.window,
			self.batch_size,
		)
	}

	pub(crate) fn record_from_wire(&self, raw: JsonMap) -> Result<Record> {
		Record::from_wire(self.schema.clone(), raw)
	}

	/// Fold a single-record response: empty means out of bounds, more than
	/// one record is a contract violation.
	pub(crate) fn single_record(&self, index: i64, response: ListResponse) -> Result<Record> {
		if response.records.len() > 1 {
			return Err(Error::InvalidResponse(
				"single-record window returned more than one record".to_string(),
			));
		}
		match response.records.into_iter().next() {
			Some(raw) => self.record_from_wire(raw),
			None => Err(Error::out_of_bounds(index, "no record at this view position")),
		}
	}
}

/// Structural equality: module, predicate, ordering, window. The batch size
/// is a materialization knob, not part of the view's identity.
impl PartialEq for QuerySet {
	fn eq(&self, other: &Self) -> bool {
		self.module_name() == other.module_name()
			&& self.predicate == other.predicate
			&& self.order_by == other.order_by
			&& self.window == other.window
	}
}

impl fmt::Display for QuerySet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let prefix = if self.predicate.is_some() {
			"filtered view"
		} else {
			"view"
		};
		write!(f, "<{prefix} on {}", self.module_name())?;
		if self.window != Window::unbounded() {
			write!(f, " [start={}, step={}", self.window.start(), self.window.step())?;
			if let Some(count) = self.window.count() {
				write!(f, ", len={count}")?;
			}
			if self.window.is_flipped() {
				write!(f, ", reversed")?;
			}
			write!(f, "]")?;
		}
		write!(f, ">")
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fields::scalars::{IdField, IntegerField, StringField};
	use serde_json::json;

	fn query() -> QuerySet {
		let schema = ModuleSchema::builder("contacts")
			.field(&IdField::new("id"))
			.field(&StringField::new("name"))
			.field(&IntegerField::new("age"))
			.build()
			.unwrap();
		QuerySet::new(schema, &QueryConfig::default())
	}

	#[test]
	fn test_composition_never_mutates_the_original() {
		let base = query();
		let snapshot = base.clone();

		let _ = base.filtered(IntegerField::new("age").gt(30));
		let _ = base.slice(2..5);
		let _ = base.step_by(2).unwrap();
		let _ = base.reversed().unwrap();

		assert_eq!(base, snapshot);
	}

	#[test]
	fn test_structural_equality_requires_no_io() {
		let age = IntegerField::new("age");
		let a = query().filtered(age.gt(30)).slice(2..5);
		let b = query().filtered(age.gt(30)).slice(2..5);
		let c = query().filtered(age.gt(31)).slice(2..5);
		assert_eq!(a, b);
		assert_ne!(a, c);
		assert_ne!(a, query().filtered(age.gt(30)).slice(2..6));
	}

	#[test]
	fn test_reverse_law_on_views() {
		let view = query().slice(2..7);
		assert_eq!(view.reversed().unwrap().reversed().unwrap(), view);

		let whole = query();
		assert_eq!(whole.reversed().unwrap().reversed().unwrap(), whole);
	}

	#[test]
	fn test_item_request_resolves_window_offsets() {
		let view = query().slice(2..5);
		let request = view.item_request(1).unwrap();
		assert_eq!(request.offset, 3);
		assert_eq!(request.limit, 1);

		let nested = view.slice(1..);
		assert_eq!(nested.item_request(0).unwrap().offset, 3);
	}

	#[test]
	fn test_filtered_views_compile_their_predicate() {
		let view = query().filtered(IntegerField::new("age").gt(30));
		let request = view.item_request(0).unwrap();
		assert_eq!(
			serde_json::Value::Object(request.filter),
			json!({"age": {"$gt": 30}})
		);
	}

	#[test]
	fn test_chained_filters_and_together() {
		let view = query()
			.filtered(IntegerField::new("age").gt(30))
			.filtered(StringField::new("name").eq("Ada"));
		let request = view.item_request(0).unwrap();
		assert_eq!(
			serde_json::Value::Object(request.filter),
			json!({"age": {"$gt": 30}, "name": "Ada"})
		);
	}

	#[test]
	fn test_reversal_flips_request_ordering() {
		let view = query().reversed().unwrap();
		let request = view.probe_request();
		let order = request.order_by.unwrap();
		assert_eq!(order.direction, SortDirection::Descending);
		assert_eq!(order.field, "id");
	}

	#[test]
	fn test_order_by_rejects_foreign_fields() {
		let foreign = IntegerField::new("salary");
		assert!(query().order_by(&foreign, SortDirection::Ascending).is_err());

		let known = IntegerField::new("age");
		let view = query().order_by(&known, SortDirection::Descending).unwrap();
		assert_eq!(view.ordering().field, "age");
	}

	#[test]
	fn test_display_repr() {
		let base = query();
		assert_eq!(base.to_string(), "<view on contacts>");

		let sliced = base.filtered(IntegerField::new("age").gt(30)).slice(2..5);
		assert_eq!(
			sliced.to_string(),
			"<filtered view on contacts [start=2, step=1, len=3]>"
		);
	}
}
