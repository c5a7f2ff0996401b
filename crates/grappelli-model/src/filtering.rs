//! Predicate trees and the wire-query compiler
//!
//! A [`Predicate`] is an immutable boolean expression over fields. Field
//! descriptors build the leaf comparisons with already-encoded wire values;
//! composition happens through `and`/`or`/`negate` (explicit methods, no
//! operator overloading). `compile` walks the tree into the backend's wire
//! query object: conjunction is multiple keys in one mapping, disjunction and
//! negation use the `$or`/`$not` wrapper keys.

use grappelli_core::{JsonMap, JsonValue};

/// The fixed operator algebra the backend accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOperator {
	Eq,
	Ne,
	Gt,
	Gte,
	Lt,
	Lte,
	In,
	NotIn,
	IsNull,
	NotNull,
	StartsWith,
	EndsWith,
	Contains,
}

impl FilterOperator {
	pub fn wire_token(&self) -> &'static str {
		match self {
			FilterOperator::Eq => "$eq",
			FilterOperator::Ne => "$ne",
			FilterOperator::Gt => "$gt",
			FilterOperator::Gte => "$gte",
			FilterOperator::Lt => "$lt",
			FilterOperator::Lte => "$lte",
			FilterOperator::In => "$in",
			FilterOperator::NotIn => "$not_in",
			FilterOperator::IsNull => "$is_null",
			FilterOperator::NotNull => "$not_null",
			FilterOperator::StartsWith => "$starts",
			FilterOperator::EndsWith => "$ends",
			FilterOperator::Contains => "$contains",
		}
	}
}

/// One comparison against one field: wire key, operator, encoded value
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
	pub field: String,
	pub operator: FilterOperator,
	pub value: JsonValue,
}

impl Filter {
	pub fn new(field: impl Into<String>, operator: FilterOperator, value: JsonValue) -> Self {
		Filter {
			field: field.into(),
			operator,
			value,
		}
	}
}

/// Immutable boolean expression over fields
///
/// `Raw` carries a hand-written wire mapping through compilation untouched —
/// the escape hatch for backend filter syntax the typed builders do not
/// model. It is accepted anywhere in the tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
	Comparison(Filter),
	And(Vec<Predicate>),
	Or(Vec<Predicate>),
	Not(Box<Predicate>),
	Raw(JsonMap),
}

impl Predicate {
	/// Conjunction of the given parts; empty input compiles to an empty filter.
	pub fn all(parts: Vec<Predicate>) -> Self {
		Predicate::And(parts)
	}

	/// Disjunction of the given parts; empty input compiles to an empty filter.
	pub fn any(parts: Vec<Predicate>) -> Self {
		Predicate::Or(parts)
	}

	pub fn raw(map: JsonMap) -> Self {
		Predicate::Raw(map)
	}

	/// This AND other, flattening nested conjunctions.
	pub fn and(self, other: Predicate) -> Predicate {
		match self {
			Predicate::And(mut parts) => {
				parts.push(other);
				Predicate::And(parts)
			}
			first => Predicate::And(vec![first, other]),
		}
	}

	/// This OR other, flattening nested disjunctions.
	pub fn or(self, other: Predicate) -> Predicate {
		match self {
			Predicate::Or(mut parts) => {
				parts.push(other);
				Predicate::Or(parts)
			}
			first => Predicate::Or(vec![first, other]),
		}
	}

	/// Logical negation; double negation collapses.
	pub fn negate(self) -> Predicate {
		match self {
			Predicate::Not(inner) => *inner,
			other => Predicate::Not(Box::new(other)),
		}
	}

	/// Compile the tree into the backend's wire query object.
	pub fn compile(&self) -> JsonMap {
		match self {
			Predicate::Comparison(filter) => {
				let condition = match filter.operator {
					// Top-level equality is the bare literal.
					FilterOperator::Eq => filter.value.clone(),
					operator => {
						let mut object = JsonMap::new();
						object.insert(operator.wire_token().to_string(), filter.value.clone());
						JsonValue::Object(object)
					}
				};
				let mut map = JsonMap::new();
				map.insert(filter.field.clone(), condition);
				map
			}
			Predicate::And(parts) => compile_conjunction(parts),
			Predicate::Or(parts) => {
				if parts.is_empty() {
					return JsonMap::new();
				}
				let branches = parts
					.iter()
					.map(|part| JsonValue::Object(part.compile()))
					.collect();
				let mut map = JsonMap::new();
				map.insert("$or".to_string(), JsonValue::Array(branches));
				map
			}
			Predicate::Not(inner) => {
				let mut map = JsonMap::new();
				map.insert("$not".to_string(), JsonValue::Object(inner.compile()));
				map
			}
			Predicate::Raw(map) => map.clone(),
		}
	}
}

/// Merge conjunction parts into one mapping level.
///
/// Conflicting keys on the same field nest as operator sub-objects (a bare
/// equality literal is promoted to `{"$eq": v}` when it has to share its
/// key); the last writer wins on an exact duplicate key+operator. Wrapper
/// keys cannot repeat inside one mapping, so colliding wrappers fall back to
/// an explicit `$and` list.
fn compile_conjunction(parts: &[Predicate]) -> JsonMap {
	let mut merged = JsonMap::new();
	let mut overflow: Vec<JsonValue> = Vec::new();

	for part in parts {
		for (key, value) in part.compile() {
			match merged.entry(key) {
				serde_json::map::Entry::Vacant(slot) => {
					slot.insert(value);
				}
				serde_json::map::Entry::Occupied(mut slot) => {
					if slot.key().starts_with('$') {
						let mut wrapper = JsonMap::new();
						wrapper.insert(slot.key().clone(), value);
						overflow.push(JsonValue::Object(wrapper));
					} else {
						let mut operators = into_operator_object(slot.get_mut().take());
						for (op, operand) in into_operator_object(value) {
							operators.insert(op, operand);
						}
						*slot.get_mut() = JsonValue::Object(operators);
					}
				}
			}
		}
	}

	if overflow.is_empty() {
		return merged;
	}
	let mut branches = Vec::with_capacity(overflow.len() + 1);
	if !merged.is_empty() {
		branches.push(JsonValue::Object(merged));
	}
	branches.append(&mut overflow);
	let mut map = JsonMap::new();
	map.insert("$and".to_string(), JsonValue::Array(branches));
	map
}

fn into_operator_object(condition: JsonValue) -> JsonMap {
	match condition {
		JsonValue::Object(operators) => operators,
		literal => {
			let mut object = JsonMap::new();
			object.insert("$eq".to_string(), literal);
			object
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn eq(field: &str, value: JsonValue) -> Predicate {
		Predicate::Comparison(Filter::new(field, FilterOperator::Eq, value))
	}

	fn cmp(field: &str, operator: FilterOperator, value: JsonValue) -> Predicate {
		Predicate::Comparison(Filter::new(field, operator, value))
	}

	#[test]
	fn test_equality_compiles_to_bare_literal() {
		let compiled = eq("name", json!("Ada")).compile();
		assert_eq!(JsonValue::Object(compiled), json!({"name": "Ada"}));
	}

	#[test]
	fn test_conjunction_merges_into_one_mapping() {
		let compiled = eq("a", json!(1)).and(eq("b", json!(2))).compile();
		assert_eq!(JsonValue::Object(compiled), json!({"a": 1, "b": 2}));
	}

	#[test]
	fn test_disjunction_emits_wrapper() {
		let compiled = eq("a", json!(1)).or(eq("b", json!(2))).compile();
		assert_eq!(
			JsonValue::Object(compiled),
			json!({"$or": [{"a": 1}, {"b": 2}]})
		);
	}

	#[test]
	fn test_negation_emits_wrapper() {
		let compiled = eq("a", json!(1)).negate().compile();
		assert_eq!(JsonValue::Object(compiled), json!({"$not": {"a": 1}}));
	}

	#[test]
	fn test_double_negation_collapses() {
		let predicate = eq("a", json!(1));
		assert_eq!(predicate.clone().negate().negate(), predicate);
	}

	#[test]
	fn test_conflicting_field_keys_nest_as_operator_objects() {
		let compiled = cmp("age", FilterOperator::Gt, json!(30))
			.and(cmp("age", FilterOperator::Lt, json!(50)))
			.compile();
		assert_eq!(
			JsonValue::Object(compiled),
			json!({"age": {"$gt": 30, "$lt": 50}})
		);
	}

	#[test]
	fn test_equality_literal_promoted_when_sharing_key() {
		let compiled = eq("age", json!(30))
			.and(cmp("age", FilterOperator::Lt, json!(50)))
			.compile();
		assert_eq!(
			JsonValue::Object(compiled),
			json!({"age": {"$eq": 30, "$lt": 50}})
		);
	}

	#[test]
	fn test_last_writer_wins_on_duplicate_operator() {
		let compiled = cmp("age", FilterOperator::Gt, json!(30))
			.and(cmp("age", FilterOperator::Gt, json!(40)))
			.compile();
		assert_eq!(JsonValue::Object(compiled), json!({"age": {"$gt": 40}}));
	}

	#[test]
	fn test_colliding_wrappers_fall_back_to_and_list() {
		let first = eq("a", json!(1)).or(eq("b", json!(2)));
		let second = eq("c", json!(3)).or(eq("d", json!(4)));
		let compiled = first.and(second).compile();
		assert_eq!(
			JsonValue::Object(compiled),
			json!({"$and": [
				{"$or": [{"a": 1}, {"b": 2}]},
				{"$or": [{"c": 3}, {"d": 4}]},
			]})
		);
	}

	#[test]
	fn test_raw_passes_through_unchanged() {
		let escape = json!({"custom_field": {"$vendor_op": [1, 2]}});
		let raw = Predicate::raw(escape.as_object().unwrap().clone());
		assert_eq!(JsonValue::Object(raw.compile()), escape);

		let compiled = raw.and(eq("a", json!(1))).compile();
		assert_eq!(
			JsonValue::Object(compiled),
			json!({"custom_field": {"$vendor_op": [1, 2]}, "a": 1})
		);
	}

	#[test]
	fn test_zero_predicates_compile_to_empty_filter() {
		assert!(Predicate::all(vec![]).compile().is_empty());
		assert!(Predicate::any(vec![]).compile().is_empty());
	}

	#[test]
	fn test_composition_leaves_originals_untouched() {
		let first = eq("a", json!(1));
		let second = eq("b", json!(2));
		let _ = first.clone().and(second.clone());
		assert_eq!(first, eq("a", json!(1)));
		assert_eq!(second, eq("b", json!(2)));
	}
}
