//! Scalar codecs and typed field descriptors
//!
//! One descriptor type per scalar kind. Every descriptor carries the shared
//! declaration surface (wire key, nullability, mutability, record accessors)
//! plus the filter builders its kind supports: strings get pattern matching,
//! numbers and datetimes get range comparisons, booleans get truth shortcuts.
//! Builders return immutable [`Predicate`] values — explicit methods instead
//! of operator overloading.

use chrono::{DateTime, SecondsFormat, Utc};
use grappelli_core::{Error, JsonValue, Result};
use uuid::Uuid;

use super::{FieldCodec, FieldDef, FieldKind, SchemaField};
use crate::filtering::{Filter, FilterOperator, Predicate};
use crate::record::Record;

pub struct StringCodec;

impl FieldCodec for StringCodec {
	type Native = String;

	fn encode(&self, _field: &str, value: &String) -> Result<JsonValue> {
		Ok(JsonValue::String(value.clone()))
	}

	fn decode(&self, field: &str, wire: &JsonValue) -> Result<String> {
		match wire {
			JsonValue::String(value) => Ok(value.clone()),
			other => Err(Error::decode(field, format!("expected a string, got {other}"))),
		}
	}
}

pub struct IntegerCodec;

impl FieldCodec for IntegerCodec {
	type Native = i64;

	fn encode(&self, _field: &str, value: &i64) -> Result<JsonValue> {
		Ok(JsonValue::from(*value))
	}

	fn decode(&self, field: &str, wire: &JsonValue) -> Result<i64> {
		wire.as_i64()
			.ok_or_else(|| Error::decode(field, format!("expected an integer, got {wire}")))
	}
}

pub struct FloatCodec;

impl FieldCodec for FloatCodec {
	type Native = f64;

	fn encode(&self, field: &str, value: &f64) -> Result<JsonValue> {
		serde_json::Number::from_f64(*value)
			.map(JsonValue::Number)
			.ok_or_else(|| Error::validation(field, "value must be a finite number"))
	}

	fn decode(&self, field: &str, wire: &JsonValue) -> Result<f64> {
		wire.as_f64()
			.ok_or_else(|| Error::decode(field, format!("expected a number, got {wire}")))
	}
}

pub struct BooleanCodec;

impl FieldCodec for BooleanCodec {
	type Native = bool;

	fn encode(&self, _field: &str, value: &bool) -> Result<JsonValue> {
		Ok(JsonValue::Bool(*value))
	}

	fn decode(&self, field: &str, wire: &JsonValue) -> Result<bool> {
		wire.as_bool()
			.ok_or_else(|| Error::decode(field, format!("expected a boolean, got {wire}")))
	}
}

pub struct IdCodec;

impl FieldCodec for IdCodec {
	type Native = Uuid;

	fn encode(&self, _field: &str, value: &Uuid) -> Result<JsonValue> {
		Ok(JsonValue::String(value.to_string()))
	}

	fn decode(&self, field: &str, wire: &JsonValue) -> Result<Uuid> {
		let text = wire
			.as_str()
			.ok_or_else(|| Error::decode(field, format!("expected an identifier string, got {wire}")))?;
		Uuid::parse_str(text)
			.map_err(|err| Error::decode(field, format!("invalid identifier `{text}`: {err}")))
	}
}

pub struct DateTimeCodec;

impl FieldCodec for DateTimeCodec {
	type Native = DateTime<Utc>;

	fn encode(&self, _field: &str, value: &DateTime<Utc>) -> Result<JsonValue> {
		Ok(JsonValue::String(value.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
	}

	fn decode(&self, field: &str, wire: &JsonValue) -> Result<DateTime<Utc>> {
		let text = wire
			.as_str()
			.ok_or_else(|| Error::decode(field, format!("expected a datetime string, got {wire}")))?;
		DateTime::parse_from_rfc3339(text)
			.map(|parsed| parsed.with_timezone(&Utc))
			.map_err(|err| Error::decode(field, format!("invalid datetime `{text}`: {err}")))
	}
}

/// Declaration surface and record accessors shared by every scalar descriptor.
macro_rules! scalar_field {
	($(#[$doc:meta])* $name:ident, $codec:expr, $native:ty, $kind:expr) => {
		$(#[$doc])*
		#[derive(Debug, Clone, PartialEq, Eq)]
		pub struct $name {
			def: FieldDef,
		}

		impl $name {
			pub fn new(name: impl Into<String>) -> Self {
				$name {
					def: FieldDef::new(name, $kind),
				}
			}

			/// Use a wire key different from the model-side name.
			pub fn wire_key(mut self, key: impl Into<String>) -> Self {
				self.def.wire_key = key.into();
				self
			}

			/// Accept wire `null` for this field.
			pub fn nullable(mut self) -> Self {
				self.def.nullable = true;
				self
			}

			/// Reject writes through this field.
			pub fn read_only(mut self) -> Self {
				self.def.mutable = false;
				self
			}

			/// Decode the field's current value; missing or null is an error.
			pub fn get(&self, record: &Record) -> Result<$native> {
				match record.raw(&self.def.wire_key) {
					None | Some(JsonValue::Null) => Err(Error::decode(
						&self.def.name,
						"value is missing or null (use get_opt for nullable reads)",
					)),
					Some(wire) => $codec.decode(&self.def.name, wire),
				}
			}

			/// Decode the field's current value, mapping missing and null to `None`.
			pub fn get_opt(&self, record: &Record) -> Result<Option<$native>> {
				match record.raw(&self.def.wire_key) {
					None | Some(JsonValue::Null) => Ok(None),
					Some(wire) => $codec.decode(&self.def.name, wire).map(Some),
				}
			}

			/// Encode a native value into the record's dirty overlay.
			pub fn set(&self, record: &mut Record, value: $native) -> Result<()> {
				self.def.check_mutable()?;
				let wire = $codec.encode(&self.def.name, &value)?;
				record.set_raw(self.def.wire_key.clone(), wire);
				Ok(())
			}

			/// Write wire `null`; only valid on nullable fields.
			pub fn set_null(&self, record: &mut Record) -> Result<()> {
				self.def.check_mutable()?;
				if !self.def.nullable {
					return Err(Error::validation(&self.def.name, "field is not nullable"));
				}
				record.set_raw(self.def.wire_key.clone(), JsonValue::Null);
				Ok(())
			}

			/// Match records where the field is null.
			pub fn is_null(&self) -> Predicate {
				self.comparison(FilterOperator::IsNull, JsonValue::Bool(true))
			}

			/// Match records where the field holds a value.
			pub fn not_null(&self) -> Predicate {
				self.comparison(FilterOperator::NotNull, JsonValue::Bool(true))
			}

			fn comparison(&self, operator: FilterOperator, value: JsonValue) -> Predicate {
				Predicate::Comparison(Filter::new(self.def.wire_key.clone(), operator, value))
			}
		}

		impl SchemaField for $name {
			fn def(&self) -> &FieldDef {
				&self.def
			}
		}
	};
}

scalar_field!(
	/// Text field with pattern-matching filters
	StringField,
	StringCodec,
	String,
	FieldKind::String
);

impl StringField {
	pub fn eq(&self, value: impl Into<String>) -> Predicate {
		self.comparison(FilterOperator::Eq, JsonValue::String(value.into()))
	}

	pub fn ne(&self, value: impl Into<String>) -> Predicate {
		self.comparison(FilterOperator::Ne, JsonValue::String(value.into()))
	}

	/// Match any of the given values.
	pub fn one_of<I, S>(&self, values: I) -> Predicate
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let values = values
			.into_iter()
			.map(|value| JsonValue::String(value.into()))
			.collect();
		self.comparison(FilterOperator::In, JsonValue::Array(values))
	}

	pub fn starts_with(&self, prefix: &str) -> Result<Predicate> {
		self.pattern(FilterOperator::StartsWith, prefix)
	}

	pub fn ends_with(&self, suffix: &str) -> Result<Predicate> {
		self.pattern(FilterOperator::EndsWith, suffix)
	}

	pub fn contains(&self, infix: &str) -> Result<Predicate> {
		self.pattern(FilterOperator::Contains, infix)
	}

	fn pattern(&self, operator: FilterOperator, pattern: &str) -> Result<Predicate> {
		if pattern.is_empty() {
			return Err(Error::validation(
				&self.def.name,
				"cannot filter on an empty pattern",
			));
		}
		Ok(self.comparison(operator, JsonValue::String(pattern.to_string())))
	}
}

scalar_field!(
	/// Integer field with range filters
	IntegerField,
	IntegerCodec,
	i64,
	FieldKind::Integer
);

impl IntegerField {
	pub fn eq(&self, value: i64) -> Predicate {
		self.comparison(FilterOperator::Eq, JsonValue::from(value))
	}

	pub fn ne(&self, value: i64) -> Predicate {
		self.comparison(FilterOperator::Ne, JsonValue::from(value))
	}

	pub fn gt(&self, value: i64) -> Predicate {
		self.comparison(FilterOperator::Gt, JsonValue::from(value))
	}

	pub fn gte(&self, value: i64) -> Predicate {
		self.comparison(FilterOperator::Gte, JsonValue::from(value))
	}

	pub fn lt(&self, value: i64) -> Predicate {
		self.comparison(FilterOperator::Lt, JsonValue::from(value))
	}

	pub fn lte(&self, value: i64) -> Predicate {
		self.comparison(FilterOperator::Lte, JsonValue::from(value))
	}

	/// Match any of the given values.
	pub fn one_of(&self, values: impl IntoIterator<Item = i64>) -> Predicate {
		let values = values.into_iter().map(JsonValue::from).collect();
		self.comparison(FilterOperator::In, JsonValue::Array(values))
	}

	/// Inclusive range; compiles to one nested operator object.
	pub fn between(&self, low: i64, high: i64) -> Predicate {
		self.gte(low).and(self.lte(high))
	}
}

scalar_field!(
	/// Floating-point field with range filters
	FloatField,
	FloatCodec,
	f64,
	FieldKind::Float
);

impl FloatField {
	pub fn eq(&self, value: f64) -> Result<Predicate> {
		Ok(self.comparison(FilterOperator::Eq, self.encoded(value)?))
	}

	pub fn ne(&self, value: f64) -> Result<Predicate> {
		Ok(self.comparison(FilterOperator::Ne, self.encoded(value)?))
	}

	pub fn gt(&self, value: f64) -> Result<Predicate> {
		Ok(self.comparison(FilterOperator::Gt, self.encoded(value)?))
	}

	pub fn gte(&self, value: f64) -> Result<Predicate> {
		Ok(self.comparison(FilterOperator::Gte, self.encoded(value)?))
	}

	pub fn lt(&self, value: f64) -> Result<Predicate> {
		Ok(self.comparison(FilterOperator::Lt, self.encoded(value)?))
	}

	pub fn lte(&self, value: f64) -> Result<Predicate> {
		Ok(self.comparison(FilterOperator::Lte, self.encoded(value)?))
	}

	fn encoded(&self, value: f64) -> Result<JsonValue> {
		FloatCodec.encode(&self.def.name, &value)
	}
}

scalar_field!(
	/// Boolean field
	BooleanField,
	BooleanCodec,
	bool,
	FieldKind::Boolean
);

impl BooleanField {
	pub fn eq(&self, value: bool) -> Predicate {
		self.comparison(FilterOperator::Eq, JsonValue::Bool(value))
	}

	pub fn is_true(&self) -> Predicate {
		self.eq(true)
	}

	pub fn is_false(&self) -> Predicate {
		self.eq(false)
	}
}

scalar_field!(
	/// Record identifier field; read-only by default
	IdField,
	IdCodec,
	Uuid,
	FieldKind::Id
);

impl IdField {
	pub fn eq(&self, value: Uuid) -> Predicate {
		self.comparison(FilterOperator::Eq, JsonValue::String(value.to_string()))
	}

	/// Match any of the given identifiers.
	pub fn one_of(&self, values: impl IntoIterator<Item = Uuid>) -> Predicate {
		let values = values
			.into_iter()
			.map(|value| JsonValue::String(value.to_string()))
			.collect();
		self.comparison(FilterOperator::In, JsonValue::Array(values))
	}
}

scalar_field!(
	/// UTC datetime field, RFC 3339 on the wire
	DateTimeField,
	DateTimeCodec,
	DateTime<Utc>,
	FieldKind::DateTime
);

impl DateTimeField {
	pub fn eq(&self, value: DateTime<Utc>) -> Predicate {
		self.comparison(FilterOperator::Eq, self.encoded(value))
	}

	pub fn before(&self, value: DateTime<Utc>) -> Predicate {
		self.comparison(FilterOperator::Lt, self.encoded(value))
	}

	pub fn after(&self, value: DateTime<Utc>) -> Predicate {
		self.comparison(FilterOperator::Gt, self.encoded(value))
	}

	pub fn at_or_before(&self, value: DateTime<Utc>) -> Predicate {
		self.comparison(FilterOperator::Lte, self.encoded(value))
	}

	pub fn at_or_after(&self, value: DateTime<Utc>) -> Predicate {
		self.comparison(FilterOperator::Gte, self.encoded(value))
	}

	/// Inclusive range; compiles to one nested operator object.
	pub fn between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Predicate {
		self.at_or_after(from).and(self.at_or_before(to))
	}

	fn encoded(&self, value: DateTime<Utc>) -> JsonValue {
		JsonValue::String(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::TimeZone;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case(json!("hello"))]
	#[case(json!(""))]
	fn test_string_round_trip(#[case] wire: JsonValue) {
		let native = StringCodec.decode("f", &wire).unwrap();
		assert_eq!(StringCodec.encode("f", &native).unwrap(), wire);
	}

	#[rstest]
	#[case(0)]
	#[case(-42)]
	#[case(i64::MAX)]
	fn test_integer_round_trip(#[case] native: i64) {
		let wire = IntegerCodec.encode("f", &native).unwrap();
		assert_eq!(IntegerCodec.decode("f", &wire).unwrap(), native);
	}

	#[rstest]
	#[case(0.0)]
	#[case(-1.5)]
	#[case(1e300)]
	fn test_float_round_trip(#[case] native: f64) {
		let wire = FloatCodec.encode("f", &native).unwrap();
		assert_eq!(FloatCodec.decode("f", &wire).unwrap(), native);
	}

	#[test]
	fn test_boolean_round_trip() {
		for native in [true, false] {
			let wire = BooleanCodec.encode("f", &native).unwrap();
			assert_eq!(BooleanCodec.decode("f", &wire).unwrap(), native);
		}
	}

	#[test]
	fn test_id_round_trip() {
		let native = Uuid::new_v4();
		let wire = IdCodec.encode("f", &native).unwrap();
		assert_eq!(IdCodec.decode("f", &wire).unwrap(), native);
	}

	#[test]
	fn test_datetime_round_trip() {
		let native = Utc.with_ymd_and_hms(2024, 3, 9, 17, 30, 0).unwrap();
		let wire = DateTimeCodec.encode("f", &native).unwrap();
		assert_eq!(DateTimeCodec.decode("f", &wire).unwrap(), native);
	}

	#[test]
	fn test_encode_rejects_values_outside_domain() {
		assert!(matches!(
			FloatCodec.encode("price", &f64::NAN),
			Err(Error::Validation { .. })
		));
		assert!(matches!(
			FloatCodec.encode("price", &f64::INFINITY),
			Err(Error::Validation { .. })
		));
	}

	#[rstest]
	#[case(json!(1.5))]
	#[case(json!("30"))]
	#[case(json!(null))]
	fn test_integer_decode_rejects_malformed_wire(#[case] wire: JsonValue) {
		assert!(matches!(
			IntegerCodec.decode("age", &wire),
			Err(Error::Decode { .. })
		));
	}

	#[test]
	fn test_id_decode_rejects_malformed_identifiers() {
		assert!(IdCodec.decode("id", &json!("not-a-uuid")).is_err());
		assert!(IdCodec.decode("id", &json!(17)).is_err());
	}

	#[test]
	fn test_descriptor_builders() {
		let field = StringField::new("last_name").wire_key("lastName").nullable();
		assert_eq!(field.def().name, "last_name");
		assert_eq!(field.def().wire_key, "lastName");
		assert!(field.def().nullable);
		assert!(field.def().mutable);

		let id = IdField::new("id");
		assert!(!id.def().mutable);
	}

	#[test]
	fn test_filters_use_wire_keys() {
		let field = IntegerField::new("age").wire_key("age_years");
		let compiled = field.gt(30).compile();
		assert_eq!(JsonValue::Object(compiled), json!({"age_years": {"$gt": 30}}));
	}

	#[test]
	fn test_between_nests_both_bounds() {
		let field = IntegerField::new("age");
		let compiled = field.between(30, 50).compile();
		assert_eq!(
			JsonValue::Object(compiled),
			json!({"age": {"$gte": 30, "$lte": 50}})
		);
	}

	#[test]
	fn test_empty_pattern_rejected() {
		let field = StringField::new("name");
		assert!(field.starts_with("").is_err());
		assert!(field.contains("a").is_ok());
	}
}
