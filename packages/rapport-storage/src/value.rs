use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::time_serde;

/// Column type of a filterable or sortable field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
	Bool,
	Integer,
	Float,
	Text,
	TextArray,
	Timestamp,
	Uuid,
}

/// A typed scalar used in constraints and cursors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
	Null,
	Bool(bool),
	Integer(i64),
	Float(f64),
	Text(String),
	Timestamp(#[serde(with = "crate::time_serde")] OffsetDateTime),
	Uuid(Uuid),
}
impl FieldValue {
	/// Parses a user supplied facet value as `kind`. Returns `None` when it does not parse.
	pub fn parse(kind: FieldKind, raw: &str) -> Option<Self> {
		let raw = raw.trim();

		match kind {
			FieldKind::Bool => match raw.to_ascii_lowercase().as_str() {
				"true" => Some(Self::Bool(true)),
				"false" => Some(Self::Bool(false)),
				_ => None,
			},
			FieldKind::Integer => raw.parse().ok().map(Self::Integer),
			FieldKind::Float =>
				raw.parse::<f64>().ok().filter(|value| value.is_finite()).map(Self::Float),
			FieldKind::Text | FieldKind::TextArray =>
				if raw.is_empty() {
					None
				} else {
					Some(Self::Text(raw.to_string()))
				},
			FieldKind::Timestamp => time_serde::parse(raw).ok().map(Self::Timestamp),
			FieldKind::Uuid => Uuid::parse_str(raw).ok().map(Self::Uuid),
		}
	}

	/// Reads a column value out of a JSON row as `kind`.
	pub fn from_json(kind: FieldKind, value: &Value) -> Option<Self> {
		if value.is_null() {
			return Some(Self::Null);
		}

		match kind {
			FieldKind::Bool => value.as_bool().map(Self::Bool),
			FieldKind::Integer => value.as_i64().map(Self::Integer),
			FieldKind::Float => value.as_f64().map(Self::Float),
			FieldKind::Text => value.as_str().map(|text| Self::Text(text.to_string())),
			FieldKind::TextArray => None,
			FieldKind::Timestamp =>
				value.as_str().and_then(|raw| time_serde::parse(raw).ok()).map(Self::Timestamp),
			FieldKind::Uuid => value.as_str().and_then(|raw| Uuid::parse_str(raw).ok()).map(Self::Uuid),
		}
	}

	pub fn to_json(&self) -> Value {
		match self {
			Self::Null => Value::Null,
			Self::Bool(value) => Value::Bool(*value),
			Self::Integer(value) => Value::from(*value),
			Self::Float(value) => Value::from(*value),
			Self::Text(value) => Value::String(value.clone()),
			Self::Timestamp(value) => time_serde::format(value).map(Value::String).unwrap_or(Value::Null),
			Self::Uuid(value) => Value::String(value.to_string()),
		}
	}

	/// Whether this value can stand in for a non-null column of `kind`.
	pub fn fits(&self, kind: FieldKind) -> bool {
		matches!(
			(self, kind),
			(Self::Bool(_), FieldKind::Bool)
				| (Self::Integer(_), FieldKind::Integer)
				| (Self::Float(_), FieldKind::Float)
				| (Self::Text(_), FieldKind::Text)
				| (Self::Timestamp(_), FieldKind::Timestamp)
				| (Self::Uuid(_), FieldKind::Uuid)
		)
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Self::Null)
	}

	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Self::Integer(value) => Some(*value as f64),
			Self::Float(value) => Some(*value),
			_ => None,
		}
	}

	/// Orders two values of compatible kinds. Mixed integer and float compare numerically.
	pub fn compare(&self, other: &Self) -> Option<Ordering> {
		match (self, other) {
			(Self::Null, Self::Null) => Some(Ordering::Equal),
			(Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
			(Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
			(Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
			(Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
			(Self::Uuid(a), Self::Uuid(b)) => Some(a.cmp(b)),
			(a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cmp::Ordering;

	use serde_json::json;

	use crate::value::{FieldKind, FieldValue};

	#[test]
	fn parse_rejects_values_of_the_wrong_kind() {
		assert_eq!(FieldValue::parse(FieldKind::Integer, " 3 "), Some(FieldValue::Integer(3)));
		assert_eq!(FieldValue::parse(FieldKind::Integer, "three"), None);
		assert_eq!(FieldValue::parse(FieldKind::Float, "NaN"), None);
		assert_eq!(FieldValue::parse(FieldKind::Bool, "TRUE"), Some(FieldValue::Bool(true)));
		assert_eq!(FieldValue::parse(FieldKind::Text, "  "), None);
	}

	#[test]
	fn postgres_json_timestamps_parse() {
		let value = FieldValue::from_json(FieldKind::Timestamp, &json!("2024-03-01T10:00:00.25+00:00"))
			.expect("Timestamp must parse.");
		let other = FieldValue::from_json(FieldKind::Timestamp, &json!("2024-03-01T10:00:00Z"))
			.expect("Timestamp must parse.");

		assert_eq!(value.compare(&other), Some(Ordering::Greater));
	}

	#[test]
	fn cursor_values_survive_serialization() {
		let value = FieldValue::from_json(FieldKind::Timestamp, &json!("2024-03-01T10:00:00Z"))
			.expect("Timestamp must parse.");
		let encoded = serde_json::to_value(&value).expect("Failed to encode value.");

		assert_eq!(encoded["kind"], "timestamp");

		let decoded: FieldValue = serde_json::from_value(encoded).expect("Failed to decode value.");

		assert_eq!(decoded, value);
	}

	#[test]
	fn cursor_values_fit_only_their_own_kind() {
		assert!(FieldValue::Integer(5).fits(FieldKind::Integer));
		assert!(FieldValue::Text("Ada".to_string()).fits(FieldKind::Text));
		assert!(!FieldValue::Integer(5).fits(FieldKind::Text));
		assert!(!FieldValue::Integer(5).fits(FieldKind::Float));
		assert!(!FieldValue::Text("Ada".to_string()).fits(FieldKind::TextArray));
		assert!(!FieldValue::Null.fits(FieldKind::Integer));
	}

	#[test]
	fn numbers_compare_across_kinds() {
		assert_eq!(FieldValue::Integer(3).compare(&FieldValue::Float(2.5)), Some(Ordering::Greater));
		assert_eq!(FieldValue::Text("a".to_string()).compare(&FieldValue::Integer(1)), None);
	}
}
