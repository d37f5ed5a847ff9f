use chrono::{DateTime, SecondsFormat, Utc};
use mongodb::bson::{self, Bson, Document};
use serde_json::{Map, Number, Value};

/// Converts a BSON value into plain JSON.
///
/// Dates become RFC 3339 strings and object ids their hex form; types with no
/// JSON counterpart fall back to relaxed extended JSON.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::Number(Number::from(i)),
        Bson::Int64(i) => Value::Number(Number::from(i)),
        Bson::Double(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Bson::String(s) => Value::String(s),
        Bson::Symbol(s) => Value::String(s),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => match to_chrono(dt) {
            Some(datetime) => Value::String(datetime.to_rfc3339_opts(SecondsFormat::Millis, true)),
            None => Bson::DateTime(dt).into_relaxed_extjson(),
        },
        Bson::Decimal128(d) => Value::String(d.to_string()),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(doc) => Value::Object(document_to_json(doc)),
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_json(doc: Document) -> Map<String, Value> {
    doc.into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

/// Renders an inspection date as `YYYY-MM-DD`.
///
/// Strings are passed through as stored; other non-null values use their JSON
/// text.
pub fn grade_date(value: Bson) -> Option<String> {
    match value {
        Bson::Null | Bson::Undefined => None,
        Bson::DateTime(dt) => Some(match to_chrono(dt) {
            Some(datetime) => datetime.format("%Y-%m-%d").to_string(),
            None => dt.to_string(),
        }),
        Bson::String(s) => Some(s),
        other => Some(bson_to_json(other).to_string()),
    }
}

/// Reads an integer-like count, as produced by `$count` or `countDocuments`.
pub fn bson_to_u64(value: &Bson) -> Option<u64> {
    match value {
        Bson::Int32(i) => u64::try_from(*i).ok(),
        Bson::Int64(i) => u64::try_from(*i).ok(),
        Bson::Double(f) if f.is_finite() && *f >= 0.0 => Some(*f as u64),
        _ => None,
    }
}

fn to_chrono(dt: bson::DateTime) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
}
