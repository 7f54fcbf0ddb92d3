//! Conversion between wire-format documents and typed entities.
//!
//! Identity and timestamps are assigned here, partial updates are reduced
//! to an explicit set of `(field, value)` pairs, and loosely typed nested
//! payloads are validated into their typed form.

use chrono::{DateTime, Duration, SecondsFormat, SubsecRound, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::models::{CREATED_AT, UPDATED_AT};
use super::store::Document;
use crate::error::ApiError;

/// Fresh opaque identity.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current instant at storage precision.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Stamp for an update that must sort strictly after `previous`.
pub fn next_stamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let current = now();
    if current > previous {
        current
    } else {
        previous + Duration::microseconds(1)
    }
}

/// Canonical text form: RFC 3339, microseconds, `Z`.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serde adapter for timestamp fields.
///
/// Writes the canonical text form. Reads accept any RFC 3339 string,
/// epoch milliseconds, or extended JSON (`{"$date": ...}`) as produced by
/// the Mongo driver for native date values.
pub mod timestamp {
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Millis(i64),
        Extended {
            #[serde(rename = "$date")]
            date: Box<Raw>,
        },
        NumberLong {
            #[serde(rename = "$numberLong")]
            value: String,
        },
    }

    fn resolve<E: de::Error>(raw: Raw) -> Result<DateTime<Utc>, E> {
        match raw {
            Raw::Text(s) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| E::custom(format!("invalid timestamp {s:?}: {e}"))),
            Raw::Millis(ms) => Utc
                .timestamp_millis_opt(ms)
                .single()
                .ok_or_else(|| E::custom(format!("timestamp out of range: {ms}"))),
            Raw::Extended { date } => resolve(*date),
            Raw::NumberLong { value } => {
                let ms = value
                    .parse::<i64>()
                    .map_err(|e| E::custom(format!("invalid $numberLong {value:?}: {e}")))?;
                resolve(Raw::Millis(ms))
            }
        }
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        resolve(Raw::deserialize(deserializer)?)
    }
}

/// Entity → storage document.
pub fn to_document<T: Serialize>(entity: &T) -> Result<Document, ApiError> {
    match serde_json::to_value(entity) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ApiError::Internal(format!(
            "entity did not serialize to an object: {other}"
        ))),
        Err(e) => Err(ApiError::Internal(format!("failed to encode document: {e}"))),
    }
}

/// Storage document → entity. Unknown fields are ignored.
///
/// Records written without `updated_at` read it as their `created_at`.
pub fn from_document<T: DeserializeOwned>(mut doc: Document) -> Result<T, ApiError> {
    if doc.get(UPDATED_AT).map_or(true, Value::is_null) {
        if let Some(created) = doc.get(CREATED_AT).cloned() {
            doc.insert(UPDATED_AT.to_string(), created);
        }
    }
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| ApiError::Internal(format!("failed to decode stored document: {e}")))
}

/// Validate a list of loosely typed records into typed elements.
/// The first failing element rejects the whole list.
pub fn normalize_list<I, T>(
    field: &str,
    raw: Vec<Value>,
    build: impl Fn(I) -> Result<T, String>,
) -> Result<Vec<T>, ApiError>
where
    I: DeserializeOwned,
{
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            serde_json::from_value::<I>(value)
                .map_err(|e| e.to_string())
                .and_then(&build)
                .map_err(|e| ApiError::InvalidInput(format!("{field}[{index}]: {e}")))
        })
        .collect()
}

/// Keep a caller-supplied nested id, or assign a fresh one.
pub fn id_or_new(id: Option<String>) -> String {
    id.filter(|s| !s.trim().is_empty()).unwrap_or_else(new_id)
}

/// Explicit set of field assignments for a partial update.
///
/// Only values that are present are recorded, so an absent or null
/// payload field never overwrites stored data.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UpdateSet {
    fields: Document,
}

impl UpdateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<T: Serialize>(mut self, field: &str, value: Option<T>) -> Result<Self, ApiError> {
        if let Some(value) = value {
            let encoded = serde_json::to_value(value)
                .map_err(|e| ApiError::Internal(format!("failed to encode {field}: {e}")))?;
            if !encoded.is_null() {
                self.fields.insert(field.to_string(), encoded);
            }
        }
        Ok(self)
    }

    pub fn stamp(mut self, field: &str, at: DateTime<Utc>) -> Self {
        self.fields
            .insert(field.to_string(), Value::String(format_timestamp(&at)));
        self
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn into_document(self) -> Document {
        self.fields
    }
}
