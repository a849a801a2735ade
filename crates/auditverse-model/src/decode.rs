//! Element-wise decoding
//!
//! Exports in the wild mix value types freely. Collections here decode one
//! element at a time so a single odd record never rejects its neighbours:
//! - a record attribute whose JSON type does not fit its typed field is kept
//!   untyped in the record's extras
//! - a record that still does not decode (bad or missing `id`) is dropped
//!   with a warning
//! - a collection that is not an array is treated as absent
//!
//! Events get their own placeholder handling in [`crate::Event`].

use crate::entity::{ConnectedEntities, EntityRecord};
use im::Vector;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}

/// Decode a record, moving attributes that do not fit their field to extras
///
/// # Errors
/// Returns the serde error when the record cannot decode even without the
/// misfit attributes, e.g. when `id` is missing or not a string.
pub(crate) fn decode_record<T: EntityRecord>(value: Value) -> Result<T, serde_json::Error> {
    let err = match T::deserialize(&value) {
        Ok(record) => return Ok(record),
        Err(err) => err,
    };
    let Value::Object(map) = value else {
        return Err(err);
    };

    let mut fitting = Map::new();
    let mut misfits = BTreeMap::new();
    for (key, attr) in map {
        let mut single = Map::new();
        single.insert("id".to_string(), Value::String(String::new()));
        single.insert(key.clone(), attr.clone());
        if key != "id" && T::deserialize(&Value::Object(single)).is_err() {
            misfits.insert(key, attr);
        } else {
            fitting.insert(key, attr);
        }
    }

    let mut record = T::deserialize(&Value::Object(fitting))?;
    if !misfits.is_empty() {
        debug!(
            id = %record.id(),
            keys = ?misfits.keys().collect::<Vec<_>>(),
            "attributes kept untyped"
        );
        record.extra_mut().extend(misfits);
    }
    Ok(record)
}

fn non_array<T>(other: &Value) {
    warn!(
        record = short_type_name::<T>(),
        found = %json_type(other),
        "collection is not an array, ignored"
    );
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode each element with `decode`, dropping failures with a warning
pub(crate) fn each<T, F>(items: Vec<Value>, decode: F) -> impl Iterator<Item = T>
where
    F: Fn(Value) -> Result<T, serde_json::Error>,
{
    items
        .into_iter()
        .enumerate()
        .filter_map(move |(index, item)| match decode(item) {
            Ok(decoded) => Some(decoded),
            Err(err) => {
                warn!(record = short_type_name::<T>(), index, error = %err, "record dropped");
                None
            }
        })
}

/// `deserialize_with` for optional entity collections
pub(crate) fn records<'de, D, T>(deserializer: D) -> Result<Option<Vector<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: EntityRecord,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(each(items, decode_record::<T>).collect()),
        Some(other) => {
            non_array::<T>(&other);
            None
        }
    })
}

fn plain<T: DeserializeOwned>(value: Option<Value>) -> Vec<T> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => each(items, serde_json::from_value::<T>).collect(),
        Some(other) => {
            non_array::<T>(&other);
            Vec::new()
        }
    }
}

/// `deserialize_with` for sequences of plain values
pub(crate) fn vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(plain(Option::<Value>::deserialize(deserializer)?))
}

/// `deserialize_with` for persistent sequences of plain values
pub(crate) fn vector<'de, D, T>(deserializer: D) -> Result<Vector<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Clone,
{
    Ok(plain::<T>(Option::<Value>::deserialize(deserializer)?)
        .into_iter()
        .collect())
}

/// `deserialize_with` for `connectedEntities`
///
/// Keeps only array-valued entries, and only the string labels inside them.
pub(crate) fn connections<'de, D>(deserializer: D) -> Result<Option<ConnectedEntities>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Object(map)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let connections = map
        .into_iter()
        .filter_map(|(key, labels)| match labels {
            Value::Array(items) => {
                let labels = items
                    .into_iter()
                    .filter_map(|label| match label {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect();
                Some((key, labels))
            }
            _ => None,
        })
        .collect();
    Ok(Some(connections))
}
