//! Structured metadata attached to log entries
//!
//! This module provides:
//! - `MetaValue`: a typed value tree for arbitrary caller context
//! - `Meta`: the per-entry key/value mapping
//! - `SharedValue`: a live, shared node that may form cycles

use super::error::{LoggerError, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Key carrying the request correlation id
pub const REQUEST_ID_KEY: &str = "requestId";

/// Nesting limit for the JSON round trip
pub const MAX_META_DEPTH: usize = 32;

/// A shared, mutable metadata node. Two handles to the same node compare
/// equal, and a node may (directly or indirectly) contain itself.
pub type SharedValue = Arc<RwLock<MetaValue>>;

/// Value type for metadata fields
#[derive(Clone)]
pub enum MetaValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<MetaValue>),
    Map(BTreeMap<String, MetaValue>),
    Shared(SharedValue),
}

impl MetaValue {
    /// Wrap a value in a shared node
    pub fn shared(value: impl Into<MetaValue>) -> SharedValue {
        Arc::new(RwLock::new(value.into()))
    }

    /// True for lists, maps and shared nodes
    pub fn is_nested(&self) -> bool {
        matches!(
            self,
            MetaValue::List(_) | MetaValue::Map(_) | MetaValue::Shared(_)
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to a plain JSON tree.
    ///
    /// Fails with [`LoggerError::CircularReference`] when a shared node is
    /// reached again while it is still being visited, when a shared node is
    /// write-locked elsewhere, or when nesting exceeds [`MAX_META_DEPTH`].
    /// Non-finite floats become `null`.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut visiting = Vec::new();
        self.to_json_inner(&mut visiting, 0)
    }

    fn to_json_inner(
        &self,
        visiting: &mut Vec<*const RwLock<MetaValue>>,
        depth: usize,
    ) -> Result<serde_json::Value> {
        use serde_json::Value;

        if depth > MAX_META_DEPTH {
            return Err(LoggerError::CircularReference);
        }

        Ok(match self {
            MetaValue::Null => Value::Null,
            MetaValue::Bool(b) => Value::Bool(*b),
            MetaValue::Int(i) => Value::Number((*i).into()),
            MetaValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            MetaValue::String(s) => Value::String(s.clone()),
            MetaValue::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| item.to_json_inner(visiting, depth + 1))
                    .collect::<Result<Vec<_>>>()?,
            ),
            MetaValue::Map(map) => {
                let mut object = serde_json::Map::new();
                for (key, value) in map {
                    object.insert(key.clone(), value.to_json_inner(visiting, depth + 1)?);
                }
                Value::Object(object)
            }
            MetaValue::Shared(node) => {
                let ptr = Arc::as_ptr(node);
                if visiting.contains(&ptr) {
                    return Err(LoggerError::CircularReference);
                }
                let guard = node.try_read().ok_or(LoggerError::CircularReference)?;
                visiting.push(ptr);
                let result = guard.to_json_inner(visiting, depth + 1);
                visiting.pop();
                result?
            }
        })
    }
}

impl fmt::Debug for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Null => write!(f, "Null"),
            MetaValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            MetaValue::Int(i) => f.debug_tuple("Int").field(i).finish(),
            MetaValue::Float(fl) => f.debug_tuple("Float").field(fl).finish(),
            MetaValue::String(s) => f.debug_tuple("String").field(s).finish(),
            MetaValue::List(items) => f.debug_tuple("List").field(items).finish(),
            MetaValue::Map(map) => f.debug_tuple("Map").field(map).finish(),
            // Never descend: the node may contain itself
            MetaValue::Shared(node) => write!(f, "Shared({:p})", Arc::as_ptr(node)),
        }
    }
}

impl PartialEq for MetaValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MetaValue::Null, MetaValue::Null) => true,
            (MetaValue::Bool(a), MetaValue::Bool(b)) => a == b,
            (MetaValue::Int(a), MetaValue::Int(b)) => a == b,
            (MetaValue::Float(a), MetaValue::Float(b)) => a == b,
            (MetaValue::String(a), MetaValue::String(b)) => a == b,
            (MetaValue::List(a), MetaValue::List(b)) => a == b,
            (MetaValue::Map(a), MetaValue::Map(b)) => a == b,
            (MetaValue::Shared(a), MetaValue::Shared(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::String(s) => write!(f, "{}", s),
            MetaValue::Int(i) => write!(f, "{}", i),
            MetaValue::Float(fl) => write!(f, "{}", fl),
            MetaValue::Bool(b) => write!(f, "{}", b),
            MetaValue::Null => write!(f, "null"),
            nested => match nested.to_json() {
                Ok(json) => write!(f, "{}", json),
                Err(_) => write!(f, "[unprintable]"),
            },
        }
    }
}

impl Serialize for MetaValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MetaValue::Null => serializer.serialize_unit(),
            MetaValue::Bool(b) => serializer.serialize_bool(*b),
            MetaValue::Int(i) => serializer.serialize_i64(*i),
            MetaValue::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            MetaValue::Float(_) => serializer.serialize_unit(),
            MetaValue::String(s) => serializer.serialize_str(s),
            MetaValue::List(items) => serializer.collect_seq(items),
            MetaValue::Map(map) => serializer.collect_map(map),
            MetaValue::Shared(_) => self
                .to_json()
                .map_err(serde::ser::Error::custom)?
                .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for MetaValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(MetaValue::from)
    }
}

impl From<serde_json::Value> for MetaValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => MetaValue::Null,
            Value::Bool(b) => MetaValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => MetaValue::Int(i),
                None => MetaValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => MetaValue::String(s),
            Value::Array(items) => MetaValue::List(items.into_iter().map(MetaValue::from).collect()),
            Value::Object(object) => MetaValue::Map(
                object
                    .into_iter()
                    .map(|(key, value)| (key, MetaValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<String> for MetaValue {
    fn from(s: String) -> Self {
        MetaValue::String(s)
    }
}

impl From<&str> for MetaValue {
    fn from(s: &str) -> Self {
        MetaValue::String(s.to_string())
    }
}

impl From<i64> for MetaValue {
    fn from(i: i64) -> Self {
        MetaValue::Int(i)
    }
}

impl From<i32> for MetaValue {
    fn from(i: i32) -> Self {
        MetaValue::Int(i as i64)
    }
}

impl From<u16> for MetaValue {
    fn from(i: u16) -> Self {
        MetaValue::Int(i as i64)
    }
}

impl From<u32> for MetaValue {
    fn from(i: u32) -> Self {
        MetaValue::Int(i as i64)
    }
}

impl From<u64> for MetaValue {
    fn from(i: u64) -> Self {
        match i64::try_from(i) {
            Ok(i) => MetaValue::Int(i),
            Err(_) => MetaValue::Float(i as f64),
        }
    }
}

impl From<usize> for MetaValue {
    fn from(i: usize) -> Self {
        MetaValue::from(i as u64)
    }
}

impl From<f64> for MetaValue {
    fn from(f: f64) -> Self {
        MetaValue::Float(f)
    }
}

impl From<bool> for MetaValue {
    fn from(b: bool) -> Self {
        MetaValue::Bool(b)
    }
}

/// Durations are recorded in whole milliseconds
impl From<Duration> for MetaValue {
    fn from(d: Duration) -> Self {
        MetaValue::from(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }
}

impl<T: Into<MetaValue>> From<Vec<T>> for MetaValue {
    fn from(items: Vec<T>) -> Self {
        MetaValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<MetaValue>> From<Option<T>> for MetaValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(MetaValue::Null)
    }
}

impl From<BTreeMap<String, MetaValue>> for MetaValue {
    fn from(map: BTreeMap<String, MetaValue>) -> Self {
        MetaValue::Map(map)
    }
}

impl From<Meta> for MetaValue {
    fn from(meta: Meta) -> Self {
        MetaValue::Map(meta.fields)
    }
}

impl From<SharedValue> for MetaValue {
    fn from(node: SharedValue) -> Self {
        MetaValue::Shared(node)
    }
}

/// Caller-supplied context for one log entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meta {
    fields: BTreeMap<String, MetaValue>,
}

impl Meta {
    /// Create an empty metadata map
    pub fn new() -> Self {
        Self {
            fields: BTreeMap::new(),
        }
    }

    /// Add a field (builder version)
    pub fn with_field<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<MetaValue>,
    {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Add a field, replacing any previous value under the same key
    pub fn add_field<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<MetaValue>,
    {
        self.fields.insert(key.into(), value.into());
    }

    /// Attach a request correlation id
    pub fn with_request_id(self, request_id: impl Into<String>) -> Self {
        self.with_field(REQUEST_ID_KEY, request_id.into())
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<MetaValue> {
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn fields(&self) -> &BTreeMap<String, MetaValue> {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.fields.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Merge `other` into `self`; keys already present in `self` win
    pub fn merge_missing(&mut self, other: &Meta) {
        for (key, value) in &other.fields {
            self.fields
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }

    /// Format fields as key=value pairs
    pub fn format_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fields())
    }
}

impl FromIterator<(String, MetaValue)> for Meta {
    fn from_iter<I: IntoIterator<Item = (String, MetaValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Meta {
    type Item = (String, MetaValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, MetaValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
