//! Ordered, recursively nested dictionaries.
//!
//! [`Dictionary`] is the canonical container used to hold decoded query
//! results. It maps scalar keys to [`Value`]s, where a value is a scalar, an
//! ordered sequence, or another dictionary. Insertion order is preserved and
//! observable through iteration, rendering and association-list projection.
//!
//! # Association lists
//!
//! An association list is a flattened form of a dictionary: a sequence of
//! `[key, value]` pairs whose values may themselves be association lists.
//!
//! ```
//! use trellis_core::{Dictionary, Scalar, Value};
//!
//! let alist = vec![
//!     Value::from(vec![Value::from("name"), Value::from("Ada")]),
//!     Value::from(vec![
//!         Value::from("address"),
//!         Value::from(vec![Value::from(vec![Value::from("city"), Value::from("London")])]),
//!     ]),
//! ];
//!
//! let dict = Dictionary::from_association_list(alist.clone()).unwrap();
//! let city = dict.recursive_get(&[Scalar::from("address"), Scalar::from("city")]);
//! assert_eq!(city, Some(&Value::from("London")));
//! assert_eq!(dict.to_association_list(), alist);
//! ```

use std::borrow::{Borrow, Cow};
use std::fmt;

use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{self, Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::Number;

use crate::error::{DictionaryError, Result};
use crate::logging::targets;

/// A leaf value, also used as a dictionary key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scalar {
    /// JSON `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A finite number.
    Number(Number),
    /// A string.
    String(String),
}

impl Scalar {
    /// Create a numeric scalar from a float.
    ///
    /// Returns `None` for NaN and infinities, which JSON cannot represent.
    pub fn from_f64(value: f64) -> Option<Self> {
        Number::from_f64(value).map(Self::Number)
    }

    /// Get the string contents, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// The text used when this scalar appears as a JSON object key.
    ///
    /// `null` has no key form.
    fn json_key(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Null => None,
            Self::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
            Self::Number(n) => Some(Cow::Owned(n.to_string())),
            Self::String(s) => Some(Cow::Borrowed(s)),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<Number> for Scalar {
    fn from(value: Number) -> Self {
        Self::Number(value)
    }
}

/// A dictionary value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A leaf value.
    Scalar(Scalar),
    /// An ordered, possibly empty, sequence of values.
    Sequence(Vec<Value>),
    /// A nested dictionary.
    Dictionary(Dictionary),
}

impl Value {
    /// The `null` value.
    pub const NULL: Value = Value::Scalar(Scalar::Null);

    /// Get the scalar, if this is one.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Get the string contents, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Scalar::as_str)
    }

    /// Get the elements, if this is a sequence.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// Get the nested dictionary, if this is one.
    pub fn as_dictionary(&self) -> Option<&Dictionary> {
        match self {
            Self::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Check if this is `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Scalar(Scalar::Null))
    }

    /// A short name for the kind of value, matching JSON type names.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Scalar(Scalar::Null) => "null",
            Self::Scalar(Scalar::Bool(_)) => "boolean",
            Self::Scalar(Scalar::Number(_)) => "number",
            Self::Scalar(Scalar::String(_)) => "string",
            Self::Sequence(_) => "array",
            Self::Dictionary(_) => "object",
        }
    }
}

macro_rules! value_from_scalar {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.into())
                }
            }
        )*
    };
}

value_from_scalar!(&str, String, bool, i32, i64, u64, Number);

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Self::Scalar(scalar)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Sequence(items)
    }
}

impl From<Dictionary> for Value {
    fn from(dict: Dictionary) -> Self {
        Self::Dictionary(dict)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::NULL,
            serde_json::Value::Bool(b) => b.into(),
            serde_json::Value::Number(n) => n.into(),
            serde_json::Value::String(s) => s.into(),
            serde_json::Value::Array(items) => {
                Self::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Self::Dictionary(
                map.into_iter()
                    .map(|(key, value)| (Scalar::String(key), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

/// An insertion-ordered map from [`Scalar`] keys to [`Value`]s.
///
/// Equality is order-sensitive: two dictionaries are equal only if they hold
/// the same entries in the same order.
#[derive(Clone, Default)]
pub struct Dictionary {
    entries: IndexMap<Scalar, Value>,
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty dictionary with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Build a dictionary from an association list.
    ///
    /// Each element must be a `[key, value]` pair with a scalar key. A value
    /// that is itself a well-formed association list becomes a nested
    /// dictionary; any other value, including a malformed nested list, is
    /// stored as-is.
    pub fn from_association_list<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut dict = Self::new();
        for (index, element) in pairs.into_iter().enumerate() {
            let Value::Sequence(pair) = element else {
                return Err(DictionaryError::MalformedPair { index });
            };
            let [key, value] = <[Value; 2]>::try_from(pair)
                .map_err(|_| DictionaryError::MalformedPair { index })?;
            let Value::Scalar(key) = key else {
                return Err(DictionaryError::NonScalarKey { index });
            };
            dict.set_pair(key, nest_association_lists(value));
        }
        Ok(dict)
    }

    /// Project this dictionary into an association list.
    ///
    /// Nested dictionaries are projected recursively; entry order is kept.
    pub fn to_association_list(&self) -> Vec<Value> {
        self.entries
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::Dictionary(nested) => Value::Sequence(nested.to_association_list()),
                    other => other.clone(),
                };
                Value::Sequence(vec![Value::Scalar(key.clone()), value])
            })
            .collect()
    }

    /// Parse JSON text whose top level is an object.
    pub fn from_json_str(text: &str) -> Result<Self> {
        match serde_json::from_str::<Value>(text)? {
            Value::Dictionary(dict) => Ok(dict),
            other => Err(DictionaryError::NotAnObject {
                found: other.type_name(),
            }),
        }
    }

    /// Insert or replace the value for `key`.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn set_pair(&mut self, key: impl Into<Scalar>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Remove every listed key that is present. Missing keys are ignored.
    pub fn delete_pairs<I, K>(&mut self, keys: I)
    where
        I: IntoIterator<Item = K>,
        K: Borrow<Scalar>,
    {
        for key in keys {
            self.entries.shift_remove(key.borrow());
        }
    }

    /// Remove `key` and return its value, keeping the order of the rest.
    pub fn remove(&mut self, key: &Scalar) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Look up a value by walking nested dictionaries along `path`.
    ///
    /// Returns `None` for an empty path, for a missing key, and when the path
    /// continues past a value that is not a dictionary.
    pub fn recursive_get(&self, path: &[Scalar]) -> Option<&Value> {
        let mut current = self;
        let mut found = None;
        let mut keys = path.iter().peekable();

        while let Some(key) = keys.next() {
            found = current.get(key);
            match found {
                Some(Value::Dictionary(nested)) => current = nested,
                _ if keys.peek().is_some() => return None,
                _ => {}
            }
        }

        found
    }

    /// Render as JSON text.
    ///
    /// With `as_compact_json` the output is compact JSON, otherwise it is
    /// pretty-printed. Key order is kept either way.
    pub fn render(&self, as_compact_json: bool) -> Result<String> {
        let rendered = if as_compact_json {
            serde_json::to_string(self)
        } else {
            serde_json::to_string_pretty(self)
        };
        rendered.map_err(|e| DictionaryError::Serialization(e.to_string()))
    }

    /// Get the value for `key`.
    pub fn get(&self, key: &Scalar) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: &Scalar) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Get the value for `key`, or `not_found` if it is absent.
    pub fn lookup_or<'a>(&'a self, key: &Scalar, not_found: &'a Value) -> &'a Value {
        self.get(key).unwrap_or(not_found)
    }

    /// Check if `key` is present.
    pub fn contains_key(&self, key: &Scalar) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, Scalar, Value> {
        self.entries.iter()
    }

    /// Iterate over keys in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, Scalar, Value> {
        self.entries.keys()
    }

    /// Iterate over values in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, Scalar, Value> {
        self.entries.values()
    }
}

/// Convert `value` into a nested dictionary if it is a well-formed
/// association list, recursively. Anything else passes through untouched.
fn nest_association_lists(value: Value) -> Value {
    match value {
        Value::Sequence(items) if is_association_list(&items) => {
            let mut nested = Dictionary::with_capacity(items.len());
            for item in items {
                if let Value::Sequence(pair) = item
                    && let Ok([Value::Scalar(key), value]) = <[Value; 2]>::try_from(pair)
                {
                    nested.set_pair(key, nest_association_lists(value));
                }
            }
            Value::Dictionary(nested)
        }
        Value::Sequence(items) => {
            tracing::trace!(
                target: targets::DICTIONARY,
                len = items.len(),
                "sequence is not an association list, storing as-is"
            );
            Value::Sequence(items)
        }
        other => other,
    }
}

fn is_association_list(items: &[Value]) -> bool {
    items.iter().all(|item| {
        matches!(item, Value::Sequence(pair) if pair.len() == 2 && matches!(pair[0], Value::Scalar(_)))
    })
}

impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl Eq for Dictionary {}

impl fmt::Debug for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: Into<Scalar>, V: Into<Value>> FromIterator<(K, V)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (key, value) in iter {
            dict.set_pair(key, value);
        }
        dict
    }
}

impl<'a> IntoIterator for &'a Dictionary {
    type Item = (&'a Scalar, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, Scalar, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl IntoIterator for Dictionary {
    type Item = (Scalar, Value);
    type IntoIter = indexmap::map::IntoIter<Scalar, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ============================================================================
// Serde
// ============================================================================

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(scalar) => scalar.serialize(serializer),
            Self::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Dictionary(dict) => dict.serialize(serializer),
        }
    }
}

impl Serialize for Dictionary {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            let key = key
                .json_key()
                .ok_or_else(|| ser::Error::custom("null cannot be used as an object key"))?;
            map.serialize_entry(key.as_ref(), value)?;
        }
        map.end()
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> std::result::Result<Value, E> {
        Ok(v.into())
    }

    fn visit_i64<E>(self, v: i64) -> std::result::Result<Value, E> {
        Ok(v.into())
    }

    fn visit_u64<E>(self, v: u64) -> std::result::Result<Value, E> {
        Ok(v.into())
    }

    fn visit_f64<E>(self, v: f64) -> std::result::Result<Value, E> {
        Ok(Scalar::from_f64(v).map_or(Value::NULL, Value::Scalar))
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Value, E> {
        Ok(v.into())
    }

    fn visit_string<E>(self, v: String) -> std::result::Result<Value, E> {
        Ok(v.into())
    }

    fn visit_unit<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::NULL)
    }

    fn visit_none<E>(self) -> std::result::Result<Value, E> {
        Ok(Value::NULL)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Value, D::Error> {
        Deserialize::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> std::result::Result<Value, A::Error> {
        DictionaryVisitor.visit_map(map).map(Value::Dictionary)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct DictionaryVisitor;

impl<'de> Visitor<'de> for DictionaryVisitor {
    type Value = Dictionary;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Dictionary, A::Error> {
        let mut dict = Dictionary::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            dict.set_pair(key, value);
        }
        Ok(dict)
    }
}

impl<'de> Deserialize<'de> for Dictionary {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(DictionaryVisitor)
    }
}
