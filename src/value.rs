use std::fmt;

use ahash::RandomState;
use indexmap::IndexMap;
use num_bigint::BigInt;

use crate::decimal::Decimal;

/// A numeric scalar. Integers are narrowed to the smallest representation
/// that holds them exactly.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    /// Fits in 32 bits.
    Int(i32),
    /// Fits in 64 bits but not in 32.
    Long(i64),
    /// Needs more than 64 bits.
    BigInt(BigInt),
    /// Decimal notation, scale preserved.
    Decimal(Decimal),
    /// Floating point; used for negative zero and values only a double
    /// parser accepts.
    Float(f64),
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Long(n) => write!(f, "{}", n),
            Number::BigInt(n) => write!(f, "{}", n),
            Number::Decimal(d) => write!(f, "{}", d),
            // debug formatting keeps the sign and fraction of `-0.0`
            Number::Float(n) => write!(f, "{:?}", n),
        }
    }
}

/// A node in the output tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Map),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Walk down a sequence of object keys.
    pub fn pointer<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> Option<&Value> {
        keys.into_iter().try_fold(self, |value, key| value.get(key))
    }

    /// Whether this is the empty string.
    pub(crate) fn is_empty_string(&self) -> bool {
        matches!(self, Value::String(s) if s.is_empty())
    }
}

/// Renders scalars as their text form; containers render as XML.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Array(_) | Value::Object(_) => f.write_str(&crate::serialize::to_string(self)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::Int(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::Long(n))
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Number(Number::Decimal(d))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

/// An insertion-ordered mapping from keys to values.
///
/// Besides plain [`Map::put`], keys can be [accumulated](Map::accumulate):
/// a second value under the same key turns the slot into an array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    entries: IndexMap<String, Value, RandomState>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Set a key, overwriting whatever was there.
    pub fn put(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Merge a value under a key.
    ///
    /// The first value is stored as is. A second value converts the slot
    /// into a two-element array; further values are appended to it. A
    /// value that is itself an array is wrapped when stored first, so it
    /// keeps its identity as a single entry.
    pub fn accumulate(&mut self, key: impl Into<String>, value: Value) {
        use indexmap::map::Entry;
        match self.entries.entry(key.into()) {
            Entry::Vacant(entry) => {
                let value = match value {
                    Value::Array(_) => Value::Array(vec![value]),
                    value => value,
                };
                entry.insert(value);
            }
            Entry::Occupied(mut entry) => match entry.get_mut() {
                Value::Array(items) => items.push(value),
                existing => {
                    let first = std::mem::take(existing);
                    *existing = Value::Array(vec![first, value]);
                }
            },
        }
    }

    /// Append a value to the array under a key, creating the array when
    /// the key is absent. A non-array value already present becomes the
    /// first element.
    pub fn append(&mut self, key: impl Into<String>, value: Value) {
        use indexmap::map::Entry;
        match self.entries.entry(key.into()) {
            Entry::Vacant(entry) => {
                entry.insert(Value::Array(vec![value]));
            }
            Entry::Occupied(mut entry) => match entry.get_mut() {
                Value::Array(items) => items.push(value),
                existing => {
                    let first = std::mem::take(existing);
                    *existing = Value::Array(vec![first, value]);
                }
            },
        }
    }

    /// Take the single value of a one-entry map stored under `key`.
    pub(crate) fn into_single(mut self, key: &str) -> Result<Value, Map> {
        if self.entries.len() == 1 && self.entries.contains_key(key) {
            match self.entries.shift_remove(key) {
                Some(value) => Ok(value),
                None => Err(self),
            }
        } else {
            Err(self)
        }
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = Map::new();
        for (key, value) in iter {
            map.put(key, value);
        }
        map
    }
}

impl IntoIterator for Map {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use serde::ser::{Serialize, SerializeMap, Serializer};

    use super::{Map, Number, Value};

    impl Serialize for Number {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Number::Int(n) => serializer.serialize_i32(*n),
                Number::Long(n) => serializer.serialize_i64(*n),
                Number::Float(n) => serializer.serialize_f64(*n),
                // no lossless native representation
                Number::BigInt(_) | Number::Decimal(_) => {
                    serializer.serialize_str(&self.to_string())
                }
            }
        }
    }

    impl Serialize for Value {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Value::Null => serializer.serialize_unit(),
                Value::Bool(b) => serializer.serialize_bool(*b),
                Value::Number(n) => n.serialize(serializer),
                Value::String(s) => serializer.serialize_str(s),
                Value::Array(items) => items.serialize(serializer),
                Value::Object(map) => map.serialize(serializer),
            }
        }
    }

    impl Serialize for Map {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut state = serializer.serialize_map(Some(self.len()))?;
            for (key, value) in self.iter() {
                state.serialize_entry(key, value)?;
            }
            state.end()
        }
    }
}
