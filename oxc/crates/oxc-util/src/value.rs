//! Value module - The runtime value domain of OX expressions.
//!
//! Variables, data-source results, evaluated expressions, and injected
//! module properties are all represented as [`Value`]s. The type mirrors a
//! JSON value with insertion-ordered objects so that output stays
//! deterministic.

use indexmap::IndexMap;

/// A dynamic runtime value.
///
/// # Examples
///
/// ```
/// use oxc_util::Value;
///
/// let v = Value::Number(42.0);
/// assert!(v.is_truthy());
/// assert_eq!(v.type_name(), "number");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// The null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number. All OX numbers are 64-bit floats.
    Number(f64),
    /// A string.
    Str(String),
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// An insertion-ordered mapping from string keys to values.
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Returns the OX type name of this value.
    ///
    /// # Examples
    ///
    /// ```
    /// use oxc_util::Value;
    ///
    /// assert_eq!(Value::Null.type_name(), "null");
    /// assert_eq!(Value::Str("x".into()).type_name(), "string");
    /// ```
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Truthiness coercion.
    ///
    /// `null`, `false`, `0`, and the empty string are falsy; everything
    /// else (including empty arrays and objects) is truthy.
    ///
    /// # Examples
    ///
    /// ```
    /// use oxc_util::Value;
    ///
    /// assert!(!Value::Null.is_truthy());
    /// assert!(!Value::Number(0.0).is_truthy());
    /// assert!(!Value::Str(String::new()).is_truthy());
    /// assert!(Value::Array(vec![]).is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Returns the number if this value is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the elements if this value is an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries if this value is an object.
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Convert a `serde_json::Value` into a runtime value.
    ///
    /// Object key order is preserved as encountered.
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(0.0)),
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert this value into a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Canonical JSON serialisation: object keys are sorted recursively so
    /// that the same value always serialises to the same byte sequence.
    pub fn to_canonical_json(&self) -> String {
        fn canonical(value: &Value) -> serde_json::Value {
            match value {
                Value::Object(map) => {
                    let mut keys: Vec<&String> = map.keys().collect();
                    keys.sort();
                    let mut out = serde_json::Map::new();
                    for key in keys {
                        out.insert(key.clone(), canonical(&map[key]));
                    }
                    serde_json::Value::Object(out)
                }
                Value::Array(items) => {
                    serde_json::Value::Array(items.iter().map(canonical).collect())
                }
                other => other.to_json(),
            }
        }
        canonical(self).to_string()
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}
