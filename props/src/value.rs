//! Dynamic values carried by props.
//!
//! Every prop value, default, converter output and computed mapping is a
//! [`Value`]. Maps use [`ValueMap`], which keeps keys sorted so that two
//! computed outputs compare equal regardless of insertion order.

use alloc::collections::BTreeMap;
use core::fmt;

use serde::{Deserialize, Serialize};

/// A string-keyed mapping of values.
pub type ValueMap = BTreeMap<String, Value>;

/// A dynamically typed prop value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// The absence of a value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A nested mapping.
    Map(ValueMap),
}

impl Value {
    /// Returns a short, human readable name of this value's kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Returns `true` if this value is [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrows the inner mapping, if this value is a map.
    #[must_use]
    pub const fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrows the inner string, if this value is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the inner integer, if this value is an int.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the inner number as a float, promoting ints.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Returns the inner boolean, if this value is a bool.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i32 => Int,
    i64 => Int,
    u32 => Int,
    f32 => Float,
    f64 => Float,
    String => Str,
    &str => Str,
    ValueMap => Map,
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Builds a [`ValueMap`] from `key => value` pairs.
///
/// ```
/// use reactk_props::{values, Value};
///
/// let map = values! { "text" => "hi", "size" => 12 };
/// assert_eq!(map["size"], Value::Int(12));
/// ```
#[macro_export]
macro_rules! values {
    () => { $crate::ValueMap::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::ValueMap::new();
        $(map.insert(::std::string::String::from($key), $crate::Value::from($value));)+
        map
    }};
}

/// Recursively merges `overrides` into `base`.
///
/// Nested maps are merged key by key; any other value in `overrides`
/// replaces the one in `base`.
#[must_use]
pub fn deep_merge(base: &ValueMap, overrides: &ValueMap) -> ValueMap {
    let mut merged = base.clone();
    for (key, value) in overrides {
        let next = match (merged.get(key), value) {
            (Some(Value::Map(left)), Value::Map(right)) => Value::Map(deep_merge(left, right)),
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_merge_merges_nested_maps() {
        let base = values! {
            "font" => values! { "family" => "Arial", "size" => 10 },
            "text" => "a",
        };
        let overrides = values! { "font" => values! { "size" => 12 } };
        let merged = deep_merge(&base, &overrides);
        assert_eq!(
            merged["font"],
            Value::Map(values! { "family" => "Arial", "size" => 12 })
        );
        assert_eq!(merged["text"], Value::from("a"));
    }

    #[test]
    fn deep_merge_replaces_non_maps() {
        let base = values! { "font" => values! { "size" => 10 } };
        let overrides = values! { "font" => Value::Null };
        assert_eq!(deep_merge(&base, &overrides)["font"], Value::Null);
    }

    #[test]
    fn untagged_json_representation() {
        let value: Value = serde_json::from_str(r#"{"a": 1, "b": [true, "x"], "c": 1.5}"#)
            .expect("valid json");
        assert_eq!(
            value,
            Value::Map(values! {
                "a" => 1,
                "b" => Value::List(vec![Value::Bool(true), Value::from("x")]),
                "c" => 1.5,
            })
        );
    }

    #[test]
    fn display_is_compact() {
        let value = Value::Map(values! { "a" => 1, "b" => "x" });
        assert_eq!(value.to_string(), r#"{a: 1, b: "x"}"#);
    }
}
