//! Leaf prop declarations.

use alloc::sync::Arc;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::value::Value;

/// How an entry takes part in diffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffMode {
    /// Compare structurally and recurse into nested sections.
    #[default]
    Recursive,
    /// Compare computed outputs wholesale.
    Simple,
    /// Like [`DiffMode::Simple`]; the entry is never diffed piecewise.
    Never,
}

impl DiffMode {
    /// Returns `true` if nested entries are compared one by one.
    #[must_use]
    pub const fn is_recursive(self) -> bool {
        matches!(self, Self::Recursive)
    }
}

/// Declared type of a leaf prop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueType {
    /// Accepts anything.
    Any,
    /// A boolean.
    Bool,
    /// An integer.
    Int,
    /// A float; ints are promoted.
    Float,
    /// A string.
    Str,
    /// A list whose items all match the inner type.
    List(Box<ValueType>),
    /// An untyped mapping.
    Map,
    /// A string restricted to the given literals.
    OneOf(Vec<String>),
    /// The inner type or `null`.
    Optional(Box<ValueType>),
}

impl ValueType {
    /// Shorthand for a list type.
    #[must_use]
    pub fn list(item: Self) -> Self {
        Self::List(Box::new(item))
    }

    /// Shorthand for an optional type.
    #[must_use]
    pub fn optional(inner: Self) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Shorthand for a string literal choice.
    #[must_use]
    pub fn one_of<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::OneOf(choices.into_iter().map(Into::into).collect())
    }

    /// Checks `value` against this type, returning the coerced value.
    ///
    /// The only coercion is `int` to `float`.
    ///
    /// # Errors
    ///
    /// Returns a description of the mismatch.
    #[allow(clippy::cast_precision_loss)]
    pub fn check(&self, value: &Value) -> Result<Value, String> {
        match (self, value) {
            (Self::Any, _)
            | (Self::Bool, Value::Bool(_))
            | (Self::Int, Value::Int(_))
            | (Self::Float, Value::Float(_))
            | (Self::Str, Value::Str(_))
            | (Self::Map, Value::Map(_))
            | (Self::Optional(_), Value::Null) => Ok(value.clone()),
            (Self::Float, Value::Int(i)) => Ok(Value::Float(*i as f64)),
            (Self::List(item), Value::List(items)) => items
                .iter()
                .enumerate()
                .map(|(index, v)| item.check(v).map_err(|e| format!("item {index}: {e}")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            (Self::OneOf(choices), Value::Str(s)) => {
                if choices.iter().any(|c| c == s) {
                    Ok(value.clone())
                } else {
                    Err(format!("expected one of {choices:?}, got {s:?}"))
                }
            }
            (Self::Optional(inner), v) => inner.check(v),
            (expected, found) => Err(format!("expected {expected}, got {}", found.kind())),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Bool => f.write_str("bool"),
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Str => f.write_str("str"),
            Self::List(item) => write!(f, "list<{item}>"),
            Self::Map => f.write_str("map"),
            Self::OneOf(choices) => write!(f, "one_of{choices:?}"),
            Self::Optional(inner) => write!(f, "optional<{inner}>"),
        }
    }
}

/// Turns a resolved value into the value a backend consumes.
#[derive(Clone)]
pub struct Converter(Arc<dyn Fn(Value) -> Value + Send + Sync>);

impl Converter {
    /// Wraps a conversion function.
    pub fn new(f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Applies the conversion.
    #[must_use]
    pub fn apply(&self, value: Value) -> Value {
        (self.0)(value)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Converter(..)")
    }
}

/// A leaf schema entry.
///
/// A prop without a default (`no_value`) is required.
#[derive(Debug, Clone)]
pub struct Prop {
    name: String,
    value_type: ValueType,
    no_value: Option<Value>,
    converter: Option<Converter>,
    subsection: Option<String>,
    computed_name: Option<String>,
    diff_mode: DiffMode,
    path: Vec<String>,
}

impl Prop {
    /// Declares a required prop of the given type.
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            no_value: None,
            converter: None,
            subsection: None,
            computed_name: None,
            diff_mode: DiffMode::Simple,
            path: Vec::new(),
        }
    }

    /// Makes the prop optional, falling back to `value` when it is not supplied.
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.no_value = Some(value.into());
        self
    }

    /// Sets the converter applied by `compute`.
    #[must_use]
    pub fn converter(mut self, f: impl Fn(Value) -> Value + Send + Sync + 'static) -> Self {
        self.converter = Some(Converter::new(f));
        self
    }

    /// Groups the computed output of this prop under `name`.
    #[must_use]
    pub fn subsection(mut self, name: impl Into<String>) -> Self {
        self.subsection = Some(name.into());
        self
    }

    /// Renames the key this prop is computed to.
    #[must_use]
    pub fn computed_name(mut self, name: impl Into<String>) -> Self {
        self.computed_name = Some(name.into());
        self
    }

    /// Overrides the diff mode.
    #[must_use]
    pub const fn diff_mode(mut self, mode: DiffMode) -> Self {
        self.diff_mode = mode;
        self
    }

    pub(crate) fn rebase(&mut self, path: &[String]) {
        self.path = path.to_vec();
    }

    /// The prop's name, which is also its input key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    #[must_use]
    pub const fn value_type(&self) -> &ValueType {
        &self.value_type
    }

    /// The default value, if any.
    #[must_use]
    pub const fn no_value(&self) -> Option<&Value> {
        self.no_value.as_ref()
    }

    /// The subsection the computed output is grouped under.
    #[must_use]
    pub fn subsection_name(&self) -> Option<&str> {
        self.subsection.as_deref()
    }

    /// The key used in computed output.
    #[must_use]
    pub fn output_name(&self) -> &str {
        self.computed_name.as_deref().unwrap_or(&self.name)
    }

    /// The configured diff mode.
    #[must_use]
    pub const fn mode(&self) -> DiffMode {
        self.diff_mode
    }

    /// Returns `true` if both props declare the same name, type, default,
    /// grouping and diff mode. Converters are not compared.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.name == other.name
            && self.path == other.path
            && self.value_type == other.value_type
            && self.no_value == other.no_value
            && self.subsection == other.subsection
            && self.computed_name == other.computed_name
            && self.diff_mode == other.diff_mode
    }

    /// Returns `true` if the prop has no default.
    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.no_value.is_none()
    }

    /// Fully qualified name, e.g. `widget.font.size`.
    #[must_use]
    pub fn fqn(&self) -> String {
        if self.path.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.path.join("."), self.name)
        }
    }

    /// Validates a supplied value, returning it coerced to the declared type.
    ///
    /// The default value itself is always accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingRequired`] for a `null` required prop and
    /// [`SchemaError::TypeMismatch`] when the type check fails.
    pub fn validate(&self, value: &Value) -> Result<Value, SchemaError> {
        if self.no_value.as_ref() == Some(value) {
            return Ok(value.clone());
        }
        let nullable = matches!(self.value_type, ValueType::Optional(_) | ValueType::Any);
        if value.is_null() && self.is_required() && !nullable {
            return Err(SchemaError::MissingRequired { path: self.fqn() });
        }
        self.value_type
            .check(value)
            .map_err(|reason| SchemaError::TypeMismatch {
                path: self.fqn(),
                reason,
            })
    }

    /// Resolves a supplied value (or the default) and applies the converter.
    #[must_use]
    pub fn compute(&self, value: Option<&Value>) -> Value {
        let resolved = value
            .or(self.no_value.as_ref())
            .cloned()
            .unwrap_or_default();
        match &self.converter {
            Some(converter) => converter.apply(resolved),
            None => resolved,
        }
    }

    /// Binds a value to this prop.
    #[must_use]
    pub fn to_value(&self, value: Option<Value>) -> crate::PropValueScalar {
        crate::PropValueScalar::new(Arc::new(self.clone()), value, None)
    }
}

impl fmt::Display for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} :: {})", self.fqn(), self.value_type)
    }
}
