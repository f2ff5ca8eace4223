//! Concrete values bound to schemas: compute, update and diff.

use alloc::sync::Arc;
use core::fmt;

use crate::error::SchemaError;
use crate::prop::Prop;
use crate::section::{PropEntry, PropSection};
use crate::value::{Value, ValueMap, deep_merge};

/// A leaf prop bound to a concrete value.
#[derive(Debug, Clone)]
pub struct PropValueScalar {
    prop: Arc<Prop>,
    value: Option<Value>,
    old: Option<Value>,
}

impl PropValueScalar {
    /// Binds `value` (and the value it replaced, if any) to `prop`.
    #[must_use]
    pub const fn new(prop: Arc<Prop>, value: Option<Value>, old: Option<Value>) -> Self {
        Self { prop, value, old }
    }

    /// The bound prop.
    #[must_use]
    pub fn prop(&self) -> &Prop {
        &self.prop
    }

    /// The supplied value, if one was given.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The value this one replaced.
    #[must_use]
    pub const fn old(&self) -> Option<&Value> {
        self.old.as_ref()
    }

    /// Returns `true` if no value was supplied.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        self.value.is_none()
    }

    /// The supplied value, or the default.
    #[must_use]
    pub fn resolved(&self) -> Value {
        resolve_prop(&self.prop, self.value.as_ref()).unwrap_or_default()
    }

    /// Resolves the value and applies the converter.
    #[must_use]
    pub fn compute(&self) -> Value {
        self.prop.compute(self.value.as_ref())
    }

    /// Returns a new scalar holding `value`, remembering the current one as old.
    #[must_use]
    pub fn update(&self, value: Value) -> Self {
        Self::new(self.prop.clone(), Some(value), self.value.clone())
    }
}

impl PartialEq for PropValueScalar {
    fn eq(&self, other: &Self) -> bool {
        self.prop.fqn() == other.prop.fqn() && self.resolved() == other.resolved()
    }
}

impl fmt::Display for PropValueScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} -> {})", self.prop.fqn(), self.resolved())
    }
}

/// One wrapped entry of a [`PropValueVector`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropValueEntry {
    /// A leaf value.
    Scalar(PropValueScalar),
    /// Values of a nested section.
    Vector(PropValueVector),
}

/// A [`PropSection`] bound to a validated mapping of values.
#[derive(Debug, Clone)]
pub struct PropValueVector {
    schema: Arc<PropSection>,
    values: ValueMap,
    old: Option<ValueMap>,
}

impl PropValueVector {
    /// Validates `values` against `schema` and binds them.
    ///
    /// # Errors
    ///
    /// Returns the [`SchemaError`] raised by [`PropSection::validate`].
    pub fn new(schema: Arc<PropSection>, values: &ValueMap) -> Result<Self, SchemaError> {
        let values = schema.validate(values)?;
        Ok(Self {
            schema,
            values,
            old: None,
        })
    }

    /// Binds an empty mapping; fails if the schema has required entries.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::MissingRequired`] for the first required entry.
    pub fn empty(schema: Arc<PropSection>) -> Result<Self, SchemaError> {
        Self::new(schema, &ValueMap::new())
    }

    /// The bound schema.
    #[must_use]
    pub const fn schema(&self) -> &Arc<PropSection> {
        &self.schema
    }

    /// The validated input values, without defaults.
    #[must_use]
    pub const fn values(&self) -> &ValueMap {
        &self.values
    }

    /// The values this vector was updated from, if any.
    #[must_use]
    pub const fn old(&self) -> Option<&ValueMap> {
        self.old.as_ref()
    }

    /// Wraps the entry at `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<PropValueEntry> {
        self.schema.get(key).map(|entry| self.wrap(entry))
    }

    /// Iterates wrapped entries in schema order.
    pub fn iter(&self) -> impl Iterator<Item = PropValueEntry> + '_ {
        self.schema.iter().map(|entry| self.wrap(entry))
    }

    fn wrap(&self, entry: &PropEntry) -> PropValueEntry {
        let name = entry.name();
        let old = self.old.as_ref().and_then(|old| old.get(name));
        match entry {
            PropEntry::Prop(prop) => PropValueEntry::Scalar(PropValueScalar::new(
                prop.clone(),
                self.values.get(name).cloned(),
                old.cloned(),
            )),
            PropEntry::Section(section) => PropValueEntry::Vector(Self {
                schema: section.clone(),
                values: self
                    .values
                    .get(name)
                    .and_then(Value::as_map)
                    .cloned()
                    .unwrap_or_default(),
                old: old.and_then(Value::as_map).cloned(),
            }),
        }
    }

    /// Computes the output mapping: defaults resolved, converters applied,
    /// leaves grouped under their subsections and keyed by computed names.
    #[must_use]
    pub fn compute(&self) -> ValueMap {
        compute_section(&self.schema, &self.values)
    }

    /// The input values with every default filled in, before conversion.
    #[must_use]
    pub fn resolved(&self) -> ValueMap {
        resolve_section(&self.schema, &self.values)
    }

    /// Returns a new vector with `overrides` deep-merged over the current
    /// values. The current values become the new vector's old values.
    ///
    /// # Errors
    ///
    /// Fails if the merged mapping does not validate.
    pub fn update(&self, overrides: &ValueMap) -> Result<Self, SchemaError> {
        let merged = merge_section(&self.schema, &self.values, overrides);
        let values = self.schema.validate(&merged)?;
        Ok(Self {
            schema: self.schema.clone(),
            values,
            old: Some(self.values.clone()),
        })
    }

    /// Computes the sparse difference from `self` to `other`.
    ///
    /// Leaves are compared by resolved value. Sections in recursive mode are
    /// compared entry by entry; other sections are compared by computed
    /// output and, when different, reported whole.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::SchemaMismatch`] if `other` is bound to a
    /// schema of a different shape.
    pub fn diff(&self, other: &Self) -> Result<PropDiff, SchemaError> {
        if !Arc::ptr_eq(&self.schema, &other.schema) && !self.schema.same_shape(&other.schema) {
            return Err(SchemaError::SchemaMismatch {
                left: self.schema.fqn(),
                right: other.schema.fqn(),
            });
        }
        let changes = diff_section(&self.schema, &self.values, &other.values);
        tracing::trace!(schema = %self.schema.fqn(), changed = changes.len(), "diffed props");
        Ok(PropDiff {
            schema: other.schema.clone(),
            changes,
        })
    }

    /// Validates `values` against this schema and diffs against them.
    ///
    /// # Errors
    ///
    /// Fails if `values` does not validate.
    pub fn diff_values(&self, values: &ValueMap) -> Result<PropDiff, SchemaError> {
        self.diff(&Self::new(self.schema.clone(), values)?)
    }

    /// A diff that sets every value of this vector, as used when a resource
    /// is first created.
    #[must_use]
    pub fn full_diff(&self) -> PropDiff {
        PropDiff {
            schema: self.schema.clone(),
            changes: self.resolved(),
        }
    }
}

impl PartialEq for PropValueVector {
    fn eq(&self, other: &Self) -> bool {
        self.schema.fqn() == other.schema.fqn() && self.resolved() == other.resolved()
    }
}

impl fmt::Display for PropValueVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: {}>", self.schema.fqn(), Value::Map(self.resolved()))
    }
}

/// A sparse set of prop changes.
///
/// [`changes`](Self::changes) is in input key space and can be fed back to
/// [`PropValueVector::update`]; [`compute`](Self::compute) produces the
/// sparse output mapping a backend applies.
#[derive(Debug, Clone)]
pub struct PropDiff {
    schema: Arc<PropSection>,
    changes: ValueMap,
}

impl PropDiff {
    /// The schema the changes refer to.
    #[must_use]
    pub const fn schema(&self) -> &Arc<PropSection> {
        &self.schema
    }

    /// The changed input values.
    #[must_use]
    pub const fn changes(&self) -> &ValueMap {
        &self.changes
    }

    /// Returns `true` if nothing changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Returns `true` if the top-level key `key` changed.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.changes.contains_key(key)
    }

    /// Computes the sparse output mapping of the changes.
    #[must_use]
    pub fn compute(&self) -> ValueMap {
        compute_sparse(&self.schema, &self.changes)
    }
}

impl PartialEq for PropDiff {
    fn eq(&self, other: &Self) -> bool {
        self.schema.fqn() == other.schema.fqn() && self.changes == other.changes
    }
}

impl fmt::Display for PropDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Map(self.changes.clone()))
    }
}

fn resolve_prop(prop: &Prop, value: Option<&Value>) -> Option<Value> {
    value.or_else(|| prop.no_value()).cloned()
}

/// Like [`deep_merge`], except that sections diffed wholesale are replaced
/// rather than merged, and keys the schema does not declare are merged
/// plainly so that validation can reject them.
fn merge_section(schema: &PropSection, base: &ValueMap, overrides: &ValueMap) -> ValueMap {
    let mut merged = base.clone();
    for (key, value) in overrides {
        let next = match (schema.get(key), merged.get(key), value) {
            (Some(PropEntry::Section(section)), Some(Value::Map(left)), Value::Map(right)) => {
                if section.mode().is_recursive() {
                    Value::Map(merge_section(section, left, right))
                } else {
                    value.clone()
                }
            }
            (None, Some(Value::Map(left)), Value::Map(right)) => {
                Value::Map(deep_merge(left, right))
            }
            _ => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}

fn nested<'a>(values: &'a ValueMap, key: &str) -> Option<&'a ValueMap> {
    values.get(key).and_then(Value::as_map)
}

fn insert_output(out: &mut ValueMap, subsection: Option<&str>, key: &str, value: Value) {
    match subsection {
        None => {
            let merged = match (out.remove(key), value) {
                (Some(Value::Map(existing)), Value::Map(incoming)) => {
                    Value::Map(deep_merge(&existing, &incoming))
                }
                (_, value) => value,
            };
            out.insert(key.to_owned(), merged);
        }
        Some(bucket) => {
            let mut section = match out.remove(bucket) {
                Some(Value::Map(map)) => map,
                _ => ValueMap::new(),
            };
            section.insert(key.to_owned(), value);
            out.insert(bucket.to_owned(), Value::Map(section));
        }
    }
}

fn compute_section(schema: &PropSection, values: &ValueMap) -> ValueMap {
    let empty = ValueMap::new();
    let mut out = ValueMap::new();
    for entry in schema.iter() {
        match entry {
            PropEntry::Prop(prop) => insert_output(
                &mut out,
                prop.subsection_name(),
                prop.output_name(),
                prop.compute(values.get(prop.name())),
            ),
            PropEntry::Section(section) => {
                let inner = nested(values, section.name()).unwrap_or(&empty);
                let computed = compute_section(section, inner);
                insert_output(&mut out, None, section.output_name(), Value::Map(computed));
            }
        }
    }
    out
}

fn compute_sparse(schema: &PropSection, changes: &ValueMap) -> ValueMap {
    let mut out = ValueMap::new();
    for entry in schema.iter() {
        match entry {
            PropEntry::Prop(prop) => {
                if let Some(value) = changes.get(prop.name()) {
                    insert_output(
                        &mut out,
                        prop.subsection_name(),
                        prop.output_name(),
                        prop.compute(Some(value)),
                    );
                }
            }
            PropEntry::Section(section) => {
                if let Some(inner) = nested(changes, section.name()) {
                    let computed = if section.mode().is_recursive() {
                        compute_sparse(section, inner)
                    } else {
                        compute_section(section, inner)
                    };
                    insert_output(&mut out, None, section.output_name(), Value::Map(computed));
                }
            }
        }
    }
    out
}

fn resolve_section(schema: &PropSection, values: &ValueMap) -> ValueMap {
    let empty = ValueMap::new();
    let mut out = ValueMap::new();
    for entry in schema.iter() {
        match entry {
            PropEntry::Prop(prop) => {
                if let Some(value) = resolve_prop(prop, values.get(prop.name())) {
                    out.insert(prop.name().to_owned(), value);
                }
            }
            PropEntry::Section(section) => {
                let inner = nested(values, section.name()).unwrap_or(&empty);
                out.insert(
                    section.name().to_owned(),
                    Value::Map(resolve_section(section, inner)),
                );
            }
        }
    }
    out
}

fn diff_section(schema: &PropSection, mine: &ValueMap, theirs: &ValueMap) -> ValueMap {
    let empty = ValueMap::new();
    let mut out = ValueMap::new();
    for entry in schema.iter() {
        match entry {
            PropEntry::Prop(prop) => {
                let before = resolve_prop(prop, mine.get(prop.name()));
                let after = resolve_prop(prop, theirs.get(prop.name()));
                if before != after {
                    out.insert(prop.name().to_owned(), after.unwrap_or_default());
                }
            }
            PropEntry::Section(section) => {
                let before = nested(mine, section.name()).unwrap_or(&empty);
                let after = nested(theirs, section.name()).unwrap_or(&empty);
                if section.mode().is_recursive() {
                    let inner = diff_section(section, before, after);
                    if !inner.is_empty() {
                        out.insert(section.name().to_owned(), Value::Map(inner));
                    }
                } else if compute_section(section, before) != compute_section(section, after) {
                    out.insert(
                        section.name().to_owned(),
                        Value::Map(resolve_section(section, after)),
                    );
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests;
