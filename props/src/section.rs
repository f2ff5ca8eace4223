//! Prop sections: ordered, nested schemas.
//!
//! A [`PropSection`] is built with a fluent API and is immutable once shared:
//!
//! ```
//! use reactk_props::{DiffMode, Prop, PropSection, ValueType};
//!
//! let font = PropSection::new("font")
//!     .diff_mode(DiffMode::Simple)
//!     .prop(Prop::new("family", ValueType::Str))
//!     .prop(Prop::new("size", ValueType::Int));
//!
//! let label = PropSection::new("label")
//!     .prop(Prop::new("text", ValueType::Str).default("").subsection("configure"))
//!     .section(font);
//!
//! assert_eq!(label.len(), 2);
//! ```

use alloc::sync::Arc;
use core::fmt;

use indexmap::IndexMap;

use crate::error::SchemaError;
use crate::prop::{DiffMode, Prop};
use crate::value::{Value, ValueMap};

/// An entry of a [`PropSection`].
#[derive(Debug, Clone)]
pub enum PropEntry {
    /// A leaf.
    Prop(Arc<Prop>),
    /// A nested section.
    Section(Arc<PropSection>),
}

impl PropEntry {
    /// The entry's input key.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Prop(prop) => prop.name(),
            Self::Section(section) => section.name(),
        }
    }

    /// Returns `true` if a mapping must supply this entry.
    #[must_use]
    pub fn is_required(&self) -> bool {
        match self {
            Self::Prop(prop) => prop.is_required(),
            Self::Section(section) => section.is_required(),
        }
    }

    /// Fully qualified name of the entry.
    #[must_use]
    pub fn fqn(&self) -> String {
        match self {
            Self::Prop(prop) => prop.fqn(),
            Self::Section(section) => section.fqn(),
        }
    }

    fn rebase(&mut self, path: &[String]) {
        match self {
            Self::Prop(prop) => Arc::make_mut(prop).rebase(path),
            Self::Section(section) => Arc::make_mut(section).rebase(path),
        }
    }
}

/// An ordered, named collection of props and nested sections.
#[derive(Debug, Clone)]
pub struct PropSection {
    name: String,
    path: Vec<String>,
    diff_mode: DiffMode,
    computed_name: Option<String>,
    entries: IndexMap<String, PropEntry>,
}

impl PropSection {
    /// Creates an empty section.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: Vec::new(),
            diff_mode: DiffMode::Recursive,
            computed_name: None,
            entries: IndexMap::new(),
        }
    }

    /// Adds (or replaces) a leaf prop.
    #[must_use]
    pub fn prop(self, prop: Prop) -> Self {
        self.entry(PropEntry::Prop(Arc::new(prop)))
    }

    /// Adds (or replaces) a nested section.
    #[must_use]
    pub fn section(self, section: Self) -> Self {
        self.entry(PropEntry::Section(Arc::new(section)))
    }

    /// Sets how this section is diffed when nested in another one.
    #[must_use]
    pub const fn diff_mode(mut self, mode: DiffMode) -> Self {
        self.diff_mode = mode;
        self
    }

    /// Renames the key this section is computed to.
    #[must_use]
    pub fn computed_name(mut self, name: impl Into<String>) -> Self {
        self.computed_name = Some(name.into());
        self
    }

    fn entry(mut self, mut entry: PropEntry) -> Self {
        entry.rebase(&self.child_path());
        self.entries.insert(entry.name().to_owned(), entry);
        self
    }

    fn child_path(&self) -> Vec<String> {
        let mut path = self.path.clone();
        path.push(self.name.clone());
        path
    }

    fn rebase(&mut self, path: &[String]) {
        self.path = path.to_vec();
        let child_path = self.child_path();
        for entry in self.entries.values_mut() {
            entry.rebase(&child_path);
        }
    }

    /// The section's name, which is also its input key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
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

    /// Fully qualified name, e.g. `widget.font`.
    #[must_use]
    pub fn fqn(&self) -> String {
        self.child_path().join(".")
    }

    /// Looks up an entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropEntry> {
        self.entries.get(key)
    }

    /// Returns `true` if the section declares `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &PropEntry> {
        self.entries.values()
    }

    /// Number of direct entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the section has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if both sections declare the same entries, in the same
    /// order and with the same shapes.
    #[must_use]
    pub fn same_shape(&self, other: &Self) -> bool {
        self.name == other.name
            && self.path == other.path
            && self.diff_mode == other.diff_mode
            && self.computed_name == other.computed_name
            && self.len() == other.len()
            && self.iter().zip(other.iter()).all(|pair| match pair {
                (PropEntry::Prop(a), PropEntry::Prop(b)) => Arc::ptr_eq(a, b) || a.same_shape(b),
                (PropEntry::Section(a), PropEntry::Section(b)) => {
                    Arc::ptr_eq(a, b) || a.same_shape(b)
                }
                _ => false,
            })
    }

    /// A section is required when it is non-empty and every entry is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        !self.is_empty() && self.iter().all(PropEntry::is_required)
    }

    /// Validates a mapping against this schema, returning it with leaf values
    /// coerced to their declared types.
    ///
    /// # Errors
    ///
    /// Fails if a required entry is missing, a leaf fails its type check, a
    /// nested section is given a non-mapping, or the mapping has keys this
    /// schema does not declare.
    pub fn validate(&self, values: &ValueMap) -> Result<ValueMap, SchemaError> {
        let mut unknown: Vec<String> = values
            .keys()
            .filter(|key| !self.contains(key))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(SchemaError::UnknownKeys {
                path: self.fqn(),
                keys: unknown,
            });
        }

        let mut validated = ValueMap::new();
        for entry in self.iter() {
            let Some(value) = values.get(entry.name()) else {
                if entry.is_required() {
                    return Err(SchemaError::MissingRequired { path: entry.fqn() });
                }
                continue;
            };
            let checked = match entry {
                PropEntry::Prop(prop) => prop.validate(value)?,
                PropEntry::Section(section) => match value {
                    Value::Map(inner) => Value::Map(section.validate(inner)?),
                    other => {
                        return Err(SchemaError::NotAMapping {
                            path: section.fqn(),
                            found: other.kind(),
                        });
                    }
                },
            };
            validated.insert(entry.name().to_owned(), checked);
        }
        Ok(validated)
    }

    /// Structurally merges `other` into this schema.
    ///
    /// Keys are united; sections present on both sides are merged
    /// recursively and a prop from `other` replaces a prop at the same key.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Conflict`] when a prop meets a section.
    pub fn merge(&self, other: &Self) -> Result<Self, SchemaError> {
        let mut merged = self.clone();
        for (key, theirs) in &other.entries {
            let next = match (merged.entries.get(key), theirs) {
                (Some(PropEntry::Section(ours)), PropEntry::Section(theirs)) => {
                    PropEntry::Section(Arc::new(ours.merge(theirs)?))
                }
                (None | Some(PropEntry::Prop(_)), PropEntry::Prop(_)) | (None, PropEntry::Section(_)) => {
                    theirs.clone()
                }
                (Some(ours), _) => {
                    return Err(SchemaError::Conflict { path: ours.fqn() });
                }
            };
            merged = merged.entry(next);
        }
        Ok(merged)
    }
}

impl fmt::Display for PropSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:", self.fqn())?;
        for entry in self.iter() {
            write!(f, " {}", entry.name())?;
        }
        f.write_str("]")
    }
}
