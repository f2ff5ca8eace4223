//! Typed, nested prop schemas and the values bound to them.
//!
//! A [`PropSection`] declares which props a node kind accepts. Binding a
//! mapping of [`Value`]s to a section yields a [`PropValueVector`], which
//! can be computed into the mapping a backend consumes, updated with
//! overrides, and diffed against another vector into a sparse [`PropDiff`].

extern crate alloc;

mod error;
mod prop;
mod section;
mod value;
mod values;

pub use error::SchemaError;
pub use prop::{Converter, DiffMode, Prop, ValueType};
pub use section::{PropEntry, PropSection};
pub use value::{Value, ValueMap, deep_merge};
pub use values::{PropDiff, PropValueEntry, PropValueScalar, PropValueVector};
