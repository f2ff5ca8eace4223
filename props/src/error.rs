//! Schema validation errors.

use thiserror::Error;

/// Raised when a value mapping does not satisfy its schema, or when two
/// schemas cannot be combined.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A required prop (or a section made only of required props) is absent.
    #[error("missing required prop `{path}`")]
    MissingRequired {
        /// Fully qualified name of the missing entry.
        path: String,
    },
    /// A leaf value failed its type check.
    #[error("type check failed for `{path}`: {reason}")]
    TypeMismatch {
        /// Fully qualified name of the offending prop.
        path: String,
        /// Human readable mismatch description.
        reason: String,
    },
    /// A section was given something other than a mapping.
    #[error("value for section `{path}` must be a mapping, got {found}")]
    NotAMapping {
        /// Fully qualified name of the section.
        path: String,
        /// Kind of the value that was supplied.
        found: &'static str,
    },
    /// The mapping contains keys the schema does not declare.
    #[error("unknown props {} in `{path}`", .keys.join(", "))]
    UnknownKeys {
        /// Fully qualified name of the section.
        path: String,
        /// The undeclared keys, sorted.
        keys: Vec<String>,
    },
    /// A prop and a section were merged at the same key.
    #[error("cannot merge a prop with a section at `{path}`")]
    Conflict {
        /// Fully qualified name of the conflicting key.
        path: String,
    },
    /// Two value vectors over different schemas were diffed.
    #[error("cannot diff `{left}` against values of schema `{right}`")]
    SchemaMismatch {
        /// Name of the receiving schema.
        left: String,
        /// Name of the other schema.
        right: String,
    },
}
