//! Errors raised while rendering, reconciling and executing.

use alloc::boxed::Box;

use reactk_props::SchemaError;
use thiserror::Error;

use crate::trace::Uid;

/// Boxed error returned by a backend.
pub type BoxError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Raised while a component renders.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A node's props did not satisfy its schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A component gave up.
    #[error("component `{component}` failed: {message}")]
    Component {
        /// Type name of the component.
        component: String,
        /// What went wrong.
        message: String,
    },
}

/// Aborts a reconciliation pass before any action is returned.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Props failed validation or two vectors of different schemas met.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Two siblings share a uid.
    #[error("duplicate key `{uid}` under `{parent}`: {}", .nodes.join(" and "))]
    DuplicateKey {
        /// The shared uid.
        uid: Uid,
        /// Uid of their parent.
        parent: Uid,
        /// Descriptions of the conflicting nodes.
        nodes: Vec<String>,
    },
    /// An explicit key contains the uid separator.
    #[error("key `{key}` of `{uid}` contains `{}`", crate::trace::SEPARATOR)]
    InvalidKey {
        /// The offending key.
        key: String,
        /// Uid of the node whose trace holds the key.
        uid: Uid,
    },
    /// A compatibility classification could not be parsed.
    #[error("unknown compatibility `{0}`, expected update, replace or recreate")]
    UnknownCompatibility(String),
    /// A node's trace does not descend from its parent's.
    #[error("node `{uid}` is not a descendant of its parent `{parent}`")]
    MissingParent {
        /// Uid of the misplaced node.
        uid: Uid,
        /// Uid of the parent it was found under.
        parent: Uid,
    },
}

/// Aborts the execution of an action stream.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The backend failed to carry out an action.
    #[error("backend failed during {action}")]
    Backend {
        /// Description of the failing action.
        action: String,
        /// The backend's error.
        #[source]
        source: BoxError,
    },
    /// An action refers to a uid without a registered resource.
    #[error("no resource registered for `{0}`")]
    MissingResource(Uid),
    /// The executor thread is gone.
    #[error("executor thread disconnected")]
    Disconnected,
    /// The executor thread could not be started.
    #[error("failed to spawn the executor thread")]
    Spawn(#[from] std::io::Error),
}
