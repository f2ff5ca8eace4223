//! The error type of a render root.

use reactk_core::{ExecuteError, ReconcileError, RenderError};
use thiserror::Error;

/// Everything that can go wrong while mounting or re-rendering.
#[derive(Debug, Error)]
pub enum Error {
    /// A component failed to render.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// The rendered tree could not be reconciled.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    /// The backend rejected an action.
    #[error(transparent)]
    Execute(#[from] ExecuteError),
    /// The configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// The configuration file could not be read.
    #[error("cannot read configuration: {0}")]
    Io(#[from] std::io::Error),
}
