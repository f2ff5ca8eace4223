//! Shadow nodes, identity, reconciliation and execution for reactk.
//!
//! A pass flows through this crate in four steps:
//!
//! 1. a [`Component`] renders into a [`RenderSink`], yielding [`ShadowNode`]s
//!    that are stamped with trace-derived [`Uid`]s;
//! 2. [`reconcile`] compares the new top container against the previously
//!    committed nodes (any [`NodeLookup`]) and emits [`ReconcileAction`]s;
//! 3. an [`ActionExecutor`] applies them through a [`Backend`];
//! 4. the executor commits the new tree for the next pass.

extern crate alloc;

pub mod action;
pub mod backend;
mod context;
mod error;
pub mod executor;
mod lookup;
mod node;
pub mod reconcile;
mod render;
#[cfg(test)]
mod testing;
mod threaded;
pub mod trace;

pub use action::{Constructive, Create, ReconcileAction, Update};
pub use backend::Backend;
pub use context::Context;
pub use error::{BoxError, ExecuteError, ReconcileError, RenderError};
pub use executor::{ActionExecutor, Executor, ResourceEntry, ResourceMap};
pub use lookup::{CompatibilityOracle, KindOracle, NodeLookup, TreeIndex};
pub use node::{
    Compatibility, NodeKind, NodeType, ShadowNode, assign_identities, default_compatibility,
};
pub use reconcile::{reconcile, validate_tree};
pub use render::{Component, Keyed, RenderSink, render_root};
pub use threaded::ThreadedExecutor;
pub use trace::{FrameCounter, FrameKey, RenderFrame, RenderTrace, SourceSite, Uid};
