//! The reconciliation engine.
//!
//! [`reconcile`] walks the previous tree (through a [`NodeLookup`]) against a
//! freshly rendered top container and emits a flat, ordered list of
//! [`ReconcileAction`]s: depth first, every parent's action before its
//! children's.

use std::collections::{HashMap, HashSet};

use tracing::{debug, debug_span};

use crate::action::{Constructive, Create, ReconcileAction, Update};
use crate::error::ReconcileError;
use crate::lookup::{CompatibilityOracle, NodeLookup};
use crate::node::{Compatibility, ShadowNode};
use crate::trace::{FrameKey, SEPARATOR, Uid};

/// Checks that sibling uids are unique, that every node's trace descends
/// from its parent's and that no explicit key holds the uid separator.
///
/// # Errors
///
/// Returns [`ReconcileError::DuplicateKey`], [`ReconcileError::MissingParent`]
/// or [`ReconcileError::InvalidKey`] for the first offending node.
pub fn validate_tree(parent: &ShadowNode) -> Result<(), ReconcileError> {
    let mut seen: HashMap<&Uid, &ShadowNode> = HashMap::new();
    for child in parent.nodes() {
        if !parent.trace().is_ancestor_of(child.trace()) {
            return Err(ReconcileError::MissingParent {
                uid: child.uid().clone(),
                parent: parent.uid().clone(),
            });
        }
        // Frames contributed below the parent: the node's own and those of
        // keyed components in between.
        for frame in &child.trace().frames()[parent.trace().depth()..] {
            if let FrameKey::Explicit(key) = frame.key() {
                if key.contains(SEPARATOR) {
                    return Err(ReconcileError::InvalidKey {
                        key: key.clone(),
                        uid: child.uid().clone(),
                    });
                }
            }
        }
        if let Some(first) = seen.insert(child.uid(), child) {
            return Err(ReconcileError::DuplicateKey {
                uid: child.uid().clone(),
                parent: parent.uid().clone(),
                nodes: vec![first.describe(), child.describe()],
            });
        }
    }
    parent.nodes().iter().try_for_each(validate_tree)
}

/// Computes the actions that turn the previously committed tree into `top`.
///
/// `top` must be the synthetic top container (see [`ShadowNode::top`]).
///
/// # Errors
///
/// Fails before returning any action if the tree has duplicate sibling uids,
/// a node outside its parent's trace, or props that cannot be diffed.
pub fn reconcile(
    previous: &dyn NodeLookup,
    oracle: &dyn CompatibilityOracle,
    top: &ShadowNode,
) -> Result<Vec<ReconcileAction>, ReconcileError> {
    let span = debug_span!("reconcile", top = %top.uid());
    let _guard = span.enter();

    validate_tree(top)?;
    let mut retained = HashSet::new();
    top.walk(&mut |node| {
        retained.insert(node.uid().clone());
    });
    let mut pass = Pass {
        previous,
        oracle,
        retained,
        placed: HashSet::new(),
        actions: Vec::new(),
    };
    pass.placed.insert(top.uid().clone());
    pass.children(top, false)?;
    debug!(actions = pass.actions.len(), "reconciled");
    Ok(pass.actions)
}

struct Pass<'a> {
    previous: &'a dyn NodeLookup,
    oracle: &'a dyn CompatibilityOracle,
    retained: HashSet<Uid>,
    placed: HashSet<Uid>,
    actions: Vec<ReconcileAction>,
}

impl Pass<'_> {
    fn children(&mut self, parent: &ShadowNode, fresh: bool) -> Result<(), ReconcileError> {
        let container = parent.uid();
        if fresh {
            for (at, next) in parent.nodes().iter().enumerate() {
                self.placed.insert(next.uid().clone());
                self.actions.push(ReconcileAction::Place {
                    container: container.clone(),
                    at,
                    what: Constructive::Create(create(container, next)),
                });
                self.children(next, true)?;
            }
            return Ok(());
        }

        let mut before: Vec<ShadowNode> = self
            .previous
            .previous(container)
            .map(|node| node.nodes().to_vec())
            .unwrap_or_default();
        // Children gone from the whole tree leave first, so that survivors
        // keep pairing with themselves.
        before.retain(|prev| {
            let keep = self.retained.contains(prev.uid());
            if !keep {
                self.actions.push(ReconcileAction::Unplace {
                    existing: prev.uid().clone(),
                    container: container.clone(),
                });
            }
            keep
        });
        let after = parent.nodes();

        for at in 0..before.len().max(after.len()) {
            // A previous child already placed elsewhere this pass no longer
            // occupies its old position.
            let prev = before
                .get(at)
                .filter(|prev| !self.placed.contains(prev.uid()));
            let next = after.get(at);

            let action = match (prev, next) {
                (_, None) => {
                    if let Some(prev) = prev {
                        self.actions.push(ReconcileAction::Unplace {
                            existing: prev.uid().clone(),
                            container: container.clone(),
                        });
                    }
                    continue;
                }
                (None, Some(next)) => Some(ReconcileAction::Place {
                    container: container.clone(),
                    at,
                    what: self.constructive(container, next)?,
                }),
                (Some(prev), Some(next)) if prev.uid() == next.uid() => {
                    match self.oracle.classify(prev, next) {
                        Compatibility::Update => {
                            let diff = prev.props().diff(next.props())?;
                            (!diff.is_empty()).then(|| {
                                ReconcileAction::Update(Update {
                                    existing: prev.uid().clone(),
                                    node: next.clone(),
                                    diff,
                                })
                            })
                        }
                        Compatibility::Replace | Compatibility::Recreate => {
                            Some(ReconcileAction::Replace {
                                container: container.clone(),
                                existing: prev.uid().clone(),
                                at,
                                with: Constructive::Update(Update {
                                    existing: next.uid().clone(),
                                    node: next.clone(),
                                    diff: next.props().full_diff(),
                                }),
                            })
                        }
                    }
                }
                (Some(prev), Some(next)) => Some(ReconcileAction::Replace {
                    container: container.clone(),
                    existing: prev.uid().clone(),
                    at,
                    with: self.constructive(container, next)?,
                }),
            };

            let Some(next) = next else { continue };
            self.placed.insert(next.uid().clone());
            let fresh = action.as_ref().is_some_and(ReconcileAction::is_creating_new);
            if let Some(action) = action {
                debug!(%action, "emit");
                self.actions.push(action);
            }
            let had_children = !fresh
                && self
                    .previous
                    .previous(next.uid())
                    .is_some_and(ShadowNode::has_children);
            if next.has_children() || had_children {
                self.children(next, fresh)?;
            }
        }
        Ok(())
    }

    /// Reuses the registered resource for `next` when one exists and is
    /// compatible, else builds a new one.
    fn constructive(
        &self,
        container: &Uid,
        next: &ShadowNode,
    ) -> Result<Constructive, ReconcileError> {
        if let Some(existing) = self.previous.previous(next.uid()) {
            if self.oracle.classify(existing, next) == Compatibility::Update {
                return Ok(Constructive::Update(Update {
                    existing: next.uid().clone(),
                    node: next.clone(),
                    diff: existing.props().diff(next.props())?,
                }));
            }
        }
        Ok(Constructive::Create(create(container, next)))
    }
}

fn create(container: &Uid, node: &ShadowNode) -> Create {
    Create {
        node: node.clone(),
        container: container.clone(),
        props: node.props().full_diff(),
    }
}
