//! Applying action streams to a backend.

use std::collections::{HashMap, HashSet};

use tracing::{debug, error, info, info_span, warn};

use crate::action::{Constructive, Create, ReconcileAction, Update};
use crate::backend::Backend;
use crate::error::ExecuteError;
use crate::lookup::{CompatibilityOracle, NodeLookup, TreeIndex};
use crate::node::{Compatibility, ShadowNode};
use crate::trace::Uid;

/// Consumes the actions of a pass and remembers what it built.
pub trait ActionExecutor: NodeLookup + CompatibilityOracle + core::fmt::Debug {
    /// Applies `actions`, which were computed for the tree `top`.
    ///
    /// # Errors
    ///
    /// The first failure abandons the rest of the pass.
    fn apply(
        &mut self,
        actions: Vec<ReconcileAction>,
        top: &ShadowNode,
    ) -> Result<(), ExecuteError>;
}

impl<T: ActionExecutor + ?Sized> ActionExecutor for Box<T> {
    fn apply(
        &mut self,
        actions: Vec<ReconcileAction>,
        top: &ShadowNode,
    ) -> Result<(), ExecuteError> {
        (**self).apply(actions, top)
    }
}

/// A live resource and the node it was last synchronized with.
#[derive(Debug, Clone)]
pub struct ResourceEntry<R> {
    resource: R,
    node: ShadowNode,
}

impl<R> ResourceEntry<R> {
    /// The live resource.
    pub const fn resource(&self) -> &R {
        &self.resource
    }

    /// The node the resource describes.
    pub const fn node(&self) -> &ShadowNode {
        &self.node
    }
}

/// Resources by uid, persisted between passes.
#[derive(Debug, Clone)]
pub struct ResourceMap<R> {
    root: R,
    top: Option<ShadowNode>,
    entries: HashMap<Uid, ResourceEntry<R>>,
}

impl<R: Clone> ResourceMap<R> {
    /// A map holding only the top container's resource.
    pub fn new(root: R) -> Self {
        Self {
            root,
            top: None,
            entries: HashMap::new(),
        }
    }

    /// The entry registered for `uid`.
    #[must_use]
    pub fn get(&self, uid: &Uid) -> Option<&ResourceEntry<R>> {
        self.entries.get(uid)
    }

    /// The resource for `uid`, including the top container.
    ///
    /// # Errors
    ///
    /// Returns [`ExecuteError::MissingResource`] for an unknown uid.
    pub fn resource(&self, uid: &Uid) -> Result<R, ExecuteError> {
        if uid.is_top() {
            return Ok(self.root.clone());
        }
        self.entries
            .get(uid)
            .map(|entry| entry.resource.clone())
            .ok_or_else(|| ExecuteError::MissingResource(uid.clone()))
    }

    /// Number of registered resources, not counting the top container.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing besides the top container is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates registered entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&Uid, &ResourceEntry<R>)> {
        self.entries.iter()
    }

    /// The registered nodes, detached from their resources.
    #[must_use]
    pub fn snapshot(&self) -> TreeIndex {
        self.top
            .iter()
            .cloned()
            .chain(self.entries.values().map(|entry| entry.node.clone()))
            .collect()
    }

    /// Registers `resource` for `node`, returning the resource it displaced.
    fn insert(&mut self, node: ShadowNode, resource: R) -> Option<R> {
        self.entries
            .insert(node.uid().clone(), ResourceEntry { resource, node })
            .map(|previous| previous.resource)
    }
}

impl<R> NodeLookup for ResourceMap<R> {
    fn previous(&self, uid: &Uid) -> Option<&ShadowNode> {
        if uid.is_top() {
            return self.top.as_ref();
        }
        self.entries.get(uid).map(|entry| &entry.node)
    }
}

/// Executes actions on a backend owned by the current thread.
#[derive(Debug)]
pub struct Executor<B: Backend> {
    backend: B,
    resources: ResourceMap<B::Resource>,
    retained: HashSet<Uid>,
    displaced: Vec<(Uid, B::Resource)>,
    created: Vec<Uid>,
}

impl<B: Backend> Executor<B> {
    /// Wraps `backend`; nothing is registered yet.
    pub fn new(backend: B) -> Self {
        let resources = ResourceMap::new(backend.root());
        Self {
            backend,
            resources,
            retained: HashSet::new(),
            displaced: Vec::new(),
            created: Vec::new(),
        }
    }

    /// The backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// The backend, mutably.
    pub const fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The registered resources.
    pub const fn resources(&self) -> &ResourceMap<B::Resource> {
        &self.resources
    }

    /// Starts a pass whose final tree is `top`.
    pub fn begin(&mut self, top: &ShadowNode) {
        self.retained.clear();
        self.displaced.clear();
        self.created.clear();
        top.walk(&mut |node| {
            self.retained.insert(node.uid().clone());
        });
    }

    /// Executes one action.
    ///
    /// # Errors
    ///
    /// Fails if the backend fails or the action names an unknown resource.
    pub fn execute(&mut self, action: &ReconcileAction) -> Result<(), ExecuteError> {
        debug!(%action, "execute");
        match action {
            ReconcileAction::Create(create) => {
                self.create(action, create)?;
            }
            ReconcileAction::Update(update) => {
                self.update(action, update)?;
            }
            ReconcileAction::Place {
                container,
                at,
                what,
            } => {
                let resource = self.constructive(action, what)?;
                let container = self.resources.resource(container)?;
                let result = self.backend.place(&resource, &container, what.diff(), *at);
                check(action, result)?;
            }
            ReconcileAction::Unplace { existing, .. } => {
                let resource = self.resources.resource(existing)?;
                check(action, self.backend.unplace(&resource))?;
            }
            ReconcileAction::Replace {
                container,
                existing,
                with,
                ..
            } => {
                let old = self.resources.resource(existing)?;
                match with {
                    Constructive::Update(update) if update.existing == *existing => {
                        self.rebuild(action, container, &old, update)?;
                    }
                    _ => {
                        let replacement = self.constructive(action, with)?;
                        let result = self.backend.replace(&old, &replacement, with.diff());
                        check(action, result)?;
                        if !self.retained.contains(existing) {
                            check(action, self.backend.destroy(&old))?;
                            self.resources.entries.remove(existing);
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Ends the pass: destroys resources that left the tree and re-snapshots
    /// every entry's node from `top`.
    ///
    /// # Errors
    ///
    /// Fails if the backend cannot destroy a resource.
    pub fn finish(&mut self, top: &ShadowNode) -> Result<(), ExecuteError> {
        let gone: Vec<Uid> = self
            .resources
            .entries
            .keys()
            .filter(|uid| !self.retained.contains(*uid))
            .cloned()
            .collect();
        let mut destroyed = 0_usize;
        for uid in gone {
            if let Some(entry) = self.resources.entries.remove(&uid) {
                warn!(%uid, "destroying resource that left the tree");
                self.destroy(&uid, &entry.resource)?;
                destroyed += 1;
            }
        }
        for (uid, resource) in core::mem::take(&mut self.displaced) {
            debug!(%uid, "destroying displaced resource");
            self.destroy(&uid, &resource)?;
            destroyed += 1;
        }

        let entries = &mut self.resources.entries;
        top.walk(&mut |node| {
            if let Some(entry) = entries.get_mut(node.uid()) {
                entry.node = node.clone();
            }
        });
        self.resources.top = Some(top.clone());
        self.retained.clear();
        self.created.clear();
        info!(resources = self.resources.len(), destroyed, "pass committed");
        Ok(())
    }

    /// Ends a pass abandoned after a failed action.
    ///
    /// Resources displaced by the pass are destroyed. Every other entry keeps
    /// the node of the last committed pass, so the next pass diffs against
    /// what the backend is known to hold and retries whatever did not run.
    /// Nodes created by the abandoned pass are remembered without children,
    /// which makes the next pass place each of their children again.
    ///
    /// # Errors
    ///
    /// Fails if the backend cannot destroy a displaced resource.
    pub fn abort(&mut self) -> Result<(), ExecuteError> {
        for uid in core::mem::take(&mut self.created) {
            if let Some(entry) = self.resources.entries.get_mut(&uid) {
                entry.node.set_children(Vec::new());
            }
        }
        self.retained.clear();
        let displaced = core::mem::take(&mut self.displaced);
        warn!(displaced = displaced.len(), "pass abandoned");
        for (uid, resource) in displaced {
            self.destroy(&uid, &resource)?;
        }
        Ok(())
    }

    fn destroy(&mut self, uid: &Uid, resource: &B::Resource) -> Result<(), ExecuteError> {
        self.backend
            .destroy(resource)
            .map_err(|source| ExecuteError::Backend {
                action: format!("destroy {uid}"),
                source: Box::new(source),
            })
    }

    fn constructive(
        &mut self,
        action: &ReconcileAction,
        what: &Constructive,
    ) -> Result<B::Resource, ExecuteError> {
        match what {
            Constructive::Create(create) => self.create(action, create),
            Constructive::Update(update) => self.update(action, update),
        }
    }

    fn create(
        &mut self,
        action: &ReconcileAction,
        create: &Create,
    ) -> Result<B::Resource, ExecuteError> {
        let container = self.resources.resource(&create.container)?;
        let resource = check(action, self.backend.create(&container, &create.node))?;
        check(action, self.backend.update(&resource, &create.props))?;
        if let Some(old) = self.resources.insert(create.node.clone(), resource.clone()) {
            self.displaced.push((create.node.uid().clone(), old));
        }
        self.created.push(create.node.uid().clone());
        Ok(resource)
    }

    fn update(
        &mut self,
        action: &ReconcileAction,
        update: &Update,
    ) -> Result<B::Resource, ExecuteError> {
        // The entry's node is committed by `finish`, once the whole pass ran.
        let Some(entry) = self.resources.entries.get(&update.existing) else {
            return Err(ExecuteError::MissingResource(update.existing.clone()));
        };
        let resource = entry.resource.clone();
        if !update.diff.is_empty() {
            check(action, self.backend.update(&resource, &update.diff))?;
        }
        Ok(resource)
    }

    /// Create, configure, swap in and destroy the old resource of the same uid.
    fn rebuild(
        &mut self,
        action: &ReconcileAction,
        container: &Uid,
        old: &B::Resource,
        update: &Update,
    ) -> Result<(), ExecuteError> {
        let container = self.resources.resource(container)?;
        let fresh = check(action, self.backend.create(&container, &update.node))?;
        check(action, self.backend.update(&fresh, &update.diff))?;
        check(action, self.backend.replace(old, &fresh, &update.diff))?;
        check(action, self.backend.destroy(old))?;
        self.resources.insert(update.node.clone(), fresh);
        self.created.push(update.node.uid().clone());
        Ok(())
    }
}

fn check<T, E>(action: &ReconcileAction, result: Result<T, E>) -> Result<T, ExecuteError>
where
    E: core::error::Error + Send + Sync + 'static,
{
    result.map_err(|source| ExecuteError::Backend {
        action: action.to_string(),
        source: Box::new(source),
    })
}

impl<B: Backend> NodeLookup for Executor<B> {
    fn previous(&self, uid: &Uid) -> Option<&ShadowNode> {
        self.resources.previous(uid)
    }
}

impl<B: Backend> CompatibilityOracle for Executor<B> {
    fn classify(&self, old: &ShadowNode, new: &ShadowNode) -> Compatibility {
        self.backend.compatibility(old, new)
    }
}

impl<B: Backend> ActionExecutor for Executor<B> {
    fn apply(
        &mut self,
        actions: Vec<ReconcileAction>,
        top: &ShadowNode,
    ) -> Result<(), ExecuteError> {
        let span = info_span!("apply", actions = actions.len());
        let _guard = span.enter();
        self.begin(top);
        for action in &actions {
            if let Err(err) = self.execute(action) {
                if let Err(cleanup) = self.abort() {
                    error!(error = %cleanup, "cleanup of abandoned pass failed");
                }
                return Err(err);
            }
        }
        self.finish(top)
    }
}

#[cfg(test)]
mod tests;
