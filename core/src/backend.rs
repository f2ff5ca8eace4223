//! The protocol a concrete resource backend implements.

use core::fmt::Debug;

use reactk_props::PropDiff;

use crate::node::{Compatibility, ShadowNode};

/// Materializes shadow nodes as live resources.
///
/// Every method receives already-resolved arguments; the executor takes care
/// of sequencing and of the uid to resource mapping.
pub trait Backend: Debug {
    /// Handle to a live resource.
    type Resource: Clone + Debug;
    /// Error raised by the backend.
    type Error: core::error::Error + Send + Sync + 'static;

    /// The resource standing for the synthetic top container.
    fn root(&self) -> Self::Resource;

    /// Builds a resource for `node` inside `container`, without placing it.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    fn create(
        &mut self,
        container: &Self::Resource,
        node: &ShadowNode,
    ) -> Result<Self::Resource, Self::Error>;

    /// Applies changed props to a resource.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    fn update(&mut self, resource: &Self::Resource, diff: &PropDiff) -> Result<(), Self::Error>;

    /// Puts a resource into `container` at `at`, moving it if it is placed
    /// elsewhere.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    fn place(
        &mut self,
        resource: &Self::Resource,
        container: &Self::Resource,
        diff: &PropDiff,
        at: usize,
    ) -> Result<(), Self::Error>;

    /// Detaches a resource from its container.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    fn unplace(&mut self, resource: &Self::Resource) -> Result<(), Self::Error>;

    /// Puts `replacement` where `resource` is and detaches `resource`.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    fn replace(
        &mut self,
        resource: &Self::Resource,
        replacement: &Self::Resource,
        diff: &PropDiff,
    ) -> Result<(), Self::Error>;

    /// Releases a resource for good.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    fn destroy(&mut self, resource: &Self::Resource) -> Result<(), Self::Error>;

    /// Classifies `old` against `new`; defaults to the node kind's policy.
    fn compatibility(&self, old: &ShadowNode, new: &ShadowNode) -> Compatibility {
        new.kind().compatibility(old, new)
    }
}
