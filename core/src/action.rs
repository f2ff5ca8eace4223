//! The closed set of actions a reconciliation pass emits.

use core::fmt;

use reactk_props::PropDiff;

use crate::node::ShadowNode;
use crate::trace::Uid;

/// Create a fresh resource for `node` inside `container`.
#[derive(Debug, Clone)]
pub struct Create {
    /// The node to materialize.
    pub node: ShadowNode,
    /// Uid of the container resource.
    pub container: Uid,
    /// Every prop of the node, as a diff from nothing.
    pub props: PropDiff,
}

/// Apply `diff` to the resource registered for `existing`.
#[derive(Debug, Clone)]
pub struct Update {
    /// Uid of the resource to update.
    pub existing: Uid,
    /// The node the resource will describe afterwards.
    pub node: ShadowNode,
    /// Props that changed.
    pub diff: PropDiff,
}

/// The inner step of a placement or replacement.
#[derive(Debug, Clone)]
pub enum Constructive {
    /// Build a new resource.
    Create(Create),
    /// Reuse a registered resource.
    Update(Update),
}

impl Constructive {
    /// The node this step produces.
    #[must_use]
    pub const fn node(&self) -> &ShadowNode {
        match self {
            Self::Create(create) => &create.node,
            Self::Update(update) => &update.node,
        }
    }

    /// The diff applied to the resulting resource.
    #[must_use]
    pub const fn diff(&self) -> &PropDiff {
        match self {
            Self::Create(create) => &create.props,
            Self::Update(update) => &update.diff,
        }
    }

    /// Returns `true` for [`Constructive::Create`].
    #[must_use]
    pub const fn is_create(&self) -> bool {
        matches!(self, Self::Create(_))
    }
}

/// One imperative step of turning the previous resource tree into the new one.
#[derive(Debug, Clone)]
pub enum ReconcileAction {
    /// Create a resource without placing it.
    Create(Create),
    /// Update a resource in place.
    Update(Update),
    /// Put the result of `with` where `existing` is, removing `existing`.
    Replace {
        /// Uid of the container.
        container: Uid,
        /// Uid of the resource being replaced.
        existing: Uid,
        /// Position within the container.
        at: usize,
        /// How the replacement is obtained.
        with: Constructive,
    },
    /// Detach a resource from its container.
    Unplace {
        /// Uid of the resource.
        existing: Uid,
        /// Uid of the container it leaves.
        container: Uid,
    },
    /// Put the result of `what` into `container` at `at`.
    Place {
        /// Uid of the container.
        container: Uid,
        /// Position within the container.
        at: usize,
        /// How the placed resource is obtained.
        what: Constructive,
    },
}

impl ReconcileAction {
    /// The uid of the resource this action leaves in the tree, or removes.
    #[must_use]
    pub const fn uid(&self) -> &Uid {
        match self {
            Self::Create(create) => create.node.uid(),
            Self::Update(update) => &update.existing,
            Self::Replace { with, .. } | Self::Place { what: with, .. } => with.node().uid(),
            Self::Unplace { existing, .. } => existing,
        }
    }

    /// The node this action materializes, if any.
    #[must_use]
    pub const fn node(&self) -> Option<&ShadowNode> {
        match self {
            Self::Create(create) => Some(&create.node),
            Self::Update(update) => Some(&update.node),
            Self::Replace { with, .. } | Self::Place { what: with, .. } => Some(with.node()),
            Self::Unplace { .. } => None,
        }
    }

    /// Returns `true` if the action yields a freshly built resource, whose
    /// descendants therefore have no history.
    ///
    /// That is any inner create, and a replacement of a resource by the same
    /// uid, which rebuilds it.
    #[must_use]
    pub fn is_creating_new(&self) -> bool {
        match self {
            Self::Create(_) => true,
            Self::Update(_) | Self::Unplace { .. } => false,
            Self::Place { what, .. } => what.is_create(),
            Self::Replace { existing, with, .. } => match with {
                Constructive::Create(_) => true,
                Constructive::Update(update) => update.existing == *existing,
            },
        }
    }

    /// Short name of the variant, e.g. `replace(update)`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update(_) => "update",
            Self::Replace {
                with: Constructive::Create(_),
                ..
            } => "replace(create)",
            Self::Replace {
                with: Constructive::Update(_),
                ..
            } => "replace(update)",
            Self::Unplace { .. } => "unplace",
            Self::Place {
                what: Constructive::Create(_),
                ..
            } => "place(create)",
            Self::Place {
                what: Constructive::Update(_),
                ..
            } => "place(update)",
        }
    }
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create(create) => write!(f, "create {} in {}", create.node, create.container),
            Self::Update(update) => write!(f, "update {} with {}", update.existing, update.diff),
            Self::Replace {
                container,
                existing,
                at,
                with,
            } => write!(
                f,
                "{} {existing} at {container}[{at}] by {}",
                self.name(),
                with.node()
            ),
            Self::Unplace { existing, container } => {
                write!(f, "unplace {existing} from {container}")
            }
            Self::Place { container, at, what } => {
                write!(f, "{} {} at {container}[{at}]", self.name(), what.node())
            }
        }
    }
}
