//! Widgets held by the memory backend, and the journal of operations.

use core::fmt;

use reactk_core::Uid;
use reactk_props::{Value, ValueMap};

/// Handle to a widget in a [`MemoryBackend`](crate::MemoryBackend).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(usize);

impl WidgetId {
    /// The root widget every window lives in.
    pub const ROOT: Self = Self(0);

    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A live (or destroyed) widget.
#[derive(Debug, Clone)]
pub struct Widget {
    pub(crate) kind: String,
    pub(crate) uid: Uid,
    pub(crate) owner: WidgetId,
    pub(crate) slot: Option<WidgetId>,
    pub(crate) children: Vec<WidgetId>,
    pub(crate) config: ValueMap,
    pub(crate) alive: bool,
}

impl Widget {
    /// The node kind the widget was created for.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The uid of the node the widget was created for.
    #[must_use]
    pub const fn uid(&self) -> &Uid {
        &self.uid
    }

    /// The container the widget was created in.
    #[must_use]
    pub const fn owner(&self) -> WidgetId {
        self.owner
    }

    /// The container the widget is currently placed in, if any.
    #[must_use]
    pub const fn placed_in(&self) -> Option<WidgetId> {
        self.slot
    }

    /// Placed children, in order.
    #[must_use]
    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    /// The accumulated computed configuration.
    #[must_use]
    pub const fn config(&self) -> &ValueMap {
        &self.config
    }

    /// Reads `key` from the `configure` subsection.
    #[must_use]
    pub fn configured(&self, key: &str) -> Option<&Value> {
        self.config
            .get("configure")
            .and_then(Value::as_map)
            .and_then(|configure| configure.get(key))
    }

    /// Returns `false` once the widget is destroyed.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.alive
    }
}

/// One call made to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    /// A widget was created.
    Create {
        /// The new widget.
        id: WidgetId,
        /// Its kind.
        kind: String,
    },
    /// Computed props were applied.
    Update {
        /// The widget.
        id: WidgetId,
        /// The sparse computed props.
        props: ValueMap,
    },
    /// A widget was placed.
    Place {
        /// The widget.
        id: WidgetId,
        /// Its new container.
        container: WidgetId,
        /// Position within the container.
        at: usize,
    },
    /// A widget was detached.
    Unplace {
        /// The widget.
        id: WidgetId,
    },
    /// A widget took another one's slot.
    Replace {
        /// The widget that left.
        old: WidgetId,
        /// The widget that took its slot.
        new: WidgetId,
    },
    /// A widget was destroyed.
    Destroy {
        /// The widget.
        id: WidgetId,
    },
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Create { id, kind } => write!(f, "create {id} {kind}"),
            Self::Update { id, props } => write!(f, "update {id} {}", Value::Map(props.clone())),
            Self::Place { id, container, at } => write!(f, "place {id} in {container} at {at}"),
            Self::Unplace { id } => write!(f, "unplace {id}"),
            Self::Replace { old, new } => write!(f, "replace {old} by {new}"),
            Self::Destroy { id } => write!(f, "destroy {id}"),
        }
    }
}
