//! The [`Backend`] implementation.

use reactk_core::{Backend, ShadowNode, Uid};
use reactk_props::{PropDiff, Value, ValueMap, deep_merge};
use thiserror::Error;
use tracing::trace;

use crate::kinds;
use crate::widget::{Op, Widget, WidgetId};

/// Raised when the backend is asked to do something impossible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    /// No widget has this id.
    #[error("unknown widget {0}")]
    Unknown(WidgetId),
    /// The widget was already destroyed.
    #[error("widget {0} is destroyed")]
    Destroyed(WidgetId),
    /// The widget is not placed anywhere.
    #[error("widget {0} is not placed")]
    NotPlaced(WidgetId),
    /// Widgets of this kind cannot hold children.
    #[error("widget {id} of kind {kind} cannot hold children")]
    NotAContainer {
        /// The would-be container.
        id: WidgetId,
        /// Its kind.
        kind: String,
    },
}

/// A widget toolkit that lives entirely in memory.
///
/// Every call is recorded in a journal of [`Op`]s. Destroying a widget
/// detaches its placed children without destroying them.
#[derive(Debug)]
pub struct MemoryBackend {
    widgets: Vec<Widget>,
    journal: Vec<Op>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Creates a backend holding only the root widget.
    #[must_use]
    pub fn new() -> Self {
        let root = Widget {
            kind: "Root".to_owned(),
            uid: Uid::top(),
            owner: WidgetId::ROOT,
            slot: None,
            children: Vec::new(),
            config: ValueMap::new(),
            alive: true,
        };
        Self {
            widgets: vec![root],
            journal: Vec::new(),
        }
    }

    /// Looks up a widget, dead or alive.
    #[must_use]
    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id.index())
    }

    /// The live widget created for `uid`, if any.
    #[must_use]
    pub fn find(&self, uid: &str) -> Option<WidgetId> {
        self.widgets
            .iter()
            .enumerate()
            .find(|(_, widget)| widget.alive && widget.uid.as_str() == uid)
            .map(|(index, _)| WidgetId::new(index))
    }

    /// Number of live widgets, not counting the root.
    #[must_use]
    pub fn live(&self) -> usize {
        self.widgets.iter().skip(1).filter(|w| w.alive).count()
    }

    /// Operations recorded so far.
    #[must_use]
    pub fn journal(&self) -> &[Op] {
        &self.journal
    }

    /// Drains the journal.
    pub fn take_journal(&mut self) -> Vec<Op> {
        core::mem::take(&mut self.journal)
    }

    /// Renders the placed tree below `id` as text, e.g.
    /// `Root[Window[Label("a"), Label("b")]]`.
    #[must_use]
    pub fn outline(&self, id: WidgetId) -> String {
        let Some(widget) = self.widget(id) else {
            return String::new();
        };
        let mut out = widget.kind.clone();
        match widget.configured("text") {
            Some(Value::Str(text)) if !text.is_empty() => {
                out.push('(');
                out.push_str(&format!("{text:?}"));
                out.push(')');
            }
            _ => {}
        }
        if !widget.children.is_empty() {
            let children: Vec<String> = widget.children.iter().map(|c| self.outline(*c)).collect();
            out.push('[');
            out.push_str(&children.join(", "));
            out.push(']');
        }
        out
    }

    fn live_mut(&mut self, id: WidgetId) -> Result<&mut Widget, MemoryError> {
        let widget = self
            .widgets
            .get_mut(id.index())
            .ok_or(MemoryError::Unknown(id))?;
        if widget.alive {
            Ok(widget)
        } else {
            Err(MemoryError::Destroyed(id))
        }
    }

    fn detach(&mut self, id: WidgetId) -> Result<Option<(WidgetId, usize)>, MemoryError> {
        let Some(container) = self.live_mut(id)?.slot.take() else {
            return Ok(None);
        };
        let parent = self.live_mut(container)?;
        let position = parent.children.iter().position(|child| *child == id);
        if let Some(position) = position {
            parent.children.remove(position);
        }
        Ok(position.map(|position| (container, position)))
    }

    fn attach(&mut self, id: WidgetId, container: WidgetId, at: usize) -> Result<(), MemoryError> {
        let parent = self.live_mut(container)?;
        let at = at.min(parent.children.len());
        parent.children.insert(at, id);
        self.live_mut(id)?.slot = Some(container);
        Ok(())
    }
}

impl Backend for MemoryBackend {
    type Resource = WidgetId;
    type Error = MemoryError;

    fn root(&self) -> WidgetId {
        WidgetId::ROOT
    }

    fn create(&mut self, container: &WidgetId, node: &ShadowNode) -> Result<WidgetId, MemoryError> {
        let owner = self.live_mut(*container)?;
        if !kinds::is_container(&owner.kind) {
            return Err(MemoryError::NotAContainer {
                id: *container,
                kind: owner.kind.clone(),
            });
        }
        let id = WidgetId::new(self.widgets.len());
        self.widgets.push(Widget {
            kind: node.kind_name().to_owned(),
            uid: node.uid().clone(),
            owner: *container,
            slot: None,
            children: Vec::new(),
            config: ValueMap::new(),
            alive: true,
        });
        trace!(%id, uid = %node.uid(), "created widget");
        self.journal.push(Op::Create {
            id,
            kind: node.kind_name().to_owned(),
        });
        Ok(id)
    }

    fn update(&mut self, resource: &WidgetId, diff: &PropDiff) -> Result<(), MemoryError> {
        let props = diff.compute();
        let widget = self.live_mut(*resource)?;
        widget.config = deep_merge(&widget.config, &props);
        self.journal.push(Op::Update {
            id: *resource,
            props,
        });
        Ok(())
    }

    fn place(
        &mut self,
        resource: &WidgetId,
        container: &WidgetId,
        _diff: &PropDiff,
        at: usize,
    ) -> Result<(), MemoryError> {
        self.detach(*resource)?;
        self.attach(*resource, *container, at)?;
        self.journal.push(Op::Place {
            id: *resource,
            container: *container,
            at,
        });
        Ok(())
    }

    fn unplace(&mut self, resource: &WidgetId) -> Result<(), MemoryError> {
        self.detach(*resource)?;
        self.journal.push(Op::Unplace { id: *resource });
        Ok(())
    }

    fn replace(
        &mut self,
        resource: &WidgetId,
        replacement: &WidgetId,
        _diff: &PropDiff,
    ) -> Result<(), MemoryError> {
        self.detach(*replacement)?;
        let (container, at) = self
            .detach(*resource)?
            .ok_or(MemoryError::NotPlaced(*resource))?;
        self.attach(*replacement, container, at)?;
        self.journal.push(Op::Replace {
            old: *resource,
            new: *replacement,
        });
        Ok(())
    }

    fn destroy(&mut self, resource: &WidgetId) -> Result<(), MemoryError> {
        self.detach(*resource)?;
        let widget = self.live_mut(*resource)?;
        widget.alive = false;
        let orphans = core::mem::take(&mut widget.children);
        for orphan in orphans {
            if let Some(child) = self.widgets.get_mut(orphan.index()) {
                child.slot = None;
            }
        }
        self.journal.push(Op::Destroy { id: *resource });
        Ok(())
    }
}
