//! Components and the sink they render into.
//!
//! A [`Component`] expands into shadow nodes by yielding them to a
//! [`RenderSink`]. Every yield is keyed by its call site (captured with
//! `#[track_caller]`) unless an explicit key is given, so the same code path
//! yields the same uid on every pass.
//!
//! ```
//! use reactk_core::{Context, NodeKind, RenderError, RenderSink, render_root};
//! use reactk_props::{Prop, PropSection, ValueType, values};
//!
//! let label = NodeKind::new(
//!     PropSection::new("Label").prop(Prop::new("text", ValueType::Str).default("")),
//! )
//! .shared();
//!
//! let app = move |_: &Context, sink: &mut RenderSink<'_>| -> Result<(), RenderError> {
//!     for text in ["a", "b"] {
//!         sink.node(reactk_core::ShadowNode::new(label.clone(), &values! { "text" => text })?);
//!     }
//!     Ok(())
//! };
//!
//! let top = render_root(&app, &Context::new()).unwrap();
//! assert_eq!(top.nodes().len(), 2);
//! ```

use core::any::type_name;

use crate::context::Context;
use crate::error::RenderError;
use crate::node::ShadowNode;
use crate::trace::{FrameCounter, RenderTrace, SourceSite};

/// Something that renders into shadow nodes.
pub trait Component {
    /// Name used in the component's trace frame.
    fn type_name(&self) -> &str {
        short_type_name(type_name::<Self>())
    }

    /// Explicit key of the component among its siblings.
    fn key(&self) -> Option<&str> {
        None
    }

    /// Yields this component's nodes into `sink`.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] if a node cannot be built.
    fn render(&self, ctx: &Context, sink: &mut RenderSink<'_>) -> Result<(), RenderError>;
}

impl<F> Component for F
where
    F: Fn(&Context, &mut RenderSink<'_>) -> Result<(), RenderError>,
{
    fn type_name(&self) -> &str {
        "fn"
    }

    fn render(&self, ctx: &Context, sink: &mut RenderSink<'_>) -> Result<(), RenderError> {
        self(ctx, sink)
    }
}

/// Wraps a component with an explicit key.
#[derive(Debug, Clone)]
pub struct Keyed<C> {
    key: String,
    inner: C,
}

impl<C> Keyed<C> {
    /// Keys `inner` with `key`.
    pub fn new(key: impl Into<String>, inner: C) -> Self {
        Self {
            key: key.into(),
            inner,
        }
    }
}

impl<C: Component> Component for Keyed<C> {
    fn type_name(&self) -> &str {
        self.inner.type_name()
    }

    fn key(&self) -> Option<&str> {
        Some(&self.key)
    }

    fn render(&self, ctx: &Context, sink: &mut RenderSink<'_>) -> Result<(), RenderError> {
        self.inner.render(ctx, sink)
    }
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Collects the nodes yielded within one parent scope.
#[derive(Debug)]
pub struct RenderSink<'a> {
    ctx: &'a Context,
    trace: RenderTrace,
    counter: FrameCounter,
    nodes: Vec<ShadowNode>,
}

impl<'a> RenderSink<'a> {
    /// Creates a sink whose yields are placed below `trace`.
    #[must_use]
    pub fn new(ctx: &'a Context, trace: RenderTrace) -> Self {
        Self {
            ctx,
            trace,
            counter: FrameCounter::new(),
            nodes: Vec::new(),
        }
    }

    /// The context of this pass.
    #[must_use]
    pub const fn context(&self) -> &'a Context {
        self.ctx
    }

    /// The trace yields are placed below.
    #[must_use]
    pub const fn trace(&self) -> &RenderTrace {
        &self.trace
    }

    fn stamp(&mut self, mut node: ShadowNode, site: SourceSite) -> ShadowNode {
        let frame = self
            .counter
            .frame(node.kind_name(), site, node.explicit_key());
        node.set_trace(self.trace.child(frame));
        node.assign_child_identities();
        node
    }

    /// Yields a node.
    #[track_caller]
    pub fn node(&mut self, node: ShadowNode) {
        let node = self.stamp(node, SourceSite::caller());
        self.nodes.push(node);
    }

    /// Yields several nodes from the same site.
    #[track_caller]
    pub fn nodes(&mut self, nodes: impl IntoIterator<Item = ShadowNode>) {
        let site = SourceSite::caller();
        for node in nodes {
            let node = self.stamp(node, site);
            self.nodes.push(node);
        }
    }

    /// Yields `node` with children rendered by `body`, appended after any
    /// children it already has.
    ///
    /// # Errors
    ///
    /// Propagates errors from `body`.
    #[track_caller]
    pub fn container(
        &mut self,
        node: ShadowNode,
        body: impl FnOnce(&mut RenderSink<'a>) -> Result<(), RenderError>,
    ) -> Result<(), RenderError> {
        let mut node = self.stamp(node, SourceSite::caller());
        let mut inner = RenderSink::new(self.ctx, node.trace().clone());
        // Pre-built children already consumed occurrences at their own sites.
        for child in node.nodes() {
            inner.counter.frame(child.kind_name(), child.site(), child.explicit_key());
        }
        body(&mut inner)?;
        let mut children = node.nodes().to_vec();
        children.extend(inner.finish());
        node.set_children(children);
        self.nodes.push(node);
        Ok(())
    }

    /// Renders a child component; its nodes are flattened into this scope
    /// below a frame for the component.
    ///
    /// # Errors
    ///
    /// Propagates the component's error.
    #[track_caller]
    pub fn component<C: Component + ?Sized>(&mut self, component: &C) -> Result<(), RenderError> {
        let frame = self
            .counter
            .frame(component.type_name(), SourceSite::caller(), component.key());
        let mut inner = RenderSink::new(self.ctx, self.trace.child(frame));
        component.render(self.ctx, &mut inner)?;
        self.nodes.extend(inner.finish());
        Ok(())
    }

    /// Returns the yielded nodes.
    #[must_use]
    pub fn finish(self) -> Vec<ShadowNode> {
        self.nodes
    }
}

/// Renders `component` and wraps its nodes in the top container.
///
/// # Errors
///
/// Propagates the component's error.
pub fn render_root<C: Component + ?Sized>(
    component: &C,
    ctx: &Context,
) -> Result<ShadowNode, RenderError> {
    let mut sink = RenderSink::new(ctx, RenderTrace::root());
    component.render(ctx, &mut sink)?;
    let mut top = ShadowNode::top(Vec::new())?;
    top.set_children(sink.finish());
    Ok(top)
}
