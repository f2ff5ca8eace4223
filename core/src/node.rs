//! Shadow nodes: immutable descriptions of one renderable item.

use alloc::sync::Arc;
use core::fmt;
use core::str::FromStr;

use reactk_props::{PropSection, PropValueVector, SchemaError, ValueMap};
use serde::{Deserialize, Serialize};

use crate::error::ReconcileError;
use crate::trace::{FrameCounter, RenderTrace, SourceSite, TOP, Uid};

/// How two same-identity nodes relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compatibility {
    /// Update the existing resource in place.
    Update,
    /// Rebuild the resource; the node kind is unchanged.
    Replace,
    /// The nodes are of different kinds entirely.
    Recreate,
}

impl Compatibility {
    /// The textual form accepted by [`FromStr`].
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Update => "update",
            Self::Replace => "replace",
            Self::Recreate => "recreate",
        }
    }
}

impl fmt::Display for Compatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Compatibility {
    type Err = ReconcileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "update" => Ok(Self::Update),
            "replace" => Ok(Self::Replace),
            "recreate" => Ok(Self::Recreate),
            _ => Err(ReconcileError::UnknownCompatibility(s.to_owned())),
        }
    }
}

/// A node kind: type discriminator, props schema and compatibility policy.
pub trait NodeType: fmt::Debug + Send + Sync {
    /// The kind's name, used as the type discriminator.
    fn name(&self) -> &str;

    /// The props schema of this kind.
    fn schema(&self) -> &Arc<PropSection>;

    /// Classifies `old` against `new`, where `new` is of this kind.
    ///
    /// The default treats a different kind name as [`Compatibility::Recreate`]
    /// and anything else as [`Compatibility::Update`].
    fn compatibility(&self, old: &ShadowNode, new: &ShadowNode) -> Compatibility {
        default_compatibility(old, new)
    }
}

/// The default policy of [`NodeType::compatibility`].
#[must_use]
pub fn default_compatibility(old: &ShadowNode, new: &ShadowNode) -> Compatibility {
    if old.kind_name() == new.kind_name() {
        Compatibility::Update
    } else {
        Compatibility::Recreate
    }
}

type Policy = Arc<dyn Fn(&ShadowNode, &ShadowNode) -> Compatibility + Send + Sync>;

/// An explicitly registered node kind.
///
/// ```
/// use reactk_core::{Compatibility, NodeKind};
/// use reactk_props::{Prop, PropSection, ValueType};
///
/// let label = NodeKind::new(
///     PropSection::new("Label").prop(Prop::new("text", ValueType::Str).default("")),
/// )
/// .with_policy(|_, _| Compatibility::Update);
/// assert_eq!(label.name(), "Label");
/// ```
#[derive(Clone)]
pub struct NodeKind {
    name: String,
    schema: Arc<PropSection>,
    policy: Option<Policy>,
}

impl NodeKind {
    /// Registers a kind named after its schema.
    #[must_use]
    pub fn new(schema: PropSection) -> Self {
        Self {
            name: schema.name().to_owned(),
            schema: Arc::new(schema),
            policy: None,
        }
    }

    /// Overrides the compatibility policy.
    #[must_use]
    pub fn with_policy(
        mut self,
        policy: impl Fn(&ShadowNode, &ShadowNode) -> Compatibility + Send + Sync + 'static,
    ) -> Self {
        self.policy = Some(Arc::new(policy));
        self
    }

    /// Wraps the kind for sharing between nodes.
    #[must_use]
    pub fn shared(self) -> Arc<dyn NodeType> {
        Arc::new(self)
    }

    /// The kind's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeKind")
            .field("name", &self.name)
            .field("custom_policy", &self.policy.is_some())
            .finish_non_exhaustive()
    }
}

impl NodeType for NodeKind {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> &Arc<PropSection> {
        &self.schema
    }

    fn compatibility(&self, old: &ShadowNode, new: &ShadowNode) -> Compatibility {
        match &self.policy {
            Some(policy) => policy(old, new),
            None => default_compatibility(old, new),
        }
    }
}

#[derive(Debug)]
struct TopKind {
    schema: Arc<PropSection>,
}

impl NodeType for TopKind {
    fn name(&self) -> &str {
        TOP
    }

    fn schema(&self) -> &Arc<PropSection> {
        &self.schema
    }
}

/// An immutable description of one renderable item.
///
/// Nodes are cheap to clone: children are shared until modified.
#[derive(Debug, Clone)]
pub struct ShadowNode {
    kind: Arc<dyn NodeType>,
    props: PropValueVector,
    children: Arc<Vec<ShadowNode>>,
    key: Option<String>,
    site: SourceSite,
    trace: RenderTrace,
    uid: Uid,
}

impl ShadowNode {
    /// Creates a node of `kind`, validating `props` against its schema.
    ///
    /// The node has no identity until it is yielded to a render sink or
    /// passed through [`assign_identities`].
    ///
    /// # Errors
    ///
    /// Returns the [`SchemaError`] raised by validation.
    #[track_caller]
    pub fn new(kind: Arc<dyn NodeType>, props: &ValueMap) -> Result<Self, SchemaError> {
        let props = PropValueVector::new(kind.schema().clone(), props)?;
        Ok(Self {
            kind,
            props,
            children: Arc::new(Vec::new()),
            key: None,
            site: SourceSite::caller(),
            trace: RenderTrace::root(),
            uid: Uid::top(),
        })
    }

    /// The synthetic top-level container holding `children`, which get
    /// their identities assigned.
    ///
    /// # Errors
    ///
    /// Never fails in practice; the top container's schema is empty.
    pub fn top(children: Vec<Self>) -> Result<Self, SchemaError> {
        let kind = TopKind {
            schema: Arc::new(PropSection::new(TOP)),
        };
        let props = PropValueVector::empty(kind.schema.clone())?;
        let mut top = Self {
            kind: Arc::new(kind),
            props,
            children: Arc::new(children),
            key: None,
            site: SourceSite::caller(),
            trace: RenderTrace::root(),
            uid: Uid::top(),
        };
        top.assign_child_identities();
        Ok(top)
    }

    /// Sets an explicit key.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Appends a child.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        Arc::make_mut(&mut self.children).push(child);
        self
    }

    /// Appends several children.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        Arc::make_mut(&mut self.children).extend(children);
        self
    }

    /// Returns this node with `overrides` merged into its props.
    ///
    /// # Errors
    ///
    /// Fails if the merged props do not validate.
    pub fn with_props(mut self, overrides: &ValueMap) -> Result<Self, SchemaError> {
        self.props = self.props.update(overrides)?;
        Ok(self)
    }

    /// The node kind.
    #[must_use]
    pub fn kind(&self) -> &Arc<dyn NodeType> {
        &self.kind
    }

    /// The node kind's name.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        self.kind.name()
    }

    /// The bound props.
    #[must_use]
    pub const fn props(&self) -> &PropValueVector {
        &self.props
    }

    /// The ordered children.
    #[must_use]
    pub fn nodes(&self) -> &[Self] {
        &self.children
    }

    /// Returns `true` if the node has children.
    #[must_use]
    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// The explicit key, if any.
    #[must_use]
    pub fn explicit_key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Where the node was constructed.
    #[must_use]
    pub const fn site(&self) -> SourceSite {
        self.site
    }

    /// The node's trace.
    #[must_use]
    pub const fn trace(&self) -> &RenderTrace {
        &self.trace
    }

    /// The node's identity.
    #[must_use]
    pub const fn uid(&self) -> &Uid {
        &self.uid
    }

    /// Returns `true` for the synthetic top container.
    #[must_use]
    pub fn is_top(&self) -> bool {
        self.uid.is_top() && self.kind.name() == TOP
    }

    /// Visits this node and every descendant, parents first.
    pub fn walk(&self, visit: &mut impl FnMut(&Self)) {
        visit(self);
        for child in self.children.iter() {
            child.walk(visit);
        }
    }

    pub(crate) fn set_trace(&mut self, trace: RenderTrace) {
        self.uid = trace.uid();
        self.trace = trace;
    }

    pub(crate) fn set_children(&mut self, children: Vec<Self>) {
        self.children = Arc::new(children);
    }

    pub(crate) fn assign_child_identities(&mut self) {
        if self.children.is_empty() {
            return;
        }
        let trace = self.trace.clone();
        assign_identities(&trace, Arc::make_mut(&mut self.children).as_mut_slice());
    }

    /// One-line description used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} ({}) built at {}", self.kind.name(), self.uid, self.site)
    }
}

impl fmt::Display for ShadowNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}>", self.kind.name(), self.uid)
    }
}

/// Stamps `children` (and their descendants) with traces below `parent`.
///
/// Each node is keyed by its explicit key, or by its kind name, its
/// construction site and its occurrence index at that site among siblings.
pub fn assign_identities(parent: &RenderTrace, children: &mut [ShadowNode]) {
    let mut counter = FrameCounter::new();
    for child in children {
        let frame = counter.frame(child.kind_name(), child.site, child.key.as_deref());
        child.set_trace(parent.child(frame));
        child.assign_child_identities();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reactk_props::{Prop, ValueType, values};

    fn label() -> Arc<dyn NodeType> {
        NodeKind::new(PropSection::new("Label").prop(Prop::new("text", ValueType::Str).default("")))
            .shared()
    }

    #[test]
    fn compatibility_parses_case_insensitively() {
        assert_eq!("Recreate".parse::<Compatibility>().unwrap(), Compatibility::Recreate);
        assert!(matches!(
            "rebuild".parse::<Compatibility>(),
            Err(ReconcileError::UnknownCompatibility(raw)) if raw == "rebuild"
        ));
    }

    #[test]
    fn compatibility_and_uid_serialize_as_strings() {
        assert_eq!(
            serde_json::to_string(&Compatibility::Recreate).unwrap(),
            r#""recreate""#
        );
        let uid: Uid = serde_json::from_str(r#""top.main.a""#).unwrap();
        assert_eq!(uid, Uid::from("top.main.a"));
        assert_eq!(serde_json::to_string(&uid).unwrap(), r#""top.main.a""#);
    }

    #[test]
    fn new_validates_props() {
        assert!(ShadowNode::new(label(), &values! { "text" => 1 }).is_err());
        assert!(ShadowNode::new(label(), &values! { "text" => "a" }).is_ok());
    }

    #[test]
    fn loop_built_siblings_get_distinct_uids() {
        let kind = label();
        let nodes: Vec<_> = (0..3)
            .map(|_| ShadowNode::new(kind.clone(), &values! {}).unwrap())
            .collect();
        let top = ShadowNode::top(nodes).unwrap();
        let uids: Vec<_> = top.nodes().iter().map(|n| n.uid().to_string()).collect();
        assert!(uids[0].ends_with("#0"));
        assert!(uids[1].ends_with("#1"));
        assert!(uids[2].ends_with("#2"));
    }

    #[test]
    fn keyed_children_nest_under_parent() {
        let kind = label();
        let frame = ShadowNode::new(kind.clone(), &values! {})
            .unwrap()
            .key("frame")
            .child(ShadowNode::new(kind, &values! {}).unwrap().key("inner"));
        let top = ShadowNode::top(vec![frame]).unwrap();
        let inner = &top.nodes()[0].nodes()[0];
        assert_eq!(inner.uid().as_str(), "top.frame.inner");
        assert!(top.nodes()[0].trace().is_ancestor_of(inner.trace()));
    }

    #[test]
    fn default_policy_compares_kind_names() {
        let a = ShadowNode::new(label(), &values! {}).unwrap();
        let other = NodeKind::new(PropSection::new("Frame")).shared();
        let b = ShadowNode::new(other, &values! {}).unwrap();
        assert_eq!(default_compatibility(&a, &a), Compatibility::Update);
        assert_eq!(default_compatibility(&a, &b), Compatibility::Recreate);
    }
}
