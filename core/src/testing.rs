//! Helpers shared by the unit tests.

use alloc::sync::Arc;
use core::fmt;

use reactk_props::{Prop, PropDiff, PropSection, ValueType, values};

use crate::backend::Backend;
use crate::node::{Compatibility, NodeKind, NodeType, ShadowNode};

#[derive(Debug)]
pub struct Refused(&'static str);

impl fmt::Display for Refused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "refused to {}", self.0)
    }
}

impl core::error::Error for Refused {}

/// Records every call; resource 0 is the top container.
#[derive(Debug, Default)]
pub struct Journal {
    pub next: usize,
    pub ops: Vec<String>,
    pub refuse_create: bool,
    pub refuse_update: Option<usize>,
    pub recreate: bool,
}

impl Journal {
    pub fn take(&mut self) -> Vec<String> {
        core::mem::take(&mut self.ops)
    }
}

impl Backend for Journal {
    type Resource = usize;
    type Error = Refused;

    fn root(&self) -> usize {
        0
    }

    fn create(&mut self, container: &usize, node: &ShadowNode) -> Result<usize, Refused> {
        if self.refuse_create {
            return Err(Refused("create"));
        }
        self.next += 1;
        self.ops
            .push(format!("create {} {} in {container}", self.next, node.kind_name()));
        Ok(self.next)
    }

    fn update(&mut self, resource: &usize, diff: &PropDiff) -> Result<(), Refused> {
        if self.refuse_update == Some(*resource) {
            return Err(Refused("update"));
        }
        self.ops.push(format!("update {resource} {diff}"));
        Ok(())
    }

    fn place(
        &mut self,
        resource: &usize,
        container: &usize,
        _: &PropDiff,
        at: usize,
    ) -> Result<(), Refused> {
        self.ops.push(format!("place {resource} in {container} at {at}"));
        Ok(())
    }

    fn unplace(&mut self, resource: &usize) -> Result<(), Refused> {
        self.ops.push(format!("unplace {resource}"));
        Ok(())
    }

    fn replace(&mut self, resource: &usize, replacement: &usize, _: &PropDiff) -> Result<(), Refused> {
        self.ops.push(format!("replace {resource} by {replacement}"));
        Ok(())
    }

    fn destroy(&mut self, resource: &usize) -> Result<(), Refused> {
        self.ops.push(format!("destroy {resource}"));
        Ok(())
    }

    fn compatibility(&self, old: &ShadowNode, new: &ShadowNode) -> Compatibility {
        if self.recreate {
            return Compatibility::Recreate;
        }
        new.kind().compatibility(old, new)
    }
}

pub fn label_kind() -> Arc<dyn NodeType> {
    NodeKind::new(PropSection::new("Label").prop(Prop::new("text", ValueType::Str).default("")))
        .shared()
}

pub fn label(key: &str, text: &str) -> ShadowNode {
    ShadowNode::new(label_kind(), &values! { "text" => text })
        .unwrap()
        .key(key)
}

pub fn top(children: Vec<ShadowNode>) -> ShadowNode {
    ShadowNode::top(children).unwrap()
}

pub fn frame_kind() -> Arc<dyn NodeType> {
    NodeKind::new(PropSection::new("Frame").prop(Prop::new("relief", ValueType::Str).default("flat")))
        .shared()
}

pub fn frame(key: &str, children: Vec<ShadowNode>) -> ShadowNode {
    ShadowNode::new(frame_kind(), &values! {})
        .unwrap()
        .key(key)
        .children(children)
}
