//! Render traces and the uids derived from them.
//!
//! Every yield contributes a [`RenderFrame`]. A frame is keyed either by an
//! explicit key or by the call site of the yield plus the number of earlier
//! yields of the same type from that site within the same parent scope.
//! Joining the frames from the synthetic top container down to a node gives
//! its [`Uid`].

use alloc::sync::Arc;
use core::fmt;
use core::panic::Location;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Uid of the synthetic top-level container.
pub const TOP: &str = "top";

/// Separates frame ids in a uid. Explicit keys must not contain it.
pub const SEPARATOR: char = '.';

/// The stable identity of a node across render passes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uid(Arc<str>);

impl Uid {
    /// Wraps a raw uid.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(Arc::from(raw.as_ref()))
    }

    /// The uid of the synthetic top container.
    #[must_use]
    pub fn top() -> Self {
        Self::new(TOP)
    }

    /// Returns `true` for the top container's uid.
    #[must_use]
    pub fn is_top(&self) -> bool {
        &*self.0 == TOP
    }

    /// The raw string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Uid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Uid {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// A source location captured with `#[track_caller]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceSite {
    file: &'static str,
    line: u32,
    column: u32,
}

impl SourceSite {
    /// Captures the caller's location.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }

    /// The source file.
    #[must_use]
    pub const fn file(&self) -> &'static str {
        self.file
    }

    /// The 1-based line.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// The 1-based column.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    fn file_name(&self) -> &'static str {
        self.file
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file)
    }
}

impl From<&'static Location<'static>> for SourceSite {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
            column: location.column(),
        }
    }
}

impl fmt::Display for SourceSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// What distinguishes a frame from its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameKey {
    /// A key chosen by the caller.
    Explicit(String),
    /// The yield site and how many same-typed yields preceded it there.
    Site {
        /// Where the yield happened.
        site: SourceSite,
        /// Occurrence index at that site within the parent scope.
        occurrence: usize,
    },
}

/// One step of a [`RenderTrace`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderFrame {
    key: FrameKey,
    type_name: String,
}

impl RenderFrame {
    /// Creates a frame.
    pub fn new(key: FrameKey, type_name: impl Into<String>) -> Self {
        Self {
            key,
            type_name: type_name.into(),
        }
    }

    /// The frame's key.
    #[must_use]
    pub const fn key(&self) -> &FrameKey {
        &self.key
    }

    /// Name of the yielded type.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The frame's part of a uid.
    #[must_use]
    pub fn id(&self) -> String {
        match &self.key {
            FrameKey::Explicit(key) => key.clone(),
            FrameKey::Site { site, occurrence } => format!(
                "{}@{}:{}:{}#{occurrence}",
                self.type_name,
                site.file_name(),
                site.line,
                site.column
            ),
        }
    }
}

/// The path of frames from the top container to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RenderTrace {
    frames: Vec<RenderFrame>,
}

impl RenderTrace {
    /// The trace of the top container.
    #[must_use]
    pub const fn root() -> Self {
        Self { frames: Vec::new() }
    }

    /// Returns this trace extended by `frame`.
    #[must_use]
    pub fn child(&self, frame: RenderFrame) -> Self {
        let mut frames = self.frames.clone();
        frames.push(frame);
        Self { frames }
    }

    /// The frames, outermost first.
    #[must_use]
    pub fn frames(&self) -> &[RenderFrame] {
        &self.frames
    }

    /// Number of frames below the top container.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` if `self` is a strict prefix of `other`.
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        other.frames.len() > self.frames.len() && other.frames.starts_with(&self.frames)
    }

    /// Joins the frame ids under the top container's uid.
    #[must_use]
    pub fn uid(&self) -> Uid {
        let mut raw = String::from(TOP);
        for frame in &self.frames {
            raw.push(SEPARATOR);
            raw.push_str(&frame.id());
        }
        Uid::new(raw)
    }
}

/// Hands out frames for the yields of one parent scope.
#[derive(Debug, Default)]
pub struct FrameCounter {
    seen: HashMap<(SourceSite, String), usize>,
}

impl FrameCounter {
    /// Creates a counter for a fresh scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the frame for the next yield of `type_name` at `site`.
    ///
    /// Explicit keys do not consume an occurrence.
    pub fn frame(&mut self, type_name: &str, site: SourceSite, key: Option<&str>) -> RenderFrame {
        if let Some(key) = key {
            return RenderFrame::new(FrameKey::Explicit(key.to_owned()), type_name);
        }
        let counter = self.seen.entry((site, type_name.to_owned())).or_insert(0);
        let occurrence = *counter;
        *counter += 1;
        RenderFrame::new(FrameKey::Site { site, occurrence }, type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_trace_is_top() {
        assert_eq!(RenderTrace::root().uid(), Uid::top());
        assert!(RenderTrace::root().uid().is_top());
    }

    #[test]
    fn explicit_keys_are_used_verbatim() {
        let mut counter = FrameCounter::new();
        let frame = counter.frame("Label", SourceSite::caller(), Some("a"));
        assert_eq!(RenderTrace::root().child(frame).uid().as_str(), "top.a");
    }

    #[test]
    fn same_site_yields_count_up() {
        let mut counter = FrameCounter::new();
        let site = SourceSite::caller();
        let first = counter.frame("Label", site, None);
        let second = counter.frame("Label", site, None);
        let other_type = counter.frame("Frame", site, None);
        assert_ne!(first.id(), second.id());
        assert!(first.id().ends_with("#0"));
        assert!(second.id().ends_with("#1"));
        assert!(other_type.id().ends_with("#0"));
        assert!(first.id().starts_with("Label@trace.rs:"));
    }

    #[test]
    fn scopes_count_independently() {
        let site = SourceSite::caller();
        let a = FrameCounter::new().frame("Label", site, None);
        let b = FrameCounter::new().frame("Label", site, None);
        assert_eq!(a, b);
    }

    #[test]
    fn ancestry() {
        let mut counter = FrameCounter::new();
        let parent = RenderTrace::root().child(counter.frame("Frame", SourceSite::caller(), None));
        let child = parent.child(counter.frame("Label", SourceSite::caller(), Some("x")));
        assert!(parent.is_ancestor_of(&child));
        assert!(RenderTrace::root().is_ancestor_of(&child));
        assert!(!child.is_ancestor_of(&parent));
        assert!(!child.is_ancestor_of(&child));
        assert_eq!(child.depth(), 2);
    }
}
