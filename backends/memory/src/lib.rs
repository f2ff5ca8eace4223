//! An in-memory widget backend for reactk.
//!
//! [`MemoryBackend`] keeps an arena of [`Widget`]s addressed by [`WidgetId`]
//! and journals every call it receives, which makes it suitable for
//! asserting what an executor did. The [`kinds`] module provides `Label`,
//! `Frame` and `Window` node kinds with Tk-style props.

mod backend;
pub mod kinds;
mod widget;

pub use backend::{MemoryBackend, MemoryError};
pub use widget::{Op, Widget, WidgetId};
