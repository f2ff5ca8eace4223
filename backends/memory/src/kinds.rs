//! Node kinds understood by the memory backend.
//!
//! The props mirror a Tk-style toolkit: plain options are grouped under the
//! `configure` subsection, window attributes under `attributes`, and packing
//! options live in their own `pack` section that is diffed wholesale.

use std::sync::{Arc, OnceLock};

use reactk_core::{NodeKind, NodeType};
use reactk_props::{DiffMode, Prop, PropSection, Value, ValueType};

/// Name of the label kind.
pub const LABEL: &str = "Label";
/// Name of the frame kind.
pub const FRAME: &str = "Frame";
/// Name of the window kind.
pub const WINDOW: &str = "Window";

fn configure(name: &str, value_type: ValueType, default: impl Into<Value>) -> Prop {
    Prop::new(name, value_type)
        .default(default)
        .subsection("configure")
}

fn font() -> PropSection {
    PropSection::new("font")
        .diff_mode(DiffMode::Simple)
        .prop(Prop::new("family", ValueType::Str))
        .prop(Prop::new("size", ValueType::Int))
        .prop(Prop::new("style", ValueType::Str).default("normal"))
}

fn pack() -> PropSection {
    PropSection::new("pack")
        .diff_mode(DiffMode::Simple)
        .prop(Prop::new("ipadx", ValueType::Int).default(0))
        .prop(Prop::new("ipady", ValueType::Int).default(0))
        .prop(Prop::new("fill", ValueType::one_of(["both", "x", "y", "none"])).default("none"))
        .prop(
            Prop::new("side", ValueType::one_of(["top", "bottom", "left", "right"]))
                .default("top"),
        )
        .prop(Prop::new("expand", ValueType::Bool).default(false))
        .prop(
            Prop::new(
                "anchor",
                ValueType::one_of(["n", "s", "e", "w", "ne", "nw", "se", "sw"]),
            )
            .default("n"),
        )
}

fn widget_schema(name: &str) -> PropSection {
    PropSection::new(name)
        .prop(configure("text", ValueType::Str, ""))
        .prop(configure("borderwidth", ValueType::Int, 0))
        .prop(configure("background", ValueType::Str, "#000001"))
        .prop(configure("foreground", ValueType::Str, "#ffffff"))
        .prop(configure(
            "justify",
            ValueType::one_of(["left", "center", "right"]),
            "center",
        ))
        .prop(configure(
            "wraplength",
            ValueType::optional(ValueType::Int),
            Value::Null,
        ))
        .prop(configure("relief", ValueType::Str, "solid"))
        .section(font())
        .section(pack())
}

fn window_schema() -> PropSection {
    PropSection::new(WINDOW)
        .prop(
            Prop::new("title", ValueType::Str)
                .default("")
                .subsection("configure"),
        )
        .prop(
            Prop::new("background", ValueType::Str)
                .default("#ffffff")
                .subsection("configure"),
        )
        .prop(
            Prop::new("topmost", ValueType::Bool)
                .default(false)
                .subsection("attributes"),
        )
        .prop(
            Prop::new("transparent_color", ValueType::optional(ValueType::Str))
                .default(Value::Null)
                .subsection("attributes")
                .computed_name("transparentcolor"),
        )
        .prop(
            Prop::new("alpha", ValueType::Float)
                .default(1.0)
                .subsection("attributes"),
        )
        .prop(Prop::new("override_redirect", ValueType::Bool).default(false))
        .section(
            PropSection::new("geometry")
                .prop(
                    Prop::new("anchor_point", ValueType::one_of(["lt", "rt", "lb", "rb"]))
                        .default("lt"),
                )
                .prop(Prop::new("width", ValueType::Int))
                .prop(Prop::new("height", ValueType::Int))
                .prop(Prop::new("x", ValueType::Int).default(0))
                .prop(Prop::new("y", ValueType::Int).default(0)),
        )
}

/// A text label; it cannot hold children.
pub fn label() -> Arc<dyn NodeType> {
    static KIND: OnceLock<Arc<dyn NodeType>> = OnceLock::new();
    KIND.get_or_init(|| NodeKind::new(widget_schema(LABEL)).shared())
        .clone()
}

/// A container widget.
pub fn frame() -> Arc<dyn NodeType> {
    static KIND: OnceLock<Arc<dyn NodeType>> = OnceLock::new();
    KIND.get_or_init(|| NodeKind::new(widget_schema(FRAME)).shared())
        .clone()
}

/// A top-level window; a window of the same uid is always updated in place.
pub fn window() -> Arc<dyn NodeType> {
    static KIND: OnceLock<Arc<dyn NodeType>> = OnceLock::new();
    KIND.get_or_init(|| NodeKind::new(window_schema()).shared())
        .clone()
}

/// Returns `true` if widgets of `kind` can hold children.
#[must_use]
pub fn is_container(kind: &str) -> bool {
    kind != LABEL
}
