use alloc::sync::Arc;

use super::*;
use crate::{DiffMode, ValueType, values};

fn ab() -> Arc<PropSection> {
    Arc::new(
        PropSection::new("ab")
            .prop(Prop::new("A", ValueType::Int))
            .prop(Prop::new("B", ValueType::Str).default("x")),
    )
}

fn label() -> Arc<PropSection> {
    Arc::new(
        PropSection::new("label")
            .prop(Prop::new("text", ValueType::Str).default("").subsection("configure"))
            .prop(
                Prop::new("wrap", ValueType::Int)
                    .default(0)
                    .subsection("configure")
                    .computed_name("wraplength"),
            )
            .section(
                PropSection::new("font")
                    .diff_mode(DiffMode::Simple)
                    .prop(Prop::new("family", ValueType::Str).default("TkDefaultFont"))
                    .prop(Prop::new("size", ValueType::Int).default(10)),
            )
            .section(
                PropSection::new("pack")
                    .prop(Prop::new("side", ValueType::Str).default("top"))
                    .prop(
                        Prop::new("padx", ValueType::Float)
                            .default(0.0)
                            .converter(|v| Value::from(v.as_float().unwrap_or_default() * 2.0)),
                    ),
            ),
    )
}

#[test]
fn compute_fills_defaults() {
    let v = PropValueVector::new(ab(), &values! { "A" => 1 }).unwrap();
    assert_eq!(v.compute(), values! { "A" => 1, "B" => "x" });
}

#[test]
fn diff_reports_only_changed_leaves() {
    let v = PropValueVector::new(ab(), &values! { "A" => 1 }).unwrap();
    let diff = v.diff_values(&values! { "A" => 2, "B" => "x" }).unwrap();
    assert_eq!(diff.changes(), &values! { "A" => 2 });
    assert_eq!(diff.compute(), values! { "A" => 2 });
}

#[test]
fn diff_with_self_is_empty() {
    let v = PropValueVector::new(label(), &values! { "text" => "hi" }).unwrap();
    assert!(v.diff(&v).unwrap().is_empty());
}

#[test]
fn explicit_default_equals_absent() {
    let schema = ab();
    let a = PropValueVector::new(schema.clone(), &values! { "A" => 1 }).unwrap();
    let b = PropValueVector::new(schema, &values! { "A" => 1, "B" => "x" }).unwrap();
    assert!(a.diff(&b).unwrap().is_empty());
    assert_eq!(a, b);
}

#[test]
fn compute_groups_by_subsection_and_renames() {
    let v = PropValueVector::new(label(), &values! { "text" => "hi", "wrap" => 40 }).unwrap();
    assert_eq!(
        v.compute(),
        values! {
            "configure" => values! { "text" => "hi", "wraplength" => 40 },
            "font" => values! { "family" => "TkDefaultFont", "size" => 10 },
            "pack" => values! { "side" => "top", "padx" => 0.0 },
        }
    );
}

#[test]
fn recursive_section_diffs_sparsely() {
    let v = PropValueVector::new(label(), &values! {}).unwrap();
    let diff = v
        .diff_values(&values! { "pack" => values! { "padx" => 3 } })
        .unwrap();
    assert_eq!(diff.changes(), &values! { "pack" => values! { "padx" => 3.0 } });
    assert_eq!(diff.compute(), values! { "pack" => values! { "padx" => 6.0 } });
}

#[test]
fn simple_section_diffs_wholesale() {
    let v = PropValueVector::new(label(), &values! {}).unwrap();
    let diff = v
        .diff_values(&values! { "font" => values! { "size" => 12 } })
        .unwrap();
    assert_eq!(
        diff.changes(),
        &values! { "font" => values! { "family" => "TkDefaultFont", "size" => 12 } }
    );
}

#[test]
fn unchanged_sections_are_omitted() {
    let v = PropValueVector::new(label(), &values! { "text" => "a" }).unwrap();
    let diff = v.diff_values(&values! { "text" => "b" }).unwrap();
    assert_eq!(diff.changes(), &values! { "text" => "b" });
    assert_eq!(diff.compute(), values! { "configure" => values! { "text" => "b" } });
}

#[test]
fn update_applies_diff_round_trip() {
    let schema = label();
    let v = PropValueVector::new(
        schema.clone(),
        &values! {
            "text" => "a",
            "font" => values! { "family" => "Arial", "size" => 9 },
        },
    )
    .unwrap();
    let w = PropValueVector::new(
        schema,
        &values! {
            "wrap" => 10,
            "font" => values! { "size" => 14 },
            "pack" => values! { "side" => "left" },
        },
    )
    .unwrap();
    let diff = v.diff(&w).unwrap();
    let updated = v.update(diff.changes()).unwrap();
    assert_eq!(updated.compute(), w.compute());
    assert_eq!(updated.old(), Some(v.values()));
}

#[test]
fn update_keeps_old_values() {
    let v = PropValueVector::new(ab(), &values! { "A" => 1 }).unwrap();
    let updated = v.update(&values! { "A" => 5 }).unwrap();
    let Some(PropValueEntry::Scalar(a)) = updated.get("A") else {
        panic!("A should be a scalar");
    };
    assert_eq!(a.value(), Some(&Value::Int(5)));
    assert_eq!(a.old(), Some(&Value::Int(1)));
}

#[test]
fn update_rejects_invalid_overrides() {
    let v = PropValueVector::new(ab(), &values! { "A" => 1 }).unwrap();
    assert!(matches!(
        v.update(&values! { "A" => "one" }),
        Err(SchemaError::TypeMismatch { .. })
    ));
    assert!(matches!(
        v.update(&values! { "C" => 1 }),
        Err(SchemaError::UnknownKeys { .. })
    ));
}

#[test]
fn diff_across_schemas_fails() {
    let a = PropValueVector::new(ab(), &values! { "A" => 1 }).unwrap();
    let b = PropValueVector::new(label(), &values! {}).unwrap();
    assert!(matches!(a.diff(&b), Err(SchemaError::SchemaMismatch { .. })));
}

#[test]
fn same_named_schemas_of_different_shapes_do_not_diff() {
    let text = Arc::new(PropSection::new("label").prop(Prop::new("text", ValueType::Str).default("")));
    let count = Arc::new(PropSection::new("label").prop(Prop::new("text", ValueType::Int).default(0)));
    let a = PropValueVector::new(text, &values! {}).unwrap();
    let b = PropValueVector::new(count, &values! {}).unwrap();
    assert!(matches!(a.diff(&b), Err(SchemaError::SchemaMismatch { .. })));
}

#[test]
fn separately_built_identical_schemas_diff() {
    let a = PropValueVector::new(label(), &values! { "text" => "a" }).unwrap();
    let b = PropValueVector::new(label(), &values! { "text" => "b" }).unwrap();
    assert_eq!(a.diff(&b).unwrap().changes(), &values! { "text" => "b" });
}

#[test]
fn full_diff_contains_everything() {
    let v = PropValueVector::new(ab(), &values! { "A" => 3 }).unwrap();
    let diff = v.full_diff();
    assert_eq!(diff.changes(), &values! { "A" => 3, "B" => "x" });
    assert_eq!(diff.compute(), v.compute());
}

#[test]
fn iteration_wraps_entries_in_order() {
    let v = PropValueVector::new(label(), &values! { "text" => "t" }).unwrap();
    let names: Vec<_> = v
        .iter()
        .map(|entry| match entry {
            PropValueEntry::Scalar(s) => s.prop().name().to_owned(),
            PropValueEntry::Vector(v) => v.schema().name().to_owned(),
        })
        .collect();
    assert_eq!(names, ["text", "wrap", "font", "pack"]);
}

#[test]
fn scalar_compute_uses_default() {
    let prop = Prop::new("B", ValueType::Str).default("x");
    let scalar = prop.to_value(None);
    assert!(scalar.is_missing());
    assert_eq!(scalar.compute(), Value::from("x"));
    assert_eq!(scalar.update(Value::from("y")).compute(), Value::from("y"));
}
