use std::collections::BTreeMap;

use reactk_core::{Context, Executor, ReconcileError, RenderError, RenderSink, ShadowNode};
use reactk_memory::{MemoryBackend, Op, WidgetId, kinds};
use reactk_props::values;

use super::*;

struct Greeting;

impl Component for Greeting {
    fn render(&self, ctx: &Context, sink: &mut RenderSink<'_>) -> Result<(), RenderError> {
        if ctx.get("fail").is_some() {
            return Err(RenderError::Component {
                component: self.type_name().to_owned(),
                message: "asked to fail".into(),
            });
        }
        let name = ctx.get_str("name").unwrap_or("world");
        let window = ShadowNode::new(
            kinds::window(),
            &values! {
                "title" => "greeting",
                "geometry" => values! { "width" => 300, "height" => 200 },
            },
        )?;
        sink.container(window, |body| {
            let text = format!("hello {name}");
            body.node(ShadowNode::new(kinds::label(), &values! { "text" => text })?.key("greeting"));
            Ok(())
        })
    }
}

type MemoryRoot = RenderRoot<Executor<MemoryBackend>>;

fn mount(config: RootConfig) -> MemoryRoot {
    RenderRoot::new(
        Greeting,
        Executor::new(MemoryBackend::new()),
        Context::new(),
        config,
    )
    .unwrap()
}

fn outline(root: &MemoryRoot) -> String {
    root.executor().backend().outline(WidgetId::ROOT)
}

fn journal_since(root: &MemoryRoot, mark: usize) -> Vec<Op> {
    root.executor().backend().journal()[mark..].to_vec()
}

#[test]
fn mounting_runs_the_first_pass() {
    let root = mount(RootConfig::default());
    assert_eq!(root.passes(), 1);
    assert_eq!(outline(&root), r#"Root[Window[Label("hello world")]]"#);
}

#[test]
fn unchanged_rerender_applies_nothing() {
    let mut root = mount(RootConfig::default());
    let mark = root.executor().backend().journal().len();
    assert_eq!(
        root.rerender().unwrap(),
        Pass {
            number: 2,
            actions: 0
        }
    );
    assert!(journal_since(&root, mark).is_empty());
}

#[test]
fn context_changes_rerender() {
    let mut root = mount(RootConfig::default());
    let mark = root.executor().backend().journal().len();

    let pass = root.set_context("name", "reactk").unwrap();
    assert_eq!(
        pass,
        Some(Pass {
            number: 2,
            actions: 1
        })
    );
    assert_eq!(outline(&root), r#"Root[Window[Label("hello reactk")]]"#);
    assert!(matches!(
        journal_since(&root, mark).as_slice(),
        [Op::Update { .. }]
    ));

    assert_eq!(root.set_context("name", "reactk").unwrap(), None);
    assert_eq!(root.passes(), 2);
    assert_eq!(root.context().get_str("name"), Some("reactk"));
}

#[test]
fn compatibility_override_rebuilds_the_kind() {
    let config = RootConfig {
        compatibility: BTreeMap::from([("Label".to_owned(), "recreate".to_owned())]),
        ..RootConfig::default()
    };
    let mut root = mount(config);
    let mark = root.executor().backend().journal().len();

    root.set_context("name", "again").unwrap();
    let ops = journal_since(&root, mark);
    assert!(ops.iter().any(|op| matches!(op, Op::Create { .. })));
    assert!(ops.iter().any(|op| matches!(op, Op::Replace { .. })));
    assert!(ops.iter().any(|op| matches!(op, Op::Destroy { .. })));
    assert_eq!(outline(&root), r#"Root[Window[Label("hello again")]]"#);
    assert_eq!(root.executor().backend().live(), 2);
}

#[test]
fn unknown_override_fails_to_mount() {
    let config = RootConfig {
        compatibility: BTreeMap::from([("Label".to_owned(), "sometimes".to_owned())]),
        ..RootConfig::default()
    };
    let result = RenderRoot::new(
        Greeting,
        Executor::new(MemoryBackend::new()),
        Context::new(),
        config,
    );
    assert!(matches!(
        result,
        Err(Error::Reconcile(ReconcileError::UnknownCompatibility(_)))
    ));
}

#[test]
fn render_failure_leaves_the_committed_tree() {
    let mut root = mount(RootConfig::default());
    assert!(matches!(
        root.set_context("fail", true),
        Err(Error::Render(RenderError::Component { .. }))
    ));
    assert_eq!(root.passes(), 1);
    assert_eq!(outline(&root), r#"Root[Window[Label("hello world")]]"#);
}

#[test]
fn threaded_mount_drives_the_backend_thread() {
    let config = RootConfig {
        threaded: true,
        log_actions: true,
        ..RootConfig::default()
    };
    let mut root = RenderRoot::mount(Greeting, MemoryBackend::new, Context::new(), config).unwrap();
    assert_eq!(root.passes(), 1);
    assert_eq!(
        root.set_context("name", "thread").unwrap(),
        Some(Pass {
            number: 2,
            actions: 1
        })
    );
    assert_eq!(root.rerender().unwrap().actions, 0);
}
