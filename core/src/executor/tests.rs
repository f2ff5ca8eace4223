use reactk_props::{Prop, PropSection, ValueType, values};

use super::*;
use crate::node::NodeKind;
use crate::reconcile::reconcile;
use crate::testing::{Journal, frame, label, top};

fn pass(executor: &mut Executor<Journal>, top: &ShadowNode) -> Result<Vec<String>, ExecuteError> {
    let actions = reconcile(&*executor, &*executor, top).unwrap();
    executor.apply(actions, top)?;
    Ok(executor.backend_mut().take())
}

#[test]
fn first_pass_creates_configures_then_places() {
    let mut executor = Executor::new(Journal::default());
    let ops = pass(&mut executor, &top(vec![label("a", "A")])).unwrap();
    assert_eq!(
        ops,
        [
            "create 1 Label in 0",
            r#"update 1 {text: "A"}"#,
            "place 1 in 0 at 0",
        ]
    );
    assert_eq!(executor.resources().len(), 1);
    let uid = Uid::from("top.a");
    assert_eq!(executor.resources().resource(&uid).unwrap(), 1);
}

#[test]
fn unchanged_pass_touches_nothing() {
    let mut executor = Executor::new(Journal::default());
    let build = || top(vec![label("a", "A"), label("b", "B")]);
    pass(&mut executor, &build()).unwrap();
    assert!(pass(&mut executor, &build()).unwrap().is_empty());
}

#[test]
fn removed_nodes_are_unplaced_then_swept() {
    let mut executor = Executor::new(Journal::default());
    pass(&mut executor, &top(vec![label("a", "A"), label("b", "B")])).unwrap();
    let ops = pass(&mut executor, &top(vec![label("b", "B")])).unwrap();
    assert_eq!(ops, ["unplace 1", "destroy 1"]);
    assert!(executor.resources().get(&Uid::from("top.a")).is_none());
    assert_eq!(executor.resources().len(), 1);
}

#[test]
fn replace_with_create_configures_before_swapping() {
    let mut executor = Executor::new(Journal::default());
    pass(&mut executor, &top(vec![label("a", "A")])).unwrap();
    let ops = pass(&mut executor, &top(vec![label("c", "C"), label("a", "A")])).unwrap();
    assert_eq!(
        ops,
        [
            "create 2 Label in 0",
            r#"update 2 {text: "C"}"#,
            "replace 1 by 2",
            "place 1 in 0 at 1",
        ]
    );
}

#[test]
fn replaced_resources_outside_the_tree_are_destroyed() {
    let mut executor = Executor::new(Journal::default());
    pass(&mut executor, &top(vec![label("a", "A")])).unwrap();
    let tree = top(vec![label("b", "B")]);
    let next = tree.nodes()[0].clone();
    let action = ReconcileAction::Replace {
        container: Uid::top(),
        existing: Uid::from("top.a"),
        at: 0,
        with: Constructive::Create(Create {
            props: next.props().full_diff(),
            node: next,
            container: Uid::top(),
        }),
    };
    executor.apply(vec![action], &tree).unwrap();
    assert_eq!(
        executor.backend_mut().take(),
        [
            "create 2 Label in 0",
            r#"update 2 {text: "B"}"#,
            "replace 1 by 2",
            "destroy 1",
        ]
    );
    assert!(executor.resources().get(&Uid::from("top.a")).is_none());
}

#[test]
fn recreate_rebuilds_the_resource_in_place() {
    let kind = NodeKind::new(PropSection::new("Canvas").prop(Prop::new("w", ValueType::Int)))
        .with_policy(|_, _| Compatibility::Recreate)
        .shared();
    let node = |w: i64| ShadowNode::new(kind.clone(), &values! { "w" => w }).unwrap().key("c");
    let mut executor = Executor::new(Journal::default());
    pass(&mut executor, &top(vec![node(1)])).unwrap();
    let ops = pass(&mut executor, &top(vec![node(2)])).unwrap();
    assert_eq!(
        ops,
        [
            "create 2 Canvas in 0",
            "update 2 {w: 2}",
            "replace 1 by 2",
            "destroy 1",
        ]
    );
    assert_eq!(executor.resources().resource(&Uid::from("top.c")).unwrap(), 2);
}

#[test]
fn swapping_siblings_destroys_nothing() {
    let mut executor = Executor::new(Journal::default());
    pass(&mut executor, &top(vec![label("a", "A"), label("b", "B")])).unwrap();
    let ops = pass(&mut executor, &top(vec![label("b", "B"), label("a", "A")])).unwrap();
    assert_eq!(ops, ["replace 1 by 2", "place 1 in 0 at 1"]);
    assert_eq!(executor.resources().len(), 2);
}

#[test]
fn snapshots_follow_the_committed_tree() {
    let mut executor = Executor::new(Journal::default());
    pass(&mut executor, &top(vec![label("a", "A")])).unwrap();
    pass(&mut executor, &top(vec![label("a", "B")])).unwrap();
    let node = executor.previous(&Uid::from("top.a")).unwrap();
    assert_eq!(node.props().values(), &values! { "text" => "B" });
    assert_eq!(executor.previous(&Uid::top()).unwrap().nodes().len(), 1);
    assert_eq!(executor.resources().snapshot().len(), 2);
}

#[test]
fn backend_failures_name_the_action() {
    let mut executor = Executor::new(Journal {
        refuse_create: true,
        ..Journal::default()
    });
    let err = pass(&mut executor, &top(vec![label("a", "A"), label("b", "B")])).unwrap_err();
    let ExecuteError::Backend { action, source } = err else {
        panic!("expected a backend error");
    };
    assert!(action.starts_with("place(create) Label<top.a>"));
    assert_eq!(source.to_string(), "refused to create");
    assert!(executor.backend().ops.is_empty());
}

#[test]
fn updates_of_unknown_uids_fail() {
    let mut executor = Executor::new(Journal::default());
    let tree = top(vec![label("ghost", "")]);
    let node = tree.nodes()[0].clone();
    let action = ReconcileAction::Update(Update {
        existing: node.uid().clone(),
        diff: node.props().full_diff(),
        node,
    });
    executor.begin(&tree);
    assert!(matches!(
        executor.execute(&action),
        Err(ExecuteError::MissingResource(_))
    ));
}

fn raised(children: Vec<ShadowNode>) -> ShadowNode {
    frame("f", children)
        .with_props(&values! { "relief" => "raised" })
        .unwrap()
}

#[test]
fn a_failed_pass_is_retried_in_full() {
    let mut executor = Executor::new(Journal::default());
    pass(&mut executor, &top(vec![frame("f", vec![label("a", "A")])])).unwrap();

    executor.backend_mut().refuse_update = Some(1);
    let next = top(vec![raised(vec![label("a", "B")])]);
    let err = pass(&mut executor, &next).unwrap_err();
    assert!(matches!(err, ExecuteError::Backend { .. }));
    assert!(executor.backend_mut().take().is_empty());
    let kept = executor.previous(&Uid::from("top.f.a")).unwrap();
    assert_eq!(kept.props().values(), &values! { "text" => "A" });

    executor.backend_mut().refuse_update = None;
    let ops = pass(&mut executor, &next).unwrap();
    assert_eq!(
        ops,
        [r#"update 1 {relief: "raised"}"#, r#"update 2 {text: "B"}"#]
    );
}

#[test]
fn an_abandoned_pass_destroys_what_it_displaced() {
    let mut executor = Executor::new(Journal::default());
    pass(&mut executor, &top(vec![label("a", "A")])).unwrap();

    let tree = top(vec![label("a", "again"), label("ghost", "")]);
    let again = tree.nodes()[0].clone();
    let ghost = tree.nodes()[1].clone();
    let actions = vec![
        ReconcileAction::Place {
            container: Uid::top(),
            at: 0,
            what: Constructive::Create(Create {
                props: again.props().full_diff(),
                node: again,
                container: Uid::top(),
            }),
        },
        ReconcileAction::Update(Update {
            existing: ghost.uid().clone(),
            diff: ghost.props().full_diff(),
            node: ghost,
        }),
    ];
    assert!(matches!(
        executor.apply(actions, &tree),
        Err(ExecuteError::MissingResource(_))
    ));
    assert_eq!(
        executor.backend_mut().take(),
        [
            "create 2 Label in 0",
            r#"update 2 {text: "again"}"#,
            "place 2 in 0 at 0",
            "destroy 1",
        ]
    );
    assert_eq!(executor.resources().resource(&Uid::from("top.a")).unwrap(), 2);
    // The committed tree is still the one of the first pass.
    assert_eq!(executor.previous(&Uid::top()).unwrap().nodes().len(), 1);
}
