use arbor_bt::{Log, NodeRegistry, Sequence, Tree, TreeDocument, TreeError, ViewTransform, Wait};
use arbor_core::{BlackboardKey, NodeId, Status, TickContext, Value, Vec2, Vec3};
use proptest::prelude::*;

fn sample() -> (Tree, NodeId, NodeId) {
    let mut tree = Tree::new();
    let key = tree
        .blackboard_mut()
        .insert(BlackboardKey::with_value("delay", Value::Float(0.5)))
        .unwrap();
    let seq = tree.insert_node(Box::new(Sequence::default()), Vec2::new(0.0, 100.0)).unwrap();
    let mut wait = Wait::new(2.0);
    wait.duration.bind(tree.blackboard().get(key).unwrap()).unwrap();
    let wait = tree.insert_node(Box::new(wait), Vec2::new(0.0, 200.0)).unwrap();
    let root = tree.root();
    tree.link(root, seq).unwrap();
    tree.link(seq, wait).unwrap();
    tree.set_description(wait, "pause").unwrap();
    tree.set_view(ViewTransform {
        position: Vec3::new(10.0, 20.0, 0.0),
        scale: Vec3::new(2.0, 2.0, 1.0),
    });
    (tree, seq, wait)
}

#[test]
fn document_roundtrip_keeps_shape_bindings_and_view() {
    let (tree, seq, wait) = sample();
    let registry = NodeRegistry::with_builtins();

    let json = tree.to_document().unwrap().to_json_pretty().unwrap();
    let document = TreeDocument::from_json(&json).unwrap();
    let loaded = Tree::from_document(&document, &registry).unwrap();

    assert_eq!(loaded.root(), tree.root());
    assert_eq!(loaded.edges(), tree.edges());
    assert_eq!(loaded.view(), tree.view());
    assert_eq!(loaded.node(wait).unwrap().description(), "pause");
    assert_eq!(loaded.node(seq).unwrap().position(), Vec2::new(0.0, 100.0));

    let wait = loaded.node(wait).unwrap().behavior_as::<Wait>().unwrap();
    assert_eq!(*wait.duration.default_value(), 2.0);
    assert_eq!(wait.duration.get(loaded.blackboard()), 0.5);
}

#[test]
fn instantiate_produces_an_independent_runnable_tree() {
    let (tree, _, _) = sample();
    let mut live = tree.instantiate(&NodeRegistry::with_builtins()).unwrap();
    assert_eq!(live.tick(TickContext::new(0, 0.1)), Status::Running);
    assert!(tree.nodes().all(|n| !n.is_running()));
}

#[test]
fn fields_default_when_omitted() {
    let registry = NodeRegistry::with_builtins();
    let log = registry.load("Log", serde_json::Value::Null).unwrap();
    assert_eq!(log.type_name(), "Log");
    let root = registry.load("Root", serde_json::Value::Null).unwrap();
    assert_eq!(root.type_name(), "Root");
}

fn corrupt(edit: impl FnOnce(&mut TreeDocument, NodeId, NodeId)) -> TreeError {
    let (tree, seq, wait) = sample();
    let mut document = tree.to_document().unwrap();
    edit(&mut document, seq, wait);
    Tree::from_document(&document, &NodeRegistry::with_builtins()).unwrap_err()
}

fn record(document: &mut TreeDocument, id: NodeId) -> &mut arbor_bt::NodeRecord {
    document.nodes.iter_mut().find(|n| n.id == id).unwrap()
}

#[test]
fn cycle_is_rejected() {
    let err = corrupt(|doc, seq, wait| {
        // wait is a leaf; make a composite loop instead.
        record(doc, wait).type_name = "Sequence".into();
        record(doc, wait).fields = serde_json::json!({});
        record(doc, wait).children = vec![seq];
        let root = doc.root;
        record(doc, root).children.clear();
    });
    assert!(matches!(err, TreeError::Cycle { .. }));
}

#[test]
fn shared_child_is_rejected() {
    let err = corrupt(|doc, _seq, wait| {
        let root = doc.root;
        record(doc, root).children = vec![wait];
    });
    assert!(matches!(err, TreeError::SharedChild(_)));
}

#[test]
fn structural_errors_are_reported() {
    assert!(matches!(
        corrupt(|doc, seq, _| record(doc, seq).children.push(NodeId::new())),
        TreeError::DanglingChild { .. }
    ));
    assert!(matches!(
        corrupt(|doc, _, _| doc.root = NodeId::new()),
        TreeError::SecondRoot
    ));
    assert!(matches!(
        corrupt(|doc, seq, _| {
            let root = doc.root;
            doc.nodes.retain(|n| n.id != root);
            doc.root = seq;
        }),
        TreeError::NotARoot(_)
    ));
    assert!(matches!(
        corrupt(|doc, seq, _| {
            let copy = record(doc, seq).clone();
            doc.nodes.push(copy);
        }),
        TreeError::DuplicateNode(_)
    ));
    assert!(matches!(
        corrupt(|doc, _, wait| record(doc, wait).type_name = "Teleport".into()),
        TreeError::UnknownNodeType(_)
    ));
    assert!(matches!(
        corrupt(|doc, _, wait| record(doc, wait).fields = serde_json::json!({ "duration": "soon" })),
        TreeError::Fields { .. }
    ));
    assert!(matches!(
        corrupt(|doc, _, _| {
            let dup = BlackboardKey::new("delay", arbor_core::ValueType::Int);
            let mut json = serde_json::to_value(&doc.blackboard).unwrap();
            json.as_array_mut().unwrap().push(serde_json::to_value(dup).unwrap());
            doc.blackboard = serde_json::from_value(json).unwrap();
        }),
        TreeError::Blackboard(_)
    ));
    assert!(matches!(
        corrupt(|doc, _, _| {
            let mut json = serde_json::to_value(&doc.blackboard).unwrap();
            let keys = json.as_array_mut().unwrap();
            let mut twin = keys[0].clone();
            twin["name"] = serde_json::json!("delay_copy");
            keys.push(twin);
            doc.blackboard = serde_json::from_value(json).unwrap();
        }),
        TreeError::DuplicateKey(_)
    ));
}

proptest! {
    #[test]
    fn composite_child_order_survives_roundtrip(count in 0usize..12) {
        let mut tree = Tree::new();
        let seq = tree.insert_node(Box::new(Sequence::default()), Vec2::ZERO).unwrap();
        let mut expected = Vec::new();
        for i in 0..count {
            let id = tree.insert_node(Box::new(Log::new(format!("{i}"))), Vec2::ZERO).unwrap();
            tree.link(seq, id).unwrap();
            expected.push(id);
        }

        let document = tree.to_document().unwrap();
        let loaded = Tree::from_document(&document, &NodeRegistry::with_builtins()).unwrap();
        prop_assert_eq!(loaded.children(seq), expected.as_slice());
        prop_assert_eq!(loaded.node_ids(), tree.node_ids());
    }
}
