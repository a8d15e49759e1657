mod common;

use arbor_bt::{Failure, ReactiveSequence, Sequence, Tree};
use arbor_core::{Context, NodeId, NodeState, Status, TickContext, Vec2};
use arbor_tools::TraceLog;

use common::{drain, journal, Probe};

fn tick(tree: &mut Tree, n: u64) -> Status {
    tree.tick(TickContext::new(n, 0.1))
}

fn running(tree: &Tree, ids: &[NodeId]) -> Vec<NodeId> {
    ids.iter()
        .copied()
        .filter(|id| tree.node(*id).unwrap().is_running())
        .collect()
}

#[test]
fn running_node_starts_once_and_stops_when_it_settles() {
    let log = journal();
    let mut tree = Tree::new();
    let probe = tree
        .insert_node(
            Box::new(Probe::new("a", &log).script([Status::Running, Status::Success])),
            Vec2::ZERO,
        )
        .unwrap();
    tree.link(tree.root(), probe).unwrap();
    tree.bind(Context::new());
    drain(&log);

    assert_eq!(tick(&mut tree, 0), Status::Running);
    assert_eq!(tree.node(probe).unwrap().state(), NodeState::Running);
    assert_eq!(tick(&mut tree, 1), Status::Success);
    assert_eq!(tree.node(probe).unwrap().state(), NodeState::Inactive);

    assert_eq!(
        drain(&log),
        vec!["a:start", "a:update", "a:update", "a:stop"]
    );
}

#[test]
fn on_init_runs_once_per_bind() {
    let log = journal();
    let mut tree = Tree::new();
    tree.insert_node(Box::new(Probe::new("a", &log)), Vec2::ZERO)
        .unwrap();

    tree.bind(Context::new());
    tree.bind(Context::new());
    assert_eq!(drain(&log), vec!["a:init", "a:init"]);
}

#[test]
fn first_tick_binds_an_unbound_tree() {
    let log = journal();
    let mut tree = Tree::new();
    let probe = tree
        .insert_node(Box::new(Probe::new("a", &log).returning(Status::Success)), Vec2::ZERO)
        .unwrap();
    tree.link(tree.root(), probe).unwrap();

    assert!(!tree.is_bound());
    assert_eq!(tick(&mut tree, 0), Status::Success);
    assert!(tree.is_bound());
    assert_eq!(drain(&log)[0], "a:init");
}

#[test]
fn non_runnable_node_fails_with_paired_start_and_stop() {
    let log = journal();
    let mut tree = Tree::new();
    let probe = tree
        .insert_node(
            Box::new(Probe::new("a", &log).returning(Status::Success).not_runnable()),
            Vec2::ZERO,
        )
        .unwrap();
    tree.link(tree.root(), probe).unwrap();
    tree.bind(Context::new());
    assert!(!tree.node(probe).unwrap().can_run());
    drain(&log);

    assert_eq!(tick(&mut tree, 0), Status::Failure);
    assert_eq!(drain(&log), vec!["a:start", "a:stop"]);
}

#[test]
fn root_without_child_fails() {
    let mut tree = Tree::new();
    assert_eq!(tick(&mut tree, 0), Status::Failure);
    assert_eq!(tree.node(tree.root()).unwrap().state(), NodeState::Inactive);
}

#[test]
fn abort_stops_deepest_first_exactly_once() {
    let log = journal();
    let mut tree = Tree::new();
    let seq = tree
        .insert_node(Box::new(Sequence::default()), Vec2::ZERO)
        .unwrap();
    let probe = tree
        .insert_node(Box::new(Probe::new("leaf", &log)), Vec2::ZERO)
        .unwrap();
    tree.link(tree.root(), seq).unwrap();
    tree.link(seq, probe).unwrap();
    tree.bind(Context::new().with(TraceLog::default()));
    drain(&log);

    assert_eq!(tick(&mut tree, 0), Status::Running);
    tree.abort(tree.root()).unwrap();
    tree.abort(tree.root()).unwrap();

    assert_eq!(drain(&log), vec!["leaf:start", "leaf:update", "leaf:stop"]);
    assert!(tree.nodes().all(|n| n.state() == NodeState::Inactive));

    let trace = tree.context().get::<TraceLog>().unwrap();
    let aborts: Vec<_> = trace
        .events
        .iter()
        .filter(|e| e.tag == "node.abort")
        .map(|e| e.node.unwrap())
        .collect();
    assert_eq!(aborts, vec![probe, seq, tree.root()]);
}

#[test]
fn unlinking_a_running_subtree_stops_it() {
    let log = journal();
    let mut tree = Tree::new();
    let decorator = tree.insert_node(Box::new(Failure), Vec2::ZERO).unwrap();
    let probe = tree
        .insert_node(Box::new(Probe::new("a", &log)), Vec2::ZERO)
        .unwrap();
    tree.link(tree.root(), decorator).unwrap();
    tree.link(decorator, probe).unwrap();

    assert_eq!(tick(&mut tree, 0), Status::Running);
    tree.unlink(tree.root(), decorator).unwrap();
    assert!(tree.nodes().all(|n| !n.is_running()));
    assert_eq!(drain(&log).last().map(String::as_str), Some("a:stop"));
}

#[test]
fn removing_a_running_node_stops_it() {
    let log = journal();
    let mut tree = Tree::new();
    let probe = tree
        .insert_node(Box::new(Probe::new("a", &log)), Vec2::ZERO)
        .unwrap();
    tree.link(tree.root(), probe).unwrap();
    tick(&mut tree, 0);

    let removed = tree.remove_node(probe).unwrap();
    assert_eq!(removed.id(), probe);
    assert_eq!(removed.state(), NodeState::Inactive);
    assert!(tree.children(tree.root()).is_empty());
    assert_eq!(drain(&log).last().map(String::as_str), Some("a:stop"));
}

#[test]
fn trace_records_start_and_stop_per_node() {
    let log = journal();
    let mut tree = Tree::new();
    let probe = tree
        .insert_node(Box::new(Probe::new("a", &log).returning(Status::Success)), Vec2::ZERO)
        .unwrap();
    tree.link(tree.root(), probe).unwrap();
    tree.bind(Context::new().with(TraceLog::default()));

    tick(&mut tree, 7);
    let trace = tree.context().get::<TraceLog>().unwrap();
    let tags: Vec<_> = trace.for_node(probe).map(|e| (e.tick, &*e.tag)).collect();
    assert_eq!(tags, vec![(7, "node.start"), (7, "node.stop")]);
}

#[test]
fn removing_the_running_first_child_stops_it_and_leaves_the_sibling_idle() {
    let log = journal();
    let mut tree = Tree::new();
    let seq = tree
        .insert_node(Box::new(Sequence::default()), Vec2::ZERO)
        .unwrap();
    let a = tree
        .insert_node(Box::new(Probe::new("a", &log)), Vec2::ZERO)
        .unwrap();
    let b = tree
        .insert_node(Box::new(Probe::new("b", &log).returning(Status::Success)), Vec2::ZERO)
        .unwrap();
    tree.link(tree.root(), seq).unwrap();
    tree.link(seq, a).unwrap();
    tree.link(seq, b).unwrap();
    tree.bind(Context::new());
    drain(&log);

    assert_eq!(tick(&mut tree, 0), Status::Running);
    let removed = tree.remove_node(a).unwrap();
    assert_eq!(removed.state(), NodeState::Inactive);
    assert_eq!(drain(&log), vec!["a:start", "a:update", "a:stop"]);
    assert!(!tree.node(b).unwrap().is_running());
    assert_eq!(tree.children(seq), &[b]);

    assert_eq!(tick(&mut tree, 1), Status::Success);
    assert_eq!(drain(&log), vec!["b:start", "b:update", "b:stop"]);
}

#[test]
fn sequence_resumes_its_running_child_after_a_finished_sibling_is_unlinked() {
    let log = journal();
    let mut tree = Tree::new();
    let seq = tree
        .insert_node(Box::new(Sequence::default()), Vec2::ZERO)
        .unwrap();
    let a = tree
        .insert_node(Box::new(Probe::new("a", &log).returning(Status::Success)), Vec2::ZERO)
        .unwrap();
    let b = tree
        .insert_node(Box::new(Probe::new("b", &log)), Vec2::ZERO)
        .unwrap();
    let c = tree
        .insert_node(Box::new(Probe::new("c", &log)), Vec2::ZERO)
        .unwrap();
    tree.link(tree.root(), seq).unwrap();
    for child in [a, b, c] {
        tree.link(seq, child).unwrap();
    }
    tree.bind(Context::new());
    drain(&log);

    assert_eq!(tick(&mut tree, 0), Status::Running);
    assert!(tree.unlink(seq, a).unwrap());
    assert_eq!(tick(&mut tree, 1), Status::Running);

    assert_eq!(running(&tree, &[a, b, c]), vec![b]);
    assert_eq!(
        drain(&log),
        vec!["a:start", "a:update", "a:stop", "b:start", "b:update", "b:update"]
    );
}

#[test]
fn sequence_resumes_a_running_child_moved_to_the_end() {
    let log = journal();
    let mut tree = Tree::new();
    let seq = tree
        .insert_node(Box::new(Sequence::default()), Vec2::ZERO)
        .unwrap();
    let a = tree
        .insert_node(Box::new(Probe::new("a", &log).returning(Status::Success)), Vec2::ZERO)
        .unwrap();
    let b = tree
        .insert_node(Box::new(Probe::new("b", &log)), Vec2::ZERO)
        .unwrap();
    let c = tree
        .insert_node(Box::new(Probe::new("c", &log)), Vec2::ZERO)
        .unwrap();
    tree.link(tree.root(), seq).unwrap();
    for child in [a, b, c] {
        tree.link(seq, child).unwrap();
    }
    tree.bind(Context::new());
    drain(&log);

    assert_eq!(tick(&mut tree, 0), Status::Running);
    tree.link(seq, b).unwrap();
    assert_eq!(tree.children(seq), &[a, c, b]);
    assert_eq!(tick(&mut tree, 1), Status::Running);

    assert_eq!(running(&tree, &[a, b, c]), vec![b]);
    assert!(!drain(&log).iter().any(|e| e.starts_with("c:")));
}

#[test]
fn reactive_sequence_keeps_one_running_child_after_a_sort() {
    let log = journal();
    let mut tree = Tree::new();
    let seq = tree
        .insert_node(Box::new(ReactiveSequence::default()), Vec2::ZERO)
        .unwrap();
    let a = tree
        .insert_node(
            Box::new(Probe::new("a", &log).returning(Status::Success)),
            Vec2::new(0.0, 0.0),
        )
        .unwrap();
    let b = tree
        .insert_node(Box::new(Probe::new("b", &log)), Vec2::new(1.0, 0.0))
        .unwrap();
    let c = tree
        .insert_node(Box::new(Probe::new("c", &log)), Vec2::new(2.0, 0.0))
        .unwrap();
    tree.link(tree.root(), seq).unwrap();
    for child in [a, b, c] {
        tree.link(seq, child).unwrap();
    }
    tree.bind(Context::new());

    assert_eq!(tick(&mut tree, 0), Status::Running);
    assert_eq!(running(&tree, &[a, b, c]), vec![b]);
    drain(&log);

    tree.set_position(c, Vec2::new(0.5, 0.0)).unwrap();
    assert!(tree.sort_children(seq).unwrap());
    assert_eq!(tick(&mut tree, 1), Status::Running);

    assert_eq!(running(&tree, &[a, b, c]), vec![c]);
    assert_eq!(
        drain(&log),
        vec!["a:start", "a:update", "a:stop", "c:start", "c:update", "b:stop"]
    );
}
