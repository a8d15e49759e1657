use std::cell::RefCell;
use std::rc::Rc;

use arbor_core::{Context, NodeId};
use arbor_tools::{emit, TraceEvent, TraceLog, TraceSink};

#[derive(Clone, Default)]
struct RcSink(Rc<RefCell<Vec<TraceEvent>>>);

impl TraceSink for RcSink {
    fn emit(&mut self, event: TraceEvent) {
        self.0.borrow_mut().push(event);
    }
}

#[test]
fn emit_writes_to_trace_log_when_present() {
    let node = NodeId::new();
    let mut ctx = Context::new().with(TraceLog::default());

    emit(&mut ctx, TraceEvent::new(1, "node.start").with_node(node));

    let log = ctx.get::<TraceLog>().unwrap();
    assert_eq!(log.events.len(), 1);
    assert_eq!(log.events[0].tick, 1);
    assert_eq!(log.events[0].tag, "node.start");
    assert_eq!(log.events[0].node, Some(node));
    assert_eq!(log.for_node(node).count(), 1);
}

#[test]
fn emit_writes_to_sink_when_present() {
    let handle = RcSink::default();
    let shared = handle.0.clone();
    let mut ctx = Context::new().with(Box::new(handle) as Box<dyn TraceSink>);

    emit(&mut ctx, TraceEvent::new(2, "sink_event"));

    let events = shared.borrow();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].tick, 2);
    assert_eq!(events[0].tag, "sink_event");
}

#[test]
fn emit_writes_to_both_log_and_sink_when_both_present() {
    let handle = RcSink::default();
    let shared = handle.0.clone();
    let mut ctx = Context::new()
        .with(TraceLog::default())
        .with(Box::new(handle) as Box<dyn TraceSink>);

    emit(&mut ctx, TraceEvent::new(3, "both"));

    assert_eq!(ctx.get::<TraceLog>().unwrap().events[0].tag, "both");
    assert_eq!(shared.borrow()[0].tag, "both");
}

#[test]
fn emit_without_destinations_is_a_no_op() {
    let mut ctx = Context::new();
    emit(&mut ctx, TraceEvent::new(4, "dropped"));
    assert!(ctx.is_empty());
}
