#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use arbor_core::{Context, NodeId};

/// A small, allocation-friendly trace event.
///
/// This is intentionally "dumb data" so it can be recorded while ticking and rendered later
/// by tooling (node highlighting, timelines).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub tag: Cow<'static, str>,
    pub node: Option<NodeId>,
}

impl TraceEvent {
    pub fn new(tick: u64, tag: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tick,
            tag: tag.into(),
            node: None,
        }
    }

    pub fn with_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    /// Events recorded for `node`, in emission order.
    pub fn for_node(&self, node: NodeId) -> impl Iterator<Item = &TraceEvent> {
        self.events.iter().filter(move |e| e.node == Some(node))
    }
}

/// Record `event` into the [`TraceLog`] and/or `Box<dyn TraceSink>` installed in `context`.
///
/// Does nothing when neither is present.
pub fn emit(context: &mut Context, event: TraceEvent) {
    if let Some(log) = context.get_mut::<TraceLog>() {
        log.push(event.clone());
    }
    if let Some(sink) = context.get_mut::<Box<dyn TraceSink>>() {
        sink.emit(event);
    }
}
