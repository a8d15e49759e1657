//! Tooling primitives for arbor behavior trees.
//!
//! This crate is intentionally lightweight: it only records what happened during ticks.
//! Rendering of traces belongs to the embedding editor.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod trace;

pub use trace::{emit, TraceEvent, TraceLog, TraceSink};
