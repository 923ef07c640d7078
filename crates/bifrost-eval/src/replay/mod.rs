//! Trace record and replay
//!
//! This module provides functionality for recording the traces a live
//! pipeline produces and replaying them as an executor, so suites can be
//! re-scored without re-running the pipeline.

mod library;
mod recorder;
mod replayer;

pub use library::TraceLibrary;
pub use recorder::TraceRecorder;
pub use replayer::TraceReplayer;
