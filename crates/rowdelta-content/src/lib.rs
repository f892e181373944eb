//! Diff coordinator for rowdelta.
//!
//! Accepts snapshot pairs from the caller, runs the diff engine on a worker
//! thread, discards results that were superseded while in flight, throttles
//! how often results are delivered, and streams each delivered result as an
//! ordered sequence of [`ContentEvent`]s: items are updated before they are
//! moved, and sections after all of their items.

pub mod config;
pub mod content;
pub mod error;
pub mod event;
pub mod state;

pub use config::ContentConfig;
pub use content::{ContentStream, DeltaContent};
pub use error::{ContentError, Result};
pub use event::{ContentEvent, ContentEventKind, ContentHandlers};
pub use state::{ContentPhase, ContentState, Decision, Snapshot};
