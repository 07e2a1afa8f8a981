//! Compositor-layer error kinds (spec.md §7). A [`SinkError`] is logged by
//! the tick loop, never propagated back into widget code (spec.md §4.9.5).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("frame sink rejected frame: {0}")]
    Rejected(String),
}
