//! Widget-layer error kinds (spec.md §7). `Update`/`Render` errors are
//! contained per widget by the compositor; `Construction` aborts the whole
//! pipeline build; `Connection` is stored in a widget's
//! [`crate::connection::ConnectionManager`] and surfaced as on-screen status.

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum WidgetError {
    #[error("widget `{widget_id}` construction failed: {reason}")]
    Construction { widget_id: String, reason: String },

    #[error("widget `{widget_id}` update failed: {reason}")]
    Update { widget_id: String, reason: String },

    #[error("widget `{widget_id}` render failed: {reason}")]
    Render { widget_id: String, reason: String },

    #[error("widget `{widget_id}` connection error: {reason}")]
    Connection { widget_id: String, reason: String },
}
