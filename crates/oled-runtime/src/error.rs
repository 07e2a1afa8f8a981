//! Runtime-layer error kinds (spec.md §7): supervisor lifecycle misuse and
//! the config/widget errors it forwards while building a compositor.

use oled_config::ConfigError;
use oled_widgets::WidgetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Widget(#[from] WidgetError),

    #[error("supervisor is already running")]
    AlreadyRunning,

    #[error("supervisor is not running")]
    NotRunning,

    #[error("failed to deliver command to the tick loop task")]
    CommandChannelClosed,
}
