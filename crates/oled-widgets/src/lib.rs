//! Widget catalogue: the [`Widget`] trait, the shared [`base::BaseWidget`]
//! plumbing, the type registry, the connection-state machine for
//! network-backed widgets, and one module per cataloged widget type
//! (spec.md §4.7-§4.10).

pub mod base;
pub mod byte_rate;
pub mod connection;
mod error;
pub mod metric_source;
pub mod registry;
pub mod types;

pub use base::BaseWidget;
pub use byte_rate::ByteRateConverter;
pub use connection::{ConnectionManager, ConnectionState};
pub use error::WidgetError;
pub use metric_source::{AtomicSource, ChannelSource, ConstantSource, DualMetricSource, MetricSource, SeriesMetricSource};
pub use registry::WidgetRegistry;

use oled_config::{PositionCfg, StyleCfg};
use oled_primitives::Frame;
use std::time::{Duration, Instant};

/// Everything the compositor needs from a widget instance: its identity,
/// its geometry/style (for blitting), its polling cadence, and the two
/// operations it drives each tick -- `update` to refresh internal state,
/// `render` to rasterize the current state into a canvas (spec.md §4.7,
/// §5 tick pipeline).
pub trait Widget: Send {
    fn id(&self) -> &str;
    fn position(&self) -> PositionCfg;
    fn style(&self) -> StyleCfg;
    fn update_interval(&self) -> Duration;

    /// Whether this widget wants an `update()` call at `now`, given its
    /// own bookkeeping of when it last ran.
    fn needs_update(&self, now: Instant) -> bool;

    /// Refreshes internal state (reads its [`MetricSource`], advances
    /// animators, ...). Errors are contained per widget by the compositor:
    /// on failure the previous frame is reused (spec.md §7).
    fn update(&mut self, now: Instant) -> Result<(), WidgetError>;

    /// Rasterizes current state into a frame sized to [`Widget::position`].
    /// Must not fail; a widget that cannot render valid content should
    /// fall back to a blank or status canvas rather than panic.
    fn render(&mut self, now: Instant) -> Frame;
}
