//! The fixed-rate tick loop: calls `update()`/`render()` on each widget in
//! z-order, composes the results into one display-sized frame, and hands it
//! to a [`FrameSink`] (spec.md §4.9).
//!
//! Per-widget scheduling state (`next_update_at`) lives on
//! [`oled_widgets::BaseWidget`] itself rather than in a separate map here --
//! each widget already tracks when it was last updated, so the compositor
//! only asks `needs_update()` instead of duplicating that bookkeeping
//! (documented as an implementation-level decision in the project's design
//! notes). `render()` is defined never to fail (a widget with nothing
//! meaningful to show renders its own placeholder, e.g. "connecting...");
//! this replaces spec.md's ERR-status-frame substitution for render errors
//! with an equivalent widget-local mechanism. `update()` failures are still
//! handled here exactly as specified: logged, with the previous frame reused.

mod error;
mod sink;

pub use error::SinkError;
pub use sink::{FrameSink, NullSink};

use oled_primitives::Frame;
use oled_widgets::Widget;
use std::time::Instant;
use tracing::warn;

struct WidgetSlot {
    widget: Box<dyn Widget>,
    last_frame: Frame,
}

/// Owns the widget list, the per-widget frame cache, and the sink. One
/// instance per active profile; the runtime supervisor swaps the whole
/// thing at reload (spec.md §4.11).
pub struct Compositor {
    width: u32,
    height: u32,
    background: u8,
    slots: Vec<WidgetSlot>,
    sink: Box<dyn FrameSink>,
}

impl Compositor {
    /// Builds a compositor from an already-constructed widget list,
    /// stable-sorted ascending by `z` (ties keep config order, spec.md
    /// §4.9's ordering rule).
    pub fn new(width: u32, height: u32, background: u8, mut widgets: Vec<Box<dyn Widget>>, sink: Box<dyn FrameSink>) -> Self {
        widgets.sort_by_key(|w| w.position().z);
        let slots = widgets
            .into_iter()
            .map(|widget| {
                let blank = Frame::new(widget.position().w, widget.position().h, 0);
                WidgetSlot { widget, last_frame: blank }
            })
            .collect();
        Self { width, height, background, slots, sink }
    }

    pub fn widget_count(&self) -> usize {
        self.slots.len()
    }

    /// Consumes the compositor, dropping widgets highest-z-first (spec.md
    /// §5's shutdown ordering) rather than the construction order.
    pub fn shutdown(mut self) {
        self.slots.reverse();
        self.slots.clear();
    }

    /// Runs one tick: update due widgets, render all, compose, and send.
    /// Returns the composed frame in addition to forwarding it to the sink,
    /// so callers (tests, the supervisor) can inspect it without a second
    /// sink implementation.
    pub fn tick(&mut self, now: Instant) -> Frame {
        for slot in &mut self.slots {
            if slot.widget.needs_update(now) {
                if let Err(e) = slot.widget.update(now) {
                    warn!(target: "compositor.tick", widget_id = slot.widget.id(), error = %e, "update failed, reusing previous frame");
                    continue;
                }
            }
            slot.last_frame = slot.widget.render(now);
        }

        let mut frame = Frame::new(self.width, self.height, self.background);
        for slot in &self.slots {
            let position = slot.widget.position();
            frame.blit(&slot.last_frame, position.x as i64, position.y as i64);
        }

        if let Err(e) = self.sink.send(&frame) {
            warn!(target: "compositor.tick", error = %e, "sink rejected frame");
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oled_config::{PositionCfg, StyleCfg, WidgetCfg};
    use oled_widgets::registry::WidgetRegistry;

    fn widget_cfg(id: &str, widget_type: &str, z: i32) -> WidgetCfg {
        WidgetCfg {
            id: Some(id.to_string()),
            widget_type: widget_type.to_string(),
            position: PositionCfg { x: 0, y: 0, w: 20, h: 10, z },
            style: StyleCfg::default(),
            ..Default::default()
        }
    }

    #[test]
    fn tick_composes_widgets_in_z_order_and_sends_to_sink() {
        let registry = WidgetRegistry::with_builtin_types();
        let w1 = registry.build(&widget_cfg("clock_0", "clock", 1)).unwrap();
        let w2 = registry.build(&widget_cfg("memory_0", "memory", 0)).unwrap();
        let mut compositor = Compositor::new(64, 32, 0, vec![w1, w2], Box::new(NullSink::default()));
        assert_eq!(compositor.widget_count(), 2);
        let frame = compositor.tick(Instant::now());
        assert_eq!(frame.width(), 64);
        assert_eq!(frame.height(), 32);
    }

    #[test]
    fn update_failure_reuses_previous_frame() {
        struct FlakyWidget {
            position: oled_config::PositionCfg,
            fail_next: bool,
        }
        impl Widget for FlakyWidget {
            fn id(&self) -> &str {
                "flaky"
            }
            fn position(&self) -> oled_config::PositionCfg {
                self.position
            }
            fn style(&self) -> StyleCfg {
                StyleCfg::default()
            }
            fn update_interval(&self) -> std::time::Duration {
                std::time::Duration::from_millis(1)
            }
            fn needs_update(&self, _now: Instant) -> bool {
                true
            }
            fn update(&mut self, _now: Instant) -> Result<(), oled_widgets::WidgetError> {
                if self.fail_next {
                    Err(oled_widgets::WidgetError::Update { widget_id: "flaky".into(), reason: "boom".into() })
                } else {
                    Ok(())
                }
            }
            fn render(&mut self, _now: Instant) -> Frame {
                Frame::new(self.position.w, self.position.h, if self.fail_next { 0 } else { 255 })
            }
        }

        let widget = Box::new(FlakyWidget { position: PositionCfg { x: 0, y: 0, w: 4, h: 4, z: 0 }, fail_next: false });
        let mut compositor = Compositor::new(8, 8, 0, vec![widget], Box::new(NullSink::default()));
        let first = compositor.tick(Instant::now());
        assert_eq!(first.get(0, 0), 255);

        compositor.slots[0].widget = Box::new(FlakyWidget { position: PositionCfg { x: 0, y: 0, w: 4, h: 4, z: 0 }, fail_next: true });
        let second = compositor.tick(Instant::now());
        // update() failed, so the previous (all-255) frame is reused rather
        // than the failing widget's own all-0 render.
        assert_eq!(second.get(0, 0), 255);
    }
}
