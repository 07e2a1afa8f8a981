//! [`BaseWidget`]: the position/style/update-interval bundle every widget
//! type embeds and delegates its [`crate::Widget`] boilerplate to
//! (spec.md §4.7). Concrete widgets hold one and implement only their own
//! `update`/`render` logic.

use oled_config::{PositionCfg, StyleCfg};
use oled_primitives::{Frame, Rect};
use std::time::{Duration, Instant};

/// Shared state behind every widget: where it sits, how it's styled, how
/// often it wants to be polled, and when it last was.
#[derive(Debug, Clone)]
pub struct BaseWidget {
    id: String,
    position: PositionCfg,
    style: StyleCfg,
    update_interval: Duration,
    last_updated: Option<Instant>,
}

impl BaseWidget {
    pub fn new(id: impl Into<String>, position: PositionCfg, style: StyleCfg, update_interval_secs: f32) -> Self {
        Self {
            id: id.into(),
            position,
            style,
            update_interval: Duration::from_secs_f32(update_interval_secs.max(0.0)),
            last_updated: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> PositionCfg {
        self.position
    }

    pub fn style(&self) -> StyleCfg {
        self.style.clone()
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.position.x as i64, self.position.y as i64, self.position.w, self.position.h, self.position.z)
    }

    /// True on the first call, and thereafter once `update_interval` has
    /// elapsed since the last call that returned true (spec.md §4.7).
    pub fn needs_update(&self, now: Instant) -> bool {
        match self.last_updated {
            None => true,
            Some(last) => now.duration_since(last) >= self.update_interval,
        }
    }

    pub fn mark_updated(&mut self, now: Instant) {
        self.last_updated = Some(now);
    }

    /// A canvas sized to this widget's rect, pre-filled with its background
    /// style.
    pub fn create_canvas(&self) -> Frame {
        Frame::new(self.position.w, self.position.h, self.style.background)
    }

    /// Draws the configured border one pixel inside the canvas, if any
    /// (`border < 0` means no border, per [`oled_config::StyleCfg`]).
    pub fn apply_border(&self, frame: &mut Frame) {
        if self.style.border < 0 {
            return;
        }
        let color = self.style.border as u8;
        frame.draw_rect_outline(0, 0, self.position.w as i64, self.position.h as i64, color);
    }
}
