//! Keyboard lock-key indicator widget: three on/off lamps for caps lock,
//! num lock, and scroll lock, laid out left to right (spec.md §4.9).

use crate::base::BaseWidget;
use crate::error::WidgetError;
use crate::metric_source::SeriesMetricSource;
use crate::Widget;
use oled_config::WidgetCfg;
use oled_primitives::Frame;
use std::time::Instant;

struct AllOff;
impl SeriesMetricSource for AllOff {
    fn read(&self) -> Vec<f32> {
        vec![0.0, 0.0, 0.0]
    }
}

pub struct KeyboardWidget {
    base: BaseWidget,
    on_color: u8,
    off_color: u8,
    states: Vec<bool>,
    source: Box<dyn SeriesMetricSource>,
}

impl KeyboardWidget {
    pub fn from_cfg(cfg: &WidgetCfg) -> Result<Self, WidgetError> {
        let id = cfg.id.clone().unwrap_or_else(|| "keyboard".to_string());
        let update_interval = cfg.update_interval.unwrap_or(oled_config::DEFAULT_UPDATE_INTERVAL_SECS);
        Ok(Self {
            base: BaseWidget::new(id, cfg.position, cfg.style.clone(), update_interval),
            on_color: cfg.colors.on.unwrap_or(255),
            off_color: cfg.colors.off.unwrap_or(40),
            states: vec![false, false, false],
            source: Box::new(AllOff),
        })
    }

    pub fn with_source(mut self, source: Box<dyn SeriesMetricSource>) -> Self {
        self.source = source;
        self
    }
}

impl Widget for KeyboardWidget {
    fn id(&self) -> &str {
        self.base.id()
    }

    fn position(&self) -> oled_config::PositionCfg {
        self.base.position()
    }

    fn style(&self) -> oled_config::StyleCfg {
        self.base.style()
    }

    fn update_interval(&self) -> std::time::Duration {
        self.base.update_interval()
    }

    fn needs_update(&self, now: Instant) -> bool {
        self.base.needs_update(now)
    }

    fn update(&mut self, now: Instant) -> Result<(), WidgetError> {
        self.base.mark_updated(now);
        self.states = self.source.read().into_iter().map(|v| v != 0.0).collect();
        Ok(())
    }

    fn render(&mut self, _now: Instant) -> Frame {
        let mut frame = self.base.create_canvas();
        let w = self.base.position().w as i64;
        let h = self.base.position().h as i64;
        let n = self.states.len().max(1) as i64;
        let cell_w = w / n;
        let lamp = (cell_w.min(h) / 2).max(1);
        for (i, &on) in self.states.iter().enumerate() {
            let cx = i as i64 * cell_w + cell_w / 2;
            let cy = h / 2;
            frame.fill_circle(cx, cy, lamp, if on { self.on_color } else { self.off_color });
        }
        self.base.apply_border(&mut frame);
        frame
    }
}
