//! Memory utilization widget: single-value text/bar/graph/gauge display of
//! a 0..=100 percentage (spec.md §4.9).

use crate::base::BaseWidget;
use crate::error::WidgetError;
use crate::metric_source::{ConstantSource, MetricSource};
use crate::Widget;
use oled_config::WidgetCfg;
use oled_primitives::{Frame, FixedRingBuffer};
use oled_strategy::{BarDirection, BarParams, GaugeParams, GraphParams, Mode, Strategy, TextParams};
use oled_text::BuiltinFont;
use std::time::Instant;

pub struct MemoryWidget {
    base: BaseWidget,
    mode: Mode,
    fill_color: u8,
    bar_direction: BarDirection,
    history: FixedRingBuffer<f32>,
    value: f32,
    source: Box<dyn MetricSource>,
}

impl MemoryWidget {
    pub fn from_cfg(cfg: &WidgetCfg) -> Result<Self, WidgetError> {
        let id = cfg.id.clone().unwrap_or_else(|| "memory".to_string());
        let update_interval = cfg.update_interval.unwrap_or(oled_config::DEFAULT_UPDATE_INTERVAL_SECS);
        let history_cap = cfg.graph.as_ref().map(|g| g.history as usize).unwrap_or(30).clamp(1, 64);
        let bar_direction = match cfg.bar.as_ref().and_then(|b| b.direction.as_deref()) {
            Some("horizontal") => BarDirection::Horizontal,
            _ => BarDirection::Vertical,
        };
        Ok(Self {
            base: BaseWidget::new(id, cfg.position, cfg.style.clone(), update_interval),
            mode: Mode::from_tag(cfg.mode.as_deref()),
            fill_color: cfg.colors.fill.unwrap_or(255),
            bar_direction,
            history: FixedRingBuffer::new(history_cap),
            value: 0.0,
            source: Box::new(ConstantSource(0.0)),
        })
    }

    pub fn with_source(mut self, source: Box<dyn MetricSource>) -> Self {
        self.source = source;
        self
    }
}

impl Widget for MemoryWidget {
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
        self.value = self.source.read();
        self.history.push(self.value);
        Ok(())
    }

    fn render(&mut self, _now: Instant) -> Frame {
        let mut frame = self.base.create_canvas();
        let w = self.base.position().w as i64;
        let h = self.base.position().h as i64;
        let history = self.history.to_slice();
        let font = BuiltinFont;
        let text = format!("{:.0}%", self.value);
        let strategy = match self.mode {
            Mode::Bar => Strategy::Bar(BarParams { direction: self.bar_direction, fill_color: self.fill_color, border: None }),
            Mode::Graph => Strategy::Graph(GraphParams { history: self.history.cap(), fill_color: self.fill_color, line_color: None }),
            Mode::Gauge => Strategy::Gauge(GaugeParams { show_ticks: false, arc_color: self.fill_color, needle_color: self.fill_color, ticks_color: self.fill_color }),
            Mode::Text => Strategy::Text(TextParams { face: &font, h_align: Default::default(), v_align: Default::default(), color: self.fill_color, text: &text }),
        };
        oled_strategy::render_metric(&mut frame, (0, 0, w, h), self.value, &history, &strategy);
        self.base.apply_border(&mut frame);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oled_config::PositionCfg;

    fn cfg() -> WidgetCfg {
        WidgetCfg { id: Some("memory_0".into()), widget_type: "memory".into(), position: PositionCfg { x: 0, y: 0, w: 20, h: 20, z: 0 }, ..Default::default() }
    }

    #[test]
    fn gauge_mode_draws_needle_for_nonzero_reading() {
        let mut c = cfg();
        c.mode = Some("gauge".into());
        let mut widget = MemoryWidget::from_cfg(&c).unwrap().with_source(Box::new(ConstantSource(75.0)));
        widget.update(Instant::now()).unwrap();
        let frame = widget.render(Instant::now());
        assert!(frame.pixels().iter().any(|&p| p != 0));
    }
}
