//! CPU utilization widget: single-value text/bar/graph/gauge, or a
//! near-square per-core grid when `cfg.extra["per_core"]` is `true`
//! (spec.md §4.9). Acquiring the actual percentage from the OS is out of
//! scope here; this widget is driven by whatever [`MetricSource`] /
//! [`SeriesMetricSource`] the runtime wires in, defaulting to a constant
//! zero reading until it is.

use crate::base::BaseWidget;
use crate::error::WidgetError;
use crate::metric_source::{ConstantSource, MetricSource, SeriesMetricSource};
use crate::Widget;
use oled_config::{IntOrRange, WidgetCfg};
use oled_primitives::{Frame, FixedRingBuffer};
use oled_strategy::{self, BarDirection, BarParams, GaugeParams, GraphParams, Mode, Strategy, TextParams};
use oled_text::BuiltinFont;
use std::time::Instant;

const HISTORY_CAP: usize = 64;

struct NoSeries;
impl SeriesMetricSource for NoSeries {
    fn read(&self) -> Vec<f32> {
        Vec::new()
    }
}

pub struct CpuWidget {
    base: BaseWidget,
    mode: Mode,
    per_core: bool,
    /// Restricts the per-core grid to cores `[min, max]` inclusive when
    /// set (spec.md §3.2's `IntOrRange` adapter, spec.md §9); `None`
    /// shows every core the series source reports.
    core_range: Option<IntOrRange>,
    fill_color: u8,
    bar_direction: BarDirection,
    bar_border: Option<u8>,
    history: FixedRingBuffer<f32>,
    per_core_histories: Vec<FixedRingBuffer<f32>>,
    value: f32,
    core_values: Vec<f32>,
    source: Box<dyn MetricSource>,
    series_source: Box<dyn SeriesMetricSource>,
}

impl CpuWidget {
    pub fn from_cfg(cfg: &WidgetCfg) -> Result<Self, WidgetError> {
        let id = cfg.id.clone().unwrap_or_else(|| "cpu".to_string());
        let update_interval = cfg.update_interval.unwrap_or(oled_config::DEFAULT_UPDATE_INTERVAL_SECS);
        let per_core = cfg.extra.get("per_core").and_then(|v| v.as_bool()).unwrap_or(false);
        let core_range = cfg
            .extra
            .get("core_range")
            .cloned()
            .map(serde_json::from_value::<IntOrRange>)
            .transpose()
            .map_err(|e| WidgetError::Construction { widget_id: id.clone(), reason: format!("invalid `core_range` field: {e}") })?;
        let history_cap = cfg.graph.as_ref().map(|g| g.history as usize).unwrap_or(30).clamp(1, HISTORY_CAP);
        let bar_direction = match cfg.bar.as_ref().and_then(|b| b.direction.as_deref()) {
            Some("vertical") => BarDirection::Vertical,
            _ => BarDirection::Horizontal,
        };
        let bar_border = if cfg.bar.as_ref().and_then(|b| b.border).unwrap_or(false) { cfg.colors.fill } else { None };
        Ok(Self {
            base: BaseWidget::new(id, cfg.position, cfg.style.clone(), update_interval),
            mode: Mode::from_tag(cfg.mode.as_deref()),
            per_core,
            core_range,
            fill_color: cfg.colors.fill.unwrap_or(255),
            bar_direction,
            bar_border,
            history: FixedRingBuffer::new(history_cap),
            per_core_histories: Vec::new(),
            value: 0.0,
            core_values: Vec::new(),
            source: Box::new(ConstantSource(0.0)),
            series_source: Box::new(NoSeries),
        })
    }

    pub fn with_source(mut self, source: Box<dyn MetricSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_series_source(mut self, source: Box<dyn SeriesMetricSource>) -> Self {
        self.series_source = source;
        self
    }
}

impl Widget for CpuWidget {
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
        if self.per_core {
            let mut values = self.series_source.read();
            if let Some(range) = self.core_range {
                let lo = range.min.max(0) as usize;
                let hi = (range.max.max(0) as usize).min(values.len().saturating_sub(1));
                values = if lo <= hi && lo < values.len() { values[lo..=hi].to_vec() } else { Vec::new() };
            }
            self.core_values = values;
            if self.per_core_histories.len() != self.core_values.len() {
                self.per_core_histories = (0..self.core_values.len()).map(|_| FixedRingBuffer::new(self.history.cap())).collect();
            }
            for (h, &v) in self.per_core_histories.iter_mut().zip(&self.core_values) {
                h.push(v);
            }
        } else {
            self.value = self.source.read();
            self.history.push(self.value);
        }
        Ok(())
    }

    fn render(&mut self, _now: Instant) -> Frame {
        let mut frame = self.base.create_canvas();
        let w = self.base.position().w as i64;
        let h = self.base.position().h as i64;

        if self.per_core && !self.core_values.is_empty() {
            let histories: Vec<Vec<f32>> = self.per_core_histories.iter().map(|h| h.to_slice()).collect();
            oled_strategy::render_grid_metric(&mut frame, (0, 0, w, h), &self.core_values, &histories, self.mode, self.fill_color, self.history.cap(), 1, None);
        } else {
            let history: Vec<f32> = self.history.to_slice();
            let font = BuiltinFont;
            let text = format!("{:.0}%", self.value);
            let strategy = match self.mode {
                Mode::Bar => Strategy::Bar(BarParams { direction: self.bar_direction, fill_color: self.fill_color, border: self.bar_border }),
                Mode::Graph => Strategy::Graph(GraphParams { history: self.history.cap(), fill_color: self.fill_color, line_color: None }),
                Mode::Gauge => Strategy::Gauge(GaugeParams { show_ticks: false, arc_color: self.fill_color, needle_color: self.fill_color, ticks_color: self.fill_color }),
                Mode::Text => Strategy::Text(TextParams { face: &font, h_align: Default::default(), v_align: Default::default(), color: self.fill_color, text: &text }),
            };
            oled_strategy::render_metric(&mut frame, (0, 0, w, h), self.value, &history, &strategy);
        }

        self.base.apply_border(&mut frame);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metric_source::AtomicSource;
    use oled_config::PositionCfg;
    use std::sync::Arc;

    fn cfg() -> WidgetCfg {
        WidgetCfg { id: Some("cpu_0".into()), widget_type: "cpu".into(), position: PositionCfg { x: 0, y: 0, w: 30, h: 10, z: 0 }, ..Default::default() }
    }

    #[test]
    fn single_value_bar_mode_fills_with_reading() {
        let mut c = cfg();
        c.mode = Some("bar".into());
        let mut widget = CpuWidget::from_cfg(&c).unwrap().with_source(Box::new(ConstantSource(60.0)));
        widget.update(Instant::now()).unwrap();
        let frame = widget.render(Instant::now());
        assert!(frame.pixels().iter().any(|&p| p == 255));
    }

    #[test]
    fn per_core_grid_renders_each_core() {
        let mut c = cfg();
        c.extra.insert("per_core".into(), serde_json::Value::Bool(true));
        c.mode = Some("bar".into());
        let source = Arc::new(AtomicSource::new(0.0));
        struct Wrap(Arc<AtomicSource>);
        impl SeriesMetricSource for Wrap {
            fn read(&self) -> Vec<f32> {
                vec![self.0.read(), self.0.read() + 10.0]
            }
        }
        let mut widget = CpuWidget::from_cfg(&c).unwrap().with_series_source(Box::new(Wrap(source)));
        widget.update(Instant::now()).unwrap();
        let frame = widget.render(Instant::now());
        assert_eq!(frame.width(), 30);
    }

    struct FourCores;
    impl SeriesMetricSource for FourCores {
        fn read(&self) -> Vec<f32> {
            vec![10.0, 20.0, 30.0, 40.0]
        }
    }

    #[test]
    fn core_range_accepts_a_bare_scalar_as_single_core() {
        let mut c = cfg();
        c.extra.insert("per_core".into(), serde_json::Value::Bool(true));
        c.extra.insert("core_range".into(), serde_json::json!(1));
        let mut widget = CpuWidget::from_cfg(&c).unwrap().with_series_source(Box::new(FourCores));
        widget.update(Instant::now()).unwrap();
        assert_eq!(widget.core_values, vec![20.0]);
    }

    #[test]
    fn core_range_restricts_to_an_explicit_min_max() {
        let mut c = cfg();
        c.extra.insert("per_core".into(), serde_json::Value::Bool(true));
        c.extra.insert("core_range".into(), serde_json::json!({"min": 1, "max": 2}));
        let mut widget = CpuWidget::from_cfg(&c).unwrap().with_series_source(Box::new(FourCores));
        widget.update(Instant::now()).unwrap();
        assert_eq!(widget.core_values, vec![20.0, 30.0]);
    }

    #[test]
    fn absent_core_range_shows_every_core() {
        let mut c = cfg();
        c.extra.insert("per_core".into(), serde_json::Value::Bool(true));
        let mut widget = CpuWidget::from_cfg(&c).unwrap().with_series_source(Box::new(FourCores));
        widget.update(Instant::now()).unwrap();
        assert_eq!(widget.core_values, vec![10.0, 20.0, 30.0, 40.0]);
    }
}
