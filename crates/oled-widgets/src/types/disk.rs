//! Disk I/O widget: dual read/write text/bar/graph/gauge display
//! (spec.md §4.9), structurally identical to the network widget but keyed
//! on the `read`/`write` color pair instead of `rx`/`tx`, and sharing the
//! same [`ByteRateConverter`] auto-scaling.

use crate::base::BaseWidget;
use crate::byte_rate::{format_byte_rate, max_speed_mbps_from, ByteRateConverter};
use crate::error::WidgetError;
use crate::metric_source::DualMetricSource;
use crate::Widget;
use oled_config::WidgetCfg;
use oled_primitives::{Frame, FixedRingBuffer};
use oled_strategy::Mode;
use oled_text::{BuiltinFont, calculate_text_position, draw_text_at};
use std::time::Instant;

struct ZeroDual;
impl DualMetricSource for ZeroDual {
    fn read(&self) -> (f32, f32) {
        (0.0, 0.0)
    }
}

pub struct DiskWidget {
    base: BaseWidget,
    mode: Mode,
    read_color: u8,
    write_color: u8,
    history_cap: usize,
    read_history: FixedRingBuffer<f32>,
    write_history: FixedRingBuffer<f32>,
    read_val: f32,
    write_val: f32,
    read_converter: ByteRateConverter,
    write_converter: ByteRateConverter,
    source: Box<dyn DualMetricSource>,
}

impl DiskWidget {
    pub fn from_cfg(cfg: &WidgetCfg) -> Result<Self, WidgetError> {
        let id = cfg.id.clone().unwrap_or_else(|| "disk".to_string());
        let update_interval = cfg.update_interval.unwrap_or(oled_config::DEFAULT_UPDATE_INTERVAL_SECS);
        let history_cap = cfg.graph.as_ref().map(|g| g.history as usize).unwrap_or(30).clamp(1, 64);
        let max_speed_mbps = max_speed_mbps_from(&cfg.extra);
        Ok(Self {
            base: BaseWidget::new(id, cfg.position, cfg.style.clone(), update_interval),
            mode: Mode::from_tag(cfg.mode.as_deref()),
            read_color: cfg.colors.read.unwrap_or(255),
            write_color: cfg.colors.write.unwrap_or(180),
            history_cap,
            read_history: FixedRingBuffer::new(history_cap),
            write_history: FixedRingBuffer::new(history_cap),
            read_val: 0.0,
            write_val: 0.0,
            read_converter: ByteRateConverter::new(max_speed_mbps),
            write_converter: ByteRateConverter::new(max_speed_mbps),
            source: Box::new(ZeroDual),
        })
    }

    pub fn with_source(mut self, source: Box<dyn DualMetricSource>) -> Self {
        self.source = source;
        self
    }
}

impl Widget for DiskWidget {
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
        let (read_val, write_val) = self.source.read();
        self.read_val = read_val;
        self.write_val = write_val;
        self.read_history.push(self.read_converter.to_percent(read_val));
        self.write_history.push(self.write_converter.to_percent(write_val));
        Ok(())
    }

    fn render(&mut self, _now: Instant) -> Frame {
        let mut frame = self.base.create_canvas();
        let w = self.base.position().w as i64;
        let h = self.base.position().h as i64;

        if self.mode == Mode::Text {
            let font = BuiltinFont;
            let text = format!("R{} W{}", format_byte_rate(self.read_val), format_byte_rate(self.write_val));
            let (x, y) = calculate_text_position(&font, &text, (0, 0, w, h), Default::default(), Default::default());
            draw_text_at(&font, &mut frame, &text, x, y, self.read_color, (0, 0, w, h));
        } else {
            let read_pct = self.read_converter.to_percent(self.read_val);
            let write_pct = self.write_converter.to_percent(self.write_val);
            oled_strategy::render_dual_metric(
                &mut frame,
                (0, 0, w, h),
                read_pct,
                write_pct,
                &self.read_history.to_slice(),
                &self.write_history.to_slice(),
                self.mode,
                self.read_color,
                self.write_color,
                self.history_cap,
            );
        }

        self.base.apply_border(&mut frame);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oled_config::PositionCfg;

    fn cfg() -> WidgetCfg {
        WidgetCfg { id: Some("disk_0".into()), widget_type: "disk".into(), position: PositionCfg { x: 0, y: 0, w: 32, h: 16, z: 0 }, ..Default::default() }
    }

    struct Fixed(f32, f32);
    impl DualMetricSource for Fixed {
        fn read(&self) -> (f32, f32) {
            (self.0, self.1)
        }
    }

    #[test]
    fn graph_mode_overlays_read_and_write_histories() {
        let mut c = cfg();
        c.mode = Some("graph".into());
        let mut widget = DiskWidget::from_cfg(&c).unwrap().with_source(Box::new(Fixed(40.0, 10.0)));
        for _ in 0..3 {
            widget.update(Instant::now()).unwrap();
        }
        let frame = widget.render(Instant::now());
        assert!(frame.pixels().iter().any(|&p| p != 0));
    }

    #[test]
    fn fixed_max_speed_caps_bar_scale() {
        let mut c = cfg();
        c.mode = Some("bar".into());
        c.extra.insert("max_speed_mbps".into(), serde_json::json!(80.0)); // 10 MiB/s cap
        const MIB: f32 = 1024.0 * 1024.0;
        let mut widget = DiskWidget::from_cfg(&c).unwrap().with_source(Box::new(Fixed(MIB, MIB * 10.0)));
        widget.update(Instant::now()).unwrap();
        let read_pct = widget.read_converter.to_percent(widget.read_val);
        let write_pct = widget.write_converter.to_percent(widget.write_val);
        assert!((read_pct - 10.0).abs() < 1.0);
        assert!((write_pct - 100.0).abs() < 0.1);
    }
}
