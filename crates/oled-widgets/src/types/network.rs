//! Network throughput widget: dual rx/tx text/bar/graph/gauge display
//! (spec.md §4.9). Values arrive from the upstream [`DualMetricSource`]
//! in bytes/sec; a per-channel [`ByteRateConverter`] auto-scales them to
//! the `0..100` percent the display strategies expect (fixed
//! `max_speed_mbps` cap, or recent-max rescaling when it's `-1`) and
//! formats the text-mode magnitude string.

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

pub struct NetworkWidget {
    base: BaseWidget,
    mode: Mode,
    rx_color: u8,
    tx_color: u8,
    history_cap: usize,
    rx_history: FixedRingBuffer<f32>,
    tx_history: FixedRingBuffer<f32>,
    rx: f32,
    tx: f32,
    rx_converter: ByteRateConverter,
    tx_converter: ByteRateConverter,
    source: Box<dyn DualMetricSource>,
}

impl NetworkWidget {
    pub fn from_cfg(cfg: &WidgetCfg) -> Result<Self, WidgetError> {
        let id = cfg.id.clone().unwrap_or_else(|| "network".to_string());
        let update_interval = cfg.update_interval.unwrap_or(oled_config::DEFAULT_UPDATE_INTERVAL_SECS);
        let history_cap = cfg.graph.as_ref().map(|g| g.history as usize).unwrap_or(30).clamp(1, 64);
        let max_speed_mbps = max_speed_mbps_from(&cfg.extra);
        Ok(Self {
            base: BaseWidget::new(id, cfg.position, cfg.style.clone(), update_interval),
            mode: Mode::from_tag(cfg.mode.as_deref()),
            rx_color: cfg.colors.rx.unwrap_or(255),
            tx_color: cfg.colors.tx.unwrap_or(180),
            history_cap,
            rx_history: FixedRingBuffer::new(history_cap),
            tx_history: FixedRingBuffer::new(history_cap),
            rx: 0.0,
            tx: 0.0,
            rx_converter: ByteRateConverter::new(max_speed_mbps),
            tx_converter: ByteRateConverter::new(max_speed_mbps),
            source: Box::new(ZeroDual),
        })
    }

    pub fn with_source(mut self, source: Box<dyn DualMetricSource>) -> Self {
        self.source = source;
        self
    }
}

impl Widget for NetworkWidget {
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
        let (rx, tx) = self.source.read();
        self.rx = rx;
        self.tx = tx;
        self.rx_history.push(self.rx_converter.to_percent(rx));
        self.tx_history.push(self.tx_converter.to_percent(tx));
        Ok(())
    }

    fn render(&mut self, _now: Instant) -> Frame {
        let mut frame = self.base.create_canvas();
        let w = self.base.position().w as i64;
        let h = self.base.position().h as i64;

        if self.mode == Mode::Text {
            let font = BuiltinFont;
            let text = format!("↓{} ↑{}", format_byte_rate(self.rx), format_byte_rate(self.tx));
            let (x, y) = calculate_text_position(&font, &text, (0, 0, w, h), Default::default(), Default::default());
            draw_text_at(&font, &mut frame, &text, x, y, self.rx_color, (0, 0, w, h));
        } else {
            let rx_pct = self.rx_converter.to_percent(self.rx);
            let tx_pct = self.tx_converter.to_percent(self.tx);
            oled_strategy::render_dual_metric(
                &mut frame,
                (0, 0, w, h),
                rx_pct,
                tx_pct,
                &self.rx_history.to_slice(),
                &self.tx_history.to_slice(),
                self.mode,
                self.rx_color,
                self.tx_color,
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
        WidgetCfg { id: Some("network_0".into()), widget_type: "network".into(), position: PositionCfg { x: 0, y: 0, w: 32, h: 16, z: 0 }, ..Default::default() }
    }

    struct Fixed(f32, f32);
    impl DualMetricSource for Fixed {
        fn read(&self) -> (f32, f32) {
            (self.0, self.1)
        }
    }

    #[test]
    fn bar_mode_stacks_rx_over_tx() {
        let mut c = cfg();
        c.mode = Some("bar".into());
        let mut widget = NetworkWidget::from_cfg(&c).unwrap().with_source(Box::new(Fixed(100.0, 50.0)));
        widget.update(Instant::now()).unwrap();
        let frame = widget.render(Instant::now());
        assert!(frame.pixels().iter().any(|&p| p != 0));
    }

    #[test]
    fn auto_scale_does_not_saturate_every_channel_at_different_magnitudes() {
        // Mirrors the mandatory network auto-scale scenario: steady 1,
        // 10, and 100 MiB/s samples must each settle near full scale
        // rather than the smaller ones reading as a sliver against a
        // cap sized for the largest.
        const MIB: f32 = 1024.0 * 1024.0;
        for steady in [1.0 * MIB, 10.0 * MIB, 100.0 * MIB] {
            let mut c = cfg();
            c.mode = Some("bar".into());
            let mut widget = NetworkWidget::from_cfg(&c).unwrap().with_source(Box::new(Fixed(steady, steady)));
            for _ in 0..5 {
                widget.update(Instant::now()).unwrap();
            }
            let pct = widget.rx_converter.to_percent(widget.rx);
            assert!(pct > 95.0, "steady {steady} B/s should settle near full scale, got {pct}");
        }
    }

    #[test]
    fn fixed_max_speed_caps_bar_scale() {
        let mut c = cfg();
        c.mode = Some("bar".into());
        c.extra.insert("max_speed_mbps".into(), serde_json::json!(8.0)); // 1 MiB/s cap
        const MIB: f32 = 1024.0 * 1024.0;
        let mut widget = NetworkWidget::from_cfg(&c).unwrap().with_source(Box::new(Fixed(MIB / 2.0, MIB * 2.0)));
        widget.update(Instant::now()).unwrap();
        let rx_pct = widget.rx_converter.to_percent(widget.rx);
        let tx_pct = widget.tx_converter.to_percent(widget.tx);
        assert!((rx_pct - 50.0).abs() < 1.0);
        assert!((tx_pct - 100.0).abs() < 0.1);
    }

    #[test]
    fn text_mode_formats_magnitude() {
        let mut c = cfg();
        c.mode = Some("text".into());
        const MIB: f32 = 1024.0 * 1024.0;
        let mut widget = NetworkWidget::from_cfg(&c).unwrap().with_source(Box::new(Fixed(5.0 * MIB, 2048.0)));
        widget.update(Instant::now()).unwrap();
        let frame = widget.render(Instant::now());
        assert!(frame.pixels().iter().any(|&p| p != 0));
    }
}
