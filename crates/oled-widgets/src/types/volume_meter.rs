//! Stereo volume meter widget: dual left/right RMS/peak bars with decay,
//! peak hold, and clipping (spec.md §4.9), a [`DualMetricSource`]
//! consumer keyed on the `left`/`right` color pair instead of `rx`/`tx`.
//! Configured through the `metering`/`peak`/`clipping` sub-configs
//! (spec.md §3.2), read out of the catch-all config map since they're
//! not promoted to typed fields.

use crate::base::BaseWidget;
use crate::error::WidgetError;
use crate::metric_source::DualMetricSource;
use crate::Widget;
use oled_config::WidgetCfg;
use oled_primitives::Frame;
use std::time::{Duration, Instant};

struct Silence;
impl DualMetricSource for Silence {
    fn read(&self) -> (f32, f32) {
        (0.0, 0.0)
    }
}

fn extra_f32(extra: &serde_json::Map<String, serde_json::Value>, section: &str, field: &str, default: f32) -> f32 {
    extra
        .get(section)
        .and_then(|v| v.as_object())
        .and_then(|m| m.get(field))
        .and_then(|v| v.as_f64())
        .map(|v| v as f32)
        .unwrap_or(default)
}

fn extra_bool(extra: &serde_json::Map<String, serde_json::Value>, section: &str, field: &str, default: bool) -> bool {
    extra
        .get(section)
        .and_then(|v| v.as_object())
        .and_then(|m| m.get(field))
        .and_then(|v| v.as_bool())
        .unwrap_or(default)
}

/// Per-channel RMS/peak metering state (spec.md §4.9). `level` is what
/// gets drawn as the bar height; `peak` is the held high-water mark line.
#[derive(Debug, Clone, Copy, Default)]
struct ChannelMeter {
    level: f32,
    peak: f32,
    peak_set_at: Option<Instant>,
    clipping: bool,
}

impl ChannelMeter {
    fn update(&mut self, sample: f32, now: Instant, dt: Duration, cfg: &MeteringCfg) {
        let sample = sample.max(0.0);

        if sample >= self.level {
            self.level = sample;
        } else {
            self.level = (self.level - cfg.decay_rate * dt.as_secs_f32()).max(0.0);
        }
        if self.level < cfg.silence_threshold {
            self.level = 0.0;
        }

        if cfg.peak_enabled {
            if self.peak_set_at.is_none() || sample >= self.peak {
                self.peak = sample;
                self.peak_set_at = Some(now);
            } else if let Some(set_at) = self.peak_set_at {
                if now.duration_since(set_at) >= cfg.hold_time {
                    self.peak = self.level;
                    self.peak_set_at = Some(now);
                }
            }
        }

        self.clipping = cfg.clip_enabled && sample >= cfg.clip_threshold;
    }
}

#[derive(Debug, Clone, Copy)]
struct MeteringCfg {
    decay_rate: f32,
    silence_threshold: f32,
    peak_enabled: bool,
    hold_time: Duration,
    clip_enabled: bool,
    clip_threshold: f32,
    divider_color: Option<u8>,
}

impl MeteringCfg {
    fn from_extra(extra: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            decay_rate: extra_f32(extra, "metering", "decay_rate", 60.0),
            silence_threshold: extra_f32(extra, "metering", "silence_threshold", 1.0),
            peak_enabled: extra_bool(extra, "peak", "enabled", true),
            hold_time: Duration::from_secs_f32(extra_f32(extra, "peak", "hold_time", 1.0).max(0.0)),
            clip_enabled: extra_bool(extra, "clipping", "enabled", true),
            clip_threshold: extra_f32(extra, "clipping", "threshold", 99.0),
            divider_color: extra.get("stereo").and_then(|v| v.get("divider_color")).and_then(|v| v.as_u64()).map(|v| v as u8),
        }
    }
}

pub struct VolumeMeterWidget {
    base: BaseWidget,
    left_color: u8,
    right_color: u8,
    metering: MeteringCfg,
    left: ChannelMeter,
    right: ChannelMeter,
    last_tick: Option<Instant>,
    source: Box<dyn DualMetricSource>,
}

impl VolumeMeterWidget {
    pub fn from_cfg(cfg: &WidgetCfg) -> Result<Self, WidgetError> {
        let id = cfg.id.clone().unwrap_or_else(|| "volume_meter".to_string());
        let update_interval = cfg.update_interval.unwrap_or(oled_config::DEFAULT_UPDATE_INTERVAL_SECS);
        Ok(Self {
            base: BaseWidget::new(id, cfg.position, cfg.style.clone(), update_interval),
            left_color: cfg.colors.left.unwrap_or(255),
            right_color: cfg.colors.right.unwrap_or(180),
            metering: MeteringCfg::from_extra(&cfg.extra),
            left: ChannelMeter::default(),
            right: ChannelMeter::default(),
            last_tick: None,
            source: Box::new(Silence),
        })
    }

    pub fn with_source(mut self, source: Box<dyn DualMetricSource>) -> Self {
        self.source = source;
        self
    }

    pub fn is_clipping(&self) -> (bool, bool) {
        (self.left.clipping, self.right.clipping)
    }
}

impl Widget for VolumeMeterWidget {
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
        let dt = self.last_tick.map(|t| now.duration_since(t)).unwrap_or(self.base.update_interval());
        self.last_tick = Some(now);

        let (left, right) = self.source.read();
        self.left.update(left, now, dt, &self.metering);
        self.right.update(right, now, dt, &self.metering);
        Ok(())
    }

    fn render(&mut self, _now: Instant) -> Frame {
        let mut frame = self.base.create_canvas();
        let w = self.base.position().w as i64;
        let h = self.base.position().h as i64;
        let half_w = w / 2;

        frame.draw_bar_vertical(0, 0, half_w - 1, h, self.left.level, self.left_color, None);
        frame.draw_bar_vertical(half_w + 1, 0, w - half_w - 1, h, self.right.level, self.right_color, None);

        if self.metering.peak_enabled {
            let left_y = h - 1 - ((self.left.peak.clamp(0.0, 100.0) / 100.0) * h as f32).round() as i64;
            frame.draw_hline(0, left_y.clamp(0, h - 1), half_w - 1, self.left_color);
            let right_y = h - 1 - ((self.right.peak.clamp(0.0, 100.0) / 100.0) * h as f32).round() as i64;
            frame.draw_hline(half_w + 1, right_y.clamp(0, h - 1), w - half_w - 1, self.right_color);
        }

        if let Some(divider) = self.metering.divider_color {
            frame.draw_line(half_w, 0, half_w, h - 1, divider);
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
        WidgetCfg { id: Some("volume_meter_0".into()), widget_type: "volume_meter".into(), position: PositionCfg { x: 0, y: 0, w: 20, h: 20, z: 0 }, ..Default::default() }
    }

    struct Fixed(f32, f32);
    impl DualMetricSource for Fixed {
        fn read(&self) -> (f32, f32) {
            (self.0, self.1)
        }
    }

    #[test]
    fn left_and_right_channels_render_independently() {
        let mut widget = VolumeMeterWidget::from_cfg(&cfg()).unwrap().with_source(Box::new(Fixed(100.0, 0.0)));
        widget.update(Instant::now()).unwrap();
        let frame = widget.render(Instant::now());
        assert_eq!(frame.get(2, 19), 255);
        assert_eq!(frame.get(18, 19), 0);
    }

    #[test]
    fn level_decays_towards_silence_after_signal_drops() {
        let mut widget = VolumeMeterWidget::from_cfg(&cfg()).unwrap().with_source(Box::new(Fixed(100.0, 100.0)));
        let t0 = Instant::now();
        widget.update(t0).unwrap();
        assert_eq!(widget.left.level, 100.0);

        widget.source = Box::new(Fixed(0.0, 0.0));
        widget.update(t0 + Duration::from_millis(500)).unwrap();
        assert!(widget.left.level < 100.0);
        assert!(widget.left.level > 0.0);

        widget.update(t0 + Duration::from_secs(5)).unwrap();
        assert_eq!(widget.left.level, 0.0);
    }

    #[test]
    fn peak_holds_then_releases_after_hold_time() {
        let mut c = cfg();
        c.extra.insert("peak".into(), serde_json::json!({"hold_time": 0.2}));
        let mut widget = VolumeMeterWidget::from_cfg(&c).unwrap().with_source(Box::new(Fixed(90.0, 0.0)));
        let t0 = Instant::now();
        widget.update(t0).unwrap();
        assert_eq!(widget.left.peak, 90.0);

        widget.source = Box::new(Fixed(10.0, 0.0));
        widget.update(t0 + Duration::from_millis(50)).unwrap();
        assert_eq!(widget.left.peak, 90.0, "peak should still be held");

        widget.update(t0 + Duration::from_millis(300)).unwrap();
        assert!(widget.left.peak < 90.0, "peak should release once hold_time elapses");
    }

    #[test]
    fn clipping_flag_set_above_threshold() {
        let mut c = cfg();
        c.extra.insert("clipping".into(), serde_json::json!({"threshold": 95.0}));
        let mut widget = VolumeMeterWidget::from_cfg(&c).unwrap().with_source(Box::new(Fixed(99.0, 10.0)));
        widget.update(Instant::now()).unwrap();
        let (left_clip, right_clip) = widget.is_clipping();
        assert!(left_clip);
        assert!(!right_clip);
    }
}
