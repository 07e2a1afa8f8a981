//! Audio visualizer widget: spectrum (FFT-bucketed bars) or oscilloscope
//! (waveform polyline) display of a PCM sample series (spec.md §4.9).
//! Acquiring the PCM ring buffer from an audio backend is out of scope
//! (spec.md §1); this widget reads raw time-domain samples fresh each tick
//! from a [`SeriesMetricSource`] and, in spectrum mode, owns the whole
//! FFT -> bucket -> smoothing pipeline itself.

use crate::base::BaseWidget;
use crate::error::WidgetError;
use crate::metric_source::SeriesMetricSource;
use crate::Widget;
use oled_config::WidgetCfg;
use oled_primitives::{Frame, FixedRingBuffer};
use rustfft::num_complex::Complex32;
use rustfft::FftPlanner;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisualMode {
    Spectrum,
    Oscilloscope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BucketScale {
    Linear,
    Logarithmic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChannelMode {
    Mono,
    Combined,
    Separated,
}

struct Silence;
impl SeriesMetricSource for Silence {
    fn read(&self) -> Vec<f32> {
        Vec::new()
    }
}

fn extra_f32(extra: &serde_json::Map<String, serde_json::Value>, field: &str, default: f32) -> f32 {
    extra.get(field).and_then(|v| v.as_f64()).map(|v| v as f32).unwrap_or(default)
}

fn extra_bool(extra: &serde_json::Map<String, serde_json::Value>, field: &str, default: bool) -> bool {
    extra.get(field).and_then(|v| v.as_bool()).unwrap_or(default)
}

fn extra_usize(extra: &serde_json::Map<String, serde_json::Value>, field: &str, default: usize) -> usize {
    extra.get(field).and_then(|v| v.as_u64()).map(|v| v as usize).unwrap_or(default)
}

/// Magnitude spectrum of `samples`, in `0..samples.len()/2` bins (real
/// input, so only the non-mirrored half carries information).
fn magnitude_spectrum(samples: &[f32]) -> Vec<f32> {
    let n = samples.len();
    if n < 2 {
        return Vec::new();
    }
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n);
    let mut buffer: Vec<Complex32> = samples.iter().map(|&s| Complex32::new(s, 0.0)).collect();
    fft.process(&mut buffer);
    buffer[..n / 2].iter().map(|c| c.norm() / n as f32 * 2.0).collect()
}

/// Collapses `magnitudes` down into `bars` buckets, spaced either evenly
/// across the bin range (linear) or with bin width growing geometrically
/// (logarithmic, so low frequencies get finer resolution than highs).
fn bucket_magnitudes(magnitudes: &[f32], bars: usize, scale: BucketScale) -> Vec<f32> {
    let n = magnitudes.len();
    if bars == 0 {
        return Vec::new();
    }
    if n == 0 {
        return vec![0.0; bars];
    }
    let mut out = vec![0.0f32; bars];
    match scale {
        BucketScale::Linear => {
            for (i, bucket) in out.iter_mut().enumerate() {
                let lo = i * n / bars;
                let hi = (((i + 1) * n / bars).max(lo + 1)).min(n);
                *bucket = magnitudes[lo..hi].iter().copied().fold(0.0f32, f32::max);
            }
        }
        BucketScale::Logarithmic => {
            let log_n = (n as f32).ln().max(1e-6);
            for (i, bucket) in out.iter_mut().enumerate() {
                let lo = (((i as f32 / bars as f32) * log_n).exp().floor() as usize).saturating_sub(1).min(n - 1);
                let hi = ((((i + 1) as f32 / bars as f32) * log_n).exp().ceil() as usize).clamp(lo + 1, n);
                *bucket = magnitudes[lo..hi].iter().copied().fold(0.0f32, f32::max);
            }
        }
    }
    out
}

/// Crude A-weighting approximation: bucket index stands in for frequency
/// (buckets are already frequency-ordered), boosting presence frequencies
/// relative to the low end the ear is less sensitive to.
fn apply_frequency_compensation(bars: &mut [f32]) {
    let n = bars.len().max(1);
    for (i, bar) in bars.iter_mut().enumerate() {
        let t = i as f32 / n as f32;
        let gain = 0.6 + 0.8 * t;
        *bar *= gain;
    }
}

/// Blends raw bucket magnitudes towards a fixed `0..100` normalization
/// driven by the rolling maximum over `window` ticks. `strength = 0`
/// leaves magnitudes as-is (caller's own gain); `strength = 1` always
/// rescales the loudest bucket to 100.
struct DynamicScaler {
    window: FixedRingBuffer<f32>,
    strength: f32,
}

impl DynamicScaler {
    fn new(window: usize, strength: f32) -> Self {
        Self { window: FixedRingBuffer::new(window.max(1)), strength: strength.clamp(0.0, 1.0) }
    }

    fn scale(&mut self, bars: &mut [f32]) {
        let tick_max = bars.iter().copied().fold(0.0f32, f32::max);
        self.window.push(tick_max);
        let recent_max = self.window.to_slice().into_iter().fold(0.0f32, f32::max);
        if recent_max <= 0.0 {
            return;
        }
        let normalize_factor = 100.0 / recent_max;
        let factor = 1.0 + self.strength * (normalize_factor - 1.0);
        for bar in bars.iter_mut() {
            *bar = (*bar * factor).clamp(0.0, 100.0);
        }
    }
}

/// Per-bar held high-water mark, released after `hold_time` of no new peak.
struct PeakHold {
    values: Vec<f32>,
    set_at: Vec<Option<Instant>>,
    hold_time: Duration,
}

impl PeakHold {
    fn new(bars: usize, hold_time: Duration) -> Self {
        Self { values: vec![0.0; bars], set_at: vec![None; bars], hold_time }
    }

    fn update(&mut self, bars: &[f32], now: Instant) {
        if self.values.len() != bars.len() {
            self.values = vec![0.0; bars.len()];
            self.set_at = vec![None; bars.len()];
        }
        for (i, &v) in bars.iter().enumerate() {
            if v >= self.values[i] || self.set_at[i].is_none() {
                self.values[i] = v;
                self.set_at[i] = Some(now);
            } else if let Some(set_at) = self.set_at[i] {
                if now.duration_since(set_at) >= self.hold_time {
                    self.values[i] = v;
                    self.set_at[i] = Some(now);
                }
            }
        }
    }
}

pub struct AudioVisualizerWidget {
    base: BaseWidget,
    mode: VisualMode,
    channels: ChannelMode,
    color: u8,
    bars: usize,
    scale: BucketScale,
    smoothing: f32,
    frequency_compensation: bool,
    dynamic_scaling: Option<DynamicScaler>,
    peak_hold: Option<PeakHold>,
    oscilloscope_samples: usize,
    smoothed: Vec<f32>,
    smoothed_right: Vec<f32>,
    samples: Vec<f32>,
    right_samples: Vec<f32>,
    source: Box<dyn SeriesMetricSource>,
    right_source: Option<Box<dyn SeriesMetricSource>>,
}

impl AudioVisualizerWidget {
    pub fn from_cfg(cfg: &WidgetCfg) -> Result<Self, WidgetError> {
        let id = cfg.id.clone().unwrap_or_else(|| "audio_visualizer".to_string());
        let update_interval = cfg.update_interval.unwrap_or(oled_config::DEFAULT_UPDATE_INTERVAL_SECS);
        let mode = match cfg.mode.as_deref() {
            Some("oscilloscope") => VisualMode::Oscilloscope,
            _ => VisualMode::Spectrum,
        };
        let channels = match cfg.extra.get("channels").and_then(|v| v.as_str()) {
            Some("separated") => ChannelMode::Separated,
            Some("combined") => ChannelMode::Combined,
            _ => ChannelMode::Mono,
        };
        let scale = match cfg.extra.get("scale").and_then(|v| v.as_str()) {
            Some("linear") => BucketScale::Linear,
            _ => BucketScale::Logarithmic,
        };
        let bars = extra_usize(&cfg.extra, "bars", 16).max(1);
        let dynamic_scaling = if extra_bool(&cfg.extra, "dynamic_scaling", false) {
            Some(DynamicScaler::new(extra_usize(&cfg.extra, "dynamic_scaling_window", 32), extra_f32(&cfg.extra, "dynamic_scaling_strength", 0.5)))
        } else {
            None
        };
        let peak_hold = if extra_bool(&cfg.extra, "peak_hold", false) {
            Some(PeakHold::new(bars, Duration::from_secs_f32(extra_f32(&cfg.extra, "peak_hold_time", 1.0).max(0.0))))
        } else {
            None
        };
        Ok(Self {
            base: BaseWidget::new(id, cfg.position, cfg.style.clone(), update_interval),
            mode,
            channels,
            color: cfg.colors.fill.unwrap_or(255),
            bars,
            scale,
            smoothing: extra_f32(&cfg.extra, "smoothing", 0.5).clamp(0.0, 0.999),
            frequency_compensation: extra_bool(&cfg.extra, "frequency_compensation", false),
            dynamic_scaling,
            peak_hold,
            oscilloscope_samples: extra_usize(&cfg.extra, "samples", 64).max(1),
            smoothed: vec![0.0; bars],
            smoothed_right: vec![0.0; bars],
            samples: Vec::new(),
            right_samples: Vec::new(),
            source: Box::new(Silence),
            right_source: None,
        })
    }

    pub fn with_source(mut self, source: Box<dyn SeriesMetricSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_right_source(mut self, source: Box<dyn SeriesMetricSource>) -> Self {
        self.right_source = Some(source);
        self
    }

    /// FFT -> bucket -> optional A-weighting, with no smoothing state
    /// touched; callers fold the result into their own `smoothed` buffer.
    fn raw_bars(&self, samples: &[f32]) -> Vec<f32> {
        let magnitudes = magnitude_spectrum(samples);
        let mut bars = bucket_magnitudes(&magnitudes, self.bars, self.scale);
        if self.frequency_compensation {
            apply_frequency_compensation(&mut bars);
        }
        // Samples arrive full-scale in -1.0..=1.0, so a unit-amplitude tone
        // maps to a full-scale (100%) bar.
        for b in bars.iter_mut() {
            *b = (*b * 100.0).clamp(0.0, 100.0);
        }
        bars
    }

    fn smooth(smoothed: &mut Vec<f32>, raw: &[f32], smoothing: f32) -> Vec<f32> {
        if smoothed.len() != raw.len() {
            *smoothed = raw.to_vec();
        } else {
            for (s, &r) in smoothed.iter_mut().zip(raw) {
                *s = *s * smoothing + r * (1.0 - smoothing);
            }
        }
        smoothed.clone()
    }
}

impl Widget for AudioVisualizerWidget {
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
        self.samples = self.source.read();
        self.right_samples = self.right_source.as_ref().map(|s| s.read()).unwrap_or_default();
        Ok(())
    }

    fn render(&mut self, now: Instant) -> Frame {
        let mut frame = self.base.create_canvas();
        let w = self.base.position().w as i64;
        let h = self.base.position().h as i64;

        if self.samples.is_empty() {
            self.base.apply_border(&mut frame);
            return frame;
        }

        match self.mode {
            VisualMode::Spectrum => {
                let combined;
                let left_samples: &[f32] = match self.channels {
                    ChannelMode::Combined if !self.right_samples.is_empty() => {
                        let n = self.samples.len().min(self.right_samples.len());
                        combined = (0..n).map(|i| (self.samples[i] + self.right_samples[i]) / 2.0).collect::<Vec<_>>();
                        &combined
                    }
                    _ => &self.samples,
                };

                let left_raw = self.raw_bars(left_samples);
                let mut left_bars = Self::smooth(&mut self.smoothed, &left_raw, self.smoothing);

                if let Some(scaler) = self.dynamic_scaling.as_mut() {
                    scaler.scale(&mut left_bars);
                }
                if let Some(peak) = self.peak_hold.as_mut() {
                    peak.update(&left_bars, now);
                }

                let right_bars = if self.channels == ChannelMode::Separated && !self.right_samples.is_empty() {
                    let right_raw = self.raw_bars(&self.right_samples.clone());
                    let mut bars = Self::smooth(&mut self.smoothed_right, &right_raw, self.smoothing);
                    if let Some(scaler) = self.dynamic_scaling.as_mut() {
                        scaler.scale(&mut bars);
                    }
                    Some(bars)
                } else {
                    None
                };

                let rows = if right_bars.is_some() { h / 2 } else { h };
                draw_spectrum_bars(&mut frame, w, rows, 0, &left_bars, self.color);
                if let Some(peak) = &self.peak_hold {
                    draw_peak_line(&mut frame, w, rows, 0, &peak.values, self.color);
                }
                if let Some(right_bars) = right_bars {
                    draw_spectrum_bars(&mut frame, w, rows, rows, &right_bars, self.color);
                }
            }
            VisualMode::Oscilloscope => {
                let tail_start = self.samples.len().saturating_sub(self.oscilloscope_samples);
                let samples = &self.samples[tail_start..];
                draw_oscilloscope(&mut frame, w, h, samples, self.color);
            }
        }

        self.base.apply_border(&mut frame);
        frame
    }
}

fn draw_spectrum_bars(frame: &mut Frame, w: i64, h: i64, y_offset: i64, bars: &[f32], color: u8) {
    let n = bars.len() as i64;
    if n == 0 || h <= 0 {
        return;
    }
    let bar_w = (w / n).max(1);
    for (i, &v) in bars.iter().enumerate() {
        let pct = v.clamp(0.0, 100.0) / 100.0;
        let bar_h = (pct as f64 * h as f64).round() as i64;
        frame.fill_rect(i as i64 * bar_w, y_offset + h - bar_h, bar_w - 1, bar_h, color);
    }
}

fn draw_peak_line(frame: &mut Frame, w: i64, h: i64, y_offset: i64, peaks: &[f32], color: u8) {
    let n = peaks.len() as i64;
    if n == 0 || h <= 0 {
        return;
    }
    let bar_w = (w / n).max(1);
    for (i, &v) in peaks.iter().enumerate() {
        let pct = v.clamp(0.0, 100.0) / 100.0;
        let y = y_offset + h - 1 - (pct as f64 * h as f64).round() as i64;
        frame.draw_hline(i as i64 * bar_w, y.clamp(y_offset, y_offset + h - 1), bar_w - 1, color);
    }
}

fn draw_oscilloscope(frame: &mut Frame, w: i64, h: i64, samples: &[f32], color: u8) {
    let n = samples.len();
    if n == 0 {
        return;
    }
    let mid = h / 2;
    let mut prev: Option<(i64, i64)> = None;
    for (i, &sample) in samples.iter().enumerate() {
        let x = if n > 1 { (i as f64 / (n - 1) as f64 * (w - 1) as f64).round() as i64 } else { 0 };
        let y = mid - (sample.clamp(-1.0, 1.0) as f64 * mid as f64).round() as i64;
        if let Some((px, py)) = prev {
            frame.draw_line(px, py, x, y, color);
        } else {
            frame.set(x, y, color);
        }
        prev = Some((x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oled_config::PositionCfg;

    fn cfg() -> WidgetCfg {
        WidgetCfg { id: Some("audio_visualizer_0".into()), widget_type: "audio_visualizer".into(), position: PositionCfg { x: 0, y: 0, w: 32, h: 16, z: 0 }, ..Default::default() }
    }

    struct FixedSeries(Vec<f32>);
    impl SeriesMetricSource for FixedSeries {
        fn read(&self) -> Vec<f32> {
            self.0.clone()
        }
    }

    fn sine_wave(freq_cycles_per_buffer: f32, n: usize, amplitude: f32) -> Vec<f32> {
        (0..n).map(|i| amplitude * (2.0 * std::f32::consts::PI * freq_cycles_per_buffer * i as f32 / n as f32).sin()).collect()
    }

    #[test]
    fn spectrum_mode_computes_bins_from_raw_pcm_not_passthrough() {
        let mut c = cfg();
        c.mode = Some("spectrum".into());
        c.extra.insert("bars".into(), serde_json::json!(8));
        let mut widget = AudioVisualizerWidget::from_cfg(&c).unwrap().with_source(Box::new(FixedSeries(sine_wave(4.0, 128, 1.0))));
        widget.update(Instant::now()).unwrap();
        let frame = widget.render(Instant::now());
        assert!(frame.pixels().iter().any(|&p| p != 0));
    }

    #[test]
    fn silent_input_produces_a_near_empty_spectrum() {
        let mut c = cfg();
        c.mode = Some("spectrum".into());
        let mut widget = AudioVisualizerWidget::from_cfg(&c).unwrap().with_source(Box::new(FixedSeries(vec![0.0; 128])));
        widget.update(Instant::now()).unwrap();
        let frame = widget.render(Instant::now());
        assert!(frame.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn smoothing_limits_how_fast_bars_can_jump_between_ticks() {
        let mut c = cfg();
        c.mode = Some("spectrum".into());
        c.extra.insert("bars".into(), serde_json::json!(4));
        c.extra.insert("smoothing".into(), serde_json::json!(0.9));
        let mut widget = AudioVisualizerWidget::from_cfg(&c).unwrap().with_source(Box::new(FixedSeries(vec![0.0; 128])));
        widget.update(Instant::now()).unwrap();
        let _ = widget.render(Instant::now());
        widget.source = Box::new(FixedSeries(sine_wave(8.0, 128, 1.0)));
        widget.update(Instant::now()).unwrap();
        let _ = widget.render(Instant::now());
        assert!(widget.smoothed.iter().all(|&v| v < 100.0));
    }

    #[test]
    fn peak_hold_keeps_a_bar_elevated_after_level_drops() {
        let mut c = cfg();
        c.mode = Some("spectrum".into());
        c.extra.insert("bars".into(), serde_json::json!(4));
        c.extra.insert("peak_hold".into(), serde_json::json!(true));
        c.extra.insert("peak_hold_time".into(), serde_json::json!(5.0));
        let mut widget = AudioVisualizerWidget::from_cfg(&c).unwrap().with_source(Box::new(FixedSeries(sine_wave(4.0, 128, 1.0))));
        widget.update(Instant::now()).unwrap();
        let _ = widget.render(Instant::now());
        let held: Vec<f32> = widget.peak_hold.as_ref().unwrap().values.clone();

        widget.source = Box::new(FixedSeries(vec![0.0; 128]));
        widget.update(Instant::now()).unwrap();
        let _ = widget.render(Instant::now());
        assert_eq!(widget.peak_hold.as_ref().unwrap().values, held);
    }

    #[test]
    fn separated_channels_render_left_and_right_halves() {
        let mut c = cfg();
        c.mode = Some("spectrum".into());
        c.extra.insert("channels".into(), serde_json::json!("separated"));
        c.extra.insert("bars".into(), serde_json::json!(4));
        let mut widget = AudioVisualizerWidget::from_cfg(&c)
            .unwrap()
            .with_source(Box::new(FixedSeries(sine_wave(4.0, 128, 1.0))))
            .with_right_source(Box::new(FixedSeries(vec![0.0; 128])));
        widget.update(Instant::now()).unwrap();
        let frame = widget.render(Instant::now());
        assert_eq!(frame.width(), 32);
    }

    #[test]
    fn oscilloscope_draws_the_configured_tail_length_without_panicking() {
        let mut c = cfg();
        c.mode = Some("oscilloscope".into());
        c.extra.insert("samples".into(), serde_json::json!(4));
        let mut widget = AudioVisualizerWidget::from_cfg(&c).unwrap().with_source(Box::new(FixedSeries(vec![-1.0, 0.0, 1.0, 0.0, -0.5, 0.5])));
        widget.update(Instant::now()).unwrap();
        let frame = widget.render(Instant::now());
        assert_eq!(frame.width(), 32);
    }
}
