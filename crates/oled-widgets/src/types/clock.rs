//! The clock widget: text (strftime), analog, binary, and segment display
//! modes (spec.md §4.8).

use crate::base::BaseWidget;
use crate::error::WidgetError;
use crate::Widget;
use oled_config::WidgetCfg;
use oled_primitives::{Frame, HAlign, VAlign};
use oled_text::{BuiltinFont, FontFace, WallTime, calculate_text_position, draw_text_at, format_strftime};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockMode {
    Text,
    Analog,
    Binary,
    Segment,
}

impl ClockMode {
    fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("analog") => ClockMode::Analog,
            Some("binary") => ClockMode::Binary,
            Some("segment") => ClockMode::Segment,
            _ => ClockMode::Text,
        }
    }
}

pub struct ClockWidget {
    base: BaseWidget,
    mode: ClockMode,
    format: String,
    fill_color: u8,
    hour_color: u8,
    minute_color: u8,
    second_color: u8,
    show_seconds: bool,
    show_ticks: bool,
    wall_time: WallTime,
}

impl ClockWidget {
    pub fn from_cfg(cfg: &WidgetCfg) -> Result<Self, WidgetError> {
        let id = cfg.id.clone().unwrap_or_else(|| "clock".to_string());
        let update_interval = cfg.update_interval.unwrap_or(oled_config::DEFAULT_UPDATE_INTERVAL_SECS);
        let mode = ClockMode::from_tag(cfg.mode.as_deref());
        let format = cfg.text.as_ref().and_then(|t| t.format.clone()).unwrap_or_else(|| "%H:%M:%S".to_string());
        let analog = cfg.analog.clone().unwrap_or_default();
        Ok(Self {
            base: BaseWidget::new(id, cfg.position, cfg.style.clone(), update_interval),
            mode,
            format,
            fill_color: cfg.colors.fill.unwrap_or(255),
            hour_color: cfg.colors.hour.unwrap_or(255),
            minute_color: cfg.colors.minute.unwrap_or(255),
            second_color: cfg.colors.second.unwrap_or(180),
            show_seconds: analog.show_seconds,
            show_ticks: analog.show_ticks,
            wall_time: WallTime { year: 1970, month: 1, day: 1, hour: 0, minute: 0, second: 0 },
        })
    }

    fn render_text(&self, frame: &mut Frame) {
        let font = BuiltinFont;
        let text = format_strftime(&self.format, &self.wall_time);
        let rect = (0, 0, self.base.position().w as i64, self.base.position().h as i64);
        let (x, y) = calculate_text_position(&font, &text, rect, HAlign::Center, VAlign::Middle);
        draw_text_at(&font, frame, &text, x, y, self.fill_color, rect);
    }

    fn render_analog(&self, frame: &mut Frame) {
        let w = self.base.position().w as i64;
        let h = self.base.position().h as i64;
        let cx = w / 2;
        let cy = h / 2;
        let radius = (w.min(h) / 2 - 1).max(1);
        frame.draw_circle(cx, cy, radius, self.fill_color);

        if self.show_ticks {
            for i in 0..12 {
                let theta = std::f64::consts::TAU * (i as f64 / 12.0) - std::f64::consts::FRAC_PI_2;
                let inner = (radius as f64 * 0.85) as i64;
                let x0 = cx + (inner as f64 * theta.cos()).round() as i64;
                let y0 = cy + (inner as f64 * theta.sin()).round() as i64;
                let x1 = cx + (radius as f64 * theta.cos()).round() as i64;
                let y1 = cy + (radius as f64 * theta.sin()).round() as i64;
                frame.draw_line(x0, y0, x1, y1, self.fill_color);
            }
        }

        let hour_theta = std::f64::consts::TAU * ((self.wall_time.hour12() % 12) as f64 + self.wall_time.minute as f64 / 60.0) / 12.0
            - std::f64::consts::FRAC_PI_2;
        let hour_len = (radius as f64 * 0.5) as i64;
        frame.draw_line(cx, cy, cx + (hour_len as f64 * hour_theta.cos()).round() as i64, cy + (hour_len as f64 * hour_theta.sin()).round() as i64, self.hour_color);

        let minute_theta = std::f64::consts::TAU * (self.wall_time.minute as f64 / 60.0) - std::f64::consts::FRAC_PI_2;
        let minute_len = (radius as f64 * 0.8) as i64;
        frame.draw_line(
            cx,
            cy,
            cx + (minute_len as f64 * minute_theta.cos()).round() as i64,
            cy + (minute_len as f64 * minute_theta.sin()).round() as i64,
            self.minute_color,
        );

        if self.show_seconds {
            let second_theta = std::f64::consts::TAU * (self.wall_time.second as f64 / 60.0) - std::f64::consts::FRAC_PI_2;
            let second_len = (radius as f64 * 0.9) as i64;
            frame.draw_line(
                cx,
                cy,
                cx + (second_len as f64 * second_theta.cos()).round() as i64,
                cy + (second_len as f64 * second_theta.sin()).round() as i64,
                self.second_color,
            );
        }
    }

    /// Draws `h:m:s` as three columns of vertically stacked on/off bits,
    /// most-significant bit at the top.
    fn render_binary(&self, frame: &mut Frame) {
        let w = self.base.position().w as i64;
        let h = self.base.position().h as i64;
        let cols = [self.wall_time.hour, self.wall_time.minute, self.wall_time.second];
        let col_w = w / cols.len() as i64;
        let bits = 6;
        let cell_h = h / bits;
        for (c, &value) in cols.iter().enumerate() {
            for bit in 0..bits {
                let on = (value >> (bits - 1 - bit)) & 1 == 1;
                if on {
                    let x = c as i64 * col_w + 1;
                    let y = bit * cell_h + 1;
                    frame.fill_rect(x, y, (col_w - 2).max(1), (cell_h - 2).max(1), self.fill_color);
                }
            }
        }
    }

    /// Seven-segment-style blocky digits for `HH:MM`, approximated with
    /// filled rectangles per digit slot rather than true segment paths.
    fn render_segment(&self, frame: &mut Frame) {
        let font = BuiltinFont;
        let text = format!("{:02}:{:02}", self.wall_time.hour, self.wall_time.minute);
        let rect = (0, 0, self.base.position().w as i64, self.base.position().h as i64);
        let (x, y) = calculate_text_position(&font, &text, rect, HAlign::Center, VAlign::Middle);
        draw_text_at(&font, frame, &text, x, y, self.fill_color, rect);
    }
}

impl Widget for ClockWidget {
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
        let epoch = SystemTime::now().duration_since(UNIX_EPOCH).map_err(|e| WidgetError::Update {
            widget_id: self.base.id().to_string(),
            reason: e.to_string(),
        })?;
        self.wall_time = civil_from_unix(epoch.as_secs() as i64);
        Ok(())
    }

    fn render(&mut self, _now: Instant) -> Frame {
        let mut frame = self.base.create_canvas();
        match self.mode {
            ClockMode::Text => self.render_text(&mut frame),
            ClockMode::Analog => self.render_analog(&mut frame),
            ClockMode::Binary => self.render_binary(&mut frame),
            ClockMode::Segment => self.render_segment(&mut frame),
        }
        self.base.apply_border(&mut frame);
        frame
    }
}

/// Converts a Unix timestamp (UTC, seconds) into a broken-down civil time,
/// using Howard Hinnant's days-from-civil algorithm so this crate needs no
/// external datetime dependency for what is just a formatting convenience.
fn civil_from_unix(unix_secs: i64) -> WallTime {
    let days = unix_secs.div_euclid(86400);
    let time_of_day = unix_secs.rem_euclid(86400);
    let (hour, minute, second) = (time_of_day / 3600, (time_of_day / 60) % 60, time_of_day % 60);

    let z = days + 719468;
    let era = if z >= 0 { z } else { z - 146096 } / 146097;
    let doe = (z - era * 146097) as u64;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = if month <= 2 { y + 1 } else { y };

    WallTime { year: year as i32, month, day, hour: hour as u32, minute: minute as u32, second: second as u32 }
}
