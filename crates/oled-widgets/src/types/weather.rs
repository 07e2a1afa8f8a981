//! Weather widget: connects to a remote weather source and displays the
//! latest temperature/condition reading as text (spec.md §4.10). Actually
//! fetching weather data is out of scope; this widget only owns the
//! connection lifecycle and rendering around whatever [`WeatherSource`] is
//! wired in.

use crate::base::BaseWidget;
use crate::connection::ConnectionManager;
use crate::error::WidgetError;
use crate::Widget;
use oled_config::WidgetCfg;
use oled_primitives::{Frame, HAlign, VAlign};
use oled_text::{BuiltinFont, calculate_text_position, draw_text_at};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct WeatherReading {
    pub temperature: f32,
    pub condition: String,
}

pub trait WeatherSource: Send {
    fn try_connect(&mut self) -> Result<(), String>;
    fn latest(&mut self) -> Option<WeatherReading>;
}

struct Unconfigured;
impl WeatherSource for Unconfigured {
    fn try_connect(&mut self) -> Result<(), String> {
        Err("no weather source configured".to_string())
    }
    fn latest(&mut self) -> Option<WeatherReading> {
        None
    }
}

pub struct WeatherWidget {
    base: BaseWidget,
    color: u8,
    show_unit: bool,
    unit: String,
    connection: ConnectionManager,
    reading: Option<WeatherReading>,
    source: Box<dyn WeatherSource>,
}

impl WeatherWidget {
    pub fn from_cfg(cfg: &WidgetCfg) -> Result<Self, WidgetError> {
        let id = cfg.id.clone().unwrap_or_else(|| "weather".to_string());
        let update_interval = cfg.update_interval.unwrap_or(60.0);
        let reconnect_secs = cfg.extra.get("reconnect_interval_secs").and_then(|v| v.as_f64()).unwrap_or(30.0);
        let timeout_secs = cfg.extra.get("connection_timeout_secs").and_then(|v| v.as_f64()).unwrap_or(5.0);
        let text = cfg.text.clone().unwrap_or_default();
        Ok(Self {
            base: BaseWidget::new(id, cfg.position, cfg.style.clone(), update_interval),
            color: cfg.colors.fill.unwrap_or(255),
            show_unit: text.show_unit.unwrap_or(true),
            unit: text.unit.unwrap_or_else(|| "C".to_string()),
            connection: ConnectionManager::new(Duration::from_secs_f64(reconnect_secs), Duration::from_secs_f64(timeout_secs)),
            reading: None,
            source: Box::new(Unconfigured),
        })
    }

    pub fn with_source(mut self, source: Box<dyn WeatherSource>) -> Self {
        self.source = source;
        self
    }
}

impl Widget for WeatherWidget {
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
        self.connection.check_timeout(now);

        if self.connection.should_attempt(now) {
            self.connection.begin_attempt(now);
            match self.source.try_connect() {
                Ok(()) => self.connection.mark_connected(),
                Err(_) => self.connection.mark_failed(now),
            }
        }

        if self.connection.is_connected() {
            if let Some(reading) = self.source.latest() {
                self.reading = Some(reading);
            }
        }
        Ok(())
    }

    fn render(&mut self, _now: Instant) -> Frame {
        let mut frame = self.base.create_canvas();
        let font = BuiltinFont;
        let w = self.base.position().w as i64;
        let h = self.base.position().h as i64;
        let text = match (&self.reading, self.connection.is_connected()) {
            (Some(r), true) if self.show_unit => format!("{:.0}°{} {}", r.temperature, self.unit, r.condition),
            (Some(r), true) => format!("{:.0} {}", r.temperature, r.condition),
            (_, false) if self.connection.is_connecting() => "connecting...".to_string(),
            _ => "--".to_string(),
        };
        let (x, y) = calculate_text_position(&font, &text, (0, 0, w, h), HAlign::Center, VAlign::Middle);
        draw_text_at(&font, &mut frame, &text, x, y, self.color, (0, 0, w, h));
        self.base.apply_border(&mut frame);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oled_config::PositionCfg;

    fn cfg() -> WidgetCfg {
        WidgetCfg { id: Some("weather_0".into()), widget_type: "weather".into(), position: PositionCfg { x: 0, y: 0, w: 64, h: 20, z: 0 }, ..Default::default() }
    }

    struct Sunny;
    impl WeatherSource for Sunny {
        fn try_connect(&mut self) -> Result<(), String> {
            Ok(())
        }
        fn latest(&mut self) -> Option<WeatherReading> {
            Some(WeatherReading { temperature: 21.0, condition: "sunny".into() })
        }
    }

    #[test]
    fn disconnected_widget_shows_placeholder() {
        let mut widget = WeatherWidget::from_cfg(&cfg()).unwrap();
        widget.update(Instant::now()).unwrap();
        assert!(widget.reading.is_none());
    }

    #[test]
    fn connected_widget_adopts_reading() {
        let mut widget = WeatherWidget::from_cfg(&cfg()).unwrap().with_source(Box::new(Sunny));
        widget.update(Instant::now()).unwrap();
        assert!(widget.reading.is_some());
        let frame = widget.render(Instant::now());
        assert!(frame.pixels().iter().any(|&p| p != 0));
    }
}
