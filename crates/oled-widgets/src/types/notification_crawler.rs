//! Notification crawler widget: scrolling marquee of the latest message
//! from a connected notification source (spec.md §4.10). Sourcing
//! notifications from the OS/desktop environment is out of scope here;
//! this widget drives a [`ConnectionManager`] against whatever
//! [`NotificationSource`] is wired in and renders a connecting/error
//! placeholder while disconnected.

use crate::base::BaseWidget;
use crate::connection::ConnectionManager;
use crate::error::WidgetError;
use crate::Widget;
use oled_anim::{Clock, Direction, ScrollMode, Scroller, SystemClock};
use oled_config::{StringOrSlice, WidgetCfg};
use oled_primitives::Frame;
use oled_text::{BuiltinFont, HorizontalTextRenderer};
use std::time::{Duration, Instant};

/// Polls for the current notification text. Implemented by whatever
/// desktop-notification backend the runtime wires in.
pub trait NotificationSource: Send {
    fn try_connect(&mut self) -> Result<(), String>;
    fn latest(&mut self) -> Option<String>;
}

struct Unconfigured;
impl NotificationSource for Unconfigured {
    fn try_connect(&mut self) -> Result<(), String> {
        Err("no notification source configured".to_string())
    }
    fn latest(&mut self) -> Option<String> {
        None
    }
}

pub struct NotificationCrawlerWidget {
    base: BaseWidget,
    color: u8,
    connection: ConnectionManager,
    scroller: Scroller,
    clock: Box<dyn Clock + Send>,
    message: String,
    /// Notification channels this widget polls, e.g. a single `"telegram"`
    /// or `["telegram", "discord"]` (spec.md §3.2's `StringOrSlice`
    /// adapter, spec.md §9).
    sources: StringOrSlice,
    source: Box<dyn NotificationSource>,
}

impl NotificationCrawlerWidget {
    pub fn from_cfg(cfg: &WidgetCfg) -> Result<Self, WidgetError> {
        let id = cfg.id.clone().unwrap_or_else(|| "notification_crawler".to_string());
        let update_interval = cfg.update_interval.unwrap_or(oled_config::DEFAULT_UPDATE_INTERVAL_SECS);
        let reconnect_secs = cfg.extra.get("reconnect_interval_secs").and_then(|v| v.as_f64()).unwrap_or(5.0);
        let timeout_secs = cfg.extra.get("connection_timeout_secs").and_then(|v| v.as_f64()).unwrap_or(3.0);
        let sources = cfg
            .extra
            .get("sources")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| WidgetError::Construction { widget_id: id.clone(), reason: format!("invalid `sources` field: {e}") })?
            .unwrap_or_else(|| StringOrSlice::one("default"));
        Ok(Self {
            base: BaseWidget::new(id, cfg.position, cfg.style.clone(), update_interval),
            color: cfg.colors.fill.unwrap_or(255),
            connection: ConnectionManager::new(Duration::from_secs_f64(reconnect_secs), Duration::from_secs_f64(timeout_secs)),
            scroller: Scroller::new(30.0, ScrollMode::Continuous, Direction::Forward, 12.0, 0),
            clock: Box::new(SystemClock),
            message: String::new(),
            sources,
            source: Box::new(Unconfigured),
        })
    }

    pub fn with_source(mut self, source: Box<dyn NotificationSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock + Send>) -> Self {
        self.clock = clock;
        self
    }

    pub fn sources(&self) -> &[String] {
        self.sources.as_slice()
    }
}

impl Widget for NotificationCrawlerWidget {
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
            if let Some(latest) = self.source.latest() {
                self.message = latest;
            }
        }
        Ok(())
    }

    fn render(&mut self, _now: Instant) -> Frame {
        let mut frame = self.base.create_canvas();
        let font = BuiltinFont;
        let w = self.base.position().w as i64;
        let h = self.base.position().h as i64;
        let placeholder;
        let text = if self.connection.is_connected() {
            self.message.as_str()
        } else if self.connection.is_connecting() {
            placeholder = format!("connecting to {}...", self.sources.as_slice().join(", "));
            placeholder.as_str()
        } else {
            placeholder = format!("no connection ({})", self.sources.as_slice().join(", "));
            placeholder.as_str()
        };
        let renderer = HorizontalTextRenderer::new(&font);
        renderer.render(&mut frame, text, &mut self.scroller, self.clock.as_ref(), (0, 0, w, h), self.color);
        self.base.apply_border(&mut frame);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oled_config::PositionCfg;

    fn cfg() -> WidgetCfg {
        WidgetCfg { id: Some("notification_crawler_0".into()), widget_type: "notification_crawler".into(), position: PositionCfg { x: 0, y: 0, w: 64, h: 10, z: 0 }, ..Default::default() }
    }

    struct AlwaysUp(String);
    impl NotificationSource for AlwaysUp {
        fn try_connect(&mut self) -> Result<(), String> {
            Ok(())
        }
        fn latest(&mut self) -> Option<String> {
            Some(self.0.clone())
        }
    }

    #[test]
    fn unconfigured_source_renders_no_connection_placeholder() {
        let mut widget = NotificationCrawlerWidget::from_cfg(&cfg()).unwrap();
        widget.update(Instant::now()).unwrap();
        assert!(!widget.connection.is_connected());
    }

    #[test]
    fn connected_source_adopts_latest_message() {
        let mut widget = NotificationCrawlerWidget::from_cfg(&cfg()).unwrap().with_source(Box::new(AlwaysUp("build finished".into())));
        widget.update(Instant::now()).unwrap();
        assert!(widget.connection.is_connected());
        assert_eq!(widget.message, "build finished");
        let frame = widget.render(Instant::now());
        assert_eq!(frame.width(), 64);
    }

    #[test]
    fn sources_field_accepts_a_bare_scalar() {
        let mut c = cfg();
        c.extra.insert("sources".into(), serde_json::json!("telegram"));
        let widget = NotificationCrawlerWidget::from_cfg(&c).unwrap();
        assert_eq!(widget.sources(), &["telegram".to_string()]);
    }

    #[test]
    fn sources_field_accepts_a_list() {
        let mut c = cfg();
        c.extra.insert("sources".into(), serde_json::json!(["telegram", "discord"]));
        let widget = NotificationCrawlerWidget::from_cfg(&c).unwrap();
        assert_eq!(widget.sources(), &["telegram".to_string(), "discord".to_string()]);
    }
}
