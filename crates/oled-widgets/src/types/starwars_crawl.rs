//! Star Wars-style upward crawl widget: static multi-line text scrolled
//! vertically, bottom to top, looping (spec.md §4.9). The crawl body comes
//! from `text.format` (treated here as literal content, not a strftime
//! template -- there is no time axis to format against).

use crate::base::BaseWidget;
use crate::error::WidgetError;
use crate::Widget;
use oled_anim::{Clock, Direction, ScrollMode, Scroller, SystemClock};
use oled_config::WidgetCfg;
use oled_primitives::Frame;
use oled_text::{BuiltinFont, MultiLineRenderer, WrapMode};
use std::time::Instant;

pub struct StarwarsCrawlWidget {
    base: BaseWidget,
    color: u8,
    text: String,
    scroller: Scroller,
    clock: Box<dyn Clock + Send>,
}

impl StarwarsCrawlWidget {
    pub fn from_cfg(cfg: &WidgetCfg) -> Result<Self, WidgetError> {
        let id = cfg.id.clone().unwrap_or_else(|| "starwars_crawl".to_string());
        let update_interval = cfg.update_interval.unwrap_or(oled_config::DEFAULT_UPDATE_INTERVAL_SECS);
        let text = cfg
            .text
            .as_ref()
            .and_then(|t| t.format.clone())
            .or_else(|| cfg.extra.get("lines").and_then(|v| v.as_str()).map(|s| s.to_string()))
            .unwrap_or_else(|| "A long time ago, in a galaxy far, far away....".to_string());
        Ok(Self {
            base: BaseWidget::new(id, cfg.position, cfg.style.clone(), update_interval),
            color: cfg.colors.fill.unwrap_or(255),
            text,
            scroller: Scroller::new(12.0, ScrollMode::Continuous, Direction::Forward, 20.0, 0),
            clock: Box::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: Box<dyn Clock + Send>) -> Self {
        self.clock = clock;
        self
    }
}

impl Widget for StarwarsCrawlWidget {
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
        Ok(())
    }

    fn render(&mut self, _now: Instant) -> Frame {
        let mut frame = self.base.create_canvas();
        let font = BuiltinFont;
        let w = self.base.position().w as i64;
        let h = self.base.position().h as i64;
        let renderer = MultiLineRenderer::new(&font, WrapMode::Normal);
        renderer.render(&mut frame, &self.text, Some(&mut self.scroller), self.clock.as_ref(), (0, 0, w, h), self.color, 10);
        self.base.apply_border(&mut frame);
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oled_config::PositionCfg;

    fn cfg() -> WidgetCfg {
        WidgetCfg { id: Some("starwars_crawl_0".into()), widget_type: "starwars_crawl".into(), position: PositionCfg { x: 0, y: 0, w: 40, h: 16, z: 0 }, ..Default::default() }
    }

    #[test]
    fn renders_without_panicking_on_long_text() {
        let mut widget = StarwarsCrawlWidget::from_cfg(&cfg()).unwrap();
        widget.update(Instant::now()).unwrap();
        let frame = widget.render(Instant::now());
        assert_eq!(frame.width(), 40);
    }
}
