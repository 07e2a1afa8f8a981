//! Maps config `type` tags to widget constructors (spec.md §9's "widget
//! registry" half of the two parallel registries; the other half, the
//! transport backend registry, lives in the runtime supervisor). Also
//! implements [`oled_config::TypeRegistry`] so the same registry gates
//! config validation.

use crate::types;
use crate::{Widget, WidgetError};
use oled_config::{TypeRegistry, WidgetCfg};
use std::collections::HashMap;

type Constructor = Box<dyn Fn(&WidgetCfg) -> Result<Box<dyn Widget>, WidgetError> + Send + Sync>;

/// Tag-keyed constructor table. Unknown tags are rejected at config
/// validation time (spec.md §6), not silently substituted.
pub struct WidgetRegistry {
    constructors: HashMap<String, Constructor>,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self { constructors: HashMap::new() }
    }

    pub fn register(&mut self, tag: &str, constructor: Constructor) {
        self.constructors.insert(tag.to_string(), constructor);
    }

    pub fn build(&self, cfg: &WidgetCfg) -> Result<Box<dyn Widget>, WidgetError> {
        let ctor = self.constructors.get(cfg.widget_type.as_str()).ok_or_else(|| WidgetError::Construction {
            widget_id: cfg.id.clone().unwrap_or_default(),
            reason: format!("no constructor registered for type `{}`", cfg.widget_type),
        })?;
        ctor(cfg)
    }

    /// The full cataloged widget set (spec.md §4.8-§4.10 widget list).
    pub fn with_builtin_types() -> Self {
        let mut registry = Self::new();
        registry.register("clock", Box::new(|cfg| types::clock::ClockWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)));
        registry.register("cpu", Box::new(|cfg| types::cpu::CpuWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)));
        registry.register("memory", Box::new(|cfg| types::memory::MemoryWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)));
        registry.register("network", Box::new(|cfg| types::network::NetworkWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)));
        registry.register("disk", Box::new(|cfg| types::disk::DiskWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)));
        registry.register("keyboard", Box::new(|cfg| types::keyboard::KeyboardWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)));
        registry.register("volume", Box::new(|cfg| types::volume::VolumeWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)));
        registry.register(
            "volume_meter",
            Box::new(|cfg| types::volume_meter::VolumeMeterWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)),
        );
        registry.register(
            "audio_visualizer",
            Box::new(|cfg| types::audio_visualizer::AudioVisualizerWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)),
        );
        registry.register(
            "notification_crawler",
            Box::new(|cfg| types::notification_crawler::NotificationCrawlerWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)),
        );
        registry.register("weather", Box::new(|cfg| types::weather::WeatherWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)));
        registry.register(
            "starwars_crawl",
            Box::new(|cfg| types::starwars_crawl::StarwarsCrawlWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)),
        );
        registry.register("image", Box::new(|cfg| types::image::ImageWidget::from_cfg(cfg).map(|w| Box::new(w) as Box<dyn Widget>)));
        registry
    }
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        Self::with_builtin_types()
    }
}

impl TypeRegistry for WidgetRegistry {
    fn is_known(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }
}
