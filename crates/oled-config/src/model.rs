//! The configuration tree (spec.md §3, §6): display geometry, widget list,
//! per-widget mode-specific sub-configs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolutionCfg {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DisplayCfg {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub background: u8,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectDriverCfg {
    pub vid: Option<String>,
    pub pid: Option<String>,
    pub interface: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AlignCfg {
    #[serde(default)]
    pub h: Option<String>,
    #[serde(default)]
    pub v: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TextCfg {
    pub format: Option<String>,
    pub font: Option<String>,
    pub size: Option<u32>,
    #[serde(default)]
    pub align: AlignCfg,
    pub unit: Option<String>,
    #[serde(default)]
    pub show_unit: Option<bool>,
}

/// Every color field is optional; a widget reads only the subset it uses
/// (spec.md §3.2).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColorsCfg {
    pub fill: Option<u8>,
    pub arc: Option<u8>,
    pub needle: Option<u8>,
    pub ticks: Option<u8>,
    pub face: Option<u8>,
    pub hour: Option<u8>,
    pub minute: Option<u8>,
    pub second: Option<u8>,
    pub rx: Option<u8>,
    pub tx: Option<u8>,
    pub read: Option<u8>,
    pub write: Option<u8>,
    pub on: Option<u8>,
    pub off: Option<u8>,
    pub left: Option<u8>,
    pub right: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StyleCfg {
    #[serde(default)]
    pub background: u8,
    /// `-1` = no border; otherwise drawn at that intensity one pixel inside
    /// the rectangle.
    #[serde(default = "default_border")]
    pub border: i16,
    #[serde(default)]
    pub padding: u16,
}

fn default_border() -> i16 {
    -1
}

impl Default for StyleCfg {
    fn default() -> Self {
        Self { background: 0, border: default_border(), padding: 0 }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PositionCfg {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
    #[serde(default)]
    pub z: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BarCfg {
    pub direction: Option<String>,
    pub border: Option<bool>,
    #[serde(default)]
    pub colors: ColorsCfg,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GraphCfg {
    #[serde(default = "default_history")]
    pub history: u32,
    #[serde(default)]
    pub colors: ColorsCfg,
}

fn default_history() -> u32 {
    30
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GaugeCfg {
    #[serde(default)]
    pub show_ticks: bool,
    #[serde(default)]
    pub colors: ColorsCfg,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalogCfg {
    #[serde(default = "default_true")]
    pub show_seconds: bool,
    #[serde(default)]
    pub show_ticks: bool,
    #[serde(default)]
    pub colors: ColorsCfg,
}

fn default_true() -> bool {
    true
}

/// A single widget's configuration. `extra` losslessly retains any
/// mode-specific sub-config the common model doesn't name explicitly
/// (binary/segment clock styling, spectrum/oscilloscope parameters,
/// per-widget stereo/metering/weather/crawl settings, ...) so the widget's
/// own constructor can parse it and so an unrecognized-but-preserved field
/// survives a load -> validate -> save round trip (spec.md testable
/// property 10).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WidgetCfg {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub position: PositionCfg,
    #[serde(default)]
    pub style: StyleCfg,
    pub update_interval: Option<f32>,
    pub mode: Option<String>,
    pub text: Option<TextCfg>,
    #[serde(default)]
    pub colors: ColorsCfg,
    pub bar: Option<BarCfg>,
    pub graph: Option<GraphCfg>,
    pub gauge: Option<GaugeCfg>,
    pub analog: Option<AnalogCfg>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DefaultsCfg {
    pub colors: Option<HashMap<String, u8>>,
    pub text: Option<TextCfg>,
    pub update_interval: Option<f32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayoutCfg {
    #[serde(rename = "type")]
    pub layout_type: String,
    pub virtual_width: Option<u32>,
    pub virtual_height: Option<u32>,
}

/// Top-level configuration document (spec.md §6).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub schema_version: Option<u32>,
    pub config_name: Option<String>,
    pub game_name: String,
    pub game_display_name: String,
    pub refresh_rate_ms: u32,
    pub deinitialize_timer_ms: Option<u32>,
    pub event_batching_enabled: Option<bool>,
    pub event_batch_size: Option<u32>,
    pub supported_resolutions: Option<Vec<ResolutionCfg>>,
    pub bundled_font_url: Option<String>,
    #[serde(default)]
    pub backend: String,
    pub direct_driver: Option<DirectDriverCfg>,
    pub display: DisplayCfg,
    pub defaults: Option<DefaultsCfg>,
    pub layout: Option<LayoutCfg>,
    pub widgets: Vec<WidgetCfg>,

    /// Where this config was loaded from, if anywhere. Ambient bookkeeping,
    /// not part of the JSON wire shape.
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// A minimal config good enough to hand-author a test fixture or as the
    /// skeleton `default_single_clock` builds from.
    pub fn skeleton(width: u32, height: u32) -> Self {
        Self {
            game_name: "oled-widgets".to_string(),
            game_display_name: "OLED Widgets".to_string(),
            refresh_rate_ms: 100,
            display: DisplayCfg { width, height, background: 0 },
            widgets: Vec::new(),
            ..Default::default()
        }
    }
}
