//! Static/streamed image widget: applies one of several grayscale
//! render-mode conversions to a source bitmap before blitting it
//! (spec.md §4.9). Decoding actual image files (PNG/JPEG/...) is out of
//! scope; this widget consumes an already-decoded grayscale buffer from
//! whatever [`ImageSource`] the runtime wires in.

use crate::base::BaseWidget;
use crate::error::WidgetError;
use crate::Widget;
use oled_config::WidgetCfg;
use oled_primitives::Frame;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RenderMode {
    Normal,
    Contrast,
    Posterize,
    Threshold,
    Dither,
    Gamma,
}

impl RenderMode {
    fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("contrast") => RenderMode::Contrast,
            Some("posterize") => RenderMode::Posterize,
            Some("threshold") => RenderMode::Threshold,
            Some("dither") => RenderMode::Dither,
            Some("gamma") => RenderMode::Gamma,
            _ => RenderMode::Normal,
        }
    }
}

/// Supplies an already-decoded `width * height` grayscale buffer matching
/// the widget's own dimensions.
pub trait ImageSource: Send {
    fn frame(&mut self, width: u32, height: u32) -> Vec<u8>;
}

struct Blank;
impl ImageSource for Blank {
    fn frame(&mut self, width: u32, height: u32) -> Vec<u8> {
        vec![0; (width as usize) * (height as usize)]
    }
}

pub struct ImageWidget {
    base: BaseWidget,
    mode: RenderMode,
    posterize_levels: u32,
    threshold: u8,
    gamma: f32,
    dither_matrix_size: usize,
    source: Box<dyn ImageSource>,
    pixels: Vec<u8>,
}

impl ImageWidget {
    pub fn from_cfg(cfg: &WidgetCfg) -> Result<Self, WidgetError> {
        let id = cfg.id.clone().unwrap_or_else(|| "image".to_string());
        let update_interval = cfg.update_interval.unwrap_or(oled_config::DEFAULT_UPDATE_INTERVAL_SECS);
        let dither_matrix_size = match cfg.extra.get("bayer_matrix_size").and_then(|v| v.as_u64()) {
            Some(8) => 8,
            Some(4) => 4,
            _ => 2,
        };
        Ok(Self {
            base: BaseWidget::new(id, cfg.position, cfg.style.clone(), update_interval),
            mode: RenderMode::from_tag(cfg.mode.as_deref()),
            posterize_levels: (cfg.extra.get("posterize_levels").and_then(|v| v.as_u64()).unwrap_or(4) as u32).clamp(2, 16),
            threshold: cfg.extra.get("threshold").and_then(|v| v.as_u64()).unwrap_or(128) as u8,
            gamma: cfg.extra.get("gamma").and_then(|v| v.as_f64()).unwrap_or(1.0) as f32,
            dither_matrix_size,
            source: Box::new(Blank),
            pixels: Vec::new(),
        })
    }

    pub fn with_source(mut self, source: Box<dyn ImageSource>) -> Self {
        self.source = source;
        self
    }

    fn apply_mode(&self, raw: Vec<u8>) -> Vec<u8> {
        match self.mode {
            RenderMode::Normal => raw,
            RenderMode::Contrast => raw.into_iter().map(|p| stretch_contrast(p)).collect(),
            RenderMode::Posterize => raw.into_iter().map(|p| posterize(p, self.posterize_levels)).collect(),
            RenderMode::Threshold => raw.into_iter().map(|p| if p >= self.threshold { 255 } else { 0 }).collect(),
            RenderMode::Dither => {
                let w = self.base.position().w as usize;
                ordered_dither(&raw, w, self.dither_matrix_size)
            }
            RenderMode::Gamma => raw.into_iter().map(|p| apply_gamma(p, self.gamma)).collect(),
        }
    }
}

fn stretch_contrast(p: u8) -> u8 {
    let centered = (p as f32 - 128.0) * 1.5 + 128.0;
    centered.clamp(0.0, 255.0) as u8
}

fn posterize(p: u8, levels: u32) -> u8 {
    let step = 255.0 / (levels - 1) as f32;
    ((p as f32 / step).round() * step).clamp(0.0, 255.0) as u8
}

fn apply_gamma(p: u8, gamma: f32) -> u8 {
    if gamma <= 0.0 {
        return p;
    }
    let normalized = p as f32 / 255.0;
    (normalized.powf(1.0 / gamma) * 255.0).clamp(0.0, 255.0) as u8
}

const BAYER_2: [[u8; 2]; 2] = [[0, 128], [191, 64]];

const BAYER_4: [[u8; 4]; 4] = [
    [0, 128, 32, 159],
    [191, 64, 223, 96],
    [48, 175, 16, 143],
    [239, 112, 207, 80],
];

const BAYER_8: [[u8; 8]; 8] = [
    [0, 128, 32, 159, 8, 135, 40, 167],
    [191, 64, 223, 96, 199, 72, 231, 104],
    [48, 175, 16, 143, 56, 183, 24, 151],
    [239, 112, 207, 80, 247, 120, 215, 88],
    [12, 139, 44, 171, 4, 131, 36, 163],
    [203, 76, 235, 108, 195, 68, 227, 100],
    [60, 187, 28, 155, 52, 179, 20, 147],
    [251, 124, 219, 92, 243, 116, 211, 84],
];

fn bayer_threshold(x: usize, y: usize, matrix_size: usize) -> u8 {
    match matrix_size {
        8 => BAYER_8[y % 8][x % 8],
        4 => BAYER_4[y % 4][x % 4],
        _ => BAYER_2[y % 2][x % 2],
    }
}

/// Ordered (Bayer) dither to pure black/white, with a configurable
/// matrix size of 2, 4, or 8 (spec.md §4.9).
fn ordered_dither(pixels: &[u8], width: usize, matrix_size: usize) -> Vec<u8> {
    pixels
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            if width == 0 {
                return p;
            }
            let x = i % width;
            let y = i / width;
            let threshold = bayer_threshold(x, y, matrix_size);
            if p >= threshold { 255 } else { 0 }
        })
        .collect()
}

impl Widget for ImageWidget {
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
        let position = self.base.position();
        let raw = self.source.frame(position.w, position.h);
        if raw.len() != (position.w as usize) * (position.h as usize) {
            return Err(WidgetError::Update {
                widget_id: self.base.id().to_string(),
                reason: format!("image source returned {} pixels, expected {}", raw.len(), position.w as usize * position.h as usize),
            });
        }
        self.pixels = self.apply_mode(raw);
        Ok(())
    }

    fn render(&mut self, _now: Instant) -> Frame {
        let position = self.base.position();
        let mut frame = self.base.create_canvas();
        for y in 0..position.h as i64 {
            for x in 0..position.w as i64 {
                let idx = (y * position.w as i64 + x) as usize;
                if let Some(&p) = self.pixels.get(idx) {
                    frame.set(x, y, p);
                }
            }
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
        WidgetCfg { id: Some("image_0".into()), widget_type: "image".into(), position: PositionCfg { x: 0, y: 0, w: 4, h: 2, z: 0 }, ..Default::default() }
    }

    struct Checker;
    impl ImageSource for Checker {
        fn frame(&mut self, width: u32, height: u32) -> Vec<u8> {
            (0..width * height).map(|i| if i % 2 == 0 { 0 } else { 255 }).collect()
        }
    }

    #[test]
    fn threshold_mode_binarizes_pixels() {
        let mut c = cfg();
        c.mode = Some("threshold".into());
        let mut widget = ImageWidget::from_cfg(&c).unwrap().with_source(Box::new(Checker));
        widget.update(Instant::now()).unwrap();
        let frame = widget.render(Instant::now());
        assert!(frame.pixels().iter().all(|&p| p == 0 || p == 255));
    }

    #[test]
    fn posterize_levels_clamp_to_documented_range() {
        let mut c = cfg();
        c.mode = Some("posterize".into());
        c.extra.insert("posterize_levels".into(), serde_json::json!(64));
        let widget = ImageWidget::from_cfg(&c).unwrap();
        assert_eq!(widget.posterize_levels, 16);

        let mut c2 = cfg();
        c2.mode = Some("posterize".into());
        c2.extra.insert("posterize_levels".into(), serde_json::json!(1));
        let widget2 = ImageWidget::from_cfg(&c2).unwrap();
        assert_eq!(widget2.posterize_levels, 2);
    }

    #[test]
    fn dither_matrix_size_is_configurable() {
        for size in [2_u64, 4, 8] {
            let mut c = cfg();
            c.mode = Some("dither".into());
            c.extra.insert("bayer_matrix_size".into(), serde_json::json!(size));
            let mut widget = ImageWidget::from_cfg(&c).unwrap().with_source(Box::new(Checker));
            assert_eq!(widget.dither_matrix_size, size as usize);
            widget.update(Instant::now()).unwrap();
            let frame = widget.render(Instant::now());
            assert!(frame.pixels().iter().all(|&p| p == 0 || p == 255));
        }
    }

    #[test]
    fn unrecognized_matrix_size_falls_back_to_2x2() {
        let mut c = cfg();
        c.mode = Some("dither".into());
        c.extra.insert("bayer_matrix_size".into(), serde_json::json!(3));
        let widget = ImageWidget::from_cfg(&c).unwrap();
        assert_eq!(widget.dither_matrix_size, 2);
    }

    #[test]
    fn mismatched_source_dimensions_error_contained() {
        struct Wrong;
        impl ImageSource for Wrong {
            fn frame(&mut self, _w: u32, _h: u32) -> Vec<u8> {
                vec![0; 1]
            }
        }
        let mut widget = ImageWidget::from_cfg(&cfg()).unwrap().with_source(Box::new(Wrong));
        assert!(widget.update(Instant::now()).is_err());
    }
}
