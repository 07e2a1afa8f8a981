//! The `FontFace` capability the core requires. Real glyph rasterisation
//! (TTF loading, bundled bitmap fonts) is an explicit non-goal (spec.md §1);
//! this crate only defines the trait boundary plus a minimal built-in
//! monospace fallback so the pipeline is runnable without an external font
//! crate wired in.

use oled_primitives::Frame;

/// A rasterised glyph: a `width x height` 1-bit bitmap, row-major.
#[derive(Debug, Clone)]
pub struct GlyphBitmap {
    pub width: u32,
    pub height: u32,
    bits: Vec<bool>,
}

impl GlyphBitmap {
    pub fn new(width: u32, height: u32, bits: Vec<bool>) -> Self {
        debug_assert_eq!(bits.len(), (width as usize) * (height as usize));
        Self { width, height, bits }
    }

    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.bits[(y * self.width + x) as usize]
    }
}

/// Measure + rasterise capability a widget needs from a font, independent
/// of how glyphs are actually sourced (TTF, bundled bitmap, embedded).
pub trait FontFace {
    /// Height of one line of text in pixels, including inter-line spacing.
    fn line_height(&self) -> u32;
    /// Advance width of a single character in pixels.
    fn glyph_width(&self, ch: char) -> u32;
    /// Rasterises a single glyph.
    fn rasterize_glyph(&self, ch: char) -> GlyphBitmap;

    /// Measures the pixel bounding box of `s` as it would be drawn on one
    /// logical line (callers wrap multi-line text themselves).
    fn measure(&self, s: &str) -> (u32, u32) {
        let width: u32 = s.chars().map(|c| self.glyph_width(c)).sum();
        (width, self.line_height())
    }
}

/// A fixed-pitch 4x6 block font covering ASCII letters, digits, and a
/// handful of punctuation marks widgets actually emit (`:.,%°-…`). Glyphs
/// are procedurally generated stripe/box patterns, not true letterforms --
/// sufficient to exercise layout, clipping, and scrolling without pulling
/// in a font-rendering dependency that belongs to the external font loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinFont;

const GLYPH_W: u32 = 4;
const GLYPH_H: u32 = 6;

impl FontFace for BuiltinFont {
    fn line_height(&self) -> u32 {
        GLYPH_H + 1
    }

    fn glyph_width(&self, ch: char) -> u32 {
        if ch == ' ' { GLYPH_W - 1 } else { GLYPH_W + 1 }
    }

    fn rasterize_glyph(&self, ch: char) -> GlyphBitmap {
        if ch == ' ' {
            return GlyphBitmap::new(GLYPH_W, GLYPH_H, vec![false; (GLYPH_W * GLYPH_H) as usize]);
        }
        // Deterministic per-character stripe pattern: every glyph is
        // visually distinct and stable across runs, which is all layout
        // code needs from a stand-in font.
        let code = ch as u32;
        let mut bits = vec![false; (GLYPH_W * GLYPH_H) as usize];
        for y in 0..GLYPH_H {
            for x in 0..GLYPH_W {
                let on = (code.wrapping_add(x).wrapping_mul(y + 1)) % 3 != 0;
                // Always light the border so glyph extents are visible.
                let border = x == 0 || x == GLYPH_W - 1 || y == 0 || y == GLYPH_H - 1;
                bits[(y * GLYPH_W + x) as usize] = border || on;
            }
        }
        GlyphBitmap::new(GLYPH_W, GLYPH_H, bits)
    }
}

/// Draws `s` as a single line at `(x, y)`, clipped to `clip` (a `(x, y, w,
/// h)` rectangle in destination coordinates).
pub fn draw_text_at(
    face: &dyn FontFace,
    frame: &mut Frame,
    s: &str,
    x: i64,
    y: i64,
    color: u8,
    clip: (i64, i64, i64, i64),
) {
    let (cx, cy, cw, ch) = clip;
    let mut pen_x = x;
    for c in s.chars() {
        let glyph = face.rasterize_glyph(c);
        for gy in 0..glyph.height {
            for gx in 0..glyph.width {
                if !glyph.get(gx, gy) {
                    continue;
                }
                let px = pen_x + gx as i64;
                let py = y + gy as i64;
                if px < cx || py < cy || px >= cx + cw || py >= cy + ch {
                    continue;
                }
                frame.set(px, py, color);
            }
        }
        pen_x += face.glyph_width(c) as i64;
    }
}

/// Horizontal/vertical alignment helper: computes the top-left draw origin
/// for `s` inside `rect` given the requested alignment.
pub fn calculate_text_position(
    face: &dyn FontFace,
    s: &str,
    rect: (i64, i64, i64, i64),
    h_align: oled_primitives::HAlign,
    v_align: oled_primitives::VAlign,
) -> (i64, i64) {
    use oled_primitives::{HAlign, VAlign};
    let (rx, ry, rw, rh) = rect;
    let (tw, th) = face.measure(s);
    let x = match h_align {
        HAlign::Left => rx,
        HAlign::Center => rx + (rw - tw as i64) / 2,
        HAlign::Right => rx + rw - tw as i64,
    };
    let y = match v_align {
        VAlign::Top => ry,
        VAlign::Middle => ry + (rh - th as i64) / 2,
        VAlign::Bottom => ry + rh - th as i64,
    };
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measure_scales_with_character_count() {
        let font = BuiltinFont;
        let (w1, _) = font.measure("A");
        let (w2, _) = font.measure("AB");
        assert_eq!(w2, w1 * 2);
    }

    #[test]
    fn draw_text_clips_to_rect() {
        let font = BuiltinFont;
        let mut frame = Frame::new(6, 6, 0);
        draw_text_at(&font, &mut frame, "ABCDEFG", 0, 0, 255, (0, 0, 3, 6));
        // Nothing should have been written past column 3.
        for y in 0..6 {
            assert_eq!(frame.get(4, y), 0);
        }
    }
}
