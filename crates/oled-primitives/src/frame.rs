//! Grayscale raster canvas and the drawing primitives widgets compose onto it.
//!
//! A [`Frame`] is a dense `width * height` byte buffer, row-major, top-left
//! origin; `0` is opaque black and `255` is full intensity (spec.md §3.1 /
//! §9 resolves the `background = 0` ambiguity as opaque, not transparent).
//! Every primitive here clips silently against the frame bounds -- nothing
//! in this module panics on out-of-range coordinates.

/// A width x height grayscale raster, one byte per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Frame {
    /// Creates a new frame filled uniformly with `fill`.
    pub fn new(width: u32, height: u32, fill: u8) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Reads a pixel. Out-of-range coordinates read as `0` rather than panic.
    pub fn get(&self, x: i64, y: i64) -> u8 {
        self.index(x, y).map(|i| self.pixels[i]).unwrap_or(0)
    }

    /// Writes a pixel, clipped silently against the frame bounds.
    pub fn set(&mut self, x: i64, y: i64, v: u8) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = v;
        }
    }

    pub fn fill(&mut self, v: u8) {
        self.pixels.fill(v);
    }

    pub fn draw_hline(&mut self, x: i64, y: i64, len: i64, color: u8) {
        let (start, end) = if len >= 0 { (x, x + len) } else { (x + len, x) };
        for px in start..end {
            self.set(px, y, color);
        }
    }

    pub fn draw_vline(&mut self, x: i64, y: i64, len: i64, color: u8) {
        let (start, end) = if len >= 0 { (y, y + len) } else { (y + len, y) };
        for py in start..end {
            self.set(x, py, color);
        }
    }

    pub fn draw_rect_outline(&mut self, x: i64, y: i64, w: i64, h: i64, color: u8) {
        if w <= 0 || h <= 0 {
            return;
        }
        self.draw_hline(x, y, w, color);
        self.draw_hline(x, y + h - 1, w, color);
        self.draw_vline(x, y, h, color);
        self.draw_vline(x + w - 1, y, h, color);
    }

    pub fn fill_rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: u8) {
        for row in 0..h {
            self.draw_hline(x, y + row, w, color);
        }
    }

    /// Midpoint circle outline, centered at `(cx, cy)`.
    pub fn draw_circle(&mut self, cx: i64, cy: i64, radius: i64, color: u8) {
        if radius < 0 {
            return;
        }
        let mut x = radius;
        let mut y = 0i64;
        let mut err = 1 - radius;
        while x >= y {
            for (dx, dy) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
                self.set(cx + dx, cy + dy, color);
            }
            y += 1;
            if err < 0 {
                err += 2 * y + 1;
            } else {
                x -= 1;
                err += 2 * (y - x) + 1;
            }
        }
    }

    pub fn fill_circle(&mut self, cx: i64, cy: i64, radius: i64, color: u8) {
        if radius < 0 {
            return;
        }
        let r2 = radius * radius;
        for dy in -radius..=radius {
            let half = ((r2 - dy * dy).max(0) as f64).sqrt() as i64;
            self.draw_hline(cx - half, cy + dy, 2 * half + 1, color);
        }
    }

    /// Bresenham line from `(x0, y0)` to `(x1, y1)` inclusive.
    pub fn draw_line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: u8) {
        let dx = (x1 - x0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let dy = -(y1 - y0).abs();
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        loop {
            self.set(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Horizontal percentage bar filling left-to-right from `(x, y)`.
    /// `percent` is clamped to `[0, 100]`. `border`, when `Some`, draws a
    /// 1px outline one pixel outside the fill rectangle.
    pub fn draw_bar_horizontal(
        &mut self,
        x: i64,
        y: i64,
        w: i64,
        h: i64,
        percent: f32,
        color: u8,
        border: Option<u8>,
    ) {
        if w <= 0 || h <= 0 {
            return;
        }
        let percent = percent.clamp(0.0, 100.0);
        let inner_w = if border.is_some() { (w - 2).max(0) } else { w };
        let inner_h = if border.is_some() { (h - 2).max(0) } else { h };
        let (inner_x, inner_y) = if border.is_some() { (x + 1, y + 1) } else { (x, y) };
        let filled = ((percent / 100.0) * inner_w as f32).floor() as i64;
        self.fill_rect(inner_x, inner_y, filled, inner_h, color);
        if let Some(b) = border {
            self.draw_rect_outline(x, y, w, h, b);
        }
    }

    /// Vertical percentage bar filling bottom-to-top from `(x, y)`.
    pub fn draw_bar_vertical(
        &mut self,
        x: i64,
        y: i64,
        w: i64,
        h: i64,
        percent: f32,
        color: u8,
        border: Option<u8>,
    ) {
        if w <= 0 || h <= 0 {
            return;
        }
        let percent = percent.clamp(0.0, 100.0);
        let inner_w = if border.is_some() { (w - 2).max(0) } else { w };
        let inner_h = if border.is_some() { (h - 2).max(0) } else { h };
        let (inner_x, inner_y) = if border.is_some() { (x + 1, y + 1) } else { (x, y) };
        let filled = ((percent / 100.0) * inner_h as f32).floor() as i64;
        let fill_top = inner_y + inner_h - filled;
        self.fill_rect(inner_x, fill_top, inner_w, filled, color);
        if let Some(b) = border {
            self.draw_rect_outline(x, y, w, h, b);
        }
    }

    /// Renders at most `capacity` samples (each `0..=100`) as a history
    /// graph: newest sample at the rightmost column, filled area below the
    /// polyline, with an optional distinct top line color.
    pub fn draw_graph(
        &mut self,
        x: i64,
        y: i64,
        w: i64,
        h: i64,
        samples: &[f32],
        capacity: usize,
        fill_color: u8,
        line_color: Option<u8>,
    ) {
        if w <= 0 || h <= 0 || capacity == 0 {
            return;
        }
        let capacity = capacity.max(1);
        let take = samples.len().min(capacity);
        let start = samples.len() - take;
        let visible = &samples[start..];
        let col_w = (w as f64 / capacity as f64).max(1.0);
        let mut prev_col_y: Option<i64> = None;
        for (i, &sample) in visible.iter().enumerate() {
            // Newest sample occupies the rightmost slot.
            let slot = capacity - take + i;
            let col_x0 = x + (slot as f64 * col_w).round() as i64;
            let col_x1 = x + ((slot + 1) as f64 * col_w).round() as i64;
            let col_w_i = (col_x1 - col_x0).max(1);
            let pct = sample.clamp(0.0, 100.0) / 100.0;
            let bar_h = (pct as f64 * h as f64).round() as i64;
            let top_y = y + h - bar_h;
            self.fill_rect(col_x0, top_y, col_w_i, bar_h, fill_color);
            if let Some(lc) = line_color {
                if let Some(py) = prev_col_y {
                    self.draw_line(col_x0, py, col_x0, top_y, lc);
                }
                self.draw_hline(col_x0, top_y, col_w_i, lc);
                prev_col_y = Some(top_y);
            }
        }
    }

    /// Semicircular gauge: arc across the top half, needle pivoting from
    /// bottom-center, optional 11 evenly spaced ticks.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_gauge(
        &mut self,
        x: i64,
        y: i64,
        w: i64,
        h: i64,
        percent: f32,
        arc_color: u8,
        needle_color: u8,
        show_ticks: bool,
        ticks_color: u8,
    ) {
        if w <= 0 || h <= 0 {
            return;
        }
        let percent = percent.clamp(0.0, 100.0);
        let cx = x + w / 2;
        let cy = y + h - 1;
        let radius = (w.min(2 * h) / 2).max(1);

        let steps = (radius as f64 * std::f64::consts::PI).ceil() as i64;
        let steps = steps.max(32);
        for i in 0..=steps {
            let theta = std::f64::consts::PI * (1.0 - i as f64 / steps as f64);
            let px = cx + (radius as f64 * theta.cos()).round() as i64;
            let py = cy - (radius as f64 * theta.sin()).round() as i64;
            self.set(px, py, arc_color);
        }

        if show_ticks {
            for i in 0..11 {
                let theta = std::f64::consts::PI * (1.0 - i as f64 / 10.0);
                let inner = (radius as f64 * 0.8) as i64;
                let px0 = cx + (inner as f64 * theta.cos()).round() as i64;
                let py0 = cy - (inner as f64 * theta.sin()).round() as i64;
                let px1 = cx + (radius as f64 * theta.cos()).round() as i64;
                let py1 = cy - (radius as f64 * theta.sin()).round() as i64;
                self.draw_line(px0, py0, px1, py1, ticks_color);
            }
        }

        let theta = std::f64::consts::PI * (1.0 - percent as f64 / 100.0);
        let nx = cx + (radius as f64 * theta.cos()).round() as i64;
        let ny = cy - (radius as f64 * theta.sin()).round() as i64;
        self.draw_line(cx, cy, nx, ny, needle_color);
    }

    /// Overwrites this frame with `src` positioned at `(x, y)`, clipped.
    /// This is the compositor's z-order blit: no blending, last write wins.
    pub fn blit(&mut self, src: &Frame, x: i64, y: i64) {
        for sy in 0..src.height() as i64 {
            for sx in 0..src.width() as i64 {
                self.set(x + sx, y + sy, src.get(sx, sy));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_has_requested_bounds_and_fill() {
        let f = Frame::new(8, 4, 7);
        assert_eq!(f.width(), 8);
        assert_eq!(f.height(), 4);
        assert_eq!(f.pixels().len(), 32);
        assert!(f.pixels().iter().all(|&p| p == 7));
    }

    #[test]
    fn out_of_range_reads_and_writes_do_not_panic() {
        let mut f = Frame::new(4, 4, 0);
        f.set(-1, -1, 200);
        f.set(100, 100, 200);
        assert_eq!(f.get(-1, -1), 0);
        assert_eq!(f.get(100, 100), 0);
    }

    #[test]
    fn draw_rect_outline_clips_at_bounds() {
        let mut f = Frame::new(4, 4, 0);
        f.draw_rect_outline(-2, -2, 10, 10, 255);
        // No panic; corners within bounds are set.
        assert_eq!(f.get(0, 0), 255);
    }

    #[test]
    fn horizontal_bar_fills_expected_columns() {
        let mut f = Frame::new(10, 4, 0);
        f.draw_bar_horizontal(0, 0, 10, 4, 50.0, 255, None);
        assert_eq!(f.get(4, 0), 255);
        assert_eq!(f.get(5, 0), 0);
    }

    #[test]
    fn vertical_bar_fills_from_bottom() {
        let mut f = Frame::new(4, 10, 0);
        f.draw_bar_vertical(0, 0, 4, 10, 30.0, 255, None);
        assert_eq!(f.get(0, 9), 255);
        assert_eq!(f.get(0, 0), 0);
    }

    #[test]
    fn blit_overwrites_destination_region() {
        let mut dst = Frame::new(8, 8, 10);
        let src = Frame::new(3, 3, 200);
        dst.blit(&src, 2, 2);
        assert_eq!(dst.get(2, 2), 200);
        assert_eq!(dst.get(4, 4), 200);
        assert_eq!(dst.get(5, 5), 10);
    }

    #[test]
    fn graph_respects_capacity_window() {
        let mut f = Frame::new(20, 10, 0);
        let samples: Vec<f32> = (0..50).map(|i| i as f32).collect();
        f.draw_graph(0, 0, 20, 10, &samples, 10, 255, None);
        // Rightmost column should reflect the last sample (49 -> near full height).
        assert_eq!(f.get(19, 9), 255);
    }
}
