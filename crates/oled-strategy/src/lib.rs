//! Stateless, tag-dispatched display-mode strategies: text, bar, graph,
//! gauge, and their dual/grid compositions (spec.md §4.6).
//!
//! Strategies are plain functions rather than trait objects: the mode set
//! is closed and small, so a tagged dispatch is equivalent to dynamic
//! dispatch here (spec.md §9 design note) without the indirection.

use oled_primitives::{Frame, HAlign, VAlign};
use oled_text::{FontFace, calculate_text_position, draw_text_at};

pub type Rect = (i64, i64, i64, i64);

/// The four display-mode tags a widget can select. Unknown tags fall back
/// to `Text` (spec.md testable property 12).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Text,
    Bar,
    Graph,
    Gauge,
}

impl Mode {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "bar" => Mode::Bar,
            "graph" => Mode::Graph,
            "gauge" => Mode::Gauge,
            _ => Mode::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarDirection {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy)]
pub struct BarParams {
    pub direction: BarDirection,
    pub fill_color: u8,
    pub border: Option<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct GraphParams {
    pub history: usize,
    pub fill_color: u8,
    pub line_color: Option<u8>,
}

#[derive(Debug, Clone, Copy)]
pub struct GaugeParams {
    pub show_ticks: bool,
    pub arc_color: u8,
    pub needle_color: u8,
    /// Drawn as a distinct overlay on top of the arc, never replacing it
    /// (spec.md §9 resolves the ticks-vs-arc ambiguity this way).
    pub ticks_color: u8,
}

pub struct TextParams<'a> {
    pub face: &'a dyn FontFace,
    pub h_align: HAlign,
    pub v_align: VAlign,
    pub color: u8,
    /// Pre-formatted display string (callers apply `text.format` /
    /// strftime / printf-style formatting before calling the strategy).
    pub text: &'a str,
}

/// Single-value strategy selection and its mode-specific parameters.
pub enum Strategy<'a> {
    Text(TextParams<'a>),
    Bar(BarParams),
    Graph(GraphParams),
    Gauge(GaugeParams),
}

/// Renders one metric value according to `strategy`. `history` is consulted
/// only by the `Graph` strategy.
pub fn render_metric(frame: &mut Frame, rect: Rect, value: f32, history: &[f32], strategy: &Strategy) {
    let (x, y, w, h) = rect;
    match strategy {
        Strategy::Text(params) => {
            let (tx, ty) = calculate_text_position(params.face, params.text, rect, params.h_align, params.v_align);
            draw_text_at(params.face, frame, params.text, tx, ty, params.color, rect);
        }
        Strategy::Bar(params) => match params.direction {
            BarDirection::Horizontal => frame.draw_bar_horizontal(x, y, w, h, value, params.fill_color, params.border),
            BarDirection::Vertical => frame.draw_bar_vertical(x, y, w, h, value, params.fill_color, params.border),
        },
        Strategy::Graph(params) => {
            frame.draw_graph(x, y, w, h, history, params.history, params.fill_color, params.line_color);
        }
        Strategy::Gauge(params) => {
            frame.draw_gauge(x, y, w, h, value, params.arc_color, params.needle_color, params.show_ticks, params.ticks_color);
        }
    }
}

/// Two-value strategy (e.g. network rx/tx, disk read/write). Bars stack
/// (channel A on top, channel B below within the same rect), graphs
/// overlap with distinct line colors, gauges nest (channel B drawn at a
/// smaller radius inside channel A's arc).
pub fn render_dual_metric(
    frame: &mut Frame,
    rect: Rect,
    value_a: f32,
    value_b: f32,
    history_a: &[f32],
    history_b: &[f32],
    mode: Mode,
    color_a: u8,
    color_b: u8,
    history_cap: usize,
) {
    let (x, y, w, h) = rect;
    match mode {
        Mode::Bar => {
            let half_h = h / 2;
            frame.draw_bar_horizontal(x, y, w, half_h, value_a, color_a, None);
            frame.draw_bar_horizontal(x, y + half_h, w, h - half_h, value_b, color_b, None);
        }
        Mode::Graph => {
            frame.draw_graph(x, y, w, h, history_a, history_cap, color_a, Some(color_a));
            frame.draw_graph(x, y, w, h, history_b, history_cap, color_b, Some(color_b));
        }
        Mode::Gauge => {
            frame.draw_gauge(x, y, w, h, value_a, color_a, color_a, false, color_a);
            let inset = (w.min(h) / 5).max(1);
            frame.draw_gauge(x + inset, y, w - 2 * inset, h, value_b, color_b, color_b, false, color_b);
        }
        Mode::Text => {
            let half_w = w / 2;
            frame.fill_rect(x, y, half_w, h, 0);
            frame.fill_rect(x + half_w, y, w - half_w, h, 0);
        }
    }
}

/// Near-square grid layout for `n` cells within `rect`, separated by
/// `margin` pixels, used by per-core CPU and other N-value widgets.
pub fn grid_layout(n: usize, rect: Rect, margin: i64) -> Vec<Rect> {
    if n == 0 {
        return Vec::new();
    }
    let (x, y, w, h) = rect;
    let cols = (n as f64).sqrt().ceil() as i64;
    let rows = ((n as i64) + cols - 1) / cols;
    let cell_w = (w - margin * (cols - 1)).max(cols) / cols;
    let cell_h = (h - margin * (rows - 1)).max(rows) / rows;
    (0..n)
        .map(|i| {
            let col = (i as i64) % cols;
            let row = (i as i64) / cols;
            (x + col * (cell_w + margin), y + row * (cell_h + margin), cell_w, cell_h)
        })
        .collect()
}

/// Renders `values` (and, for `Graph`, `histories`) over a [`grid_layout`]
/// using the single-value strategy selected by `mode`.
pub fn render_grid_metric(
    frame: &mut Frame,
    rect: Rect,
    values: &[f32],
    histories: &[Vec<f32>],
    mode: Mode,
    fill_color: u8,
    history_cap: usize,
    margin: i64,
    cell_border: Option<u8>,
) {
    let cells = grid_layout(values.len(), rect, margin);
    for (i, cell) in cells.into_iter().enumerate() {
        let value = values[i];
        let empty = Vec::new();
        let history = histories.get(i).unwrap_or(&empty);
        match mode {
            Mode::Bar => {
                frame.draw_bar_vertical(cell.0, cell.1, cell.2, cell.3, value, fill_color, cell_border);
            }
            Mode::Graph => {
                frame.draw_graph(cell.0, cell.1, cell.2, cell.3, history, history_cap, fill_color, None);
            }
            Mode::Gauge => {
                frame.draw_gauge(cell.0, cell.1, cell.2, cell.3, value, fill_color, fill_color, false, fill_color);
            }
            Mode::Text => {
                // Grid text cells are rendered by the caller (needs a FontFace
                // and per-cell formatted strings); this strategy only lays
                // out + draws the optional cell border here.
            }
        }
        if let (Some(b), true) = (cell_border, !matches!(mode, Mode::Bar)) {
            frame.draw_rect_outline(cell.0, cell.1, cell.2, cell.3, b);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_mode_tag_falls_back_to_text() {
        assert_eq!(Mode::from_tag("unknown"), Mode::Text);
        assert_eq!(Mode::from_tag("bar"), Mode::Bar);
    }

    #[test]
    fn grid_layout_is_near_square_and_covers_all_cells() {
        let cells = grid_layout(4, (0, 0, 100, 100), 2);
        assert_eq!(cells.len(), 4);
        for (x, y, w, h) in &cells {
            assert!(*x >= 0 && *y >= 0);
            assert!(*w > 0 && *h > 0);
        }
    }

    #[test]
    fn grid_layout_for_nine_values_is_three_by_three() {
        let cells = grid_layout(9, (0, 0, 90, 90), 0);
        // A 3x3 grid means the 4th cell (index 3) starts a new row at x=0.
        assert_eq!(cells[3].0, 0);
    }

    #[test]
    fn bar_strategy_draws_into_frame() {
        let mut frame = Frame::new(20, 10, 0);
        let strategy = Strategy::Bar(BarParams { direction: BarDirection::Horizontal, fill_color: 255, border: None });
        render_metric(&mut frame, (0, 0, 20, 10), 50.0, &[], &strategy);
        assert_eq!(frame.get(5, 5), 255);
        assert_eq!(frame.get(15, 5), 0);
    }
}
