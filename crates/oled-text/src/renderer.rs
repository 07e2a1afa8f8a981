//! Single-line marquee and multi-line scrolling text renderers.

use crate::font::{FontFace, draw_text_at};
use crate::wrapper::{TextWrapper, WrapMode, truncate_with_ellipsis};
use oled_anim::{Clock, ScrollMode, Scroller};
use oled_primitives::Frame;

/// `(x, y, w, h)` destination rectangle, in frame coordinates.
pub type Rect = (i64, i64, i64, i64);

/// Single-line horizontal marquee. Owns no state itself; callers pass in
/// the widget-owned [`Scroller`] so multiple renderers never fight over one
/// animator.
pub struct HorizontalTextRenderer<'a> {
    pub face: &'a dyn FontFace,
}

impl<'a> HorizontalTextRenderer<'a> {
    pub fn new(face: &'a dyn FontFace) -> Self {
        Self { face }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        text: &str,
        scroller: &mut Scroller,
        clock: &dyn Clock,
        rect: Rect,
        color: u8,
    ) {
        let (rx, ry, rw, _rh) = rect;
        let (content_w, _) = self.face.measure(text);
        if content_w as i64 <= rw {
            draw_text_at(self.face, frame, text, rx, ry, color, rect);
            return;
        }
        let offset = scroller.update(content_w as f32, rw as f32, clock) as i64;
        draw_text_at(self.face, frame, text, rx - offset, ry, color, rect);
        if scroller.mode == ScrollMode::Continuous {
            let period = content_w as i64 + scroller.gap_px as i64;
            draw_text_at(self.face, frame, text, rx - offset + period, ry, color, rect);
        }
    }
}

/// Multi-line vertical renderer with word wrap, ellipsis truncation, and
/// (when content overflows) scroll-driven paging.
pub struct MultiLineRenderer<'a> {
    pub face: &'a dyn FontFace,
    pub wrap_mode: WrapMode,
}

impl<'a> MultiLineRenderer<'a> {
    pub fn new(face: &'a dyn FontFace, wrap_mode: WrapMode) -> Self {
        Self { face, wrap_mode }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &self,
        frame: &mut Frame,
        text: &str,
        scroller: Option<&mut Scroller>,
        clock: &dyn Clock,
        rect: Rect,
        color: u8,
        scroll_gap: u32,
    ) {
        let (rx, ry, rw, rh) = rect;
        let wrapper = TextWrapper::new(self.face, rw as u32, self.wrap_mode);
        let lines = wrapper.wrap(text);
        let line_height = self.face.line_height() as i64;
        let total_height = lines.len() as i64 * line_height;

        if total_height <= rh || scroller.is_none() {
            let truncated = truncate_with_ellipsis(self.face, &lines, rh as u32, rw as u32);
            for (i, line) in truncated.iter().enumerate() {
                draw_text_at(self.face, frame, line, rx, ry + i as i64 * line_height, color, rect);
            }
            return;
        }

        let scroller = scroller.unwrap();
        let content_h = total_height as f32;
        let offset = scroller.update(content_h, rh as f32, clock) as i64;

        match scroller.mode {
            ScrollMode::Continuous => {
                let period = total_height + scroll_gap as i64;
                self.draw_lines_at(frame, &lines, rect, color, ry - offset, line_height);
                self.draw_lines_at(frame, &lines, rect, color, ry - offset + period, line_height);
            }
            ScrollMode::Bounce | ScrollMode::PauseEnds => {
                self.draw_lines_at(frame, &lines, rect, color, ry - offset, line_height);
            }
        }
    }

    fn draw_lines_at(&self, frame: &mut Frame, lines: &[String], rect: Rect, color: u8, start_y: i64, line_height: i64) {
        let (rx, _, _, _) = rect;
        for (i, line) in lines.iter().enumerate() {
            draw_text_at(self.face, frame, line, rx, start_y + i as i64 * line_height, color, rect);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BuiltinFont;
    use oled_anim::{Direction, FakeClock};

    #[test]
    fn short_text_renders_without_scroll() {
        let font = BuiltinFont;
        let renderer = HorizontalTextRenderer::new(&font);
        let mut frame = Frame::new(40, 8, 0);
        let clock = FakeClock::new();
        let mut scroller = Scroller::new(10.0, ScrollMode::Continuous, Direction::Forward, 4.0, 0);
        renderer.render(&mut frame, "hi", &mut scroller, &clock, (0, 0, 40, 8), 255);
        assert_eq!(scroller.offset(), 0.0);
    }

    #[test]
    fn multiline_truncates_when_no_scroller_given() {
        let font = BuiltinFont;
        let renderer = MultiLineRenderer::new(&font, WrapMode::Normal);
        let mut frame = Frame::new(30, 10, 0);
        let clock = FakeClock::new();
        renderer.render(
            &mut frame,
            "one two three four five six seven",
            None,
            &clock,
            (0, 0, 30, 10),
            255,
            2,
        );
        // Doesn't panic and stays within bounds; smoke test for the no-scroll path.
        assert_eq!(frame.width(), 30);
    }
}
