//! Font-aware word / break-all wrapping with ellipsis truncation.

use crate::font::FontFace;
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrapMode {
    Normal,
    BreakAll,
}

/// Splits `s` into paragraphs on explicit newlines, then wraps each
/// paragraph to `max_width` pixels per `mode`.
pub struct TextWrapper<'a> {
    pub face: &'a dyn FontFace,
    pub max_width: u32,
    pub mode: WrapMode,
}

impl<'a> TextWrapper<'a> {
    pub fn new(face: &'a dyn FontFace, max_width: u32, mode: WrapMode) -> Self {
        Self { face, max_width, mode }
    }

    pub fn wrap(&self, s: &str) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in s.split('\n') {
            match self.mode {
                WrapMode::Normal => lines.extend(self.wrap_normal(paragraph)),
                WrapMode::BreakAll => lines.extend(self.wrap_break_all(paragraph)),
            }
        }
        lines
    }

    fn width_of(&self, s: &str) -> u32 {
        self.face.measure(s).0
    }

    fn wrap_normal(&self, paragraph: &str) -> Vec<String> {
        if paragraph.is_empty() {
            return vec![String::new()];
        }
        let mut lines = Vec::new();
        let mut current = String::new();
        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if self.width_of(&candidate) <= self.max_width || current.is_empty() {
                if self.width_of(&candidate) <= self.max_width {
                    current = candidate;
                    continue;
                }
                // The word alone exceeds max_width: break it char-by-char.
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                let mut broken = self.wrap_break_all(word);
                if broken.is_empty() {
                    continue;
                }
                let last = broken.pop().unwrap();
                lines.extend(broken);
                current = last;
                continue;
            }
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
        if !current.is_empty() || lines.is_empty() {
            lines.push(current);
        }
        lines
    }

    fn wrap_break_all(&self, paragraph: &str) -> Vec<String> {
        if paragraph.is_empty() {
            return vec![String::new()];
        }
        let mut lines = Vec::new();
        let mut current = String::new();
        for grapheme in paragraph.graphemes(true) {
            let candidate = format!("{current}{grapheme}");
            if self.width_of(&candidate) <= self.max_width || current.is_empty() {
                current = candidate;
            } else {
                lines.push(std::mem::take(&mut current));
                current = grapheme.to_string();
            }
        }
        lines.push(current);
        lines
    }
}

/// Truncates `lines` to fit `max_height` pixels given the face's line
/// height, appending an ellipsis to the last kept line if content overflows.
pub fn truncate_with_ellipsis(face: &dyn FontFace, lines: &[String], max_height: u32, max_width: u32) -> Vec<String> {
    let line_height = face.line_height().max(1);
    let max_lines = (max_height / line_height) as usize;
    if max_lines == 0 {
        return Vec::new();
    }
    if lines.len() <= max_lines {
        return lines.to_vec();
    }
    let mut kept: Vec<String> = lines[..max_lines].to_vec();
    if let Some(last) = kept.last_mut() {
        *last = fit_with_ellipsis(face, last, max_width);
    }
    kept
}

fn fit_with_ellipsis(face: &dyn FontFace, line: &str, max_width: u32) -> String {
    const ELLIPSIS: &str = "\u{2026}";
    if face.measure(line).0 + face.measure(ELLIPSIS).0 <= max_width {
        return format!("{line}{ELLIPSIS}");
    }
    let graphemes: Vec<&str> = line.graphemes(true).collect();
    for cut in (0..graphemes.len()).rev() {
        let candidate: String = graphemes[..cut].concat();
        let candidate = format!("{candidate}{ELLIPSIS}");
        if face.measure(&candidate).0 <= max_width {
            return candidate;
        }
    }
    ELLIPSIS.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::BuiltinFont;

    #[test]
    fn normal_wrap_respects_max_width() {
        let font = BuiltinFont;
        let wrapper = TextWrapper::new(&font, 20, WrapMode::Normal);
        let lines = wrapper.wrap("the quick brown fox jumps");
        for line in &lines {
            assert!(font.measure(line).0 <= 20);
        }
    }

    #[test]
    fn break_all_concatenates_back_to_original_ignoring_newlines() {
        let font = BuiltinFont;
        let wrapper = TextWrapper::new(&font, 12, WrapMode::BreakAll);
        let original = "helloworld";
        let lines = wrapper.wrap(original);
        assert_eq!(lines.concat(), original);
    }

    #[test]
    fn truncate_appends_ellipsis_when_overflowing() {
        let font = BuiltinFont;
        let lines: Vec<String> = vec!["one".into(), "two".into(), "three".into()];
        let out = truncate_with_ellipsis(&font, &lines, font.line_height() * 2, 200);
        assert_eq!(out.len(), 2);
        assert!(out[1].ends_with('\u{2026}'));
    }

    #[test]
    fn paragraph_split_preserves_explicit_newlines() {
        let font = BuiltinFont;
        let wrapper = TextWrapper::new(&font, 200, WrapMode::Normal);
        let lines = wrapper.wrap("first\nsecond");
        assert_eq!(lines, vec!["first".to_string(), "second".to_string()]);
    }
}
