//! Text wrapping and rendering: font-aware word wrap, single-line marquee,
//! multi-line scroll, and strftime token translation.

mod font;
mod renderer;
mod strftime;
mod wrapper;

pub use font::{BuiltinFont, FontFace, GlyphBitmap, calculate_text_position, draw_text_at};
pub use renderer::{HorizontalTextRenderer, MultiLineRenderer, Rect};
pub use strftime::{WallTime, format_strftime};
pub use wrapper::{TextWrapper, WrapMode, truncate_with_ellipsis};
