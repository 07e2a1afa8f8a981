//! The animation substrate shared across widgets: scrollers, blink
//! animators, and inter-frame transitions. Every type here is owned
//! exclusively by the widget that instantiates it (spec.md §9).

mod blink;
mod clock;
mod scroller;
mod transition;

pub use blink::{BlinkAnimator, BlinkMode};
pub use clock::{Clock, FakeClock, SystemClock};
pub use scroller::{Direction, ScrollMode, Scroller};
pub use transition::{Edge, TransitionEngine, TransitionKind};
