//! Inter-frame transitions: dissolve, push, slide, wipe. Owned per-widget
//! (spec.md §3.3/§4.9) so the compositor only ever composes already-final
//! widget frames.

use crate::clock::Clock;
use oled_primitives::Frame;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Dissolve,
    Push(Edge),
    Slide(Edge),
    Wipe(Edge),
}

#[derive(Debug, Clone)]
pub struct TransitionEngine {
    active: bool,
    kind: TransitionKind,
    start_instant: Option<Instant>,
    duration: Duration,
    old_frame: Option<Frame>,
    progress: f32,
    pixel_order: Option<Vec<u32>>,
}

impl Default for TransitionEngine {
    fn default() -> Self {
        Self {
            active: false,
            kind: TransitionKind::Dissolve,
            start_instant: None,
            duration: Duration::from_millis(300),
            old_frame: None,
            progress: 1.0,
            pixel_order: None,
        }
    }
}

impl TransitionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Starts a new transition away from `old_frame`, toward whatever the
    /// widget renders next.
    pub fn start(&mut self, kind: TransitionKind, duration: Duration, old_frame: Frame, clock: &dyn Clock) {
        let total = (old_frame.width() as usize) * (old_frame.height() as usize);
        self.pixel_order = matches!(kind, TransitionKind::Dissolve).then(|| shuffled_indices(total));
        self.kind = kind;
        self.duration = duration;
        self.old_frame = Some(old_frame);
        self.start_instant = Some(clock.now());
        self.progress = 0.0;
        self.active = true;
    }

    /// Advances `progress` toward `1.0`; deactivates once complete.
    pub fn tick(&mut self, clock: &dyn Clock) -> f32 {
        if !self.active {
            return 1.0;
        }
        let elapsed = self
            .start_instant
            .map(|s| clock.now().saturating_duration_since(s))
            .unwrap_or(Duration::ZERO);
        let p = if self.duration.is_zero() {
            1.0
        } else {
            (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        };
        self.progress = p;
        if p >= 1.0 {
            self.active = false;
        }
        p
    }

    /// Composes `old_frame` (captured at `start`) and `new_frame` at the
    /// current progress. Call `tick` first to advance progress for this
    /// frame. Returns `new_frame` unchanged when no transition is active.
    pub fn render(&self, new_frame: &Frame) -> Frame {
        let Some(old) = &self.old_frame else {
            return new_frame.clone();
        };
        if !self.active && self.progress >= 1.0 {
            return new_frame.clone();
        }
        let w = new_frame.width();
        let h = new_frame.height();
        let mut out = Frame::new(w, h, 0);
        match self.kind {
            TransitionKind::Dissolve => {
                let total = (w as usize) * (h as usize);
                let threshold = (self.progress * total as f32) as usize;
                let order = self.pixel_order.as_deref().unwrap_or(&[]);
                for y in 0..h as i64 {
                    for x in 0..w as i64 {
                        let idx = (y as usize) * (w as usize) + (x as usize);
                        let rank = order.get(idx).copied().unwrap_or(idx as u32) as usize;
                        let v = if rank < threshold { new_frame.get(x, y) } else { old.get(x, y) };
                        out.set(x, y, v);
                    }
                }
            }
            TransitionKind::Push(edge) => {
                let (dx, dy) = edge_offset(edge, w, h, self.progress);
                out.blit(old, dx, dy);
                let (ndx, ndy) = edge_offset(opposite(edge), w, h, 1.0 - self.progress);
                out.blit(new_frame, dx - ndx, dy - ndy);
            }
            TransitionKind::Slide(edge) => {
                out.blit(old, 0, 0);
                let (dx, dy) = edge_offset(edge, w, h, self.progress);
                out.blit(new_frame, dx, dy);
            }
            TransitionKind::Wipe(edge) => {
                out.blit(old, 0, 0);
                let boundary = match edge {
                    Edge::Left | Edge::Right => (self.progress * w as f32) as i64,
                    Edge::Up | Edge::Down => (self.progress * h as f32) as i64,
                };
                for y in 0..h as i64 {
                    for x in 0..w as i64 {
                        let revealed = match edge {
                            Edge::Left => x < boundary,
                            Edge::Right => x >= w as i64 - boundary,
                            Edge::Up => y < boundary,
                            Edge::Down => y >= h as i64 - boundary,
                        };
                        if revealed {
                            out.set(x, y, new_frame.get(x, y));
                        }
                    }
                }
            }
        }
        out
    }
}

fn opposite(edge: Edge) -> Edge {
    match edge {
        Edge::Left => Edge::Right,
        Edge::Right => Edge::Left,
        Edge::Up => Edge::Down,
        Edge::Down => Edge::Up,
    }
}

fn edge_offset(edge: Edge, w: u32, h: u32, progress: f32) -> (i64, i64) {
    let p = progress.clamp(0.0, 1.0);
    match edge {
        Edge::Left => (-((w as f32) * p) as i64, 0),
        Edge::Right => (((w as f32) * p) as i64, 0),
        Edge::Up => (0, -((h as f32) * p) as i64),
        Edge::Down => (0, ((h as f32) * p) as i64),
    }
}

/// Deterministic pseudo-shuffle of `0..n` using a xorshift PRNG seeded from
/// `n` itself. No external RNG dependency is warranted for a cosmetic pixel
/// reveal order.
fn shuffled_indices(n: usize) -> Vec<u32> {
    let mut indices: Vec<u32> = (0..n as u32).collect();
    let mut state: u32 = (n as u32).wrapping_mul(2654435761).max(1);
    for i in (1..indices.len()).rev() {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let j = (state as usize) % (i + 1);
        indices.swap(i, j);
    }
    // `rank[original_index] = shuffled position`, so dissolve reveals pixels
    // in the shuffled order rather than index order.
    let mut rank = vec![0u32; n];
    for (pos, &orig) in indices.iter().enumerate() {
        rank[orig as usize] = pos as u32;
    }
    rank
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FakeClock;

    #[test]
    fn inactive_engine_returns_new_frame_unchanged() {
        let engine = TransitionEngine::new();
        let new_frame = Frame::new(4, 4, 77);
        let out = engine.render(&new_frame);
        assert_eq!(out, new_frame);
    }

    #[test]
    fn progress_reaches_one_and_deactivates_after_duration() {
        let clock = FakeClock::new();
        let mut engine = TransitionEngine::new();
        let old = Frame::new(4, 4, 0);
        engine.start(TransitionKind::Dissolve, Duration::from_millis(100), old, &clock);
        assert!(engine.is_active());
        clock.advance(Duration::from_millis(50));
        let mid = engine.tick(&clock);
        assert!(mid > 0.0 && mid < 1.0);
        assert!(engine.is_active());
        clock.advance(Duration::from_millis(60));
        let done = engine.tick(&clock);
        assert_eq!(done, 1.0);
        assert!(!engine.is_active());
    }

    #[test]
    fn dissolve_at_full_progress_matches_new_frame() {
        let clock = FakeClock::new();
        let mut engine = TransitionEngine::new();
        let old = Frame::new(4, 4, 10);
        engine.start(TransitionKind::Dissolve, Duration::from_millis(10), old, &clock);
        clock.advance(Duration::from_millis(20));
        engine.tick(&clock);
        let new_frame = Frame::new(4, 4, 250);
        let out = engine.render(&new_frame);
        assert_eq!(out, new_frame);
    }

    #[test]
    fn wipe_left_reveals_progressively() {
        let clock = FakeClock::new();
        let mut engine = TransitionEngine::new();
        let old = Frame::new(10, 4, 0);
        engine.start(TransitionKind::Wipe(Edge::Left), Duration::from_millis(100), old, &clock);
        clock.advance(Duration::from_millis(50));
        engine.tick(&clock);
        let new_frame = Frame::new(10, 4, 255);
        let out = engine.render(&new_frame);
        assert_eq!(out.get(0, 0), 255);
        assert_eq!(out.get(9, 0), 0);
    }
}
