//! `MetricSource` traits: the external collaborator boundary widgets pull
//! system-data samples through. How values are obtained (CPU %, audio PCM,
//! network counters, ...) is out of scope here (spec.md §1); producer tasks
//! deposit the latest sample into locked state behind these traits and
//! widgets read it at `update()` time, never blocking (spec.md §5).

/// A single `0..=100`-ish scalar reading, e.g. CPU%, memory%, volume%.
pub trait MetricSource: Send + Sync {
    fn read(&self) -> f32;
}

/// Two related readings, e.g. network rx/tx or disk read/write, in
/// whatever unit the widget expects (bytes/sec for network/disk).
pub trait DualMetricSource: Send + Sync {
    fn read(&self) -> (f32, f32);
}

/// A variable-length set of readings, e.g. per-core CPU percentages.
pub trait SeriesMetricSource: Send + Sync {
    fn read(&self) -> Vec<f32>;
}

/// A fixed value source for tests and the CLI smoke-test binary.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSource(pub f32);

impl MetricSource for ConstantSource {
    fn read(&self) -> f32 {
        self.0
    }
}

/// A value source backed by an atomic, settable from a producer task
/// without locking (spec.md §5's "push into locked state" pattern,
/// specialised to the common single-f32 case via bit-cast storage).
#[derive(Debug)]
pub struct AtomicSource(std::sync::atomic::AtomicU32);

impl AtomicSource {
    pub fn new(initial: f32) -> Self {
        Self(std::sync::atomic::AtomicU32::new(initial.to_bits()))
    }

    pub fn set(&self, value: f32) {
        self.0.store(value.to_bits(), std::sync::atomic::Ordering::Relaxed);
    }
}

impl MetricSource for AtomicSource {
    fn read(&self) -> f32 {
        f32::from_bits(self.0.load(std::sync::atomic::Ordering::Relaxed))
    }
}

/// A value source fed by a producer task over a `crossbeam-channel`
/// (spec.md §5's "producer deposits into locked state" pattern, for
/// producers that are naturally push-based rather than poll-based).
/// `read()` drains to the newest pending sample without blocking,
/// holding onto the last-seen value if nothing new has arrived.
pub struct ChannelSource {
    rx: crossbeam_channel::Receiver<f32>,
    last: std::sync::Mutex<f32>,
}

impl ChannelSource {
    pub fn new(rx: crossbeam_channel::Receiver<f32>, initial: f32) -> Self {
        Self { rx, last: std::sync::Mutex::new(initial) }
    }
}

impl MetricSource for ChannelSource {
    fn read(&self) -> f32 {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        while let Ok(v) = self.rx.try_recv() {
            *last = v;
        }
        *last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_source_roundtrips_latest_value() {
        let source = AtomicSource::new(12.0);
        assert_eq!(source.read(), 12.0);
        source.set(87.5);
        assert_eq!(source.read(), 87.5);
    }

    #[test]
    fn channel_source_reads_newest_pending_sample() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let source = ChannelSource::new(rx, 0.0);
        assert_eq!(source.read(), 0.0);
        tx.send(10.0).unwrap();
        tx.send(20.0).unwrap();
        assert_eq!(source.read(), 20.0);
    }

    #[test]
    fn channel_source_holds_last_value_when_nothing_new_arrived() {
        let (tx, rx) = crossbeam_channel::unbounded();
        let source = ChannelSource::new(rx, 5.0);
        tx.send(42.0).unwrap();
        assert_eq!(source.read(), 42.0);
        assert_eq!(source.read(), 42.0);
    }
}
