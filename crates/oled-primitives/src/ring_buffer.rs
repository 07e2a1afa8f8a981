//! Fixed-capacity overwrite-on-full ring buffer shared by every widget's
//! history state (CPU/network/disk graphs, per-core grids, audio history).

/// A FIFO of fixed capacity; once full, `push` overwrites the oldest entry.
/// Index `0` is always the oldest retained element, `len() - 1` the newest.
#[derive(Debug, Clone)]
pub struct FixedRingBuffer<T> {
    data: Vec<Option<T>>,
    cap: usize,
    head: usize,
    len: usize,
}

impl<T: Clone> FixedRingBuffer<T> {
    /// Creates a buffer of the given capacity. `0` is treated as `1`.
    pub fn new(cap: usize) -> Self {
        let cap = cap.max(1);
        Self {
            data: vec![None; cap],
            cap,
            head: 0,
            len: 0,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.cap
    }

    /// Pushes a new (newest) value, overwriting the oldest when full.
    pub fn push(&mut self, value: T) {
        let write_at = (self.head + self.len) % self.cap;
        self.data[write_at] = Some(value);
        if self.len < self.cap {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % self.cap;
        }
    }

    /// Returns the element at logical index `i` (`0` = oldest), if in range.
    pub fn get(&self, i: usize) -> Option<&T> {
        if i >= self.len {
            return None;
        }
        let idx = (self.head + i) % self.cap;
        self.data[idx].as_ref()
    }

    /// Copies out all retained elements, oldest first.
    pub fn to_slice(&self) -> Vec<T> {
        (0..self.len).filter_map(|i| self.get(i).cloned()).collect()
    }

    pub fn clear(&mut self) {
        self.data.fill(None);
        self.head = 0;
        self.len = 0;
    }
}
