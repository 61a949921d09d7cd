use std::cell::Cell;

/// A metrics-only counter that can be bumped through `&self`.
///
/// Used for read paths such as `peek_lfu` and `frequency` that do not take
/// `&mut self`. The cache itself is `!Sync` while it holds one of these, which
/// matches its single-owner usage model.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(Cell<u64>);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(Cell::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.get()
    }

    #[inline]
    pub fn incr(&self) {
        self.0.set(self.0.get() + 1);
    }
}
