/// Deterministic commit timebase.
///
/// The controller advances one frame per processed event, so diagnostics and
/// staged commits can be ordered and replayed without wall-clock time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
}

impl Frame {
    pub fn new(index: u64) -> Self {
        Self { index }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new(0)
    }
}
