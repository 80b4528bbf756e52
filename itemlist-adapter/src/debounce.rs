/// Coalesces rapid inputs (filter keystrokes, scroll bursts) into a single value.
///
/// Adapter-driven: the caller supplies timestamps on `push` and polls with `poll(now_ms)` from
/// its timer or frame tick. Only the latest pushed value is kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Debouncer<T> {
    delay_ms: u64,
    pending: Option<(T, u64)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Replaces the pending value and restarts the delay.
    pub fn push(&mut self, value: T, now_ms: u64) {
        self.pending = Some((value, now_ms));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes ready.
    pub fn deadline_ms(&self) -> Option<u64> {
        self.pending
            .as_ref()
            .map(|(_, at)| at.saturating_add(self.delay_ms))
    }

    /// Returns the pending value once the delay has elapsed since the last push.
    pub fn poll(&mut self, now_ms: u64) -> Option<T> {
        let deadline = self.deadline_ms()?;
        if now_ms < deadline {
            return None;
        }
        self.pending.take().map(|(value, _)| value)
    }

    /// Returns the pending value immediately.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
