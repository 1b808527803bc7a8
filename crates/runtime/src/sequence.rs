//! Cooperative, step-resumed waiting.
//!
//! There are no threads and no blocking anywhere in the core: a behavior
//! that needs to wait simply records what it is waiting for and re-enters on
//! the next step. Disabling the owning behavior cancels the wait
//! synchronously.

enum WaitState {
    Ready,
    Ticks(u32),
    Until(Box<dyn FnMut() -> bool + Send>),
}

impl std::fmt::Debug for WaitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitState::Ready => f.write_str("Ready"),
            WaitState::Ticks(n) => write!(f, "Ticks({n})"),
            WaitState::Until(_) => f.write_str("Until(..)"),
        }
    }
}

/// A resumable wait: "N more steps" or "until the predicate holds".
///
/// Call [`Sequence::tick`] once at the start of each step; it advances the
/// wait and reports whether the owner may proceed this step.
#[derive(Debug)]
pub struct Sequence {
    state: WaitState,
}

impl Default for Sequence {
    fn default() -> Self {
        Self {
            state: WaitState::Ready,
        }
    }
}

impl Sequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suspends the owner for `ticks` further steps. Zero is a no-op.
    pub fn wait_ticks(&mut self, ticks: u32) {
        if ticks > 0 {
            self.state = WaitState::Ticks(ticks);
        }
    }

    /// Suspends the owner until `predicate` returns true at a step boundary.
    pub fn wait_until(&mut self, predicate: impl FnMut() -> bool + Send + 'static) {
        self.state = WaitState::Until(Box::new(predicate));
    }

    /// Advances the wait by one step. Returns true when the owner may run.
    pub fn tick(&mut self) -> bool {
        match &mut self.state {
            WaitState::Ready => true,
            WaitState::Ticks(remaining) => {
                *remaining -= 1;
                if *remaining == 0 {
                    self.state = WaitState::Ready;
                    true
                } else {
                    false
                }
            }
            WaitState::Until(predicate) => {
                if predicate() {
                    self.state = WaitState::Ready;
                    true
                } else {
                    false
                }
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, WaitState::Ready)
    }

    /// Synchronous cancellation: the wait is discarded and the sequence is
    /// immediately ready again.
    pub fn cancel(&mut self) {
        self.state = WaitState::Ready;
    }
}
