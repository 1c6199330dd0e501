use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct SubmitGuardState {
    is_submitting: bool,
    last_submit: Option<Instant>,
}

/// Drops duplicate submissions.
///
/// A call is rejected while another one is in flight, or when it starts less
/// than `min_interval` after the previous accepted call started. Clones share
/// the same state.
#[derive(Debug, Clone)]
pub struct SubmitGuard {
    state: Arc<Mutex<SubmitGuardState>>,
    min_interval: Duration,
}

impl Default for SubmitGuard {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_INTERVAL)
    }
}

/// Clears the busy flag when the guarded action finishes or is dropped.
struct InFlight<'a> {
    guard: &'a SubmitGuard,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.guard.lock().is_submitting = false;
    }
}

impl SubmitGuard {
    pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1000);

    pub fn new(min_interval: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(SubmitGuardState::default())),
            min_interval,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.lock().is_submitting
    }

    /// Runs `action` unless the guard rejects it, in which case `None` is
    /// returned and `action` is never called.
    pub async fn run<F, Fut, T>(&self, action: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let _in_flight = self.try_begin()?;
        Some(action().await)
    }

    fn try_begin(&self) -> Option<InFlight<'_>> {
        let now = Instant::now();
        let mut state = self.lock();
        let too_soon = state
            .last_submit
            .is_some_and(|last| now.duration_since(last) < self.min_interval);
        if state.is_submitting || too_soon {
            tracing::warn!(
                in_flight = state.is_submitting,
                "duplicate submission dropped"
            );
            return None;
        }
        state.is_submitting = true;
        state.last_submit = Some(now);
        Some(InFlight { guard: self })
    }

    fn lock(&self) -> MutexGuard<'_, SubmitGuardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
