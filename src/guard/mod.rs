//! Client-side guards that keep rapid repeated user actions from turning into
//! repeated backend calls.
//!
//! All three read time from `tokio::time::Instant`, so tests can pause and
//! advance the clock.

pub mod debounce;
pub mod rate_limit;
pub mod submit;

pub use debounce::Debouncer;
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use submit::SubmitGuard;
