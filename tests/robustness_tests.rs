use resultgate::guard::{Debouncer, RateLimitDecision, RateLimiter, SubmitGuard};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_submit_guard_clones_share_state_across_tasks() {
    let guard = SubmitGuard::default();
    let runs = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..10)
        .map(|_| {
            let guard = guard.clone();
            let runs = Arc::clone(&runs);
            tokio::spawn(async move {
                guard
                    .run(|| async {
                        runs.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(200)).await;
                    })
                    .await
            })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().is_some() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert!(!guard.is_submitting());
}

#[tokio::test(start_paused = true)]
async fn test_rate_limiter_partial_window() {
    let mut limiter = RateLimiter::new(2, Duration::from_secs(60));
    limiter.record_attempt();
    limiter.record_attempt();
    tokio::time::advance(Duration::from_secs(30)).await;

    let RateLimitDecision::Denied { wait_seconds, .. } = limiter.check_limit() else {
        panic!("expected denial");
    };
    assert_eq!(wait_seconds, 30);

    tokio::time::advance(Duration::from_secs(30)).await;
    assert!(limiter.check_limit().is_allowed());
    assert_eq!(limiter.attempts_in_window(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_debouncer_collapses_bursts() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut debouncer = Debouncer::new(Duration::from_millis(500));

    for _ in 0..20 {
        let calls = Arc::clone(&calls);
        debouncer.call(move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
        });
        tokio::time::advance(Duration::from_millis(100)).await;
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(!debouncer.is_pending());
}
