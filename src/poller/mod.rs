//! Live data poller
//!
//! Keeps a UI-visible value approximately fresh with minimal redundant
//! network calls, surviving transient failures gracefully. One `Poller` is
//! owned by each live widget; all of them share this implementation instead
//! of hand-rolling their own cache/retry loops.
//!
//! A running poller is a background tokio task that fetches immediately on
//! start, then on a recurring interval. Fresh cache entries short-circuit the
//! network call entirely. Failures are retried with linear backoff up to a
//! cap; once the cap is spent the widget shows an error and polling is
//! suspended until a manual retry resets the budget. Status updates are
//! published over a watch channel the UI reads every frame.

mod state;

pub use state::{
    Backoff, DisplayState, FetchError, PollerConfig, PollerPhase, PollerStatus, RetryDecision,
    RetryState,
};

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::cache::{CachedData, FreshnessCache};

/// Commands the UI can send to a running poller task
#[derive(Debug, Clone, Copy)]
enum Command {
    /// Reset the retry budget and fetch immediately
    ManualRetry,
}

/// State shared between the poller handle and its background task
///
/// Publishing goes through `publish` so that a poll superseded by `stop`
/// can never apply a late result: `stop` flips `cancelled` under the same
/// lock the task publishes under.
struct Shared<T> {
    sender: watch::Sender<PollerStatus<T>>,
    cancelled: AtomicBool,
    transition: Mutex<()>,
}

impl<T> Shared<T> {
    fn publish(&self, apply: impl FnOnce(&mut PollerStatus<T>)) {
        let _guard = lock_ignoring_poison(&self.transition);
        if self.cancelled.load(Ordering::SeqCst) {
            return;
        }
        self.sender.send_modify(apply);
    }
}

/// Locks a mutex, recovering the guard if a panicking thread poisoned it
fn lock_ignoring_poison<G>(mutex: &Mutex<G>) -> MutexGuard<'_, G> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Handle to the currently running background task
struct ActiveTask<T> {
    commands: mpsc::Sender<Command>,
    shared: Arc<Shared<T>>,
    task: JoinHandle<()>,
}

impl<T> ActiveTask<T> {
    /// Flips the cancellation flag under the transition lock, marks the
    /// status Stopped, then aborts the task. Any in-flight fetch result is
    /// discarded.
    fn cancel(self) {
        {
            let _guard = lock_ignoring_poison(&self.shared.transition);
            self.shared.cancelled.store(true, Ordering::SeqCst);
            self.shared
                .sender
                .send_modify(|status| status.phase = PollerPhase::Stopped);
        }
        self.task.abort();
    }
}

/// A poller instance owned by one widget
///
/// The cache lives on the `Poller` itself, not on the task, so restarting
/// the poller keeps previously fetched data available as "last known".
pub struct Poller<T> {
    config: PollerConfig,
    cache: Arc<Mutex<FreshnessCache<T>>>,
    resource_id: Option<String>,
    status_rx: Option<watch::Receiver<PollerStatus<T>>>,
    active: Option<ActiveTask<T>>,
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a poller with the given configuration; nothing runs until
    /// `start` is called.
    pub fn new(config: PollerConfig) -> Self {
        Self {
            config,
            cache: Arc::new(Mutex::new(FreshnessCache::new())),
            resource_id: None,
            status_rx: None,
            active: None,
        }
    }

    /// Begins polling `resource_id` with the given fetch function.
    ///
    /// Fetches once immediately, then on every interval tick. If the poller
    /// was already running, the previous task is cancelled first so a widget
    /// can never accumulate duplicate timers.
    ///
    /// # Panics
    /// Panics if the configured interval is zero; that is a programming
    /// error, not a runtime condition.
    pub fn start<F, Fut>(&mut self, resource_id: &str, fetch_fn: F) -> watch::Receiver<PollerStatus<T>>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        assert!(
            self.config.interval > Duration::ZERO,
            "poller interval must be positive"
        );

        self.stop();

        let (status_tx, status_rx) = watch::channel(PollerStatus::initial());
        let (cmd_tx, cmd_rx) = mpsc::channel(4);

        let shared = Arc::new(Shared {
            sender: status_tx,
            cancelled: AtomicBool::new(false),
            transition: Mutex::new(()),
        });

        let ctx = PollContext {
            config: self.config,
            key: resource_id.to_string(),
            cache: Arc::clone(&self.cache),
            shared: Arc::clone(&shared),
        };
        let task = tokio::spawn(run_poller(ctx, cmd_rx, fetch_fn));

        self.resource_id = Some(resource_id.to_string());
        self.status_rx = Some(status_rx.clone());
        self.active = Some(ActiveTask {
            commands: cmd_tx,
            shared,
            task,
        });

        status_rx
    }

    /// Cancels the recurring timer and any pending retry.
    ///
    /// Idempotent; after it returns, no further display-state transition
    /// will be observed from the cancelled task. Results of fetches still in
    /// flight are discarded.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
        }
    }

    /// Resets the retry budget and triggers an immediate fetch, regardless
    /// of whether the cap was reached.
    pub fn manual_retry(&self) {
        if let Some(active) = &self.active {
            let _ = active.commands.try_send(Command::ManualRetry);
        }
    }

    /// Current status snapshot for rendering
    pub fn status(&self) -> PollerStatus<T> {
        match &self.status_rx {
            Some(rx) => rx.borrow().clone(),
            None => PollerStatus::initial(),
        }
    }

    /// Last fetched payload, fresh or stale, if any fetch ever succeeded
    pub fn last_known(&self) -> Option<CachedData<T>> {
        let key = self.resource_id.as_deref()?;
        lock_ignoring_poison(&self.cache).read(key)
    }

    /// Whether a background task is currently attached
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        if let Some(active) = self.active.take() {
            active.cancel();
        }
    }
}

/// Everything a poll cycle needs
struct PollContext<T> {
    config: PollerConfig,
    key: String,
    cache: Arc<Mutex<FreshnessCache<T>>>,
    shared: Arc<Shared<T>>,
}

/// Background task: recurring interval ticks plus manual-retry commands
async fn run_poller<T, F, Fut>(
    ctx: PollContext<T>,
    mut commands: mpsc::Receiver<Command>,
    fetch_fn: F,
) where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
{
    let mut retry = RetryState::default();
    let mut interval = tokio::time::interval(ctx.config.interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Automatic retries stopped; only a manual retry resumes.
                if retry.is_exhausted(&ctx.config) {
                    continue;
                }
                run_cycle(&ctx, &mut retry, &fetch_fn).await;
            }
            cmd = commands.recv() => match cmd {
                Some(Command::ManualRetry) => {
                    retry.reset();
                    let snapshot = retry.clone();
                    ctx.shared.publish(|status| status.retry = snapshot);
                    run_cycle(&ctx, &mut retry, &fetch_fn).await;
                }
                // Handle dropped; nothing left to poll for.
                None => break,
            }
        }
    }
}

/// One fetch cycle: cache check, then fetch with bounded backoff retries
async fn run_cycle<T, F, Fut>(ctx: &PollContext<T>, retry: &mut RetryState, fetch_fn: &F)
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
{
    // Cache hit: zero network calls, retry state untouched.
    let fresh = lock_ignoring_poison(&ctx.cache).read_fresh(&ctx.key);
    if let Some(cached) = fresh {
        let snapshot = retry.clone();
        ctx.shared.publish(move |status| {
            status.display = DisplayState::Ready {
                data: cached.data,
                fetched_at: cached.fetched_at,
            };
            status.phase = PollerPhase::Idle;
            status.retry = snapshot;
        });
        return;
    }

    loop {
        ctx.shared.publish(|status| status.phase = PollerPhase::Polling);

        match fetch_fn().await {
            Ok(data) => {
                lock_ignoring_poison(&ctx.cache).write(&ctx.key, data.clone(), ctx.config.ttl);
                retry.reset();
                tracing::debug!(resource = %ctx.key, "fetch succeeded");

                let snapshot = retry.clone();
                let fetched_at = Utc::now();
                ctx.shared.publish(move |status| {
                    status.display = DisplayState::Ready { data, fetched_at };
                    status.phase = PollerPhase::Idle;
                    status.retry = snapshot;
                });
                return;
            }
            Err(err) => {
                let decision = retry.record_failure(&err, &ctx.config);
                tracing::warn!(
                    resource = %ctx.key,
                    attempts = retry.attempts,
                    error = %err,
                    "fetch failed"
                );

                match decision {
                    RetryDecision::RetryAfter(delay) => {
                        // Keep showing whatever is on screen (Loading or the
                        // previous Ready data) while waiting out the backoff.
                        let snapshot = retry.clone();
                        ctx.shared.publish(move |status| {
                            status.phase = PollerPhase::Retrying;
                            status.retry = snapshot;
                        });
                        tokio::time::sleep(delay).await;
                    }
                    RetryDecision::Exhausted => {
                        let snapshot = retry.clone();
                        let message = err.to_string();
                        ctx.shared.publish(move |status| {
                            status.display = DisplayState::Error(message);
                            status.phase = PollerPhase::Idle;
                            status.retry = snapshot;
                        });
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Ttl;
    use std::sync::atomic::AtomicU32;
    use tokio::time::{sleep, Instant};

    fn config(ttl: Duration, interval: Duration) -> PollerConfig {
        PollerConfig {
            ttl: Ttl::Duration(ttl),
            interval,
            retry_cap: 3,
            backoff: Backoff::linear(Duration::from_secs(3)),
        }
    }

    /// Fetch function that counts invocations and always succeeds
    fn counting_ok(calls: Arc<AtomicU32>) -> impl Fn() -> futures::future::Ready<Result<u32, FetchError>> {
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            futures::future::ready(Ok(n))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_immediately_then_on_interval() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut poller = Poller::new(config(Duration::ZERO, Duration::from_secs(10)));
        poller.start("counter", counting_ok(Arc::clone(&calls)));

        sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "first fetch is immediate");
        assert!(poller.status().display.is_ready());

        sleep(Duration::from_secs(25)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3, "two more interval ticks");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_cache_entry_skips_network_calls() {
        let calls = Arc::new(AtomicU32::new(0));
        // TTL far longer than the interval: every tick after the first is a
        // cache hit.
        let mut poller = Poller::new(config(Duration::from_secs(300), Duration::from_secs(5)));
        poller.start("cached", counting_ok(Arc::clone(&calls)));

        sleep(Duration::from_secs(22)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1, "cache hits make no network calls");
        let status = poller.status();
        assert!(status.display.is_ready());
        assert_eq!(status.retry.attempts, 0, "cache hits never touch retry state");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_delays_follow_backoff_then_give_up() {
        let times = Arc::new(Mutex::new(Vec::new()));
        let times_in_fetch = Arc::clone(&times);

        let mut poller = Poller::new(config(Duration::ZERO, Duration::from_secs(600)));
        poller.start("failing", move || {
            lock_ignoring_poison(&times_in_fetch).push(Instant::now());
            futures::future::ready(Err::<u32, _>(FetchError::Network(
                "connection refused".to_string(),
            )))
        });

        // Enough paused time for the full 3s + 6s + 9s retry schedule.
        sleep(Duration::from_secs(30)).await;

        let recorded = lock_ignoring_poison(&times).clone();
        assert_eq!(recorded.len(), 4, "initial attempt plus three retries");
        assert_eq!(recorded[1] - recorded[0], Duration::from_secs(3));
        assert_eq!(recorded[2] - recorded[1], Duration::from_secs(6));
        assert_eq!(recorded[3] - recorded[2], Duration::from_secs(9));

        let status = poller.status();
        assert_eq!(
            status.display.error(),
            Some("network error: connection refused")
        );

        // Automatic polling is suspended after exhaustion.
        sleep(Duration::from_secs(1300)).await;
        assert_eq!(lock_ignoring_poison(&times).len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_all_transitions_and_timers() {
        let calls = Arc::new(AtomicU32::new(0));
        let interval = Duration::from_secs(10);
        let mut poller = Poller::new(config(Duration::ZERO, interval));
        let rx = poller.start("stoppable", counting_ok(Arc::clone(&calls)));

        sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        poller.stop();
        // Idempotent.
        poller.stop();
        let frozen = rx.borrow().clone();

        sleep(interval * 2).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1, "no leaked timers after stop");
        assert_eq!(*rx.borrow(), frozen, "no transitions after stop");
        assert_eq!(frozen.phase, PollerPhase::Stopped);
        assert!(!poller.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_result_discarded_after_stop() {
        let mut poller = Poller::new(config(Duration::ZERO, Duration::from_secs(60)));
        let rx = poller.start("slow", || async {
            sleep(Duration::from_secs(5)).await;
            Ok::<u32, FetchError>(42)
        });

        // Let the fetch get in flight, then cancel under it.
        sleep(Duration::from_secs(1)).await;
        poller.stop();
        sleep(Duration::from_secs(10)).await;

        assert!(
            rx.borrow().display.is_loading(),
            "late response must not be applied after stop"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_cancels_previous_timer() {
        let first_calls = Arc::new(AtomicU32::new(0));
        let second_calls = Arc::new(AtomicU32::new(0));
        let interval = Duration::from_secs(10);

        let mut poller = Poller::new(config(Duration::ZERO, interval));
        poller.start("restart", counting_ok(Arc::clone(&first_calls)));
        poller.start("restart", counting_ok(Arc::clone(&second_calls)));

        sleep(Duration::from_secs(35)).await;

        // Only the second task's timer survives: 1 immediate + 3 ticks.
        assert_eq!(second_calls.load(Ordering::SeqCst), 4);
        assert!(
            first_calls.load(Ordering::SeqCst) <= 1,
            "first task keeps no recurring timer"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refresh_keeps_previous_ready_data() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_in_fetch = Arc::clone(&calls);

        let mut poller = Poller::new(config(Duration::ZERO, Duration::from_secs(10)));
        poller.start("flaky", move || {
            let n = calls_in_fetch.fetch_add(1, Ordering::SeqCst) + 1;
            futures::future::ready(if n == 1 {
                Ok(7u32)
            } else {
                Err(FetchError::Http {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                })
            })
        });

        sleep(Duration::from_millis(100)).await;
        assert_eq!(poller.status().display.data(), Some(&7));

        // Second tick fails; while retries are pending the display keeps the
        // previous Ready payload.
        sleep(Duration::from_secs(10)).await;
        let mid = poller.status();
        assert_eq!(mid.display.data(), Some(&7), "failure must not erase Ready");
        assert!(mid.retry.attempts >= 1);

        // After the budget is spent the widget shows the error, but the last
        // known payload is still there for the UI.
        sleep(Duration::from_secs(30)).await;
        let done = poller.status();
        assert!(done.display.error().is_some());
        let last = poller.last_known().expect("last known data survives");
        assert_eq!(last.data, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_retry_resets_budget_and_refetches() {
        let fail = Arc::new(AtomicBool::new(true));
        let calls = Arc::new(AtomicU32::new(0));
        let fail_in_fetch = Arc::clone(&fail);
        let calls_in_fetch = Arc::clone(&calls);

        let mut poller = Poller::new(config(Duration::ZERO, Duration::from_secs(600)));
        poller.start("manual", move || {
            calls_in_fetch.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(if fail_in_fetch.load(Ordering::SeqCst) {
                Err(FetchError::Network("unreachable".to_string()))
            } else {
                Ok(9u32)
            })
        });

        // Exhaust the retry budget.
        sleep(Duration::from_secs(30)).await;
        assert!(poller.status().display.error().is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 4);

        // Manual retry resets the counter and fetches immediately.
        fail.store(false, Ordering::SeqCst);
        poller.manual_retry();
        sleep(Duration::from_millis(100)).await;

        let status = poller.status();
        assert_eq!(status.display.data(), Some(&9));
        assert_eq!(status.retry.attempts, 0, "manual retry resets the counter");
        assert_eq!(calls.load(Ordering::SeqCst), 5);

        // A later single failure waits the base delay again: attempts restart
        // from zero rather than continuing past the old cap.
        fail.store(true, Ordering::SeqCst);
        poller.manual_retry();
        sleep(Duration::from_millis(100)).await;
        assert_eq!(poller.status().retry.attempts, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_before_start_is_initial() {
        let poller: Poller<u32> = Poller::new(PollerConfig::default());
        let status = poller.status();
        assert!(status.display.is_loading());
        assert_eq!(status.phase, PollerPhase::Idle);
        assert!(!poller.is_running());
    }
}
