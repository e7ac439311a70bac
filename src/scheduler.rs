//! The autosave scheduler background loop.
//!
//! [`SaveScheduler`] owns a single background tokio task that sleeps until
//! the next save deadline, fires an injected save action, and re-arms. The
//! wait can be cut short at any moment from any other task:
//!
//! - [`reconfigure`](SaveScheduler::reconfigure) swaps the interval,
//!   persists it, and re-arms the in-progress wait without firing;
//! - [`stop`](SaveScheduler::stop) cancels the loop, which issues exactly
//!   one final save on the way out.
//!
//! The wake source is disambiguated by `tokio::select!` arm and the shared
//! state is re-read under a mutex on every loop iteration, so a reconfigure
//! racing a naturally-elapsing wait cannot be lost or double-fire.
//!
//! Save-action failures are logged and swallowed — the schedule always
//! proceeds to the next wait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use chrono::TimeDelta;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::SaveTickError;
use crate::interval::SaveInterval;
use crate::store::IntervalStore;

/// Callback type for the injected save action.
///
/// The scheduler is agnostic to what the action does or how long it takes;
/// it is invoked synchronously inside the loop task, so at most one
/// invocation is ever in flight.
pub type SaveAction = Box<dyn Fn() -> crate::Result<()> + Send + Sync>;

/// Mutable scheduling state shared between the loop and caller tasks.
#[derive(Debug)]
struct WaitState {
    /// Currently configured interval.
    interval: SaveInterval,
    /// Absolute time of the next fire; `None` while disabled or stopped.
    ///
    /// Re-armed at start, after every fire, and on every reconfigure, and
    /// it feeds both the loop's sleep and [`SaveScheduler::time_until_next_fire`],
    /// so the reported remaining time and the actual wait cannot disagree.
    deadline: Option<Instant>,
}

struct Shared {
    state: Mutex<WaitState>,
    running: AtomicBool,
    /// Wakes the loop to re-read its state after a reconfigure.
    rearm: Notify,
    /// Terminates the loop (after one final save).
    cancel: CancellationToken,
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, WaitState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// What woke the loop out of its wait.
enum Wake {
    Elapsed,
    Rearm,
    Stop,
}

/// A single background timer that fires a save action every configured
/// interval, reconfigurable and stoppable from any task.
///
/// Lifecycle is `Stopped → Running → Stopped`, terminal: a scheduler is
/// started at most once and cannot be restarted after [`stop`](Self::stop).
pub struct SaveScheduler {
    shared: Arc<Shared>,
    store: IntervalStore,
    action: Mutex<Option<SaveAction>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SaveScheduler {
    /// Create a stopped scheduler.
    ///
    /// `interval` is the initial refresh rate (typically
    /// [`IntervalStore::load_or_init`]); `store` receives every subsequent
    /// reconfigure; `action` is the save trigger the loop will fire.
    pub fn new(interval: SaveInterval, store: IntervalStore, action: SaveAction) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(WaitState {
                    interval,
                    deadline: None,
                }),
                running: AtomicBool::new(false),
                rearm: Notify::new(),
                cancel: CancellationToken::new(),
            }),
            store,
            action: Mutex::new(Some(action)),
            handle: Mutex::new(None),
        }
    }

    /// Start the background loop.
    ///
    /// Arms the first deadline and spawns the wait/fire loop. Must be called
    /// from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`SaveTickError::Scheduler`] if the scheduler is already
    /// running or has already been stopped — there is at most one loop
    /// instance per scheduler, ever.
    pub fn start(&self) -> crate::Result<()> {
        if self.shared.cancel.is_cancelled() {
            return Err(SaveTickError::Scheduler(
                "scheduler already stopped".to_owned(),
            ));
        }
        if self.shared.running.swap(true, Ordering::SeqCst) {
            return Err(SaveTickError::Scheduler(
                "scheduler already running".to_owned(),
            ));
        }

        let action = self
            .action
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(action) = action else {
            self.shared.running.store(false, Ordering::SeqCst);
            return Err(SaveTickError::Scheduler(
                "scheduler cannot be restarted".to_owned(),
            ));
        };

        {
            let mut state = self.shared.lock_state();
            state.deadline = next_deadline(state.interval);
        }

        let shared = Arc::clone(&self.shared);
        let handle = tokio::spawn(run_loop(shared, action));
        *self.handle.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);

        Ok(())
    }

    /// Swap in a new interval, effective immediately.
    ///
    /// The next-fire deadline is re-armed to `now + new_interval` (cleared
    /// when the new interval is `0:00`), the value is persisted, and the
    /// loop's in-progress wait is cut short without firing. Safe to call
    /// concurrently from any number of tasks; the last write wins and the
    /// loop always sleeps on the value it re-reads after waking.
    ///
    /// A persistence failure is a soft warning: the in-memory interval still
    /// applies for the rest of the process lifetime, it just isn't durable.
    pub fn reconfigure(&self, new_interval: SaveInterval) {
        {
            let mut state = self.shared.lock_state();
            state.interval = new_interval;
            state.deadline = next_deadline(new_interval);
        }

        if let Err(e) = self.store.save(&new_interval) {
            warn!(
                error = %e,
                "cannot persist refresh rate; keeping in-memory value for this session"
            );
        }

        self.shared.rearm.notify_one();
        info!(interval = %new_interval, "refresh rate reconfigured");
    }

    /// Stop the scheduler, firing one final save.
    ///
    /// Cancels the loop and waits for it to terminate; the loop issues
    /// exactly one save on the cancellation path before exiting and never
    /// fires again. A second call is a no-op.
    pub async fn stop(&self) {
        self.shared.cancel.cancel();

        let handle = self
            .handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "scheduler task did not shut down cleanly");
            }
        }
    }

    /// Currently configured interval.
    #[must_use]
    pub fn interval(&self) -> SaveInterval {
        self.shared.lock_state().interval
    }

    /// Time until the next fire.
    ///
    /// Negative when a fire is overdue (the save action is still running);
    /// `None` when no automatic save is scheduled — the interval is `0:00`
    /// or the scheduler is not running. Callers clamp/format as needed.
    #[must_use]
    pub fn time_until_next_fire(&self) -> Option<TimeDelta> {
        let deadline = self.shared.lock_state().deadline?;
        let now = Instant::now();
        let delta = if deadline >= now {
            TimeDelta::from_std(deadline - now).unwrap_or(TimeDelta::MAX)
        } else {
            -TimeDelta::from_std(now - deadline).unwrap_or(TimeDelta::MAX)
        };
        Some(delta)
    }

    /// `true` while the background loop is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }
}

/// Deadline for a freshly-armed wait: `now + interval`, or `None` when the
/// interval is zero (automatic saves disabled — the loop parks instead).
fn next_deadline(interval: SaveInterval) -> Option<Instant> {
    (!interval.is_zero()).then(|| Instant::now() + interval.as_duration())
}

async fn run_loop(shared: Arc<Shared>, action: SaveAction) {
    info!("autosave scheduler started");

    loop {
        let deadline = shared.lock_state().deadline;

        let wake = match deadline {
            Some(at) => {
                tokio::select! {
                    _ = shared.cancel.cancelled() => Wake::Stop,
                    _ = shared.rearm.notified() => Wake::Rearm,
                    _ = tokio::time::sleep_until(tokio::time::Instant::from_std(at)) => Wake::Elapsed,
                }
            }
            // Disabled: park until a reconfigure or stop.
            None => {
                tokio::select! {
                    _ = shared.cancel.cancelled() => Wake::Stop,
                    _ = shared.rearm.notified() => Wake::Rearm,
                }
            }
        };

        match wake {
            Wake::Rearm => {
                debug!("wait re-armed");
            }
            Wake::Elapsed => {
                if let Err(e) = action() {
                    warn!(error = %e, "save action failed; keeping schedule");
                } else {
                    debug!("save action fired");
                }
                let mut state = shared.lock_state();
                state.deadline = next_deadline(state.interval);
            }
            Wake::Stop => {
                info!("scheduler stopping; issuing final save");
                if let Err(e) = action() {
                    warn!(error = %e, "final save action failed");
                }
                break;
            }
        }
    }

    shared.running.store(false, Ordering::SeqCst);
    info!("autosave scheduler stopped");
}
