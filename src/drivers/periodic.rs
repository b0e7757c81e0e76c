//! Cancellable self-rearming periodic task.
//!
//! Each task runs on its own timer thread: it sleeps for `interval`, runs
//! the callback, then rearms for another `interval` measured from the end of
//! the firing.  It keeps going until [`PeriodicTask::cancel`].
//!
//! ## Synchronous cancel
//!
//! `cancel()` marks the task cancelled, wakes the timer thread and joins
//! it.  When it returns, no firing is in flight and none will start, even
//! if a firing was already running when `cancel()` was called.  The
//! callback may then safely reference state the caller is about to free.
//!
//! A cancel issued from inside the callback itself only marks the task;
//! the timer thread exits as soon as that firing returns.

use core::time::Duration;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::Instant;

use crate::error::HwError;

/// Timer thread stack.  Callbacks are bounded and shallow.
const TIMER_STACK_KB: usize = 16;

struct Shared {
    cancelled: Mutex<bool>,
    wake: Condvar,
    fired: AtomicU64,
}

impl Shared {
    fn cancelled(&self) -> MutexGuard<'_, bool> {
        self.cancelled.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct PeriodicTask {
    name: &'static str,
    interval: Duration,
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Start firing `tick` every `interval`.  The first firing happens one
    /// interval from now.
    ///
    /// `tick` runs in timer context: it must not block and must return in
    /// bounded time, since `cancel()` waits for it.
    pub fn spawn<F>(name: &'static str, interval: Duration, mut tick: F) -> Result<Self, HwError>
    where
        F: FnMut() + Send + 'static,
    {
        let shared = Arc::new(Shared {
            cancelled: Mutex::new(false),
            wake: Condvar::new(),
            fired: AtomicU64::new(0),
        });
        let timer_shared = Arc::clone(&shared);

        let worker = std::thread::Builder::new()
            .name(name.into())
            .stack_size(TIMER_STACK_KB * 1024)
            .spawn(move || run(&timer_shared, interval, &mut tick))
            .map_err(|e| {
                log::error!("timer '{}' spawn failed: {}", name, e);
                HwError::TimerUnavailable
            })?;

        Ok(Self {
            name,
            interval,
            shared,
            worker: Some(worker),
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Completed firings so far.
    pub fn fired(&self) -> u64 {
        self.shared.fired.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Stop the task and wait out any in-flight firing.  Idempotent.
    pub fn cancel(&mut self) {
        *self.shared.cancelled() = true;
        self.shared.wake.notify_all();

        let Some(worker) = self.worker.take() else {
            return;
        };
        if worker.thread().id() == std::thread::current().id() {
            return;
        }
        if worker.join().is_err() {
            log::error!("timer '{}' callback panicked", self.name);
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn run(shared: &Shared, interval: Duration, tick: &mut impl FnMut()) {
    let mut cancelled = shared.cancelled();
    loop {
        let deadline = Instant::now() + interval;
        loop {
            if *cancelled {
                return;
            }
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = shared
                .wake
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        // Cancel must be able to land while the callback runs.
        drop(cancelled);
        tick();
        shared.fired.fetch_add(1, Ordering::Release);
        cancelled = shared.cancelled();
    }
}
