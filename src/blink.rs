//! Blink scheduler.
//!
//! Owns at most one [`PeriodicTask`] that toggles the LED every interval.
//! Coexists with the switch ISRs: both mutate the LED through the
//! actuator's critical section, so each toggle is atomic with respect to a
//! concurrent raise / lower edge.
//!
//! ```text
//!   write "1:<pid>" ──▶ start(interval) ──▶ PeriodicTask ──▶ Actuator::toggle
//!   write "0:<pid>" ──▶ stop()          ──▶ cancel + join
//! ```
//!
//! `start` while a job is active replaces it: the old job is cancelled
//! synchronously before the new one is spawned, so two jobs never overlap.
//! `stop` returns only after any in-flight toggle has finished.

use core::time::Duration;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::info;

use crate::app::ports::PinPort;
use crate::drivers::actuator::Actuator;
use crate::drivers::periodic::PeriodicTask;
use crate::error::Result;

/// The blink scheduler.
pub struct BlinkScheduler<P: PinPort> {
    actuator: Arc<Actuator<P>>,
    /// Active job.  Only touched from request context.
    job: Mutex<Option<PeriodicTask>>,
}

impl<P: PinPort> BlinkScheduler<P> {
    pub fn new(actuator: Arc<Actuator<P>>) -> Self {
        Self {
            actuator,
            job: Mutex::new(None),
        }
    }

    fn job(&self) -> MutexGuard<'_, Option<PeriodicTask>> {
        self.job.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin toggling the LED every `interval`, replacing any active job.
    pub fn start(&self, interval: Duration) -> Result<()> {
        let mut job = self.job();
        if let Some(mut previous) = job.take() {
            previous.cancel();
        }

        let actuator = Arc::clone(&self.actuator);
        let task = PeriodicTask::spawn("blink", interval, move || {
            actuator.toggle();
        })?;
        *job = Some(task);
        info!("Blink: started ({} ms)", interval.as_millis());
        Ok(())
    }

    /// Cancel the active job and wait for any in-flight toggle.  Returns
    /// whether a job was active.
    pub fn stop(&self) -> bool {
        let Some(mut task) = self.job().take() else {
            return false;
        };
        task.cancel();
        info!("Blink: stopped after {} toggles", task.fired());
        true
    }

    pub fn is_active(&self) -> bool {
        self.job().is_some()
    }

    /// Interval of the active job.
    pub fn interval(&self) -> Option<Duration> {
        self.job().as_ref().map(PeriodicTask::interval)
    }

    /// Toggles performed by the active job.
    pub fn toggles(&self) -> u64 {
        self.job().as_ref().map_or(0, PeriodicTask::fired)
    }
}

impl<P: PinPort> Drop for BlinkScheduler<P> {
    fn drop(&mut self) {
        self.stop();
    }
}
