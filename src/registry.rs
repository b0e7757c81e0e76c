//! Subscriber registry.
//!
//! Holds at most one subscriber: the process that receives `Raised` /
//! `Lowered` notifications.  Registration happens on the write path
//! (request context); notification happens from the switch ISRs
//! (restricted context).
//!
//! ## Lookup failure
//!
//! A registration whose pid does not resolve leaves the current subscriber
//! in place.  Later notifications keep going to that earlier process.
//!
//! ## Locking
//!
//! The slot sits behind a critical-section mutex.  `register` resolves the
//! pid before entering the critical section and drops the displaced handle
//! after leaving it, so the only work under the lock is a pointer swap or a
//! non-blocking `signal`.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use crate::app::events::NotificationEvent;
use crate::app::ports::{Pid, ProcessTable, SignalTarget};
use crate::error::{Error, Result};

struct Subscriber<T> {
    pid: Pid,
    task: T,
}

pub struct SubscriberRegistry<T: SignalTarget> {
    slot: Mutex<CriticalSectionRawMutex, RefCell<Option<Subscriber<T>>>>,
}

impl<T: SignalTarget> Default for SubscriberRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: SignalTarget> SubscriberRegistry<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(RefCell::new(None)),
        }
    }

    /// Resolve `pid` in `processes` and make it the subscriber.
    ///
    /// Returns [`Error::LookupFailed`] without touching the current
    /// subscriber if no such process is alive.
    pub fn register<P>(&self, processes: &P, pid: Pid) -> Result<()>
    where
        P: ProcessTable<Task = T>,
    {
        let task = processes.find(pid).ok_or(Error::LookupFailed(pid))?;
        let displaced = self
            .slot
            .lock(|slot| slot.replace(Some(Subscriber { pid, task })));
        drop(displaced);
        Ok(())
    }

    /// Deliver `event` to the subscriber, if there is one.  Fire-and-forget.
    ///
    /// Restricted-context safe.
    pub fn notify(&self, event: NotificationEvent) {
        self.slot.lock(|slot| {
            if let Some(sub) = slot.borrow().as_ref() {
                sub.task.signal(event);
            }
        });
    }

    /// Pid of the current subscriber.
    pub fn current(&self) -> Option<Pid> {
        self.slot.lock(|slot| slot.borrow().as_ref().map(|s| s.pid))
    }

    /// Forget the subscriber (session teardown).
    pub fn clear(&self) {
        let displaced = self.slot.lock(|slot| slot.replace(None));
        drop(displaced);
    }
}
