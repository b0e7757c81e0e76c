//! Mailbox-backed process table.
//!
//! Each live process owns a bounded `embassy-sync` channel.  Notifications
//! are pushed with `try_send` from interrupt context: no heap allocation,
//! no blocking, and an event that finds the mailbox full is dropped and
//! counted.
//!
//! The receive side never registers a waker.  A listener polls with
//! `try_receive` and sleeps between polls, so `try_send` in an ISR has no
//! thread to unpark and takes no OS lock.
//!
//! ```text
//! ┌──────────────┐  NotificationEvent  ┌──────────────┐
//! │  Switch ISR  │────────────────────▶│   Listener   │
//! │  (try_send)  │     (depth 8)       │  (polling)   │
//! └──────────────┘                     └──────────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::info;

use crate::app::events::NotificationEvent;
use crate::app::ports::{Pid, ProcessTable, SignalTarget};

/// Pending notifications a listener may fall behind by.
pub const MAILBOX_DEPTH: usize = 8;

/// Sleep between mailbox polls while a listener waits.
const WAIT_POLL: Duration = Duration::from_millis(2);

struct Process {
    mailbox: Channel<CriticalSectionRawMutex, NotificationEvent, MAILBOX_DEPTH>,
    dropped: AtomicU32,
}

/// Delivery handle handed to the subscriber registry.
#[derive(Clone)]
pub struct ProcessHandle {
    pid: Pid,
    inner: Arc<Process>,
}

impl ProcessHandle {
    pub fn pid(&self) -> Pid {
        self.pid
    }
}

impl SignalTarget for ProcessHandle {
    fn signal(&self, event: NotificationEvent) {
        if self.inner.mailbox.try_send(event).is_err() {
            self.inner.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }
}

/// Receiving end of a process's mailbox.
pub struct Listener {
    pid: Pid,
    inner: Arc<Process>,
}

impl Listener {
    pub fn pid(&self) -> Pid {
        self.pid
    }

    /// Next pending notification, if any.
    pub fn try_next(&self) -> Option<NotificationEvent> {
        self.inner.mailbox.try_receive().ok()
    }

    /// Block the calling thread until a notification arrives.
    pub fn wait(&self) -> NotificationEvent {
        loop {
            if let Some(event) = self.try_next() {
                return event;
            }
            std::thread::sleep(WAIT_POLL);
        }
    }

    /// Like [`wait`](Self::wait), giving up after `timeout`.
    pub fn wait_timeout(&self, timeout: Duration) -> Option<NotificationEvent> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(event) = self.try_next() {
                return Some(event);
            }
            let now = Instant::now();
            if now >= deadline {
                return None;
            }
            std::thread::sleep(WAIT_POLL.min(deadline - now));
        }
    }

    /// Take every pending notification, oldest first.
    pub fn drain(&self) -> heapless::Vec<NotificationEvent, MAILBOX_DEPTH> {
        let mut out = heapless::Vec::new();
        while let Some(event) = self.try_next() {
            // Capacity equals mailbox depth, so this cannot overflow.
            let _ = out.push(event);
        }
        out
    }

    /// Notifications discarded because the mailbox was full.
    pub fn dropped(&self) -> u32 {
        self.inner.dropped.load(Ordering::Relaxed)
    }
}

/// [`ProcessTable`] of in-firmware listener processes.
#[derive(Default)]
pub struct MailboxTable {
    live: Mutex<BTreeMap<Pid, Arc<Process>>>,
}

impl MailboxTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn live(&self) -> MutexGuard<'_, BTreeMap<Pid, Arc<Process>>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a process with a fresh mailbox.  A previous process with the
    /// same pid is replaced.
    pub fn spawn(&self, pid: Pid) -> Listener {
        let inner = Arc::new(Process {
            mailbox: Channel::new(),
            dropped: AtomicU32::new(0),
        });
        self.live().insert(pid, Arc::clone(&inner));
        info!("process {} started", pid);
        Listener { pid, inner }
    }

    /// Remove `pid` from the table.  Handles already resolved keep
    /// delivering into the orphaned mailbox.
    pub fn exit(&self, pid: Pid) -> bool {
        let existed = self.live().remove(&pid).is_some();
        if existed {
            info!("process {} exited", pid);
        }
        existed
    }
}

impl ProcessTable for MailboxTable {
    type Task = ProcessHandle;

    fn find(&self, pid: Pid) -> Option<ProcessHandle> {
        self.live()
            .get(&pid)
            .map(|inner| ProcessHandle { pid, inner: Arc::clone(inner) })
    }
}
