//! Edge handler slot shared with interrupt context.
//!
//! The ESP-IDF ISR service takes a raw pointer argument per pin.  On
//! dual-core chips `gpio_isr_handler_remove` only stops new dispatches; a
//! handler already entered on the other core keeps running.  [`IsrSlot`]
//! counts handlers in flight so the owner can wait for them to leave before
//! the slot is freed.
//!
//! ```text
//!   core 0: release ─ remove ─ settle ─ drain ──▶ drop slot
//!   core 1:    ISR ── enter ───── handler ── leave
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::app::ports::EdgeHandler;

pub struct IsrSlot {
    handler: EdgeHandler,
    running: AtomicU32,
}

impl IsrSlot {
    pub fn new(handler: EdgeHandler) -> Box<Self> {
        Box::new(Self { handler, running: AtomicU32::new(0) })
    }

    /// Runs the handler, counting it as in flight for its duration.
    pub fn enter(&self) {
        self.running.fetch_add(1, Ordering::AcqRel);
        (self.handler)();
        self.running.fetch_sub(1, Ordering::AcqRel);
    }

    pub fn in_flight(&self) -> u32 {
        self.running.load(Ordering::Acquire)
    }

    /// Waits for handlers that started before the dispatch was removed.
    ///
    /// `settle` covers the window between the dispatcher loading the
    /// argument and [`IsrSlot::enter`] bumping the counter; it must be at
    /// least one interrupt latency.
    pub fn drain(&self, settle: Duration) {
        std::thread::sleep(settle);
        while self.in_flight() != 0 {
            std::thread::yield_now();
        }
    }
}
