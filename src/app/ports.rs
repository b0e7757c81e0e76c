//! Port traits: the boundary between driver logic and the platform.
//!
//! ```text
//!   Platform adapter ──▶ Port trait ──▶ DriverSession (domain)
//! ```
//!
//! The GPIO controller and the process table are owned by the platform.
//! [`DriverSession`](super::session::DriverSession) consumes them through
//! generics, so the driver core never touches registers or process
//! structures directly.
//!
//! ## Execution contexts
//!
//! Methods marked *restricted-context safe* may be called from interrupt
//! handlers and timer callbacks.  Implementations of those methods must not
//! block, sleep, or allocate.

use serde::{Deserialize, Serialize};

use super::events::NotificationEvent;
use crate::error::HwError;

/// Platform GPIO line number.
pub type LineId = i32;

/// Process identifier of a notification subscriber.
pub type Pid = u32;

// ───────────────────────────────────────────────────────────────
// Pin port (driven adapter: domain ↔ GPIO controller)
// ───────────────────────────────────────────────────────────────

/// Input-line transition that triggers an edge handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    /// Low → high.
    Rising,
    /// High → low.
    Falling,
    /// Either transition.
    Both,
}

impl Edge {
    /// Whether a transition from `from` to `to` fires on this edge.
    pub fn matches(self, from: bool, to: bool) -> bool {
        match self {
            Self::Rising => !from && to,
            Self::Falling => from && !to,
            Self::Both => from != to,
        }
    }

    /// Resting level of a line wired for this edge: pull-down for rising
    /// edges, pull-up for falling edges.
    pub fn idle_level(self) -> bool {
        matches!(self, Self::Falling)
    }
}

/// Callback the platform invokes once per qualifying edge.
///
/// # Contract
///
/// Runs in interrupt context.  The closure must complete in bounded time
/// and must not block, sleep, or allocate.  It may call restricted-context
/// safe port methods only.
pub type EdgeHandler = Box<dyn Fn() + Send + Sync + 'static>;

/// Raw GPIO access.
pub trait PinPort: Send + Sync + 'static {
    /// Claim `line` as a digital output driven to `initial`.
    fn claim_output(&self, line: LineId, label: &'static str, initial: bool)
        -> Result<(), HwError>;

    /// Claim `line` as an input and install `handler` on `edge`.
    fn claim_edge_irq(
        &self,
        line: LineId,
        label: &'static str,
        edge: Edge,
        handler: EdgeHandler,
    ) -> Result<(), HwError>;

    /// Drive an output line.  Restricted-context safe.
    fn write(&self, line: LineId, high: bool);

    /// Sample a line's level.  Restricted-context safe.
    fn read(&self, line: LineId) -> bool;

    /// Release a previously claimed line.  For interrupt lines, no handler
    /// invocation is in flight or pending once this returns.
    fn release(&self, line: LineId);
}

// ───────────────────────────────────────────────────────────────
// Process table (driven adapter: domain → subscriber processes)
// ───────────────────────────────────────────────────────────────

/// Delivery handle for one live process.
pub trait SignalTarget: Send + 'static {
    /// Deliver `event`, best-effort.  Restricted-context safe: never blocks,
    /// never reports failure.
    fn signal(&self, event: NotificationEvent);
}

/// Host table of live processes.
pub trait ProcessTable: Send + Sync + 'static {
    type Task: SignalTarget;

    /// Resolve `pid` to a delivery handle, or `None` if no such process is
    /// alive.  Called from request context only.
    fn find(&self, pid: Pid) -> Option<Self::Task>;
}

impl<T: ProcessTable> ProcessTable for std::sync::Arc<T> {
    type Task = T::Task;

    fn find(&self, pid: Pid) -> Option<Self::Task> {
        (**self).find(pid)
    }
}
