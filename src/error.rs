//! Unified error types for the gpioled driver.
//!
//! A single `Error` enum that every subsystem converts into, so the session
//! layer reports parse, lookup and resource failures uniformly.  All variants
//! are `Copy` so they can be returned from request paths without allocation.

use core::fmt;

use crate::app::ports::Pid;

// ---------------------------------------------------------------------------
// Top-level driver error
// ---------------------------------------------------------------------------

/// Every fallible operation in the driver funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A write payload did not match `<cmd>:<pid>`.  Nothing was mutated.
    MalformedPayload(ParseError),
    /// The subscriber process id does not resolve to a live process.
    /// The previously registered subscriber (if any) is still in place.
    LookupFailed(Pid),
    /// A pin, interrupt line or timer could not be acquired.
    ResourceAcquisitionFailed(HwError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedPayload(e) => write!(f, "malformed payload: {e}"),
            Self::LookupFailed(pid) => write!(f, "no live process with pid {pid}"),
            Self::ResourceAcquisitionFailed(e) => write!(f, "resource acquisition failed: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Payload parse errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// No `:` between command and process id.
    MissingSeparator,
    /// Nothing before the `:`.
    EmptyCommand,
    /// Right-hand side is not a non-negative integer that fits a pid.
    InvalidPid,
    /// Payload exceeds the device message buffer.
    TooLong,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "missing ':' separator"),
            Self::EmptyCommand => write!(f, "empty command field"),
            Self::InvalidPid => write!(f, "process id is not a non-negative integer"),
            Self::TooLong => write!(f, "payload too long"),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::MalformedPayload(e)
    }
}

// ---------------------------------------------------------------------------
// Hardware / platform errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwError {
    /// The line is already claimed or does not exist.
    LineUnavailable(i32),
    /// The platform refused to configure the line (raw return code).
    LineConfigFailed { line: i32, rc: i32 },
    /// Interrupt registration on the line failed (raw return code).
    IrqRequestFailed { line: i32, rc: i32 },
    /// The periodic timer context could not be created.
    TimerUnavailable,
}

impl fmt::Display for HwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LineUnavailable(line) => write!(f, "GPIO {line} unavailable"),
            Self::LineConfigFailed { line, rc } => {
                write!(f, "GPIO {line} config failed (rc={rc})")
            }
            Self::IrqRequestFailed { line, rc } => {
                write!(f, "GPIO {line} IRQ request failed (rc={rc})")
            }
            Self::TimerUnavailable => write!(f, "blink timer could not be started"),
        }
    }
}

impl From<HwError> for Error {
    fn from(e: HwError) -> Self {
        Self::ResourceAcquisitionFailed(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Driver-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
