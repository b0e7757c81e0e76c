//! Inbound commands to the driver session.
//!
//! A write payload has the form `<cmd>:<pid>`.  Only the first byte of the
//! command field is significant: `0` stops blinking, anything else starts
//! it.  The truncation is kept for compatibility with existing clients that
//! send longer command words (`"10:42"` starts, `"0ff:42"` stops).
//!
//! Decoding is pure and allocation-free; a payload either yields a complete
//! [`Command`] or a [`ParseError`] with nothing applied.

use super::ports::Pid;
use crate::error::ParseError;

/// Size of the device message buffer; longer writes are rejected.
pub const MAX_PAYLOAD: usize = 1024;

const SEPARATOR: u8 = b':';
const STOP_CHAR: u8 = b'0';

/// What the write asks the blink scheduler to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Stop,
    Start,
}

/// A fully decoded write payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub directive: Directive,
    /// Process to register as the notification subscriber.
    pub pid: Pid,
}

/// Decode a raw write payload.
pub fn parse(payload: &[u8]) -> Result<Command, ParseError> {
    if payload.len() > MAX_PAYLOAD {
        return Err(ParseError::TooLong);
    }

    let split = payload
        .iter()
        .position(|&b| b == SEPARATOR)
        .ok_or(ParseError::MissingSeparator)?;
    let (cmd, rest) = payload.split_at(split);
    let pid_field = &rest[1..];

    let directive = match cmd.first() {
        None => return Err(ParseError::EmptyCommand),
        Some(&STOP_CHAR) => Directive::Stop,
        Some(_) => Directive::Start,
    };

    let pid = parse_pid(trim_terminator(pid_field))?;
    Ok(Command { directive, pid })
}

/// Strip the trailing newline / NUL padding that shell and C clients append.
fn trim_terminator(field: &[u8]) -> &[u8] {
    let end = field
        .iter()
        .rposition(|&b| !(b.is_ascii_whitespace() || b == 0))
        .map_or(0, |i| i + 1);
    &field[..end]
}

fn parse_pid(digits: &[u8]) -> Result<Pid, ParseError> {
    if digits.is_empty() {
        return Err(ParseError::InvalidPid);
    }
    digits.iter().try_fold(0 as Pid, |acc, &b| {
        if !b.is_ascii_digit() {
            return Err(ParseError::InvalidPid);
        }
        acc.checked_mul(10)
            .and_then(|v| v.checked_add(Pid::from(b - b'0')))
            .ok_or(ParseError::InvalidPid)
    })
}

// ───────────────────────────────────────────────────────────────
// Control channel
// ───────────────────────────────────────────────────────────────

/// Codes accepted on the secondary control channel.  They only produce a
/// log line; none of them touches the LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    Test1,
    Test2,
    Test3,
    Test4,
}

impl ControlCode {
    pub fn from_raw(code: u32) -> Option<Self> {
        match code {
            0 => Some(Self::Test1),
            1 => Some(Self::Test2),
            2 => Some(Self::Test3),
            3 => Some(Self::Test4),
            _ => None,
        }
    }

    /// 1-based label printed in the log.
    pub fn ordinal(self) -> u8 {
        match self {
            Self::Test1 => 1,
            Self::Test2 => 2,
            Self::Test3 => 3,
            Self::Test4 => 4,
        }
    }
}
