//! gpioled firmware: main entry point.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │  stdin console ──▶ DriverSession ◀── EspPins (GPIO)   │
//! │                        │                              │
//! │                        ▼                              │
//! │                  MailboxTable ──▶ listener (pid 1)    │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! Console lines:
//!
//! - `?`: print the status line
//! - `ctl <n>`: send control code `n`
//! - anything else: write payload, e.g. `1:1` to blink and subscribe pid 1
#![deny(unused_must_use)]

use std::io::BufRead;
use std::sync::Arc;

use anyhow::Result;
use log::{info, warn};

use gpioled::adapters::esp_gpio::EspPins;
use gpioled::adapters::mailbox::MailboxTable;
use gpioled::app::session::DriverSession;
use gpioled::config::DriverConfig;

/// Pid of the built-in notification listener.
const LISTENER_PID: u32 = 1;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("gpioled v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Listener process ───────────────────────────────────
    let processes = Arc::new(MailboxTable::new());
    let listener = processes.spawn(LISTENER_PID);
    std::thread::Builder::new()
        .name("listener".into())
        .stack_size(4 * 1024)
        .spawn(move || {
            loop {
                let event = listener.wait();
                info!(
                    "listener {}: caught {} (signal {})",
                    listener.pid(),
                    event,
                    event.signal_number()
                );
            }
        })?;

    // ── 3. Session ────────────────────────────────────────────
    let session = DriverSession::open(
        DriverConfig::default(),
        Arc::new(EspPins::new()),
        Arc::clone(&processes),
    )?;

    // ── 4. Console ────────────────────────────────────────────
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "?" {
            info!("{}", session.read());
        } else if let Some(code) = line.strip_prefix("ctl ") {
            match code.trim().parse::<u32>() {
                Ok(code) => {
                    session.control(code);
                }
                Err(_) => warn!("console: bad control code '{}'", code),
            }
        } else if let Err(e) = session.write(line.as_bytes()) {
            warn!("console: {}", e);
        }
    }

    session.close();
    Ok(())
}
