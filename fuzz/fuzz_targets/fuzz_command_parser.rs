//! Fuzz target: `commands::parse`
//!
//! Drives arbitrary write payloads into the parser and asserts that it never
//! panics and that every accepted payload re-parses to the same command
//! after re-encoding.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use gpioled::app::commands::{parse, Directive, MAX_PAYLOAD};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match parse(data) {
        Ok(cmd) => {
            assert!(data.len() <= MAX_PAYLOAD);
            let stop = data.first() == Some(&b'0');
            assert_eq!(cmd.directive == Directive::Stop, stop);

            let canonical = format!("{}:{}", if stop { '0' } else { '1' }, cmd.pid);
            assert_eq!(parse(canonical.as_bytes()), Ok(cmd));
        }
        Err(_) => {}
    }
});
