//! Fuzz target: `DriverConfig::from_blob`
//!
//! Corrupted persisted configuration must be rejected, never accepted in an
//! invalid state, and never panic.
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use gpioled::config::DriverConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = DriverConfig::from_blob(data) {
        assert!(config.validate().is_ok());
        let blob = config.to_blob().expect("valid config encodes");
        assert_eq!(DriverConfig::from_blob(&blob).ok(), Some(config));
    }
});
