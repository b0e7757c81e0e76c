//! Integration tests for the write / read / control / close surface.

use std::sync::Arc;
use std::time::Duration;

use gpioled::adapters::sim::SimPins;
use gpioled::app::commands::ControlCode;
use gpioled::app::events::NotificationEvent::{Lowered, Raised};
use gpioled::app::session::DriverSession;
use gpioled::config::DriverConfig;
use gpioled::error::{Error, HwError, ParseError};

use super::mock_platform::{RecordingTable, open, open_with, wait_until};

// ── Blink, stop, raise scenario ───────────────────────────────

#[test]
fn blink_then_stop_then_raise_scenario() {
    let rig = open(&[4242]);
    let s = &rig.session;

    assert_eq!(s.write(b"1:4242"), Ok(6));
    assert!(s.is_blinking());
    assert_eq!(s.subscriber(), Some(4242));
    assert!(wait_until(|| rig.led_writes() >= 4), "blink never toggled");

    assert_eq!(s.write(b"0:4242"), Ok(6));
    assert!(!s.is_blinking());
    assert!(!s.is_on());
    assert_eq!(s.read().as_str(), "LED off, blink off, subscriber 4242");

    assert_eq!(rig.raise(), 1);
    assert_eq!(rig.raise(), 1);
    assert!(s.is_on());
    assert_eq!(rig.table.deliveries(), vec![(4242, Raised)]);

    rig.raise();
    assert_eq!(rig.table.deliveries(), vec![(4242, Raised)]);
    assert_eq!(rig.led_level(), Some(true));
}

// ── Malformed payloads ────────────────────────────────────────

#[test]
fn malformed_payloads_change_nothing() {
    let rig = open(&[1, 2]);
    let s = &rig.session;
    assert_eq!(s.write(b"1:1"), Ok(3));
    let writes_before = s.subscriber();

    let cases: [(&[u8], ParseError); 5] = [
        (b"11", ParseError::MissingSeparator),
        (b":2", ParseError::EmptyCommand),
        (b"0:abc", ParseError::InvalidPid),
        (b"0:", ParseError::InvalidPid),
        (b"0:2:3", ParseError::InvalidPid),
    ];
    for (payload, expected) in cases {
        assert_eq!(s.write(payload), Err(Error::MalformedPayload(expected)));
        assert!(s.is_blinking(), "{:?} stopped the blink job", payload);
        assert_eq!(s.subscriber(), writes_before);
    }

    let oversized = vec![b'0'; gpioled::app::commands::MAX_PAYLOAD + 1];
    assert_eq!(
        s.write(&oversized),
        Err(Error::MalformedPayload(ParseError::TooLong))
    );
    assert!(s.is_blinking());
}

#[test]
fn malformed_payloads_leave_led_untouched() {
    let rig = open(&[1]);
    let s = &rig.session;
    s.write(b"0:1").unwrap();
    rig.raise();
    assert!(s.is_on());
    let writes = rig.led_writes();

    let payloads: [&[u8]; 6] = [b"11", b":1", b"1:x", b"1:", b"0:1:1", b"0:99999999999"];
    for payload in payloads {
        assert!(
            matches!(s.write(payload), Err(Error::MalformedPayload(_))),
            "{:?} accepted",
            payload
        );
        assert!(s.is_on(), "{:?} changed the LED", payload);
        assert_eq!(rig.led_writes(), writes, "{:?} wrote the pin", payload);
        assert!(!s.is_blinking());
        assert_eq!(s.subscriber(), Some(1));
    }

    let oversized = vec![b'1'; gpioled::app::commands::MAX_PAYLOAD + 1];
    assert!(s.write(&oversized).is_err());
    assert!(s.is_on());
    assert_eq!(rig.led_writes(), writes);

    assert_eq!(rig.led_level(), Some(true));
    assert_eq!(rig.table.deliveries(), vec![(1, Raised)]);
}

#[test]
fn command_field_is_truncated_to_first_byte() {
    let rig = open(&[9]);
    let s = &rig.session;
    assert!(s.write(b"10:9").is_ok());
    assert!(s.is_blinking());
    assert!(s.write(b"0ff:9").is_ok());
    assert!(!s.is_blinking());
}

// ── Lookup failure ────────────────────────────────────────────

#[test]
fn failed_lookup_keeps_earlier_subscriber() {
    let rig = open(&[100]);
    let s = &rig.session;
    s.write(b"0:100").unwrap();

    assert_eq!(s.write(b"0:555"), Err(Error::LookupFailed(555)));
    assert_eq!(s.subscriber(), Some(100));

    rig.raise();
    rig.lower();
    assert_eq!(rig.table.deliveries(), vec![(100, Raised), (100, Lowered)]);
}

#[test]
fn failed_lookup_still_starts_blinking() {
    let rig = open(&[]);
    assert_eq!(rig.session.write(b"1:7"), Err(Error::LookupFailed(7)));
    assert!(rig.session.is_blinking());
    assert_eq!(rig.session.subscriber(), None);
}

#[test]
fn dead_process_is_not_registered() {
    let rig = open(&[3, 4]);
    rig.session.write(b"0:3").unwrap();
    rig.table.kill(4);
    assert_eq!(rig.session.write(b"0:4"), Err(Error::LookupFailed(4)));
    assert_eq!(rig.session.subscriber(), Some(3));
}

// ── Open / close ──────────────────────────────────────────────

#[test]
fn open_fails_cleanly_on_each_unavailable_line() {
    let cfg = DriverConfig::default();
    for busy in [cfg.actuator_pin, cfg.raise_pin, cfg.lower_pin] {
        let pins = Arc::new(SimPins::new());
        pins.mark_unavailable(busy);
        let result = DriverSession::open(cfg.clone(), Arc::clone(&pins), RecordingTable::default());
        assert!(
            matches!(
                result,
                Err(Error::ResourceAcquisitionFailed(HwError::LineUnavailable(l))) if l == busy
            ),
            "GPIO{} busy",
            busy
        );
        for line in [cfg.actuator_pin, cfg.raise_pin, cfg.lower_pin] {
            assert!(!pins.is_claimed(line), "GPIO{} leaked after failed open", line);
        }
    }
}

#[test]
fn close_stops_blinking_and_releases_lines() {
    let rig = open(&[1]);
    rig.session.write(b"1:1").unwrap();
    let pins = Arc::clone(&rig.pins);
    let cfg = rig.config.clone();
    rig.session.close();

    for line in [cfg.actuator_pin, cfg.raise_pin, cfg.lower_pin] {
        assert!(!pins.is_claimed(line));
    }
    assert_eq!(pins.pulse(cfg.raise_pin), 0);
}

#[test]
fn drop_releases_lines() {
    let pins = Arc::new(SimPins::new());
    {
        let _s = DriverSession::open(
            DriverConfig::default(),
            Arc::clone(&pins),
            RecordingTable::default(),
        )
        .unwrap();
        assert!(pins.is_claimed(DriverConfig::default().actuator_pin));
    }
    assert!(!pins.is_claimed(DriverConfig::default().actuator_pin));
    // Lines can be claimed again by a fresh session.
    assert!(
        DriverSession::open(DriverConfig::default(), pins, RecordingTable::default()).is_ok()
    );
}

#[test]
fn signal_variant_uses_falling_edges_and_fast_blink() {
    let rig = open_with(DriverConfig::signal_variant(), &[8]);
    let s = &rig.session;
    s.write(b"1:8").unwrap();
    assert!(s.read().contains("blink 10ms"));
    s.write(b"0:8").unwrap();

    assert_eq!(rig.raise(), 1);
    assert!(s.is_on());
    assert_eq!(rig.lower(), 1);
    assert!(!s.is_on());
    assert_eq!(rig.table.deliveries(), vec![(8, Raised), (8, Lowered)]);
}

#[test]
fn session_from_json_config() {
    let json = r#"{
        "blink_interval_ms": 20,
        "actuator_pin": 2,
        "raise_pin": 3,
        "lower_pin": 4,
        "raise_edge": "Rising",
        "lower_edge": "Both"
    }"#;
    let rig = open_with(DriverConfig::from_json(json).unwrap(), &[5]);
    rig.session.write(b"1:5").unwrap();
    assert_eq!(rig.session.config().blink_interval(), Duration::from_millis(20));
    assert!(rig.session.read().contains("blink 20ms"));
}

// ── Control channel ───────────────────────────────────────────

#[test]
fn control_codes_do_not_touch_led() {
    let rig = open(&[]);
    let writes = rig.led_writes();
    let decoded: Vec<_> = (0..6).map(|c| rig.session.control(c)).collect();
    assert_eq!(
        decoded,
        vec![
            Some(ControlCode::Test1),
            Some(ControlCode::Test2),
            Some(ControlCode::Test3),
            Some(ControlCode::Test4),
            None,
            None,
        ]
    );
    assert_eq!(rig.led_writes(), writes);
}
