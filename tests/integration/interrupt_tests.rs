//! Integration tests for switch edges → LED transitions → notifications.

use gpioled::adapters::mailbox::MailboxTable;
use gpioled::adapters::sim::SimPins;
use gpioled::app::events::NotificationEvent::{self, Lowered, Raised};
use gpioled::app::session::DriverSession;
use gpioled::config::DriverConfig;
use gpioled::drivers::switches::SwitchLine;
use std::sync::Arc;

use super::mock_platform::open;

#[test]
fn raise_twice_notifies_once() {
    let rig = open(&[42]);
    rig.session.write(b"0:42").unwrap();
    let writes = rig.led_writes();

    rig.raise();
    rig.raise();
    assert!(rig.session.is_on());
    assert_eq!(rig.led_writes(), writes + 1, "self-loop wrote the pin");
    assert_eq!(rig.table.deliveries(), vec![(42, Raised)]);
}

#[test]
fn lower_twice_notifies_once() {
    let rig = open(&[42]);
    rig.session.write(b"0:42").unwrap();
    rig.raise();
    rig.lower();
    rig.lower();
    assert!(!rig.session.is_on());
    assert_eq!(rig.table.deliveries(), vec![(42, Raised), (42, Lowered)]);
}

#[test]
fn lower_from_initial_off_is_silent() {
    let rig = open(&[42]);
    rig.session.write(b"0:42").unwrap();
    rig.lower();
    assert!(rig.table.deliveries().is_empty());
}

#[test]
fn edges_without_subscriber_still_move_led() {
    let rig = open(&[]);
    rig.raise();
    assert!(rig.session.is_on());
    assert_eq!(rig.led_level(), Some(true));
    rig.lower();
    assert!(!rig.session.is_on());
    assert!(rig.table.deliveries().is_empty());
}

#[test]
fn bounce_is_counted_not_filtered() {
    let rig = open(&[]);
    for _ in 0..4 {
        rig.raise();
    }
    rig.lower();
    assert_eq!(rig.session.edge_count(SwitchLine::Raise), 4);
    assert_eq!(rig.session.edge_count(SwitchLine::Lower), 1);
    assert!(!rig.session.is_on());
}

#[test]
fn notifications_follow_new_subscriber() {
    let rig = open(&[1, 2]);
    rig.session.write(b"0:1").unwrap();
    rig.raise();
    // Stop drives the LED off, so the next raise is a real transition.
    rig.session.write(b"0:2").unwrap();
    assert!(!rig.session.is_on());
    rig.raise();
    rig.lower();
    assert_eq!(
        rig.table.deliveries(),
        vec![(1, Raised), (2, Raised), (2, Lowered)]
    );
}

#[test]
fn mailbox_listener_receives_in_order() {
    let pins = Arc::new(SimPins::new());
    let table = Arc::new(MailboxTable::new());
    let listener = table.spawn(4242);
    let cfg = DriverConfig::default();
    let session = DriverSession::open(cfg.clone(), Arc::clone(&pins), Arc::clone(&table)).unwrap();
    session.write(b"0:4242").unwrap();

    for _ in 0..3 {
        pins.pulse(cfg.raise_pin);
        pins.pulse(cfg.lower_pin);
    }
    let got: Vec<NotificationEvent> = listener.drain().into_iter().collect();
    assert_eq!(got, vec![Raised, Lowered, Raised, Lowered, Raised, Lowered]);
    assert_eq!(listener.dropped(), 0);
}

#[test]
fn exited_listener_keeps_receiving_until_replaced() {
    let pins = Arc::new(SimPins::new());
    let table = Arc::new(MailboxTable::new());
    let listener = table.spawn(7);
    let cfg = DriverConfig::default();
    let session = DriverSession::open(cfg.clone(), Arc::clone(&pins), Arc::clone(&table)).unwrap();
    session.write(b"0:7").unwrap();

    assert!(table.exit(7));
    pins.pulse(cfg.raise_pin);
    assert_eq!(listener.try_next(), Some(Raised));
    assert_eq!(session.write(b"0:7"), Err(gpioled::error::Error::LookupFailed(7)));
}
