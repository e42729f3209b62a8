//! Dual-console behaviour: mirroring, error routing, line framing.

use autopush::events::PendingAction;

use crate::mock_hw::Rig;

#[test]
fn setter_reply_reaches_both_consoles() {
    let mut rig = Rig::new();
    let serial = rig.serial("width 1000");
    assert_eq!(serial, "$ OK\r\n$ ");
    assert_eq!(rig.telnet_output(), "OK\r\n$ ");
}

#[test]
fn telnet_command_is_mirrored_to_serial() {
    let mut rig = Rig::new();
    let telnet = rig.telnet("settings");
    assert!(telnet.starts_with("$ \r\nInit Angle    : 85[degree]"));
    let serial = rig.serial_output();
    assert!(serial.starts_with("\r\nInit Angle    : 85[degree]"));
    assert!(serial.ends_with("Period        : 800[ms]\r\n$ "));
}

#[test]
fn parse_error_goes_only_to_sender_and_posts_nothing() {
    let mut rig = Rig::new();

    let out = rig.serial("onec");
    assert_eq!(out, "ERROR: Command \"onec\" not found\r\nDid you mean \"once\"?\r\n$ ");
    assert!(rig.telnet_output().is_empty());
    assert_eq!(rig.service.executed(), 0);

    let out = rig.telnet("width");
    assert!(out.starts_with("ERROR: Missing argument"), "{out:?}");
    assert!(rig.serial_output().is_empty());

    let out = rig.telnet("width abc");
    assert!(out.starts_with("ERROR: "), "{out:?}");
    let out = rig.telnet("timer go");
    assert!(out.starts_with("ERROR: "), "{out:?}");
    let out = rig.telnet("once now");
    assert!(out.starts_with("ERROR: "), "{out:?}");

    assert_eq!(rig.service.executed(), 0);
    assert!(rig.angles().is_empty());
}

#[test]
fn blank_line_just_prompts() {
    let mut rig = Rig::new();
    assert_eq!(rig.serial(""), "$ ");
    assert_eq!(rig.serial("   "), "$ ");
    assert_eq!(rig.service.executed(), 0);
}

#[test]
fn keywords_are_case_sensitive_and_whitespace_tolerant() {
    let mut rig = Rig::new();
    let out = rig.serial("TIMER start");
    assert_eq!(out, "ERROR: Command \"TIMER\" not found\r\nDid you mean \"timer\"?\r\n$ ");
    assert!(rig.serial("Once").starts_with("ERROR: "));
    assert_eq!(rig.service.executed(), 0);
    assert!(!rig.service.timer_armed());

    assert!(rig.serial("  timer   start ").contains("Starting"));
    assert!(rig.service.timer_armed());
    assert!(rig.serial("timer stop").contains("Total Count: 0"));
}

#[test]
fn line_split_across_reads_is_reassembled() {
    let mut rig = Rig::new();
    rig.consoles.local.transport_mut().input.extend(b"us");
    assert_eq!(rig.step(), PendingAction::NoAction);
    rig.consoles.local.transport_mut().input.extend(b"b on\n");
    assert_eq!(rig.step(), PendingAction::UsbOn);
}

#[test]
fn backspace_edits_the_line() {
    let mut rig = Rig::new();
    rig.consoles.local.transport_mut().input.extend(b"oncx\x08e\r\n");
    assert_eq!(rig.step(), PendingAction::TimerOnce);
}

#[test]
fn disconnected_remote_gets_nothing_and_serial_still_works() {
    let mut rig = Rig::new();
    rig.consoles.remote.transport_mut().connected = false;
    let out = rig.serial("usb on");
    assert!(out.contains("USB connection on."));
    assert!(rig.telnet_output().is_empty());
}
