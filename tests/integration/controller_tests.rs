//! End-to-end controller tests: console line in, actuator calls and report
//! text out.

use autopush::config::PushConfig;
use autopush::events::PendingAction;

use crate::mock_hw::{HwCall, Rig, TimerCall};

// ── Boot ──────────────────────────────────────────────────────

#[test]
fn boot_parks_servo_settles_and_prints_help_on_both_consoles() {
    let mut rig = Rig::unbooted(PushConfig::default());
    rig.clear_log();
    rig.boot();

    assert_eq!(rig.calls(), vec![HwCall::Servo(85), HwCall::Hold(500)]);
    let serial = rig.serial_output();
    assert!(serial.starts_with("# AutoPush Application\r\n"));
    assert!(serial.ends_with("$ "));
    assert_eq!(rig.telnet_output(), serial);
    assert_eq!(rig.service.current_action(), PendingAction::NoAction);
}

// ── Setters ───────────────────────────────────────────────────

#[test]
fn init_100_then_settings() {
    let mut rig = Rig::new();

    let out = rig.serial("init 100");
    assert!(out.contains("OK\r\n"), "{out:?}");
    // Accepting a new rest position moves the arm there.
    assert_eq!(rig.angles(), vec![100]);

    let out = rig.serial("settings");
    assert!(out.contains("Init Angle    : 100[degree]"));
    assert!(out.contains("Push Angle    : 65[degree]"));
    assert!(out.contains("On Time       : 800[ms]"));
    assert!(out.contains("Interval Time : 0[ms]"));
    assert!(out.contains("Period        : 800[ms]"));

    let c = rig.service.config();
    assert_eq!((c.init_angle, c.push_angle, c.pulse_width_ms, c.interval_ms), (100, 65, 800, 0));
}

#[test]
fn init_angle_bounds() {
    let mut rig = Rig::new();
    for v in [89, 121, -5, 0] {
        let out = rig.serial(&format!("init {v}"));
        assert!(out.contains("invalid value"), "init {v}: {out:?}");
        assert_eq!(rig.service.config().init_angle, 85);
    }
    assert!(rig.angles().is_empty(), "rejected init must not move the arm");

    assert!(rig.serial("init 90").contains("OK"));
    assert!(rig.serial("init 120").contains("OK"));
    assert_eq!(rig.service.config().init_angle, 120);
}

#[test]
fn push_angle_travel_window() {
    let mut rig = Rig::new();
    // init 85
    assert!(rig.serial("push 80").contains("invalid value")); // travel 5
    assert!(rig.serial("push 55").contains("invalid value")); // travel 30
    assert!(rig.serial("push 90").contains("invalid value")); // negative
    assert_eq!(rig.service.config().push_angle, 65);

    assert!(rig.serial("push 79").contains("OK")); // travel 6
    assert!(rig.serial("push 56").contains("OK")); // travel 29
    assert_eq!(rig.service.config().push_angle, 56);
}

#[test]
fn width_then_interval() {
    let mut rig = Rig::new();
    assert!(rig.serial("width 700").contains("invalid value"));
    assert!(rig.serial("width 900").contains("OK"));
    assert!(rig.serial("interval 500").contains("invalid value"));
    assert_eq!(rig.service.config().interval_ms, 0);
    assert!(rig.serial("interval 900").contains("OK"));
    assert_eq!(rig.service.config().interval_ms, 900);
    assert!(rig.serial("settings").contains("Period        : 1800[ms]"));
}

#[test]
fn setter_reply_is_ok_or_invalid_and_never_both() {
    let mut rig = Rig::new();
    for line in ["init 100", "init 10", "push 80", "width 1000", "interval 1", "interval 5000"] {
        let out = rig.serial(line);
        assert!(
            out.contains("OK") ^ out.contains("invalid value"),
            "{line}: {out:?}"
        );
    }
}

// ── Timer start / stop ────────────────────────────────────────

#[test]
fn timer_start_ticks_count_and_stop_reports_total() {
    let mut rig = Rig::new();
    rig.serial("interval 1000");

    let out = rig.serial("timer start");
    assert!(out.contains("Starting\r\n"));
    assert_eq!(rig.timer.calls, vec![TimerCall::Arm(1800)]);
    assert!(rig.service.timer_armed());
    assert!(rig.angles().is_empty(), "arming must not move the arm");

    for n in 1..=3u32 {
        rig.clear_log();
        let out = rig.fire_timer();
        assert_eq!(out, format!("\x1b[31m times : {n}\x1b[0m\r\n"));
        assert_eq!(
            rig.calls(),
            vec![
                HwCall::Servo(65),
                HwCall::Hold(400),
                HwCall::Servo(85),
                HwCall::Hold(400),
            ]
        );
    }
    assert_eq!(rig.service.counters().total, 3);

    let out = rig.serial("timer stop");
    assert!(out.contains("Total Count: 3\r\nend\r\n$ "), "{out:?}");
    assert_eq!(rig.timer.calls.last(), Some(&TimerCall::Disarm));
    assert!(!rig.service.timer_armed());
    assert_eq!(rig.service.counters().total, 0);
    assert_eq!(rig.service.counters().set, 0);

    // Counting restarts from 1.
    rig.serial("timer start");
    assert_eq!(rig.fire_timer(), "\x1b[31m times : 1\x1b[0m\r\n");
}

#[test]
fn timer_stop_when_already_stopped_is_harmless() {
    let mut rig = Rig::new();
    let first = rig.serial("timer stop");
    let second = rig.serial("timer stop");
    assert!(first.contains("Total Count: 0\r\nend"));
    assert_eq!(first, second);
    assert_eq!(rig.service.counters().total, 0);
    assert!(!rig.service.timer_armed());
    assert!(rig.angles().is_empty());
}

#[test]
fn restart_while_running_replaces_period_and_zeroes_count() {
    let mut rig = Rig::new();
    rig.serial("timer start");
    rig.fire_timer();
    rig.fire_timer();
    rig.serial("width 1000");
    rig.serial("timer start");
    assert_eq!(rig.timer.period_ms, Some(1000));
    assert_eq!(rig.service.counters().total, 0);
}

// ── Once ──────────────────────────────────────────────────────

#[test]
fn once_is_exactly_one_pulse_and_does_not_arm() {
    let mut rig = Rig::new();
    rig.serial("width 1000");
    rig.clear_log();

    rig.serial("once");
    assert_eq!(
        rig.calls(),
        vec![
            HwCall::Servo(65),
            HwCall::Hold(500),
            HwCall::Servo(85),
            HwCall::Hold(500),
        ]
    );
    assert!(rig.timer.calls.is_empty());
    assert_eq!(rig.service.counters().total, 0);
    assert_eq!(rig.service.last_block_ms(), 1000);

    // Nothing further happens on idle iterations.
    rig.clear_log();
    assert_eq!(rig.step(), PendingAction::NoAction);
    assert!(rig.calls().is_empty());
}

// ── Mailbox race ──────────────────────────────────────────────

#[test]
fn typed_ahead_commands_run_in_order() {
    let mut rig = Rig::new();
    let serial = rig.consoles.local.transport_mut();
    serial.type_line("width 900");
    serial.type_line("interval 900");

    assert_eq!(rig.step(), PendingAction::SetWidth);
    assert_eq!(rig.step(), PendingAction::SetInterval);
    assert_eq!(rig.step(), PendingAction::NoAction);

    assert_eq!(rig.service.config().pulse_width_ms, 900);
    assert_eq!(rig.service.config().interval_ms, 900);
    assert_eq!(rig.mailbox.overwrites(), 0);
    assert_eq!(rig.serial_output(), "$ OK\r\n$ $ OK\r\n$ ");
}

#[test]
fn both_consoles_in_one_iteration_last_poster_wins() {
    let mut rig = Rig::new();
    rig.consoles.local.transport_mut().type_line("once");
    rig.consoles.remote.transport_mut().type_line("usb on");
    assert_eq!(rig.step(), PendingAction::UsbOn);

    assert_eq!(rig.calls(), vec![HwCall::Usb(true)]);
    assert_eq!(rig.mailbox.overwrites(), 1);
    assert_eq!(rig.step(), PendingAction::NoAction);
}

#[test]
fn posts_during_a_pulse_overwrite_each_other() {
    let mut rig = Rig::new();
    let mb = rig.mailbox;
    let mut fired = false;
    rig.on_hold(move |_| {
        if !fired {
            fired = true;
            mb.post(PendingAction::SingleClick);
            mb.post(PendingAction::UsbOn);
        }
    });

    rig.serial("once");
    assert_eq!(rig.service.last_block_ms(), 800);
    assert_eq!(rig.mailbox.peek(), PendingAction::UsbOn);

    rig.clear_log();
    assert_eq!(rig.step(), PendingAction::UsbOn);
    assert_eq!(rig.calls(), vec![HwCall::Usb(true)]);
    assert_eq!(rig.step(), PendingAction::NoAction);
}

#[test]
fn tick_landing_during_a_tick_is_not_lost_or_doubled() {
    let mut rig = Rig::new();
    rig.serial("timer start");
    let mb = rig.mailbox;
    let mut once = true;
    rig.on_hold(move |_| {
        if once {
            once = false;
            mb.post(PendingAction::TimerTick);
        }
    });
    rig.fire_timer();
    // The tick posted mid-pulse runs on the next iteration.
    rig.step();
    assert_eq!(rig.service.counters().total, 2);
    assert_eq!(rig.step(), PendingAction::NoAction);
}

// ── USB / reset / help ────────────────────────────────────────

#[test]
fn usb_switch_follows_commands() {
    let mut rig = Rig::new();
    let out = rig.serial("usb on");
    assert!(out.contains("\r\nUSB connection on.\r\n$ "));
    assert!(rig.service.usb_on());
    let out = rig.serial("usb off");
    assert!(out.contains("USB connection off."));
    assert_eq!(rig.calls(), vec![HwCall::Usb(true), HwCall::Usb(false)]);
}

#[test]
fn reset_restarts_and_keeps_reset_pending() {
    let mut rig = Rig::new();
    rig.serial("reset");
    assert_eq!(rig.hw.restart_requests(), 1);
    assert_eq!(rig.mailbox.peek(), PendingAction::Reset);
    rig.step();
    assert_eq!(rig.hw.restart_requests(), 2);
}

#[test]
fn help_lists_commands() {
    let mut rig = Rig::new();
    let out = rig.serial("?");
    assert!(out.contains("Type: timer {start / stop}"));
    assert!(out.contains("Type: usb {on / off}"));
}

#[test]
fn counters_track_executed_actions() {
    let mut rig = Rig::new();
    rig.serial("settings");
    rig.serial("once");
    rig.step();
    assert_eq!(rig.service.executed(), 2);
    assert_eq!(rig.service.tick_count(), 3);
}
