//! Shared mutable context threaded through every action handler.
//!
//! `FsmContext` is the single struct that handlers read from and write to.
//! It holds the live configuration, the cycle counters, the scratch argument
//! delivered with the current action, and the *plan*: the ordered list of
//! side effects the handler wants performed.  Handlers never touch hardware;
//! [`PushService`](crate::app::service::PushService) walks the plan and
//! applies each step through the port traits.

use crate::app::events::Report;
use crate::config::PushConfig;

/// Upper bound on side effects a single action may request.
pub const MAX_PLAN_STEPS: usize = 8;

// ---------------------------------------------------------------------------
// Plan steps (written by handlers; applied by the service)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Drive the servo to an angle (degrees).
    MoveServo(u32),
    /// Block the loop for this many milliseconds.
    Hold(u32),
    /// Switch the USB power line.
    UsbPower(bool),
    /// Attach the periodic timer with this period (milliseconds).
    ArmTimer(u32),
    /// Detach the periodic timer.
    DisarmTimer,
    /// Send a report to the consoles.
    Emit(Report),
    /// Restart the device.
    Restart,
}

pub type Plan = heapless::Vec<Step, MAX_PLAN_STEPS>;

// ---------------------------------------------------------------------------
// Counters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counters {
    /// Completed automatic cycles since the timer was last armed or stopped.
    pub total: u32,
    /// Reserved; always cleared together with `total`.
    pub set: u32,
}

impl Counters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every action handler.
pub struct FsmContext {
    /// Operator-tunable actuation parameters.
    pub config: PushConfig,
    pub counters: Counters,
    /// Argument delivered with the action being executed.  Read by the
    /// setters, never written by handlers.
    pub pending_value: i32,
    /// Whether this controller believes the periodic timer is attached.
    pub timer_armed: bool,
    pub usb_on: bool,
    /// Side effects requested by the current handler, in order.
    pub plan: Plan,
}

impl FsmContext {
    pub fn new(config: PushConfig) -> Self {
        Self {
            config,
            counters: Counters::default(),
            pending_value: 0,
            timer_armed: false,
            usb_on: false,
            plan: Plan::new(),
        }
    }

    /// Append a side effect to the plan.
    pub fn push_step(&mut self, step: Step) {
        let pushed = self.plan.push(step);
        debug_assert!(pushed.is_ok(), "plan overflow at {step:?}");
    }

    /// Queue a full pulse cycle: push, hold half, return, hold half.
    pub fn push_pulse_cycle(&mut self) {
        let half = self.config.half_width_ms();
        self.push_step(Step::MoveServo(self.config.push_angle));
        self.push_step(Step::Hold(half));
        self.push_step(Step::MoveServo(self.config.init_angle));
        self.push_step(Step::Hold(half));
    }

    /// Queue a report.
    pub fn emit(&mut self, report: Report) {
        self.push_step(Step::Emit(report));
    }

    /// Total time the current plan will block the loop.
    pub fn planned_hold_ms(&self) -> u32 {
        self.plan
            .iter()
            .map(|s| match s {
                Step::Hold(ms) => *ms,
                _ => 0,
            })
            .fold(0u32, u32::saturating_add)
    }
}
