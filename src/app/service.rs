//! Application service: the hexagonal core.
//!
//! [`PushService`] owns the action dispatcher, the shared context and a
//! reference to the mailbox.  It exposes a hardware-agnostic API; all I/O
//! flows through port traits injected at call sites, so the whole
//! controller runs against mock adapters in tests.
//!
//! ```text
//!  Mailbox ──drain──▶ ┌────────────────────────┐ ──▶ ReportSink
//!                     │      PushService       │
//!  ActuatorPort ◀──── │  Fsm · FsmContext      │ ──▶ PeriodicTimerPort
//!  HoldPort     ◀──── └────────────────────────┘
//! ```

use log::{debug, error, info};

use crate::config::PushConfig;
use crate::error::TransportFault;
use crate::events::{Delivery, Mailbox, PendingAction};
use crate::fsm::actions::build_action_table;
use crate::fsm::context::{Counters, FsmContext, Step};
use crate::fsm::Fsm;

use super::events::Report;
use super::ports::{ActuatorPort, HoldPort, PeriodicTimerPort, ReportSink, SystemPort};

// ───────────────────────────────────────────────────────────────
// PushService
// ───────────────────────────────────────────────────────────────

/// The actuation controller.
pub struct PushService<'m> {
    mailbox: &'m Mailbox,
    fsm: Fsm,
    ctx: FsmContext,
    /// Main-loop iterations (including idle ones).
    tick_count: u64,
    /// Non-idle actions executed.
    executed: u64,
    /// Blocking time of the most recent action with holds.
    last_block_ms: u32,
}

impl<'m> PushService<'m> {
    /// Construct the controller.  Call [`start`](Self::start) before the
    /// first [`tick`](Self::tick).
    pub fn new(mailbox: &'m Mailbox, config: PushConfig) -> Self {
        Self {
            mailbox,
            fsm: Fsm::new(build_action_table()),
            ctx: FsmContext::new(config),
            tick_count: 0,
            executed: 0,
            last_block_ms: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Boot sequence: park the arm at the init angle, let it settle, then
    /// print the command list.
    pub fn start(
        &mut self,
        hw: &mut (impl ActuatorPort + HoldPort),
        sink: &mut impl ReportSink,
        settle_ms: u32,
    ) {
        hw.move_servo(self.ctx.config.init_angle);
        hw.hold_ms(settle_ms);
        sink.emit(&Report::Help);
        info!(
            "PushService started: init={} push={} width={}ms interval={}ms",
            self.ctx.config.init_angle,
            self.ctx.config.push_angle,
            self.ctx.config.pulse_width_ms,
            self.ctx.config.interval_ms
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Drain the mailbox and execute at most one action.
    ///
    /// The `hw` parameter satisfies all three hardware ports so one adapter
    /// can own the servo, the USB line and the delay provider without a
    /// double mutable borrow.  Returns the action that ran.
    pub fn tick<H, T, S>(&mut self, hw: &mut H, timer: &mut T, sink: &mut S) -> PendingAction
    where
        H: ActuatorPort + HoldPort + SystemPort,
        T: PeriodicTimerPort,
        S: ReportSink,
    {
        self.tick_count += 1;
        let Delivery { action, argument } = self.mailbox.drain_with_argument();
        if action == PendingAction::NoAction {
            return action;
        }

        self.ctx.pending_value = argument;
        let follow_up = self.fsm.dispatch(action, &mut self.ctx);

        let block_ms = self.ctx.planned_hold_ms();
        if block_ms > 0 {
            self.last_block_ms = block_ms;
        }

        let plan = core::mem::take(&mut self.ctx.plan);
        for step in &plan {
            Self::apply(*step, hw, timer, sink);
        }

        self.fsm.finish();
        self.executed += 1;

        if let Some(next) = follow_up {
            debug!("Re-posting {}", self.fsm.name_of(next));
            self.mailbox.post(next);
        }
        action
    }

    /// Network transport is gone: restart the device.
    pub fn fail_fast(&mut self, hw: &mut impl SystemPort, fault: TransportFault) {
        error!("Fatal transport fault: {fault}; restarting");
        hw.restart();
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &PushConfig {
        &self.ctx.config
    }

    pub fn counters(&self) -> Counters {
        self.ctx.counters
    }

    /// Whether the controller has the periodic timer attached.
    pub fn timer_armed(&self) -> bool {
        self.ctx.timer_armed
    }

    pub fn usb_on(&self) -> bool {
        self.ctx.usb_on
    }

    /// Action being executed; `NoAction` between ticks.
    pub fn current_action(&self) -> PendingAction {
        self.fsm.current_action()
    }

    /// Main-loop iterations since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Non-idle actions executed since startup.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// How long the last pulse cycle blocked the loop.  Any post landing
    /// in the mailbox during that window may have overwritten another.
    pub fn last_block_ms(&self) -> u32 {
        self.last_block_ms
    }

    pub fn mailbox(&self) -> &'m Mailbox {
        self.mailbox
    }

    // ── Internal ──────────────────────────────────────────────

    /// Translate one plan step into port calls.
    fn apply<H, T, S>(step: Step, hw: &mut H, timer: &mut T, sink: &mut S)
    where
        H: ActuatorPort + HoldPort + SystemPort,
        T: PeriodicTimerPort,
        S: ReportSink,
    {
        match step {
            Step::MoveServo(angle) => hw.move_servo(angle),
            Step::Hold(ms) => hw.hold_ms(ms),
            Step::UsbPower(on) => hw.set_usb_power(on),
            Step::ArmTimer(period_ms) => timer.arm(period_ms),
            Step::DisarmTimer => timer.disarm(),
            Step::Emit(report) => sink.emit(&report),
            Step::Restart => {
                error!("{}", TransportFault::RestartRequested);
                hw.restart();
            }
        }
    }
}
