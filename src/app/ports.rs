//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ PushService (domain)
//! ```
//!
//! Driven adapters (servo, USB switch, delays, periodic timer, consoles)
//! implement these traits.  The [`PushService`](super::service::PushService)
//! consumes them via generics, so the domain core never touches hardware
//! directly and every transition can be replayed against mocks.

use super::events::Report;

// ───────────────────────────────────────────────────────────────
// Actuator port (domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Drive the servo arm to `angle_deg` (0–180).  Returns immediately;
    /// the arm needs a [`HoldPort::hold_ms`] to actually get there.
    fn move_servo(&mut self, angle_deg: u32);

    /// Switch the USB power line.
    fn set_usb_power(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Hold port (blocking delay inside a transition)
// ───────────────────────────────────────────────────────────────

/// Blocks the caller.  Nothing else in the main loop runs while a hold
/// is in progress; interrupt-side posts still land in the mailbox.
pub trait HoldPort {
    fn hold_ms(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// System port
// ───────────────────────────────────────────────────────────────

pub trait SystemPort {
    /// Request a full device restart.  On hardware this does not return.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Periodic timer port
// ───────────────────────────────────────────────────────────────

/// The hardware timer that drives automatic pulse cycles.  While armed it
/// posts `TimerTick` into the mailbox once per period, from its own
/// (interrupt or timer-task) context.
pub trait PeriodicTimerPort {
    /// Attach with `period_ms`.  Re-arming replaces the previous period.
    fn arm(&mut self, period_ms: u32);

    /// Detach.  Idempotent.
    fn disarm(&mut self);

    fn is_armed(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Report sink (domain → consoles)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`Report`]s through this port.
pub trait ReportSink {
    fn emit(&mut self, report: &Report);
}
