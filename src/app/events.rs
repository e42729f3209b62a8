//! Outbound application reports.
//!
//! The [`PushService`](super::service::PushService) emits these through the
//! [`ReportSink`](super::ports::ReportSink) port.  Adapters on the other
//! side decide what to do with them; the console adapter renders them with
//! [`reporter`](crate::reporter) and mirrors the text to every transport.

use crate::config::{Field, PushConfig};
use crate::drivers::button::ClickEvent;
use crate::error::ValidationError;

/// Structured reports emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    /// Command list (boot banner and `?`).
    Help,

    /// Snapshot of the current configuration (`settings`).
    Settings(PushConfig),

    /// Periodic actuation was armed.
    Starting,

    /// Periodic actuation was stopped; carries the final cycle count.
    Stopped { total: u32 },

    /// One automatic pulse cycle completed; carries the running count.
    PulseCount(u32),

    /// USB power switch was driven on or off.
    UsbPower(bool),

    /// A setter committed a new value.
    Accepted(Field),

    /// A setter was refused; configuration unchanged.
    Rejected(ValidationError),

    /// A button gesture was classified (echoed before it is posted).
    Click(ClickEvent),
}
