//! Event sources that feed the mailbox from the main loop.
//!
//! The periodic timer posts on its own (see
//! [`PeriodicTimer`](crate::drivers::hw_timer::PeriodicTimer)) and the
//! consoles post through [`ConsoleChannel::poll`](crate::console::ConsoleChannel::poll).
//! The button is sampled here: each classified gesture is echoed to the
//! consoles, then posted.

use embedded_hal::digital::InputPin;
use log::info;

use crate::app::events::Report;
use crate::app::ports::ReportSink;
use crate::drivers::button::{ButtonDriver, ClickEvent};
use crate::events::Mailbox;

pub struct ButtonSource<I: InputPin> {
    button: ButtonDriver<I>,
}

impl<I: InputPin> ButtonSource<I> {
    pub fn new(pin: I) -> Self {
        Self {
            button: ButtonDriver::new(pin),
        }
    }

    /// Sample the button; on a gesture, echo it and post its action.
    pub fn poll(
        &mut self,
        now_ms: u32,
        mailbox: &Mailbox,
        sink: &mut impl ReportSink,
    ) -> Option<ClickEvent> {
        let ev = self.button.poll(now_ms)?;
        info!("button: {ev}");
        sink.emit(&Report::Click(ev));
        mailbox.post(ev.action());
        Some(ev)
    }
}
