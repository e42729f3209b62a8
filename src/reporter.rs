//! Console text rendering.
//!
//! Stateless: turns a [`Report`] (or a console [`ParseError`]) into the
//! exact bytes an operator sees.  Rendering targets any `core::fmt::Write`,
//! so the same code feeds a `heapless::String` buffer on the device and a
//! `String` in tests.
//!
//! Every line ends in `\r\n`.  Interactive replies end with the prompt
//! marker [`PROMPT`].

use core::fmt::{self, Write};

use crate::app::events::Report;
use crate::config::PushConfig;
use crate::error::ParseError;

pub const PROMPT: &str = "$ ";
pub const EOL: &str = "\r\n";

/// Largest rendered report (the help text) fits comfortably in this.
pub const MAX_REPORT_LEN: usize = 512;

const HELP: &[&str] = &[
    "# AutoPush Application",
    "Type: once",
    "Type: init {degree}, push {degree}",
    "Type: width {ms}, interval {ms} (700ms < width <= interval)",
    "Type: timer {start / stop}",
    "Type: usb {on / off}",
    "Type: settings",
    "Type: reset",
    "Type: ?",
];

fn line(out: &mut impl Write, text: &str) -> fmt::Result {
    out.write_str(text)?;
    out.write_str(EOL)
}

fn settings(out: &mut impl Write, c: &PushConfig) -> fmt::Result {
    out.write_str(EOL)?;
    write!(out, "Init Angle    : {}[degree]{EOL}", c.init_angle)?;
    write!(out, "Push Angle    : {}[degree]{EOL}", c.push_angle)?;
    write!(out, "On Time       : {}[ms]{EOL}", c.pulse_width_ms)?;
    write!(out, "Interval Time : {}[ms]{EOL}", c.interval_ms)?;
    write!(out, "Period        : {}[ms]{EOL}", c.period_ms())?;
    out.write_str(PROMPT)
}

/// Render `report` into `out`.
pub fn render(report: &Report, out: &mut impl Write) -> fmt::Result {
    match report {
        Report::Help => {
            for text in HELP {
                line(out, text)?;
            }
            out.write_str(PROMPT)
        }
        Report::Settings(c) => settings(out, c),
        Report::Starting => line(out, "Starting"),
        Report::Stopped { total } => {
            write!(out, "Total Count: {total}{EOL}")?;
            line(out, "end")?;
            out.write_str(PROMPT)
        }
        Report::PulseCount(n) => write!(out, "\x1b[31m times : {n}\x1b[0m{EOL}"),
        Report::UsbPower(on) => {
            out.write_str(EOL)?;
            let state = if *on { "on" } else { "off" };
            write!(out, "USB connection {state}.{EOL}")?;
            out.write_str(PROMPT)
        }
        Report::Accepted(_) => {
            line(out, "OK")?;
            out.write_str(PROMPT)
        }
        Report::Rejected(_) => {
            line(out, "invalid value")?;
            out.write_str(PROMPT)
        }
        Report::Click(ev) => write!(out, "{ev}{EOL}"),
    }
}

/// Render a grammar failure for the transport that sent the line.
pub fn render_parse_error(err: &ParseError, out: &mut impl Write) -> fmt::Result {
    write!(out, "ERROR: {err}{EOL}")?;
    if let Some(s) = err.suggestion {
        write!(out, "Did you mean \"{s}\"?{EOL}")?;
    }
    out.write_str(PROMPT)
}

/// Render into a fixed buffer.  Output past capacity is dropped.
pub fn render_to_buffer(report: &Report) -> heapless::String<MAX_REPORT_LEN> {
    let mut buf = heapless::String::new();
    let _ = render(report, &mut buf);
    buf
}
