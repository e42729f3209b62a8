//! Inbound console commands.
//!
//! Both consoles (serial and telnet) share this grammar:
//!
//! ```text
//! once
//! init <int> | push <int> | width <int> | interval <int>
//! timer start|stop
//! usb on|off
//! settings | reset | ?
//! ```
//!
//! A parsed [`ConsoleCommand`] maps onto exactly one mailbox
//! [`PendingAction`]; the setters also carry the numeric argument.
//! Keywords and choices are case-sensitive; suggestions are not.

use crate::config::Field;
use crate::error::{ParseError, ParseErrorKind};
use crate::events::{Mailbox, PendingAction};

/// Every keyword the interpreter knows, in help order.
pub const KEYWORDS: &[&str] = &[
    "once", "init", "push", "width", "interval", "timer", "usb", "settings", "reset", "?",
];

const TIMER_CHOICES: &[&str] = &["start", "stop"];
const USB_CHOICES: &[&str] = &["on", "off"];

/// Largest edit distance still offered as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 2;

/// Commands the operator can type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// One pulse cycle.
    Once,
    /// Propose a new value for a configuration field.
    Set(Field, i32),
    TimerStart,
    TimerStop,
    UsbOn,
    UsbOff,
    Settings,
    Reset,
    Help,
}

impl ConsoleCommand {
    /// Mailbox action this command requests.
    pub fn action(&self) -> PendingAction {
        match self {
            Self::Once => PendingAction::TimerOnce,
            Self::Set(Field::InitAngle, _) => PendingAction::SetInitAngle,
            Self::Set(Field::PushAngle, _) => PendingAction::SetPushAngle,
            Self::Set(Field::PulseWidth, _) => PendingAction::SetWidth,
            Self::Set(Field::Interval, _) => PendingAction::SetInterval,
            // Console start/stop reuse the button gestures.
            Self::TimerStart => PendingAction::LongClickStart,
            Self::TimerStop => PendingAction::SingleClick,
            Self::UsbOn => PendingAction::UsbOn,
            Self::UsbOff => PendingAction::UsbOff,
            Self::Settings => PendingAction::PrintSettings,
            Self::Reset => PendingAction::Reset,
            Self::Help => PendingAction::PrintHelp,
        }
    }

    /// Numeric argument, for the setters.
    pub fn argument(&self) -> Option<i32> {
        match self {
            Self::Set(_, v) => Some(*v),
            _ => None,
        }
    }

    /// Hand the command to the controller.
    pub fn post(&self, mailbox: &Mailbox) {
        match self.argument() {
            Some(v) => mailbox.post_with_argument(self.action(), v),
            None => mailbox.post(self.action()),
        }
    }
}

/// Parse one console line.  The caller skips blank lines.
pub fn parse(line: &str) -> Result<ConsoleCommand, ParseError> {
    let mut tokens = line.split_whitespace();
    let Some(keyword) = tokens.next() else {
        return Err(ParseError::new(ParseErrorKind::UnknownCommand, ""));
    };
    let arg = tokens.next();
    if let Some(extra) = tokens.next() {
        return Err(ParseError::new(ParseErrorKind::UnexpectedArgument, extra));
    }

    let kw = KEYWORDS
        .iter()
        .copied()
        .find(|k| *k == keyword)
        .ok_or_else(|| {
            ParseError::new(ParseErrorKind::UnknownCommand, keyword)
                .with_suggestion(suggest(keyword, KEYWORDS))
        })?;

    match kw {
        "init" => number(kw, arg).map(|v| ConsoleCommand::Set(Field::InitAngle, v)),
        "push" => number(kw, arg).map(|v| ConsoleCommand::Set(Field::PushAngle, v)),
        "width" => number(kw, arg).map(|v| ConsoleCommand::Set(Field::PulseWidth, v)),
        "interval" => number(kw, arg).map(|v| ConsoleCommand::Set(Field::Interval, v)),
        "timer" => match choice(kw, arg, TIMER_CHOICES)? {
            "start" => Ok(ConsoleCommand::TimerStart),
            _ => Ok(ConsoleCommand::TimerStop),
        },
        "usb" => match choice(kw, arg, USB_CHOICES)? {
            "on" => Ok(ConsoleCommand::UsbOn),
            _ => Ok(ConsoleCommand::UsbOff),
        },
        _ => {
            if let Some(a) = arg {
                return Err(ParseError::new(ParseErrorKind::UnexpectedArgument, a));
            }
            Ok(match kw {
                "once" => ConsoleCommand::Once,
                "settings" => ConsoleCommand::Settings,
                "reset" => ConsoleCommand::Reset,
                _ => ConsoleCommand::Help,
            })
        }
    }
}

fn number(kw: &str, arg: Option<&str>) -> Result<i32, ParseError> {
    let a = arg.ok_or_else(|| ParseError::new(ParseErrorKind::MissingArgument, kw))?;
    a.parse::<i32>()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidArgument, a))
}

fn choice(
    kw: &str,
    arg: Option<&str>,
    choices: &'static [&'static str],
) -> Result<&'static str, ParseError> {
    let a = arg.ok_or_else(|| ParseError::new(ParseErrorKind::MissingArgument, kw))?;
    choices
        .iter()
        .copied()
        .find(|c| *c == a)
        .ok_or_else(|| {
            ParseError::new(ParseErrorKind::InvalidArgument, a)
                .with_suggestion(suggest(a, choices))
        })
}

/// Closest candidate within [`MAX_SUGGESTION_DISTANCE`] edits, if any.
pub fn suggest(token: &str, candidates: &[&'static str]) -> Option<&'static str> {
    candidates
        .iter()
        .filter_map(|c| edit_distance(token, c).map(|d| (d, *c)))
        .filter(|(d, _)| *d <= MAX_SUGGESTION_DISTANCE)
        .min_by_key(|(d, _)| *d)
        .map(|(_, c)| c)
}

const MAX_COMPARE_LEN: usize = 32;

/// Levenshtein distance over ASCII-lowercased bytes.  `None` for tokens
/// too long to be a typo of any keyword.
fn edit_distance(a: &str, b: &str) -> Option<usize> {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() > MAX_COMPARE_LEN || b.len() > MAX_COMPARE_LEN {
        return None;
    }
    let mut prev = [0usize; MAX_COMPARE_LEN + 1];
    let mut cur = [0usize; MAX_COMPARE_LEN + 1];
    for (j, p) in prev.iter_mut().enumerate().take(b.len() + 1) {
        *p = j;
    }
    for i in 1..=a.len() {
        cur[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(!a[i - 1].eq_ignore_ascii_case(&b[j - 1]));
            cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + cost);
        }
        prev = cur;
    }
    Some(prev[b.len()])
}
