//! Error types for the AutoPush firmware.
//!
//! Three failure classes exist, and each one is recovered at a different
//! layer:
//!
//! | Class            | Raised by          | Recovery                          |
//! |------------------|--------------------|-----------------------------------|
//! | `ParseError`     | console grammar    | reply to the requesting transport |
//! | `ValidationError`| validator          | report "invalid value", no commit |
//! | `TransportFault` | Wi-Fi / telnet     | full device restart (fail-fast)   |
//!
//! Each is consumed in the layer that raises it; nothing funnels them together.
//! All are `Clone` and allocation-free.

use core::fmt;

use crate::config::Field;

/// Longest offending token kept in a [`ParseError`].
pub const MAX_ERROR_TEXT: usize = 32;

// ---------------------------------------------------------------------------
// Parse errors
// ---------------------------------------------------------------------------

/// What was wrong with a console line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// First token is not a known keyword.
    UnknownCommand,
    /// Keyword needs an argument and none was given.
    MissingArgument,
    /// Argument is not acceptable for this keyword.
    InvalidArgument,
    /// More tokens than the keyword accepts.
    UnexpectedArgument,
}

/// Console grammar failure, carrying the offending text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Offending token (truncated to [`MAX_ERROR_TEXT`] bytes).
    pub text: heapless::String<MAX_ERROR_TEXT>,
    /// Best-guess replacement for `text`, if one is close enough.
    pub suggestion: Option<&'static str>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, text: &str) -> Self {
        let mut end = text.len().min(MAX_ERROR_TEXT);
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        let mut owned = heapless::String::new();
        let _ = owned.push_str(&text[..end]);
        Self {
            kind,
            text: owned,
            suggestion: None,
        }
    }

    #[must_use]
    pub fn with_suggestion(mut self, suggestion: Option<&'static str>) -> Self {
        self.suggestion = suggestion;
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParseErrorKind::UnknownCommand => write!(f, "Command \"{}\" not found", self.text),
            ParseErrorKind::MissingArgument => {
                write!(f, "Missing argument for \"{}\"", self.text)
            }
            ParseErrorKind::InvalidArgument => write!(f, "Invalid argument \"{}\"", self.text),
            ParseErrorKind::UnexpectedArgument => {
                write!(f, "Unexpected argument \"{}\"", self.text)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// A proposed value for `field` was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationError {
    pub field: Field,
    pub value: i32,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rejects {}", self.field, self.value)
    }
}

// ---------------------------------------------------------------------------
// Transport faults
// ---------------------------------------------------------------------------

/// Network-side failures.  None of these are recovered in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportFault {
    /// Station lost its association or IP.
    LinkDown,
    /// The telnet listener could not be bound.
    ListenFailed,
    /// An operator asked for a restart.
    RestartRequested,
}

impl fmt::Display for TransportFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LinkDown => write!(f, "WiFi link down"),
            Self::ListenFailed => write!(f, "telnet listener failed"),
            Self::RestartRequested => write!(f, "restart requested"),
        }
    }
}
