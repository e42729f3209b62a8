//! Text consoles: transport-agnostic line input and mirrored output.
//!
//! ```text
//!  UART   ──▶ ConsoleChannel ──parse──▶ Mailbox
//!  Telnet ──▶ ConsoleChannel ──parse──▶ Mailbox
//!
//!  PushService ──Report──▶ ConsoleMirror ──▶ UART + Telnet
//! ```
//!
//! Input from either console goes through the same grammar.  Parse errors
//! and the prompt go back only to the console that sent the line; reports
//! from the controller are rendered once and written to both.

pub mod codec;
pub mod transport;

use log::{debug, warn};

use crate::app::commands;
use crate::app::events::Report;
use crate::app::ports::ReportSink;
use crate::events::Mailbox;
use crate::reporter::{self, MAX_REPORT_LEN, PROMPT};

use codec::LineDecoder;
use transport::{Transport, write_all};

const READ_CHUNK: usize = 64;

/// One console: a transport plus its line decoder.
///
/// At most one line is interpreted per [`poll`](Self::poll); bytes read
/// past it wait in `backlog`, so typed-ahead commands run one per tick
/// in the order they were typed.
pub struct ConsoleChannel<T: Transport> {
    name: &'static str,
    transport: T,
    decoder: LineDecoder,
    backlog: heapless::Deque<u8, READ_CHUNK>,
    /// Transport session the buffered input belongs to.
    session: u32,
}

impl<T: Transport> ConsoleChannel<T> {
    pub fn new(name: &'static str, transport: T) -> Self {
        let session = transport.session();
        Self {
            name,
            transport,
            decoder: LineDecoder::new(),
            backlog: heapless::Deque::new(),
            session,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Interpret the next complete line, if one is available, and post
    /// the resulting command.  Returns whether a line was handled.
    pub fn poll(&mut self, mailbox: &Mailbox) -> bool {
        self.check_session();
        while let Some(byte) = self.backlog.pop_front() {
            if self.feed(byte, mailbox) {
                return true;
            }
        }

        let mut chunk = [0u8; READ_CHUNK];
        loop {
            let n = match self.transport.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n.min(READ_CHUNK),
                Err(e) => {
                    warn!("{}: read failed: {:?}", self.name, e);
                    break;
                }
            };
            self.check_session();
            for (i, &byte) in chunk[..n].iter().enumerate() {
                if self.feed(byte, mailbox) {
                    // Backlog was drained above, so the rest of one chunk fits.
                    for &rest in &chunk[i + 1..n] {
                        let _ = self.backlog.push_back(rest);
                    }
                    return true;
                }
            }
        }
        false
    }

    fn feed(&mut self, byte: u8, mailbox: &Mailbox) -> bool {
        let Some(line) = self.decoder.push(byte) else {
            return false;
        };
        let reply = interpret(self.name, line, mailbox);
        self.send(reply.as_bytes());
        true
    }

    /// Drop half-typed input left over from a previous peer.
    fn check_session(&mut self) {
        let session = self.transport.session();
        if session == self.session {
            return;
        }
        if self.decoder.pending() > 0 || !self.backlog.is_empty() {
            debug!("{}: session changed, discarding partial input", self.name);
        }
        self.session = session;
        self.decoder.reset();
        self.backlog.clear();
    }

    /// Write raw bytes if a peer is attached.
    pub fn send(&mut self, bytes: &[u8]) {
        if !self.transport.is_connected() {
            return;
        }
        let result = write_all(&mut self.transport, bytes).and_then(|()| self.transport.flush());
        if let Err(e) = result {
            warn!("{}: write failed: {:?}", self.name, e);
        }
    }
}

impl<T: Transport> ReportSink for ConsoleChannel<T> {
    fn emit(&mut self, report: &Report) {
        let text = reporter::render_to_buffer(report);
        self.send(text.as_bytes());
    }
}

/// Turn one console line into a reply for the sender, posting the parsed
/// command on success.
fn interpret(name: &str, line: &str, mailbox: &Mailbox) -> heapless::String<MAX_REPORT_LEN> {
    let mut reply = heapless::String::new();
    let line = line.trim();
    if line.is_empty() {
        let _ = reply.push_str(PROMPT);
        return reply;
    }
    match commands::parse(line) {
        Ok(cmd) => {
            debug!("{name}: {line:?} -> {:?}", cmd.action());
            cmd.post(mailbox);
            let _ = reply.push_str(PROMPT);
        }
        Err(e) => {
            warn!("{name}: {e}");
            let _ = reporter::render_parse_error(&e, &mut reply);
        }
    }
    reply
}

/// Both consoles together: polls each for input and mirrors every report
/// to both.
pub struct ConsoleMirror<L: Transport, R: Transport> {
    pub local: ConsoleChannel<L>,
    pub remote: ConsoleChannel<R>,
}

impl<L: Transport, R: Transport> ConsoleMirror<L, R> {
    pub fn new(local: L, remote: R) -> Self {
        Self {
            local: ConsoleChannel::new("serial", local),
            remote: ConsoleChannel::new("telnet", remote),
        }
    }

    /// Poll both consoles, one line each at most.  Returns the number of
    /// lines handled.
    pub fn poll(&mut self, mailbox: &Mailbox) -> usize {
        usize::from(self.local.poll(mailbox)) + usize::from(self.remote.poll(mailbox))
    }
}

impl<L: Transport, R: Transport> ReportSink for ConsoleMirror<L, R> {
    fn emit(&mut self, report: &Report) {
        let text = reporter::render_to_buffer(report);
        self.local.send(text.as_bytes());
        self.remote.send(text.as_bytes());
    }
}
