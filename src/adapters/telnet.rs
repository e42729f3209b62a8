//! Telnet console transport over `std::net`.
//!
//! Single-session server on a non-blocking listener (port 23 on the device):
//!
//! - First client gets a welcome line naming its address.
//! - A new connection from the *same* address replaces the old session.
//! - A connection from any other address while a session is live is
//!   refused; the current client is told who tried.
//! - Telnet option negotiation (IAC sequences) is stripped from input.
//!
//! Works unchanged on the ESP-IDF std target and on the host.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};

use log::{info, warn};

use crate::console::transport::Transport;
use crate::error::TransportFault;

// ── IAC filter ────────────────────────────────────────────────

const IAC: u8 = 255;
const SB: u8 = 250;
const SE: u8 = 240;
const WILL: u8 = 251;
const DONT: u8 = 254;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IacState {
    Data,
    /// Saw IAC.
    Command,
    /// Saw IAC WILL/WONT/DO/DONT; next byte is the option.
    Option,
    /// Inside IAC SB … IAC SE.
    Sub,
    /// Saw IAC inside a subnegotiation.
    SubIac,
}

/// Strips telnet negotiation from a byte stream.  Keeps state across reads.
#[derive(Debug, Clone)]
pub struct IacFilter {
    state: IacState,
}

impl Default for IacFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl IacFilter {
    pub const fn new() -> Self {
        Self {
            state: IacState::Data,
        }
    }

    /// Filter `buf` in place.  Returns the number of data bytes kept.
    pub fn filter(&mut self, buf: &mut [u8]) -> usize {
        let mut kept = 0;
        for i in 0..buf.len() {
            let b = buf[i];
            self.state = match (self.state, b) {
                (IacState::Data, IAC) => IacState::Command,
                (IacState::Data, _) => {
                    buf[kept] = b;
                    kept += 1;
                    IacState::Data
                }
                // Escaped 0xFF data byte; not printable, so dropped.
                (IacState::Command, IAC) => IacState::Data,
                (IacState::Command, SB) => IacState::Sub,
                (IacState::Command, WILL..=DONT) => IacState::Option,
                (IacState::Command | IacState::Option, _) => IacState::Data,
                (IacState::Sub, IAC) => IacState::SubIac,
                (IacState::Sub, _) => IacState::Sub,
                (IacState::SubIac, SE) => IacState::Data,
                (IacState::SubIac, _) => IacState::Sub,
            };
        }
        kept
    }
}

// ── Session events ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Connected(IpAddr),
    Reconnected(IpAddr),
    /// A second client was turned away.
    Refused(IpAddr),
    Disconnected(IpAddr),
}

struct Session {
    stream: TcpStream,
    ip: IpAddr,
}

// ── Transport ─────────────────────────────────────────────────

pub struct TelnetTransport {
    listener: TcpListener,
    session: Option<Session>,
    iac: IacFilter,
    last_event: Option<SessionEvent>,
    /// Bumped on every connect, reconnect and hangup.
    generation: u32,
}

impl TelnetTransport {
    /// Listen on all interfaces at `port`.
    pub fn bind(port: u16) -> Result<Self, TransportFault> {
        Self::bind_addr(SocketAddr::from(([0, 0, 0, 0], port)))
    }

    /// Listen on `addr` (tests use `127.0.0.1:0`).
    pub fn bind_addr(addr: SocketAddr) -> Result<Self, TransportFault> {
        let listener = TcpListener::bind(addr).map_err(|e| {
            warn!("telnet: bind {addr} failed: {e}");
            TransportFault::ListenFailed
        })?;
        listener.set_nonblocking(true).map_err(|e| {
            warn!("telnet: set_nonblocking failed: {e}");
            TransportFault::ListenFailed
        })?;
        info!("telnet: listening on {addr}");
        Ok(Self {
            listener,
            session: None,
            iac: IacFilter::new(),
            last_event: None,
            generation: 0,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Address of the connected client.
    pub fn peer_ip(&self) -> Option<IpAddr> {
        self.session.as_ref().map(|s| s.ip)
    }

    /// Most recent session change (connect, reconnect, refusal, drop).
    pub fn last_event(&self) -> Option<SessionEvent> {
        self.last_event
    }

    /// Accept pending connections.  Call once per main-loop iteration.
    pub fn poll_connections(&mut self) -> Option<SessionEvent> {
        let mut event = None;
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => event = Some(self.admit(stream, peer.ip())),
                Err(e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(e) => {
                    warn!("telnet: accept failed: {e}");
                    break;
                }
            }
        }
        if event.is_some() {
            self.last_event = event;
        }
        event
    }

    fn admit(&mut self, stream: TcpStream, ip: IpAddr) -> SessionEvent {
        if let Err(e) = stream.set_nonblocking(true).and_then(|()| stream.set_nodelay(true)) {
            warn!("telnet: socket setup failed for {ip}: {e}");
        }
        match self.session.as_ref().map(|s| s.ip) {
            Some(current) if current == ip => {
                info!("telnet: {ip} reconnected");
                self.start_session(stream, ip);
                self.say(&format!("- Telnet: {ip} reconnected\r\n"));
                SessionEvent::Reconnected(ip)
            }
            Some(_) => {
                warn!("telnet: refused {ip}, session busy");
                self.say(&format!("- Telnet: {ip} tried to connect\r\n"));
                drop(stream);
                SessionEvent::Refused(ip)
            }
            None => {
                info!("telnet: {ip} connected");
                self.start_session(stream, ip);
                self.say(&format!("\r\n- Telnet: Welcome. Your IP address is {ip}\r\n"));
                SessionEvent::Connected(ip)
            }
        }
    }

    fn start_session(&mut self, stream: TcpStream, ip: IpAddr) {
        self.session = Some(Session { stream, ip });
        self.iac = IacFilter::new();
        self.generation = self.generation.wrapping_add(1);
    }

    /// Best-effort message to the current client.
    fn say(&mut self, text: &str) {
        if let Some(s) = self.session.as_mut() {
            let _ = s.stream.write_all(text.as_bytes());
        }
    }

    fn drop_session(&mut self) {
        if let Some(s) = self.session.take() {
            info!("telnet: {} disconnected", s.ip);
            self.last_event = Some(SessionEvent::Disconnected(s.ip));
            self.generation = self.generation.wrapping_add(1);
        }
    }
}

impl Transport for TelnetTransport {
    type Error = io::Error;

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            let Some(s) = self.session.as_mut() else {
                return Ok(0);
            };
            match s.stream.read(buf) {
                Ok(0) => {
                    self.drop_session();
                    return Ok(0);
                }
                Ok(n) => {
                    let kept = self.iac.filter(&mut buf[..n]);
                    if kept > 0 {
                        return Ok(kept);
                    }
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(0),
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("telnet: read error: {e}");
                    self.drop_session();
                    return Ok(0);
                }
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let Some(s) = self.session.as_mut() else {
            return Ok(data.len());
        };
        match s.stream.write(data) {
            Ok(n) => Ok(n),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(e) => {
                self.drop_session();
                Err(e)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.session.as_mut() {
            Some(s) => s.stream.flush(),
            None => Ok(()),
        }
    }

    fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    fn session(&self) -> u32 {
        self.generation
    }
}
