//! Telnet console over a real loopback socket.

use std::io::{ErrorKind, Read, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use autopush::adapters::telnet::{SessionEvent, TelnetTransport};
use autopush::app::service::PushService;
use autopush::config::PushConfig;
use autopush::console::{ConsoleChannel, ConsoleMirror};
use autopush::console::transport::Transport;
use autopush::events::{Mailbox, PendingAction};

use crate::mock_hw::{CallLog, HwCall, MockTimer, MockTransport, leak_mailbox, mock_adapter};

const LOCALHOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
const DEADLINE: Duration = Duration::from_secs(2);

fn listen() -> (TelnetTransport, SocketAddr) {
    let t = TelnetTransport::bind_addr(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
    let addr = t.local_addr().unwrap();
    (t, addr)
}

fn connect(addr: SocketAddr) -> TcpStream {
    let s = TcpStream::connect(addr).unwrap();
    s.set_read_timeout(Some(Duration::from_millis(50))).unwrap();
    s
}

/// Poll until a session event shows up.
fn accept(t: &mut TelnetTransport) -> SessionEvent {
    let start = Instant::now();
    loop {
        if let Some(ev) = t.poll_connections() {
            return ev;
        }
        assert!(start.elapsed() < DEADLINE, "no connection accepted");
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Read from the client until `needle` has been seen.
fn read_until(client: &mut TcpStream, needle: &str) -> String {
    let start = Instant::now();
    let mut seen = Vec::new();
    let mut buf = [0u8; 256];
    while start.elapsed() < DEADLINE {
        match client.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => seen.extend_from_slice(&buf[..n]),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) => panic!("client read failed: {e}"),
        }
        if String::from_utf8_lossy(&seen).contains(needle) {
            break;
        }
    }
    let text = String::from_utf8_lossy(&seen).into_owned();
    assert!(text.contains(needle), "never saw {needle:?} in {text:?}");
    text
}

#[test]
fn first_client_is_welcomed() {
    let (mut t, addr) = listen();
    assert!(!t.is_connected());

    let mut client = connect(addr);
    assert_eq!(accept(&mut t), SessionEvent::Connected(LOCALHOST));
    assert!(t.is_connected());
    assert_eq!(t.peer_ip(), Some(LOCALHOST));

    read_until(&mut client, "- Telnet: Welcome. Your IP address is 127.0.0.1\r\n");
}

#[test]
fn same_address_replaces_the_session() {
    let (mut t, addr) = listen();
    let _old = connect(addr);
    accept(&mut t);

    let mut new = connect(addr);
    assert_eq!(accept(&mut t), SessionEvent::Reconnected(LOCALHOST));
    assert_eq!(t.last_event(), Some(SessionEvent::Reconnected(LOCALHOST)));
    read_until(&mut new, "- Telnet: 127.0.0.1 reconnected\r\n");
}

#[test]
fn client_hangup_is_detected_on_read() {
    let (mut t, addr) = listen();
    let client = connect(addr);
    accept(&mut t);
    drop(client);

    let start = Instant::now();
    let mut buf = [0u8; 16];
    while t.is_connected() {
        assert_eq!(t.read(&mut buf).unwrap(), 0);
        assert!(start.elapsed() < DEADLINE, "hangup never noticed");
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(t.last_event(), Some(SessionEvent::Disconnected(LOCALHOST)));
    // Writes with nobody attached are swallowed.
    assert_eq!(t.write(b"x").unwrap(), 1);
}

#[test]
fn command_over_telnet_drives_the_controller() {
    let (mut t, addr) = listen();
    let mut client = connect(addr);
    accept(&mut t);
    read_until(&mut client, "Welcome");

    let mailbox = leak_mailbox();
    let log: CallLog = Default::default();
    let mut hw = mock_adapter(&log, &Default::default());
    log.borrow_mut().clear();
    let mut timer = MockTimer::default();
    let mut service = PushService::new(mailbox, PushConfig::default());
    let mut consoles = ConsoleMirror::new(MockTransport::new(), t);

    // Option negotiation from the client must not reach the parser.
    client.write_all(b"\xff\xfb\x01usb on\r\n").unwrap();

    let start = Instant::now();
    let mut ran = PendingAction::NoAction;
    while ran == PendingAction::NoAction {
        assert!(start.elapsed() < DEADLINE, "command never arrived");
        consoles.poll(mailbox);
        ran = service.tick(&mut hw, &mut timer, &mut consoles);
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(ran, PendingAction::UsbOn);
    assert_eq!(*log.borrow(), vec![HwCall::Usb(true)]);

    read_until(&mut client, "USB connection on.\r\n$ ");
    let serial = consoles.local.transport_mut().take_output();
    assert_eq!(serial, "\r\nUSB connection on.\r\n$ ");
}

/// Poll the channel until it hands over a line.
fn poll_line(ch: &mut ConsoleChannel<TelnetTransport>, mailbox: &Mailbox) {
    let start = Instant::now();
    while !ch.poll(mailbox) {
        assert!(start.elapsed() < DEADLINE, "line never arrived");
        std::thread::sleep(Duration::from_millis(5));
    }
}

/// Let whatever the client sent reach the decoder.
fn drain_input(ch: &mut ConsoleChannel<TelnetTransport>, mailbox: &Mailbox) {
    for _ in 0..20 {
        assert!(!ch.poll(mailbox));
        std::thread::sleep(Duration::from_millis(5));
    }
}

#[test]
fn half_line_from_a_dropped_client_is_not_inherited() {
    let (mut t, addr) = listen();
    let mut first = connect(addr);
    accept(&mut t);
    read_until(&mut first, "Welcome");

    let mailbox = leak_mailbox();
    let mut ch = ConsoleChannel::new("telnet", t);
    first.write_all(b"res").unwrap();
    drain_input(&mut ch, mailbox);
    drop(first);

    let start = Instant::now();
    while ch.transport().is_connected() {
        assert!(!ch.poll(mailbox));
        assert!(start.elapsed() < DEADLINE, "hangup never noticed");
        std::thread::sleep(Duration::from_millis(5));
    }

    let mut second = connect(addr);
    assert_eq!(accept(ch.transport_mut()), SessionEvent::Connected(LOCALHOST));
    read_until(&mut second, "Welcome");
    second.write_all(b"et\r\n").unwrap();
    poll_line(&mut ch, mailbox);

    assert_eq!(mailbox.peek(), PendingAction::NoAction);
    read_until(&mut second, "ERROR: Command \"et\" not found");
}

#[test]
fn reconnect_discards_the_old_session_half_line() {
    let (mut t, addr) = listen();
    let mut old = connect(addr);
    accept(&mut t);
    read_until(&mut old, "Welcome");

    let mailbox = leak_mailbox();
    let mut ch = ConsoleChannel::new("telnet", t);
    old.write_all(b"usb o").unwrap();
    drain_input(&mut ch, mailbox);

    let mut new = connect(addr);
    assert_eq!(accept(ch.transport_mut()), SessionEvent::Reconnected(LOCALHOST));
    new.write_all(b"once\r\n").unwrap();
    poll_line(&mut ch, mailbox);

    assert_eq!(mailbox.drain(), PendingAction::TimerOnce);
}

#[test]
fn port_in_use_is_a_listen_fault() {
    let (_t, addr) = listen();
    let err = TelnetTransport::bind_addr(addr).err();
    assert_eq!(err, Some(autopush::error::TransportFault::ListenFailed));
}
