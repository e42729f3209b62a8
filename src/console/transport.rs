//! Transport abstraction: any byte-oriented console channel.
//!
//! Concrete implementations:
//! - UART serial ([`UartTransport`](crate::adapters::uart::UartTransport), device only)
//! - Telnet over Wi-Fi ([`TelnetTransport`](crate::adapters::telnet::TelnetTransport))
//!
//! The console front end is generic over `Transport`, so both consoles
//! share one grammar and one output format.

use log::warn;

/// Byte-oriented transport channel.
pub trait Transport {
    /// Error type for this transport.
    type Error: core::fmt::Debug;

    /// Read up to `buf.len()` bytes into `buf`.
    /// Returns 0 if no data is available (non-blocking).
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Write `data` to the transport.
    /// Returns the number of bytes actually written.
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Flush any buffered output.
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Whether a peer is attached.  Writes to a disconnected transport
    /// are dropped.
    fn is_connected(&self) -> bool;

    /// Changes whenever the peer changes (connect, reconnect, hangup).
    /// Input buffered under an older value belongs to someone else.
    fn session(&self) -> u32 {
        0
    }
}

/// Write all of `data`, retrying short writes.  Gives up on the first
/// zero-length write (logged) or error.
pub fn write_all<T: Transport>(t: &mut T, mut data: &[u8]) -> Result<(), T::Error> {
    while !data.is_empty() {
        let n = t.write(data)?;
        if n == 0 {
            warn!("console: transport stalled, {} bytes dropped", data.len());
            break;
        }
        data = &data[n.min(data.len())..];
    }
    Ok(())
}
