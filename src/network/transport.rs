//! Transport
//!
//! Exact-length reads and whole-buffer writes over a `Connection`.

use std::io::{self, ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use crate::error::{RconError, Result};
use super::Connection;

/// Owns the connection and enforces the read deadline
pub struct Transport<C: Connection> {
    conn: C,

    /// Budget for one logical read; zero disables the deadline
    read_timeout: Duration,

    /// Peer address for logging
    peer: String,
}

impl<C: Connection> Transport<C> {
    pub fn new(conn: C, read_timeout: Duration) -> Self {
        let peer = conn.peer_label();
        Self {
            conn,
            read_timeout,
            peer,
        }
    }

    /// Write all bytes and flush
    pub fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.conn.write_all(bytes)?;
        self.conn.flush()?;
        Ok(())
    }

    /// Deadline for a read starting now, `None` when disabled
    ///
    /// Callers that need several `read_exact` calls for one logical read
    /// share a single deadline across them.
    pub fn deadline(&self) -> Option<Instant> {
        if self.read_timeout.is_zero() {
            None
        } else {
            Some(Instant::now() + self.read_timeout)
        }
    }

    /// Read exactly `n` bytes
    ///
    /// Every underlying read needed to fill the buffer is bounded by
    /// `deadline`. Fails with `Transport` (`TimedOut`) when it elapses and
    /// with `Truncated` when the stream ends first. Never retries.
    pub fn read_exact(&mut self, n: usize, deadline: Option<Instant>) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; n];
        let mut filled = 0;

        while filled < n {
            match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(self.timed_out());
                    }
                    self.conn.set_read_timeout(Some(remaining))?;
                }
                None => self.conn.set_read_timeout(None)?,
            }

            match self.conn.read(&mut buf[filled..]) {
                Ok(0) => {
                    return Err(RconError::Truncated {
                        expected: n,
                        received: filled,
                    })
                }
                Ok(read) => filled += read,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                // Unix reports an elapsed socket timeout as WouldBlock, Windows as TimedOut
                Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    return Err(self.timed_out());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(buf)
    }

    fn timed_out(&self) -> RconError {
        RconError::Transport(io::Error::new(
            ErrorKind::TimedOut,
            format!("read from {} timed out after {:?}", self.peer, self.read_timeout),
        ))
    }

    /// Get the peer address string
    pub fn peer(&self) -> &str {
        &self.peer
    }

    /// Close the underlying connection
    pub fn close(&self) -> Result<()> {
        self.conn.close()?;
        Ok(())
    }
}
