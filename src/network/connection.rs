//! Connection provider
//!
//! The byte stream a session runs over.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{RconError, Result};

/// A bidirectional byte stream that supports read deadlines
///
/// Closing the stream is the only way to cancel a blocked read.
pub trait Connection: Read + Write {
    /// Bound the next underlying read; `None` blocks indefinitely
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Address label for display
    fn peer_label(&self) -> String;

    /// Close both directions of the stream
    fn close(&self) -> io::Result<()>;
}

impl Connection for TcpStream {
    fn set_read_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn peer_label(&self) -> String {
        self.peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    fn close(&self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// Dial the configured server
///
/// Tries every resolved address in turn, each bounded by the connect
/// timeout, and returns the first stream that connects.
pub fn connect(config: &Config) -> Result<TcpStream> {
    let addr = config.server_addr.as_str();
    let connect_err = |source: io::Error| RconError::Connect {
        addr: addr.to_string(),
        source,
    };

    let addrs = addr.to_socket_addrs().map_err(connect_err)?;

    let mut last_err = None;
    for socket_addr in addrs {
        tracing::debug!("Connecting to {}", socket_addr);
        match TcpStream::connect_timeout(&socket_addr, config.connect_timeout()) {
            Ok(stream) => {
                // Disable Nagle's algorithm, commands are small
                stream.set_nodelay(true)?;
                stream.set_write_timeout(config.write_timeout())?;
                return Ok(stream);
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(connect_err(last_err.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
    })))
}
