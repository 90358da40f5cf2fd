//! Session
//!
//! One connection to an RCON server: transport plus id allocation.

use std::net::TcpStream;
use std::time::Duration;

use crate::config::Config;
use crate::error::{RconError, Result};
use crate::exchange;
use crate::protocol::{read_packet, write_packet, Packet, RequestType, ResponseType};
use super::{connect, Connection, IdAllocator, SharedSession, Transport};

/// A single RCON connection
///
/// Owned by the caller; authenticate once, then execute commands one at a
/// time. Use [`SharedSession`] when more than one thread needs it.
pub struct Session<C: Connection = TcpStream> {
    transport: Transport<C>,
    ids: IdAllocator,
}

impl Session<TcpStream> {
    /// Connect to `config.server_addr`
    pub fn connect(config: &Config) -> Result<Self> {
        let stream = connect(config)?;
        Ok(Self::new(stream, config.read_timeout()))
    }
}

impl<C: Connection> Session<C> {
    /// Wrap an already-open connection
    pub fn new(conn: C, read_timeout: Duration) -> Self {
        Self {
            transport: Transport::new(conn, read_timeout),
            ids: IdAllocator::new(),
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Run the auth handshake, reporting only success or failure
    ///
    /// A rejected password and an unintelligible reply are both `false`.
    /// The connection stays open either way.
    pub fn authenticate(&mut self, password: &str) -> bool {
        match self.try_authenticate(password) {
            Ok(()) => {
                tracing::info!("Authentication successful.");
                true
            }
            Err(RconError::AuthenticationFailed) => {
                tracing::error!("Authentication failed.");
                false
            }
            Err(e) => {
                tracing::error!("Authentication failed: {}", e);
                false
            }
        }
    }

    /// Run the auth handshake, returning the underlying error on failure
    ///
    /// Success requires exactly one reply carrying our id and the
    /// AUTH_RESPONSE type.
    pub fn try_authenticate(&mut self, password: &str) -> Result<()> {
        let auth_id = self.next_id();

        tracing::debug!("Sending authentication packet (id {})", auth_id);
        self.send(&Packet::request(auth_id, RequestType::Auth, password))?;

        let response = self.receive()?;
        if response.id == auth_id && response.is_type(ResponseType::AuthResponse) {
            Ok(())
        } else {
            tracing::debug!(
                "Auth reply id={} type={} does not match request id {}",
                response.id,
                response.packet_type,
                auth_id
            );
            Err(RconError::AuthenticationFailed)
        }
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Execute one command and return the reassembled response
    ///
    /// See [`exchange::execute`].
    pub fn execute(&mut self, command: &str) -> Result<String> {
        exchange::execute(self, command)
    }

    /// Allocate the next request id
    pub fn next_id(&mut self) -> i32 {
        self.ids.next_id()
    }

    /// Send one packet
    pub fn send(&mut self, packet: &Packet) -> Result<()> {
        write_packet(&mut self.transport, packet)
    }

    /// Receive one packet, bounded by the read deadline
    pub fn receive(&mut self) -> Result<Packet> {
        read_packet(&mut self.transport)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the peer address string
    pub fn peer(&self) -> &str {
        self.transport.peer()
    }

    /// Share this session between threads
    pub fn into_shared(self) -> SharedSession<C> {
        SharedSession::new(self)
    }

    /// Close the connection
    pub fn close(self) -> Result<()> {
        self.transport.close()
    }
}
