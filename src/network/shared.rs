//! Shared session
//!
//! Serializes command exchanges from several callers (REPL, scheduler)
//! over one connection.

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::error::Result;
use super::{Connection, Session};

/// Cloneable handle to a session guarded by a mutex
///
/// The lock is held for a whole exchange: command send, every fragment
/// read and the sentinel send. Interleaving two exchanges on one connection
/// would mix their fragments, so the session is only reachable through the
/// lock.
pub struct SharedSession<C: Connection = TcpStream> {
    inner: Arc<Mutex<Session<C>>>,

    /// Peer address, cached so display does not need the lock
    peer: Arc<str>,
}

impl<C: Connection> SharedSession<C> {
    pub fn new(session: Session<C>) -> Self {
        let peer = Arc::from(session.peer());
        Self {
            inner: Arc::new(Mutex::new(session)),
            peer,
        }
    }

    /// Execute one command with the session locked for the full exchange
    pub fn execute(&self, command: &str) -> Result<String> {
        let mut session = self.inner.lock();
        session.execute(command)
    }

    /// Hold the session exclusively, e.g. to run several exchanges back to
    /// back
    pub fn lock(&self) -> MutexGuard<'_, Session<C>> {
        self.inner.lock()
    }

    /// Get the peer address string
    pub fn peer(&self) -> &str {
        &self.peer
    }
}

impl<C: Connection> Clone for SharedSession<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            peer: Arc::clone(&self.peer),
        }
    }
}
