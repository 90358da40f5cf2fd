//! Exchange Module
//!
//! Sends one command and reassembles its response.
//!
//! ## Multi-packet responses
//!
//! Servers split long output over several RESPONSE_VALUE packets without
//! marking the last one. After the first fragment arrives the client sends
//! an empty RESPONSE_VALUE (the sentinel) with the same id. The server
//! answers it with an empty packet once every earlier fragment has gone
//! out, so the first empty packet seen after the sentinel ends the
//! response.
//!
//! ```text
//! AwaitingFirstFragment ──(fragment, send sentinel)──▶ AwaitingTermination
//! AwaitingTermination   ──(non-empty fragment)───────▶ AwaitingTermination
//! AwaitingTermination   ──(empty fragment)───────────▶ Done
//! ```

use crate::error::{RconError, Result};
use crate::network::{Connection, Session};
use crate::protocol::{Packet, RequestType, ResponseType};

/// Where an exchange is in the sentinel handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    /// Command sent, nothing correlated received yet
    AwaitingFirstFragment,

    /// Sentinel sent, waiting for its empty echo
    AwaitingTermination,

    Done,
}

/// What the caller must do after feeding a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep reading
    Continue,

    /// Send the sentinel, then call [`PendingExchange::sentinel_sent`]
    SendSentinel,

    /// Response complete
    Finished,
}

/// State of one outstanding command
///
/// Created per call and dropped when it returns.
#[derive(Debug)]
pub struct PendingExchange {
    id: i32,
    buffer: Vec<u8>,
    state: ExchangeState,
}

impl PendingExchange {
    pub fn new(id: i32) -> Self {
        Self {
            id,
            buffer: Vec::new(),
            state: ExchangeState::AwaitingFirstFragment,
        }
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    /// Feed one received packet
    ///
    /// Packets for other ids are logged and skipped. A correlated packet of
    /// any type other than RESPONSE_VALUE fails with `UnexpectedPacketType`.
    pub fn accept(&mut self, packet: Packet) -> Result<Step> {
        if packet.id != self.id {
            tracing::warn!("Received packet with unexpected ID: {}", packet.id);
            return Ok(Step::Continue);
        }

        if !packet.is_type(ResponseType::ResponseValue) {
            return Err(RconError::UnexpectedPacketType {
                id: packet.id,
                packet_type: packet.packet_type,
            });
        }

        match self.state {
            ExchangeState::AwaitingFirstFragment => {
                self.buffer.extend_from_slice(&packet.payload);
                Ok(Step::SendSentinel)
            }
            ExchangeState::AwaitingTermination if packet.is_empty() => {
                self.state = ExchangeState::Done;
                Ok(Step::Finished)
            }
            ExchangeState::AwaitingTermination => {
                self.buffer.extend_from_slice(&packet.payload);
                Ok(Step::Continue)
            }
            ExchangeState::Done => Ok(Step::Finished),
        }
    }

    /// Record that the sentinel went out
    pub fn sentinel_sent(&mut self) {
        if self.state == ExchangeState::AwaitingFirstFragment {
            self.state = ExchangeState::AwaitingTermination;
        }
    }

    /// Text accumulated so far
    ///
    /// Decoded only here so a character split across fragments survives.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.buffer).into_owned()
    }

    pub fn into_text(self) -> String {
        match String::from_utf8(self.buffer) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

/// Execute one command on a session
///
/// Fails with a plain error if the command cannot be sent. Once it has been
/// sent, any failure (read timeout, truncation, sentinel write failure,
/// unexpected packet type) is returned as `RconError::Interrupted` holding
/// the text received until then. There is no overall deadline, only the
/// per-frame read deadline.
pub fn execute<C: Connection>(session: &mut Session<C>, command: &str) -> Result<String> {
    let id = session.next_id();

    tracing::debug!("Sending command: {}", command);
    session.send(&Packet::request(id, RequestType::ExecCommand, command))?;

    let mut pending = PendingExchange::new(id);
    match collect_response(session, &mut pending) {
        Ok(()) => Ok(pending.into_text()),
        Err(e) => Err(RconError::Interrupted {
            partial: pending.into_text(),
            source: Box::new(e),
        }),
    }
}

/// Read packets until the exchange is done
fn collect_response<C: Connection>(
    session: &mut Session<C>,
    pending: &mut PendingExchange,
) -> Result<()> {
    while pending.state() != ExchangeState::Done {
        let packet = session.receive()?;

        if pending.accept(packet)? == Step::SendSentinel {
            tracing::debug!("Sending empty packet to confirm response fully received");
            session.send(&Packet::sentinel(pending.id()))?;
            pending.sentinel_sent();
        }
    }

    Ok(())
}
