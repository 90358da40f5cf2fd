//! Packet definitions
//!
//! One RCON frame, plus the request/response type values.

use std::borrow::Cow;

use super::codec::{HEADER_SIZE, TERMINATOR};

/// Types the client sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum RequestType {
    /// Empty sentinel sent after the first response fragment
    ResponseValue = 0,
    ExecCommand = 2,
    Auth = 3,
}

/// Types the server sends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ResponseType {
    ResponseValue = 0,
    AuthResponse = 2,
}

impl ResponseType {
    /// Interpret a raw type value received from the server
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(ResponseType::ResponseValue),
            2 => Some(ResponseType::AuthResponse),
            _ => None,
        }
    }
}

/// A decoded frame
///
/// The type is kept raw because the same value means different things
/// depending on direction, and servers may send values we don't know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Correlation id
    pub id: i32,

    /// Raw packet type
    pub packet_type: i32,

    /// Payload without the terminator bytes
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new(id: i32, packet_type: i32, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            packet_type,
            payload: payload.into(),
        }
    }

    /// Build a client request
    pub fn request(id: i32, kind: RequestType, payload: impl Into<Vec<u8>>) -> Self {
        Self::new(id, kind as i32, payload)
    }

    /// The empty RESPONSE_VALUE packet used to detect the end of a
    /// multi-packet response
    pub fn sentinel(id: i32) -> Self {
        Self::request(id, RequestType::ResponseValue, Vec::new())
    }

    /// Value of the size field this packet encodes to
    pub fn size(&self) -> i32 {
        (HEADER_SIZE + self.payload.len() + TERMINATOR.len()) as i32
    }

    pub fn is_type(&self, kind: ResponseType) -> bool {
        self.packet_type == kind as i32
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Payload as text (lossy UTF-8)
    pub fn payload_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}
