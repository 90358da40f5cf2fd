//! Protocol codec
//!
//! Encoding and decoding functions for RCON frames.
//!
//! ## Wire Format
//! ```text
//! ┌──────────┬──────────┬──────────┬───────────────────┬────────┐
//! │ Size (4) │  Id (4)  │ Type (4) │      Payload      │ 00 00  │
//! └──────────┴──────────┴──────────┴───────────────────┴────────┘
//! ```
//!
//! `Size` = 4 (id) + 4 (type) + payload length + 2 (terminator).

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{RconError, Result};
use crate::network::{Connection, Transport};
use super::Packet;

/// Length of the leading size field
pub const SIZE_FIELD_LEN: usize = 4;

/// Minimum body size: id (4) + type (4)
pub const HEADER_SIZE: usize = 8;

/// NUL terminator plus the pad byte
pub const TERMINATOR: [u8; 2] = [0x00, 0x00];

/// Maximum accepted body size (16 MB)
pub const MAX_PACKET_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// Encoding
// =============================================================================

/// Encode a frame to bytes
///
/// The payload is treated as opaque; the terminator is always appended and
/// the size field is computed from the final length.
pub fn encode(id: i32, packet_type: i32, payload: &[u8]) -> Vec<u8> {
    let size = HEADER_SIZE + payload.len() + TERMINATOR.len();

    let mut buf = BytesMut::with_capacity(SIZE_FIELD_LEN + size);
    buf.put_i32_le(size as i32);
    buf.put_i32_le(id);
    buf.put_i32_le(packet_type);
    buf.put_slice(payload);
    buf.put_slice(&TERMINATOR);

    buf.to_vec()
}

/// Encode a packet to bytes
pub fn encode_packet(packet: &Packet) -> Vec<u8> {
    encode(packet.id, packet.packet_type, &packet.payload)
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a complete frame (size field included) from bytes
///
/// Bytes past the declared frame end are ignored.
pub fn decode_packet(bytes: &[u8]) -> Result<Packet> {
    if bytes.len() < SIZE_FIELD_LEN {
        return Err(RconError::Truncated {
            expected: SIZE_FIELD_LEN,
            received: bytes.len(),
        });
    }

    let size = validate_size(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))?;

    let total_len = SIZE_FIELD_LEN + size;
    if bytes.len() < total_len {
        return Err(RconError::Truncated {
            expected: size,
            received: bytes.len() - SIZE_FIELD_LEN,
        });
    }

    decode_body(&bytes[SIZE_FIELD_LEN..total_len])
}

/// Check a declared size and convert it to a body length
fn validate_size(size: i32) -> Result<usize> {
    if size < HEADER_SIZE as i32 {
        return Err(RconError::MalformedFrame(format!(
            "declared size {} is smaller than the {}-byte header",
            size, HEADER_SIZE
        )));
    }

    let size = size as usize;
    if size > MAX_PACKET_SIZE {
        return Err(RconError::MalformedFrame(format!(
            "declared size {} exceeds maximum of {}",
            size, MAX_PACKET_SIZE
        )));
    }

    Ok(size)
}

/// Split a frame body into id, type, and payload
///
/// Up to two trailing NUL bytes are dropped, so servers that send a single
/// terminator decode the same as ones that send both.
fn decode_body(mut body: &[u8]) -> Result<Packet> {
    if body.len() < HEADER_SIZE {
        return Err(RconError::MalformedFrame(format!(
            "body of {} bytes is smaller than the {}-byte header",
            body.len(),
            HEADER_SIZE
        )));
    }

    let id = body.get_i32_le();
    let packet_type = body.get_i32_le();

    let mut end = body.len();
    for _ in 0..TERMINATOR.len() {
        if end > 0 && body[end - 1] == 0x00 {
            end -= 1;
        }
    }

    Ok(Packet::new(id, packet_type, &body[..end]))
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete packet from a transport
///
/// Blocks until the whole frame arrived, the stream ended, or the read
/// deadline elapsed. One deadline covers both the size field and the body.
pub fn read_packet<C: Connection>(transport: &mut Transport<C>) -> Result<Packet> {
    let deadline = transport.deadline();

    let size_bytes = transport.read_exact(SIZE_FIELD_LEN, deadline)?;
    let size = validate_size(i32::from_le_bytes([
        size_bytes[0],
        size_bytes[1],
        size_bytes[2],
        size_bytes[3],
    ]))?;

    let body = transport.read_exact(size, deadline)?;
    let packet = decode_body(&body)?;

    tracing::debug!(
        "Received packet: id={}, type={}, payload={}",
        packet.id,
        packet.packet_type,
        packet.payload_str()
    );
    Ok(packet)
}

/// Write a packet to a transport
pub fn write_packet<C: Connection>(transport: &mut Transport<C>, packet: &Packet) -> Result<()> {
    tracing::trace!(
        "Sending packet: id={}, type={}, {} payload bytes",
        packet.id,
        packet.packet_type,
        packet.payload.len()
    );
    transport.write(&encode_packet(packet))
}
