//! Protocol Module
//!
//! Defines the RCON wire protocol.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬──────────┬──────────┬───────────────────┬────────┐
//! │ Size (4) │  Id (4)  │ Type (4) │      Payload      │ 00 00  │
//! └──────────┴──────────┴──────────┴───────────────────┴────────┘
//! ```
//!
//! All integers are signed 32-bit little-endian. `Size` counts every byte
//! after the size field, including the two terminator bytes.
//!
//! ### Packet Types
//! - 3: AUTH            - Request, payload: password
//! - 2: EXEC_COMMAND    - Request, payload: command line
//! - 2: AUTH_RESPONSE   - Response to AUTH (same value, other direction)
//! - 0: RESPONSE_VALUE  - Response text; also the client's sentinel

mod packet;
mod codec;

pub use packet::{Packet, RequestType, ResponseType};
pub use codec::{
    encode, encode_packet, decode_packet, read_packet, write_packet,
    HEADER_SIZE, MAX_PACKET_SIZE, SIZE_FIELD_LEN, TERMINATOR,
};
