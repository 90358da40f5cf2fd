//! Network Module
//!
//! Connection handling for the RCON client.
//!
//! ## Layers
//! - `Connection`: byte stream supplied by the caller (TCP by default)
//! - `Transport`: exact-length reads bounded by a per-frame deadline
//! - `Session`: id allocation, auth handshake, command exchange
//! - `SharedSession`: serializes whole exchanges across threads

mod connection;
mod transport;
mod ids;
mod session;
mod shared;

pub use connection::{connect, Connection};
pub use transport::Transport;
pub use ids::IdAllocator;
pub use session::Session;
pub use shared::SharedSession;
