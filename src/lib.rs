//! # sandstorm-rcon
//!
//! A client for the Source-style RCON protocol used to administer game
//! servers:
//! - Length-prefixed, id-correlated binary framing
//! - Password authentication handshake
//! - Command execution with multi-packet response reassembly
//! - Interactive prompt and scheduled (cron) commands
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │   REPL / one-shot    │      │      Scheduler       │
//! └──────────┬───────────┘      └──────────┬───────────┘
//!            │                             │
//! ┌──────────▼─────────────────────────────▼───────────┐
//! │                  SharedSession                      │
//! │        (one exchange at a time, Mutex-guarded)      │
//! └──────────────────────────┬──────────────────────────┘
//!                            │
//! ┌──────────────────────────▼──────────────────────────┐
//! │   Session: auth handshake + command exchange        │
//! │   (IdAllocator, sentinel reassembly)                │
//! └──────────────────────────┬──────────────────────────┘
//!                            │
//!          ┌─────────────────┴────────────────┐
//!          ▼                                  ▼
//!   ┌─────────────┐                   ┌──────────────┐
//!   │    Codec    │                   │  Transport   │
//!   │  (packets)  │                   │ (deadlines)  │
//!   └─────────────┘                   └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod exchange;
pub mod schedule;
pub mod repl;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RconError, Result};
pub use config::Config;
pub use network::{Connection, Session, SharedSession};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of sandstorm-rcon
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
