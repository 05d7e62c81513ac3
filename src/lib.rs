//! # DualKV
//!
//! A volatile key-value service with:
//! - One in-memory store behind a single lock
//! - A line-oriented text protocol (PUT / GET / DELETE)
//! - Two interchangeable transports: TCP sessions and UDP datagrams
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │       TCP Server         │   │       UDP Server         │
//! │ (one session at a time)  │   │  (one reply per packet)  │
//! └────────────┬─────────────┘   └─────────────┬────────────┘
//!              │          request line         │
//!              └───────────────┬───────────────┘
//!                              │
//! ┌────────────────────────────▼────────────────────────────────┐
//! │                Parser  →  Dispatcher                        │
//! │        (typed parse errors, faults become ERROR:)           │
//! └────────────────────────────┬────────────────────────────────┘
//!                              │
//!                       ┌──────▼──────┐
//!                       │  MemStore   │
//!                       │   (Mutex)   │
//!                       └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;
pub mod logging;

pub mod store;
pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::{Config, Transport};
pub use store::{KvEngine, MemStore};
pub use network::{Server, ShutdownHandle};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of DualKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
