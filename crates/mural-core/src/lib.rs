//! Shared types for the Mural collaborative canvas service.
//!
//! Everything the other crates agree on lives here: the wire protocol
//! (inbound pixel commands, outbound frames), configuration, and the
//! crate-wide error type.

pub mod config;
pub mod error;
pub mod protocol;

pub use config::Config;
pub use error::{MuralError, Result};
