//! WebSocket server for the Mural shared canvas.
//!
//! The server accepts connections on the `tile` endpoint, runs one
//! session per upgraded socket, and fans canvas changes out to every
//! connected client through the store's broadcast channel.

pub mod server;
pub mod session;
pub mod state;

pub use server::serve;
pub use state::GatewayState;
