//! WebSocket Chat Session
//!
//! This module contains the logic for driving chat sessions over
//! WebSockets. It is structured into submodules for clarity:
//!
//! - `protocol`: Defines the JSON-based message format for client-server communication.
//! - `session`: Manages the connection lifecycle and dispatches each turn to the orchestrator.

pub mod protocol;
pub mod session;

pub use session::ws_handler;
