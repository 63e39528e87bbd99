//! Studychat API Library Crate
//!
//! This library contains all the logic for the Studychat web service: the
//! shared service state, configuration, REST handlers for the lesson
//! catalog, the WebSocket chat session, and routing. The `api` binary is a
//! thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod ws;
