//! Shared Service State
//!
//! This module defines the `ServiceState` struct, which holds all shared,
//! clonable resources: the lesson catalog, the turn orchestrator, and the
//! loaded configuration. Per-session conversation state lives with each
//! WebSocket connection, not here.

use crate::config::Config;
use std::sync::Arc;
use studychat_core::{catalog::LessonCatalog, engine::Orchestrator};

/// The shared service state, created once at startup and passed to all
/// handlers. All fields are public to be accessible from other modules.
#[derive(Clone)]
pub struct ServiceState {
    pub catalog: Arc<LessonCatalog>,
    pub orchestrator: Arc<Orchestrator>,
    pub config: Arc<Config>,
}
