use std::sync::Arc;

use quickai_identity::IdentityStore;

use crate::config::ServerConfig;
use crate::engine::audit::AuditSink;
use crate::engine::dispatcher::Dispatcher;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (every field is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (auth fallback and side-effect scheduling read it).
    pub config: Arc<ServerConfig>,
    /// External store holding caller identity, plan and usage counter.
    pub identity: Arc<dyn IdentityStore>,
    /// Executes one generation command.
    pub dispatcher: Arc<Dispatcher>,
    /// Where finished generations are recorded.
    pub audit: Arc<dyn AuditSink>,
}
