use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::gateway::Gateway;
use crate::session::Session;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable gateway. Default: `ApiGatewayClient`; tests use a fake.
    pub gateway: Arc<dyn Gateway>,
    /// The recruiter session this process serves.
    pub session: Arc<Mutex<Session>>,
    pub config: Config,
}
