use axum::extract::FromRef;

use super::router::SessionRouter;
use super::ServerConfig;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub router: SessionRouter,
}

impl FromRef<ServerState> for SessionRouter {
    fn from_ref(input: &ServerState) -> Self {
        input.router.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
