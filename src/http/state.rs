//! Shared application state handed to every route handler.

use std::sync::Arc;

use crate::config::Config;
use crate::routing::RoutingClient;
use crate::solver::SolverClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub solver: Arc<SolverClient>,
    pub routing: Arc<RoutingClient>,
}

impl AppState {
    pub fn new(config: Config, http: reqwest::Client) -> Self {
        let solver = SolverClient::new(http.clone(), config.vroouty_url.clone());
        let routing = RoutingClient::new(http);
        Self {
            config: Arc::new(config),
            solver: Arc::new(solver),
            routing: Arc::new(routing),
        }
    }
}
