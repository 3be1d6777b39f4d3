// Application state for HTTP handlers
use crate::application::decision_service::DecisionService;

#[derive(Clone)]
pub struct AppState {
    pub decision_service: DecisionService,
}
