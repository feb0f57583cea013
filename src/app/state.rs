use std::sync::Arc;
use std::time::Duration;

use crate::adapters::http::SiblingCaller;
use crate::core::availability::AvailabilityChecker;
use crate::core::dashboard::DashboardAggregator;
use crate::core::detail::DetailAssembler;
use crate::domain::ports::Discovery;

/// Shared state cloned into every handler. Everything is Arc-backed,
/// so a clone per request is cheap.
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<DashboardAggregator>,
    pub availability: Arc<AvailabilityChecker>,
    pub detail: Arc<DetailAssembler>,
}

impl AppState {
    pub fn new(discovery: Arc<dyn Discovery>, call_timeout: Duration) -> Self {
        let caller = Arc::new(SiblingCaller::new(discovery, call_timeout));
        AppState {
            dashboard: Arc::new(DashboardAggregator::new(caller.clone())),
            availability: Arc::new(AvailabilityChecker::new(caller.clone())),
            detail: Arc::new(DetailAssembler::new(caller)),
        }
    }
}
