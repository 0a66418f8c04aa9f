//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::config::ApiConfig;
use crate::explain::ExplainService;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Stateless explain service shared by all requests
    pub service: Arc<ExplainService>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create state with the default PromQL-backed service
    pub fn new(config: ApiConfig) -> Self {
        Self::with_service(ExplainService::new(), config)
    }

    /// Create state around an existing service
    pub fn with_service(service: ExplainService, config: ApiConfig) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
