//! Application state for the HTTP server.

use std::sync::Arc;

use crate::config::AppSettings;
use crate::db::repository::FullRepository;
use crate::scheduler::JobScheduler;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Repository instance for database operations
    pub repository: Arc<dyn FullRepository>,
    /// Queue for deferred email jobs
    pub scheduler: Arc<dyn JobScheduler>,
    pub settings: Arc<AppSettings>,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn FullRepository>,
        scheduler: Arc<dyn JobScheduler>,
        settings: AppSettings,
    ) -> Self {
        Self {
            repository,
            scheduler,
            settings: Arc::new(settings),
        }
    }

}
