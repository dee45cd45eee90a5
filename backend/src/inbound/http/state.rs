//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on the domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::{AccountsService, SchedulingService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Account management service.
    pub accounts: Arc<AccountsService>,
    /// Scheduling service.
    pub scheduling: Arc<SchedulingService>,
}

impl HttpState {
    /// Construct state from the two domain services.
    pub fn new(accounts: Arc<AccountsService>, scheduling: Arc<SchedulingService>) -> Self {
        Self {
            accounts,
            scheduling,
        }
    }
}
