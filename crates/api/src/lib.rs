//! BiosAudit Web API
//!
//! Axum-based JSON API over the reference catalog and the compliance analyzer.

mod handlers;
mod routes;

pub use routes::create_router;

use biosaudit_database::ReferenceStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: ReferenceStore,
}

impl AppState {
    pub fn new(store: ReferenceStore) -> Self {
        Self { store }
    }
}

pub type SharedState = Arc<AppState>;
