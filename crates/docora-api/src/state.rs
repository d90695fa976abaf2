//! Application state and sub-state extractors.
//!
//! AppState is split into domain sub-states so handlers can extract only what
//! they need via Axum's `FromRef`.

use docora_core::Config;
use docora_db::{
    ReferenceRepository, WorkflowActionRepository, WorkflowRepository, WorkflowTriggerRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

use crate::services::workflow::WorkflowService;

// ----- Sub-state types -----

/// Database pool and repositories not tied to a specific service.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub reference_repository: ReferenceRepository,
}

/// Workflow repositories and the validator service.
#[derive(Clone)]
pub struct WorkflowState {
    pub workflow_repository: WorkflowRepository,
    pub trigger_repository: WorkflowTriggerRepository,
    pub action_repository: WorkflowActionRepository,
    pub workflow_service: WorkflowService,
}

// ----- AppState -----

/// Main application state: aggregates sub-states for dependency injection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbState,
    pub workflows: WorkflowState,
    pub config: Config,
    pub is_production: bool,
}

// ----- FromRef for sub-state extraction -----

impl axum::extract::FromRef<Arc<AppState>> for DbState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.db.clone()
    }
}

impl axum::extract::FromRef<Arc<AppState>> for WorkflowState {
    fn from_ref(state: &Arc<AppState>) -> Self {
        state.workflows.clone()
    }
}

fn _assert_app_state_send_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<AppState>();
    assert_sync::<AppState>();
}
