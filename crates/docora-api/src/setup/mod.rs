//! Application setup and initialization
//!
//! All application initialization logic lives here rather than in main.rs so
//! tests can assemble the same state and router against their own database.

pub mod database;
pub mod routes;
pub mod server;

use crate::services::workflow::WorkflowService;
use crate::state::{AppState, DbState, WorkflowState};
use anyhow::Result;
use docora_core::Config;
use docora_db::{
    ReferenceRepository, WorkflowActionRepository, WorkflowRepository, WorkflowTriggerRepository,
};
use sqlx::PgPool;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry();
    tracing::info!(environment = %config.environment(), "Configuration loaded");

    let pool = database::setup_database(&config).await?;
    let state = build_state(&config, pool);
    let router = routes::setup_routes(&config, state.clone()).await?;

    Ok((state, router))
}

/// Assemble repositories, services, and AppState over an existing pool.
pub fn build_state(config: &Config, pool: PgPool) -> Arc<AppState> {
    let workflow_repo = WorkflowRepository::new(pool.clone());
    let trigger_repo = WorkflowTriggerRepository::new(pool.clone());
    let action_repo = WorkflowActionRepository::new(pool.clone());
    let reference_repo = ReferenceRepository::new(pool.clone());
    let workflow_service = WorkflowService::new(
        workflow_repo.clone(),
        trigger_repo.clone(),
        action_repo.clone(),
        reference_repo.clone(),
    );

    Arc::new(AppState {
        db: DbState {
            pool,
            reference_repository: reference_repo,
        },
        workflows: WorkflowState {
            workflow_repository: workflow_repo,
            trigger_repository: trigger_repo,
            action_repository: action_repo,
            workflow_service,
        },
        config: config.clone(),
        is_production: config.is_production(),
    })
}
