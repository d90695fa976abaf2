//! Docora database layer
//!
//! Repositories over Postgres for the workflow subsystem and the reference
//! entities workflow fields point at.

pub mod db;

pub use db::reference::ReferenceRepository;
pub use db::workflow::{WorkflowActionRepository, WorkflowRepository, WorkflowTriggerRepository};
