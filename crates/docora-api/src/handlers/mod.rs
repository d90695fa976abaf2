//! API request handlers

pub mod workflow_actions;
pub mod workflow_triggers;
pub mod workflows;
