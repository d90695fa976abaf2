//! API services

pub mod workflow;
