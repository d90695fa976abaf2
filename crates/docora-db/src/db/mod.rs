//! Database repositories for the data access layer
//!
//! Each repository owns a pool handle and provides CRUD operations and
//! specialized queries for one aggregate.

pub mod reference;
pub mod workflow;
