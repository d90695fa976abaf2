//! API constants
//!
//! Collection routes keep their trailing slash; clients address
//! `/api/workflows/` and `/api/workflows/{id}/`.

/// API base path prefix
pub const API_PREFIX: &str = "/api";
