//! Crate-level error type for dashboard operations.
//!
//! Two failure classes reach callers: transport failures from the records
//! API and local validation gaps that block a submission before any request
//! is made. Dangling references are not errors; they resolve to `None` at
//! the lookup site and degrade display only.

use thiserror::Error;

use crate::api::ApiError;
use crate::schema::FieldError;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("API: {0}")]
    Api(#[from] ApiError),
    /// A required local input is missing or inconsistent; never reaches the
    /// network.
    #[error("Validation: {0}")]
    Validation(String),
    /// A field payload failed boundary validation against the collection
    /// metadata.
    #[error("Field validation: {0}")]
    Field(#[from] FieldError),
}
