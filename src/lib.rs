//! Core of a calendar-based shift planner backed by the Living Apps
//! records API.
//!
//! - `api`: generic CRUD client for one records collection
//! - `reference`: record-id extraction and lookup for applookup urls
//! - `calendar`: week/month view-model (ranges, binning, navigation)
//! - `schema`: control metadata and boundary validation of field payloads
//! - `services::dashboard`: the controller composing the above

pub mod api;
pub mod calendar;
pub mod error;
pub mod reference;
pub mod schema;
pub mod services;
pub mod types;
