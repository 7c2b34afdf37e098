//! Request and Response models for the product API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::UpdateRequest;
pub use responses::{ErrorResponse, HealthResponse, StatsResponse, UpdateResponse};
