//! API Module
//!
//! HTTP handlers and routing for the product API.
//!
//! # Endpoints
//! - `GET /products/:id` - Read a product through the cache
//! - `PATCH /products/:id` - Update product fields
//! - `GET /stats` - Accessor statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
