//! API Module
//!
//! HTTP handlers and routing for the cache manager REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key
//! - `GET /has/:key` - Check whether a key is held
//! - `DELETE /del/:pattern` - Delete a key, or a prefix with a trailing `*`
//! - `POST /reset` - Drop every entry
//! - `GET /keys` - List registered keys
//! - `GET /stats` - Get store statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
