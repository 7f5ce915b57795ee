//! Credential Service library.
//!
//! A small HTTP API consumed by the host and viewer views:
//!
//! - `GET /api/local-ip` reports the LAN address viewers should use
//! - `POST /api/token` mints a short-lived join credential for the single
//!   shared room, with publish permission for hosts only
//!
//! The service keeps no state between requests. It assumes a private,
//! trusted LAN: there is no rate limiting and any caller may mint a host
//! credential.
//!
//! # Modules
//!
//! - `config` - Service configuration from environment
//! - `errors` - Error types with HTTP status code mapping
//! - `handlers` - HTTP request handlers
//! - `middleware` - HTTP metrics middleware
//! - `observability` - Prometheus metrics
//! - `routes` - Axum router setup
//! - `services` - Credential signing and LAN address discovery

pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod routes;
pub mod services;
