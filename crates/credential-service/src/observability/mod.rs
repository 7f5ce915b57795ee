//! Observability module for the Credential Service.
//!
//! Provides metrics definitions recorded by the HTTP middleware and the
//! token handler.

pub mod metrics;
