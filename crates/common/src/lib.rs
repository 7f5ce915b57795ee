//! Common utilities and types shared by the credential service and the
//! screen-share client.

#![warn(clippy::pedantic)]

/// Module for the HTTP wire types and participant roles
pub mod types;

/// Module for join-credential claim structures
pub mod grants;

/// Module for secret types that prevent accidental logging
pub mod secret;
