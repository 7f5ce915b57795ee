//! HTTP request handlers for the Credential Service.

pub mod health;
pub mod local_ip;
pub mod metrics;
pub mod token;

pub use health::health_check;
pub use local_ip::get_local_ip;
pub use metrics::metrics_handler;
pub use token::issue_token;
