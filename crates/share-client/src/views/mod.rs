//! Host and viewer views.
//!
//! Each view borrows the application's [`crate::context::AppContext`] and
//! exposes its render state on a `watch` channel.

pub mod host;
pub mod viewer;

pub use host::{HostState, HostStatus, HostView};
pub use viewer::{ViewerState, ViewerStatus, ViewerView};
