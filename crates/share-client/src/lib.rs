//! Share Client Library
//!
//! Client side of LAN screen sharing: one host publishes its screen to a
//! media room and any number of viewers on the same network render it.
//!
//! # Architecture
//!
//! - [`context::AppContext`] - one per application instance; owns the
//!   [`session::RoomSession`] and the [`credentials::CredentialClient`]
//! - [`views::HostView`] - capture and publish the screen
//! - [`views::ViewerView`] - subscribe to and render the screen share
//!
//! The media transport, platform screen capture and video output are
//! reached through the [`transport::Transport`], [`capture::ScreenCapture`]
//! and [`surface::VideoSurface`] traits.

pub mod capture;
pub mod config;
pub mod context;
pub mod credentials;
pub mod errors;
pub mod identity;
pub mod session;
pub mod surface;
pub mod transport;
pub mod views;
