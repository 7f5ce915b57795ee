//! # Share Client Test Utilities
//!
//! In-memory stand-ins for the collaborators `share-client` reaches through
//! traits:
//! - `RoomHub` / `HubTransport` - a media room that verifies join
//!   credentials and forwards roster and track events between participants
//! - `ScriptedCapture` - screen capture returning configured tracks or errors
//! - `RecordingSurface` - video surface recording attach/play/clear calls
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cs_test_utils::TestCredentialServer;
//! use share_test_utils::*;
//!
//! let server = TestCredentialServer::spawn().await?;
//! let hub = RoomHub::new();
//! let ctx = AppContext::new(client_config(&server.url()), hub.transport())?;
//! let host = HostView::new(ctx, Arc::new(ScriptedCapture::returning(vec![screen_track("s1")])));
//! host.start_sharing().await?;
//! ```

pub mod fixtures;
pub mod mock_capture;
pub mod mock_room;
pub mod mock_surface;

// Re-export commonly used items
pub use fixtures::*;
pub use mock_capture::*;
pub use mock_room::*;
pub use mock_surface::*;
