//! Camera control for lidarview
//!
//! This crate drives the camera over a loaded point cloud:
//! - First-person and orbit navigation with deterministic framing
//! - Named camera tours played back frame by frame
//! - Camera presets and altitude-based point sizing
//! - Viewpoint sharing and bookmarks
//! - The application context tying these to an external renderer

pub mod camera;
pub mod context;
pub mod easing;
pub mod navigation;
pub mod paths;
pub mod playback;
pub mod point_size;
pub mod presets;
pub mod viewpoint;

pub use camera::*;
pub use context::*;
pub use easing::Easing;
pub use navigation::*;
pub use paths::*;
pub use playback::*;
pub use point_size::*;
pub use presets::*;
pub use viewpoint::*;
