//! Core data structures for lidarview
//!
//! This crate provides the fundamental types shared by the ingestion pipeline
//! and the camera engine: points, bounding boxes, coordinate normalization,
//! color modes and the merged point cloud dataset.

pub mod point;
pub mod normalize;
pub mod bounds;
pub mod color;
pub mod dataset;
pub mod config;
pub mod error;

pub use point::*;
pub use normalize::*;
pub use bounds::*;
pub use color::*;
pub use dataset::*;
pub use config::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, Matrix4};
