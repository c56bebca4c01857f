//! Named camera tours derived from dataset bounds
//!
//! Waypoints are expressed as fractions of the dataset extents plus fixed
//! altitudes above its lowest point, so the same tours work for any
//! dataset scale. Rebuilding from new bounds replaces every path.

use crate::easing::Easing;
use lidarview_core::{BoundingBox, Error, Point3d, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Height of the look-at plane above the minimum elevation
pub const GROUND_CLEARANCE: f64 = 100.0;

/// Low flying altitude, relative to ground level
pub const LOW_ALTITUDE_OFFSET: f64 = 150.0;

/// Overview altitude, relative to ground level
pub const MEDIUM_ALTITUDE_OFFSET: f64 = 450.0;

/// One waypoint of a camera tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub position: Point3d,
    pub target: Point3d,
    /// Time taken to travel here from the previous waypoint
    pub duration: Duration,
    pub easing: Easing,
}

impl Keyframe {
    /// Create a keyframe; the duration must be non-zero
    pub fn new(position: Point3d, target: Point3d, duration: Duration, easing: Easing) -> Result<Self> {
        if duration.is_zero() {
            return Err(Error::InvalidData("keyframe duration must be positive".to_string()));
        }
        Ok(Self {
            position,
            target,
            duration,
            easing,
        })
    }

    fn fixed(position: Point3d, target: Point3d, millis: u64, easing: Easing) -> Self {
        Self {
            position,
            target,
            duration: Duration::from_millis(millis),
            easing,
        }
    }
}

/// An ordered, named camera tour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyframePath {
    id: String,
    name: String,
    description: String,
    keyframes: Vec<Keyframe>,
}

impl KeyframePath {
    /// Create a path; at least one keyframe is required
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        keyframes: Vec<Keyframe>,
    ) -> Result<Self> {
        let id = id.into();
        if keyframes.is_empty() {
            return Err(Error::InvalidData(format!("camera path {id} has no keyframes")));
        }
        Ok(Self {
            id,
            name: name.into(),
            description: description.into(),
            keyframes,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn total_duration(&self) -> Duration {
        self.keyframes.iter().map(|k| k.duration).sum()
    }

    pub fn summary(&self) -> PathSummary {
        PathSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Listing entry for a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// The registered camera tours, in a stable order
#[derive(Debug, Clone, Default)]
pub struct CameraPathSet {
    paths: Vec<KeyframePath>,
}

impl CameraPathSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in tours for a dataset with the given bounds
    pub fn from_bounds(bounds: &BoundingBox) -> Self {
        let mut set = Self::new();
        set.rebuild(bounds);
        set
    }

    /// Replace every path with the built-in tours for `bounds`
    pub fn rebuild(&mut self, bounds: &BoundingBox) {
        if !bounds.is_valid() {
            warn!("Cannot build camera paths for empty bounds");
            self.paths.clear();
            return;
        }
        self.paths = builtin_paths(bounds);
        debug!(count = self.paths.len(), "Camera paths rebuilt");
    }

    /// Register a path, replacing any path with the same id
    pub fn insert(&mut self, path: KeyframePath) {
        match self.paths.iter_mut().find(|p| p.id == path.id) {
            Some(existing) => *existing = path,
            None => self.paths.push(path),
        }
    }

    pub fn get(&self, id: &str) -> Option<&KeyframePath> {
        self.paths.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(|p| p.id.as_str())
    }

    pub fn summaries(&self) -> Vec<PathSummary> {
        self.paths.iter().map(KeyframePath::summary).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyframePath> {
        self.paths.iter()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn builtin_paths(bounds: &BoundingBox) -> Vec<KeyframePath> {
    let center = bounds.center();
    let size_x = bounds.max_x - bounds.min_x;
    let size_z = bounds.max_z - bounds.min_z;
    let size = bounds.horizontal_extent();

    let ground = bounds.min_y + GROUND_CLEARANCE;
    let low = ground + LOW_ALTITUDE_OFFSET;
    let medium = ground + MEDIUM_ALTITUDE_OFFSET;

    // Position at a fraction of the way across from the min corner
    let from_min = |fx: f64, y: f64, fz: f64| Point3d::new(bounds.min_x + size_x * fx, y, bounds.min_z + size_z * fz);
    let from_max = |fx: f64, y: f64, fz: f64| Point3d::new(bounds.max_x - size_x * fx, y, bounds.max_z - size_z * fz);
    let around = |dx: f64, y: f64, dz: f64| Point3d::new(center.x + dx, y, center.z + dz);
    let focus = around(0.0, ground, 0.0);

    use Easing::*;
    let path = |id: &str, name: &str, description: &str, keyframes: Vec<Keyframe>| KeyframePath {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        keyframes,
    };

    vec![
        path(
            "overview",
            "City Overview",
            "Aerial view of the entire dataset",
            vec![
                Keyframe::fixed(from_min(0.2, medium + 50.0, 0.2), focus, 2000, QuadraticInOut),
                Keyframe::fixed(from_min(0.1, medium, 0.1), focus, 4000, QuadraticInOut),
                Keyframe::fixed(from_max(0.1, medium, 0.1), focus, 4000, QuadraticInOut),
            ],
        ),
        path(
            "flythrough",
            "Low Flythrough",
            "Low-altitude path through the entire area",
            vec![
                Keyframe::fixed(from_min(0.1, low, 0.1), from_min(0.4, ground, 0.4), 3000, CubicInOut),
                Keyframe::fixed(
                    around(0.0, low + 20.0, 0.0),
                    around(size_x * 0.3, ground, size_z * 0.3),
                    4000,
                    CubicInOut,
                ),
                Keyframe::fixed(from_max(0.1, low, 0.1), from_max(0.4, ground, 0.4), 3000, CubicInOut),
            ],
        ),
        path(
            "inspection",
            "Close Inspection",
            "Close-up views of terrain features",
            vec![
                Keyframe::fixed(from_min(0.25, low - 20.0, 0.25), from_min(0.35, ground, 0.35), 3000, QuadraticInOut),
                Keyframe::fixed(
                    around(-size_x * 0.1, low - 10.0, 0.0),
                    around(size_x * 0.1, ground, size_z * 0.1),
                    4000,
                    QuadraticInOut,
                ),
                Keyframe::fixed(from_max(0.25, low, 0.25), from_max(0.35, ground, 0.35), 3000, QuadraticInOut),
            ],
        ),
        path(
            "rotate",
            "360° Rotation",
            "Rotating view around the center",
            vec![
                Keyframe::fixed(from_min(0.2, medium - 50.0, 0.2), focus, 2000, QuadraticInOut),
                Keyframe::fixed(around(-size * 0.55, medium - 50.0, 0.0), focus, 3000, Linear),
                Keyframe::fixed(around(-size * 0.35, medium - 50.0, size * 0.35), focus, 3000, Linear),
                Keyframe::fixed(around(size * 0.35, medium - 50.0, size * 0.35), focus, 3000, Linear),
                Keyframe::fixed(around(size * 0.55, medium - 50.0, 0.0), focus, 3000, Linear),
                Keyframe::fixed(around(size * 0.35, medium - 50.0, -size * 0.35), focus, 3000, Linear),
            ],
        ),
        path(
            "diagonal",
            "Diagonal Sweep",
            "Sweeps diagonally across the full map",
            vec![
                Keyframe::fixed(from_min(0.0, medium, 0.0), from_min(0.3, ground, 0.3), 2000, QuadraticIn),
                Keyframe::fixed(
                    around(0.0, medium + 50.0, 0.0),
                    around(size_x * 0.2, ground, size_z * 0.2),
                    4000,
                    QuadraticInOut,
                ),
                Keyframe::fixed(from_max(0.0, medium, 0.0), from_max(0.3, ground, 0.3), 2000, QuadraticOut),
            ],
        ),
    ]
}
