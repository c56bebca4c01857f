//! Color modes and the gradients they map through

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the per-point color buffer is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Elevation,
    Vaporwave,
    Intensity,
    Rgb,
    /// Selectable, but colored exactly like [`ColorMode::Elevation`]
    Classification,
}

impl ColorMode {
    pub const ALL: [ColorMode; 5] = [
        ColorMode::Elevation,
        ColorMode::Vaporwave,
        ColorMode::Intensity,
        ColorMode::Rgb,
        ColorMode::Classification,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Elevation => "elevation",
            ColorMode::Vaporwave => "vaporwave",
            ColorMode::Intensity => "intensity",
            ColorMode::Rgb => "rgb",
            ColorMode::Classification => "classification",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ColorMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::unknown("color mode", s))
    }
}

/// An RGB triple with components in `[0, 1]`
pub type Rgb = [f32; 3];

/// Map `t` in `[0, 1]` onto a violet-blue-green-yellow-red ramp.
///
/// Each channel is a triangular band `clamp(1.5 - |3t - k|)` with blue at
/// `k = 1`, green at `k = 2` and red at `k = 3`.
pub fn rainbow(t: f32) -> Rgb {
    let band = |k: f32| (1.5 - (t * 3.0 - k).abs()).clamp(0.0, 1.0);
    [band(3.0), band(2.0), band(1.0)]
}

/// Gradient stops: dark navy, purple, magenta, hot pink, coral, orange, yellow-orange, bright yellow
const VAPORWAVE_STOPS: [(f32, Rgb); 8] = [
    (0.00, [0.102, 0.016, 0.251]),
    (0.14, [0.290, 0.078, 0.549]),
    (0.28, [0.702, 0.122, 0.400]),
    (0.42, [1.000, 0.000, 0.431]),
    (0.56, [1.000, 0.420, 0.616]),
    (0.70, [1.000, 0.482, 0.000]),
    (0.85, [1.000, 0.667, 0.000]),
    (1.00, [1.000, 0.867, 0.000]),
];

/// Map `t` in `[0, 1]` onto the eight-stop synthwave gradient
pub fn vaporwave(t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let upper = VAPORWAVE_STOPS
        .iter()
        .position(|(stop, _)| t < *stop)
        .unwrap_or(VAPORWAVE_STOPS.len() - 1)
        .max(1);
    let (t0, c0) = VAPORWAVE_STOPS[upper - 1];
    let (t1, c1) = VAPORWAVE_STOPS[upper];
    let local = (t - t0) / (t1 - t0);
    [
        c0[0] + (c1[0] - c0[0]) * local,
        c0[1] + (c1[1] - c0[1]) * local,
        c0[2] + (c1[2] - c0[2]) * local,
    ]
}

/// Running min/max over a scalar channel, normalizing into `[0, 1]`.
///
/// A zero-width range normalizes every value to 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub fn from_values<I: IntoIterator<Item = f32>>(values: I) -> Option<Self> {
        values.into_iter().fold(None, |range, v| match range {
            None => Some(ValueRange { min: v, max: v }),
            Some(r) => Some(ValueRange {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }

    pub fn width(&self) -> f32 {
        self.max - self.min
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0
    }

    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        if self.is_degenerate() {
            0.0
        } else {
            (value - self.min) / self.width()
        }
    }
}
