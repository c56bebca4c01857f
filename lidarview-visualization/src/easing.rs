//! Easing functions for camera transitions

use lidarview_core::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maps elapsed fraction to progress fraction.
///
/// Identifiers follow the `Family.Direction` form, e.g. `Quadratic.InOut`
/// or `Linear.None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Easing {
    #[serde(rename = "Linear.None")]
    Linear,
    #[serde(rename = "Quadratic.In")]
    QuadraticIn,
    #[serde(rename = "Quadratic.Out")]
    QuadraticOut,
    #[default]
    #[serde(rename = "Quadratic.InOut")]
    QuadraticInOut,
    #[serde(rename = "Cubic.In")]
    CubicIn,
    #[serde(rename = "Cubic.Out")]
    CubicOut,
    #[serde(rename = "Cubic.InOut")]
    CubicInOut,
}

impl Easing {
    pub const ALL: [Easing; 7] = [
        Easing::Linear,
        Easing::QuadraticIn,
        Easing::QuadraticOut,
        Easing::QuadraticInOut,
        Easing::CubicIn,
        Easing::CubicOut,
        Easing::CubicInOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Easing::Linear => "Linear.None",
            Easing::QuadraticIn => "Quadratic.In",
            Easing::QuadraticOut => "Quadratic.Out",
            Easing::QuadraticInOut => "Quadratic.InOut",
            Easing::CubicIn => "Cubic.In",
            Easing::CubicOut => "Cubic.Out",
            Easing::CubicInOut => "Cubic.InOut",
        }
    }

    /// Apply the easing to `t`, clamped to `[0, 1]`
    pub fn apply(&self, t: f64) -> f64 {
        let k = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => k,
            Easing::QuadraticIn => k * k,
            Easing::QuadraticOut => k * (2.0 - k),
            Easing::QuadraticInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k
                } else {
                    let k = k - 1.0;
                    -0.5 * (k * (k - 2.0) - 1.0)
                }
            }
            Easing::CubicIn => k * k * k,
            Easing::CubicOut => {
                let k = k - 1.0;
                k * k * k + 1.0
            }
            Easing::CubicInOut => {
                let k = k * 2.0;
                if k < 1.0 {
                    0.5 * k * k * k
                } else {
                    let k = k - 2.0;
                    0.5 * (k * k * k + 2.0)
                }
            }
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Easing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| Error::unknown("easing", s))
    }
}
