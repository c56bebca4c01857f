//! Device performance profiles injected by the host application

use serde::{Deserialize, Serialize};

/// Broad device categories the host detects before creating a viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    Mobile,
    Tablet,
    Desktop,
}

/// Rendering and decoding knobs chosen per device.
///
/// Only `decimation_stride` reaches the decode/merge path; the remaining
/// fields are passed through to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceProfile {
    /// Keep one of every `decimation_stride` decoded points
    pub decimation_stride: usize,
    pub antialiasing: bool,
    pub pixel_ratio_cap: f32,
    pub point_size_base: f32,
}

impl PerformanceProfile {
    /// Profile tuned for a device class
    pub fn for_device(device: DeviceClass) -> Self {
        match device {
            DeviceClass::Mobile => Self {
                decimation_stride: 60,
                antialiasing: false,
                pixel_ratio_cap: 1.0,
                point_size_base: 0.9,
            },
            DeviceClass::Tablet => Self {
                decimation_stride: 40,
                antialiasing: false,
                pixel_ratio_cap: 1.2,
                point_size_base: 0.7,
            },
            DeviceClass::Desktop => Self {
                decimation_stride: 30,
                antialiasing: true,
                pixel_ratio_cap: 1.5,
                point_size_base: 0.5,
            },
        }
    }

    /// Clamp a device pixel ratio to the profile's cap
    pub fn pixel_ratio(&self, device_pixel_ratio: f32) -> f32 {
        device_pixel_ratio.min(self.pixel_ratio_cap)
    }
}

impl Default for PerformanceProfile {
    fn default() -> Self {
        Self::for_device(DeviceClass::Desktop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_decimate_harder_on_smaller_devices() {
        let mobile = PerformanceProfile::for_device(DeviceClass::Mobile);
        let tablet = PerformanceProfile::for_device(DeviceClass::Tablet);
        let desktop = PerformanceProfile::default();
        assert!(mobile.decimation_stride > tablet.decimation_stride);
        assert!(tablet.decimation_stride > desktop.decimation_stride);
        assert!(desktop.antialiasing && !mobile.antialiasing);
        assert_eq!(mobile.pixel_ratio(3.0), 1.0);
        assert_eq!(desktop.pixel_ratio(1.25), 1.25);
    }
}
