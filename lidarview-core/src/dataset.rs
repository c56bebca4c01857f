//! Merged point cloud dataset and color recomputation

use crate::bounds::BoundingBox;
use crate::color::{rainbow, vaporwave, ColorMode, Rgb, ValueRange};
use crate::error::{Error, Result};
use crate::point::COMPONENTS;
use tracing::{debug, warn};

/// The in-memory dataset handed to the renderer.
///
/// `positions` and `colors` are flat `3 × total_points` buffers; positions are
/// already in Y-up viewer space. Optional attributes are dense when present.
/// Only `colors` is ever rewritten after construction.
#[derive(Debug, Clone)]
pub struct PointCloudDataset {
    positions: Vec<f32>,
    colors: Vec<f32>,
    intensity: Option<Vec<u16>>,
    rgb: Option<Vec<u8>>,
    bounds: BoundingBox,
    total_points: usize,
    color_mode: ColorMode,
    colors_dirty: bool,
}

impl PointCloudDataset {
    /// Assemble a dataset from merged buffers and compute colors for `color_mode`
    pub fn new(
        positions: Vec<f32>,
        intensity: Option<Vec<u16>>,
        rgb: Option<Vec<u8>>,
        bounds: BoundingBox,
        color_mode: ColorMode,
    ) -> Result<Self> {
        if positions.len() % COMPONENTS != 0 {
            return Err(Error::InvalidData(format!(
                "position buffer length {} is not a multiple of {}",
                positions.len(),
                COMPONENTS
            )));
        }
        let total_points = positions.len() / COMPONENTS;
        if total_points == 0 {
            return Err(Error::EmptyPointSet);
        }
        if let Some(intensity) = &intensity {
            if intensity.len() != total_points {
                return Err(Error::InvalidData(format!(
                    "intensity has {} entries for {} points",
                    intensity.len(),
                    total_points
                )));
            }
        }
        if let Some(rgb) = &rgb {
            if rgb.len() != total_points * COMPONENTS {
                return Err(Error::InvalidData(format!(
                    "rgb has {} entries for {} points",
                    rgb.len(),
                    total_points
                )));
            }
        }

        let mut dataset = Self {
            colors: vec![0.0; positions.len()],
            positions,
            intensity,
            rgb,
            bounds,
            total_points,
            color_mode,
            colors_dirty: false,
        };
        dataset.recompute_colors();
        Ok(dataset)
    }

    pub fn positions(&self) -> &[f32] {
        &self.positions
    }

    pub fn colors(&self) -> &[f32] {
        &self.colors
    }

    pub fn intensity(&self) -> Option<&[u16]> {
        self.intensity.as_deref()
    }

    pub fn rgb(&self) -> Option<&[u8]> {
        self.rgb.as_deref()
    }

    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    pub fn total_points(&self) -> usize {
        self.total_points
    }

    pub fn len(&self) -> usize {
        self.total_points
    }

    pub fn is_empty(&self) -> bool {
        self.total_points == 0
    }

    /// The mode last requested, which may differ from the mode actually rendered
    pub fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    /// The mode whose computation actually fills `colors`, after attribute fallbacks
    pub fn effective_color_mode(&self) -> ColorMode {
        match self.color_mode {
            ColorMode::Intensity if self.intensity.is_none() => ColorMode::Elevation,
            ColorMode::Rgb if self.rgb.is_none() => ColorMode::Elevation,
            ColorMode::Classification => ColorMode::Elevation,
            mode => mode,
        }
    }

    /// Switch color mode, recomputing `colors` in place and flagging them for upload
    pub fn set_color_mode(&mut self, mode: ColorMode) {
        self.color_mode = mode;
        self.recompute_colors();
    }

    /// True when `colors` changed since the renderer last consumed them
    pub fn colors_dirty(&self) -> bool {
        self.colors_dirty
    }

    /// Acknowledge a color upload
    pub fn mark_colors_uploaded(&mut self) {
        self.colors_dirty = false;
    }

    /// Raw position bytes for a vertex buffer upload
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Raw color bytes for a vertex buffer upload
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.colors)
    }

    fn recompute_colors(&mut self) {
        match (self.color_mode, &self.intensity, &self.rgb) {
            (ColorMode::Intensity, None, _) => {
                warn!("No intensity data loaded, falling back to elevation colors");
            }
            (ColorMode::Rgb, _, None) => {
                warn!("No RGB data loaded, falling back to elevation colors");
            }
            _ => {}
        }

        match self.effective_color_mode() {
            ColorMode::Vaporwave => self.fill_by_elevation(vaporwave),
            ColorMode::Intensity => self.fill_intensity(),
            ColorMode::Rgb => self.fill_rgb(),
            ColorMode::Elevation | ColorMode::Classification => self.fill_by_elevation(rainbow),
        }
        self.colors_dirty = true;
        debug!(
            mode = %self.color_mode,
            points = self.total_points,
            "Recomputed point colors"
        );
    }

    fn elevation_range(&self) -> ValueRange {
        let range = ValueRange::from_values(self.positions.iter().skip(1).step_by(COMPONENTS).copied())
            .unwrap_or(ValueRange { min: 0.0, max: 0.0 });
        if range.is_degenerate() {
            debug!(elevation = range.min, "All points share one elevation");
        }
        range
    }

    fn fill_by_elevation(&mut self, ramp: fn(f32) -> Rgb) {
        let range = self.elevation_range();
        for (color, position) in self
            .colors
            .chunks_exact_mut(COMPONENTS)
            .zip(self.positions.chunks_exact(COMPONENTS))
        {
            color.copy_from_slice(&ramp(range.normalize(position[1])));
        }
    }

    fn fill_intensity(&mut self) {
        let Some(intensity) = &self.intensity else {
            return;
        };
        let range = ValueRange::from_values(intensity.iter().map(|&i| f32::from(i)))
            .unwrap_or(ValueRange { min: 0.0, max: 0.0 });
        if range.is_degenerate() {
            debug!(intensity = range.min, "All points share one intensity");
        }
        for (color, &value) in self.colors.chunks_exact_mut(COMPONENTS).zip(intensity) {
            color.fill(range.normalize(f32::from(value)));
        }
    }

    fn fill_rgb(&mut self) {
        let Some(rgb) = &self.rgb else {
            return;
        };
        for (color, &byte) in self.colors.iter_mut().zip(rgb) {
            *color = f32::from(byte) / 255.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::point_at;
    use crate::Point3d;
    use approx::assert_abs_diff_eq;

    fn bounds_of(positions: &[f32]) -> BoundingBox {
        let mut bounds = BoundingBox::empty();
        for p in positions.chunks_exact(3) {
            bounds.extend(&Point3d::new(p[0] as f64, p[1] as f64, p[2] as f64));
        }
        bounds
    }

    fn ramp_dataset(intensity: Option<Vec<u16>>, rgb: Option<Vec<u8>>) -> PointCloudDataset {
        let positions = vec![
            0.0, 10.0, 0.0, //
            1.0, 15.0, 1.0, //
            2.0, 20.0, 2.0,
        ];
        let bounds = bounds_of(&positions);
        PointCloudDataset::new(positions, intensity, rgb, bounds, ColorMode::Elevation).unwrap()
    }

    #[test]
    fn test_elevation_colors_use_actual_range() {
        let dataset = ramp_dataset(None, None);
        assert_eq!(&dataset.colors()[0..3], &rainbow(0.0));
        assert_eq!(&dataset.colors()[3..6], &rainbow(0.5));
        assert_eq!(&dataset.colors()[6..9], &rainbow(1.0));
        assert!(dataset.colors_dirty());
    }

    #[test]
    fn test_set_color_mode_is_idempotent() {
        let mut dataset = ramp_dataset(Some(vec![5, 50, 500]), None);
        for mode in ColorMode::ALL {
            dataset.set_color_mode(mode);
            let once = dataset.color_bytes().to_vec();
            dataset.set_color_mode(mode);
            assert_eq!(dataset.color_bytes(), once.as_slice(), "mode {mode}");
        }
    }

    #[test]
    fn test_flat_elevation_normalizes_to_zero() {
        let positions = vec![0.0, 7.0, 0.0, 4.0, 7.0, 9.0];
        let bounds = bounds_of(&positions);
        let mut dataset =
            PointCloudDataset::new(positions, None, None, bounds, ColorMode::Elevation).unwrap();
        for color in dataset.colors().chunks_exact(3) {
            assert_eq!(color, &rainbow(0.0));
        }
        dataset.set_color_mode(ColorMode::Vaporwave);
        for color in dataset.colors().chunks_exact(3) {
            assert_eq!(color, &vaporwave(0.0));
            assert!(color.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn test_intensity_grayscale() {
        let mut dataset = ramp_dataset(Some(vec![100, 200, 300]), None);
        dataset.set_color_mode(ColorMode::Intensity);
        assert_eq!(dataset.effective_color_mode(), ColorMode::Intensity);
        assert_eq!(&dataset.colors()[0..3], &[0.0, 0.0, 0.0]);
        assert_eq!(&dataset.colors()[3..6], &[0.5, 0.5, 0.5]);
        assert_eq!(&dataset.colors()[6..9], &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_constant_intensity_is_black_not_nan() {
        let mut dataset = ramp_dataset(Some(vec![9, 9, 9]), None);
        dataset.set_color_mode(ColorMode::Intensity);
        assert!(dataset.colors().iter().all(|&c| c == 0.0));
    }

    #[test]
    fn test_missing_attributes_fall_back_to_elevation() {
        let mut dataset = ramp_dataset(None, None);
        let elevation = dataset.colors().to_vec();

        dataset.set_color_mode(ColorMode::Intensity);
        assert_eq!(dataset.color_mode(), ColorMode::Intensity);
        assert_eq!(dataset.effective_color_mode(), ColorMode::Elevation);
        assert_eq!(dataset.colors(), elevation.as_slice());

        dataset.set_color_mode(ColorMode::Rgb);
        assert_eq!(dataset.colors(), elevation.as_slice());

        dataset.set_color_mode(ColorMode::Classification);
        assert_eq!(dataset.colors(), elevation.as_slice());
    }

    #[test]
    fn test_rgb_scaled_to_unit_range() {
        let rgb = vec![255, 0, 0, 0, 255, 0, 51, 102, 204];
        let mut dataset = ramp_dataset(None, Some(rgb));
        dataset.set_color_mode(ColorMode::Rgb);
        assert_eq!(&dataset.colors()[0..3], &[1.0, 0.0, 0.0]);
        assert_eq!(&dataset.colors()[3..6], &[0.0, 1.0, 0.0]);
        assert_abs_diff_eq!(dataset.colors()[6], 0.2, epsilon = 1e-6);
        assert_abs_diff_eq!(dataset.colors()[7], 0.4, epsilon = 1e-6);
        assert_abs_diff_eq!(dataset.colors()[8], 0.8, epsilon = 1e-6);
    }

    #[test]
    fn test_color_switch_leaves_positions_untouched() {
        let mut dataset = ramp_dataset(Some(vec![1, 2, 3]), Some(vec![7; 9]));
        let positions = dataset.positions().to_vec();
        dataset.set_color_mode(ColorMode::Rgb);
        dataset.set_color_mode(ColorMode::Intensity);
        assert_eq!(dataset.positions(), positions.as_slice());
        assert_eq!(point_at(dataset.positions(), 2).y, 20.0);
        assert_eq!(dataset.rgb(), Some(&[7u8; 9][..]));
    }

    #[test]
    fn test_dirty_flag_cycle() {
        let mut dataset = ramp_dataset(None, None);
        dataset.mark_colors_uploaded();
        assert!(!dataset.colors_dirty());
        dataset.set_color_mode(ColorMode::Vaporwave);
        assert!(dataset.colors_dirty());
        assert_eq!(dataset.color_bytes().len(), 9 * 4);
        assert_eq!(dataset.position_bytes().len(), 9 * 4);
    }

    #[test]
    fn test_rejects_inconsistent_buffers() {
        let bounds = BoundingBox::empty();
        assert!(matches!(
            PointCloudDataset::new(vec![0.0; 4], None, None, bounds, ColorMode::Elevation),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            PointCloudDataset::new(vec![], None, None, bounds, ColorMode::Elevation),
            Err(Error::EmptyPointSet)
        ));
        assert!(matches!(
            PointCloudDataset::new(vec![0.0; 6], Some(vec![1]), None, bounds, ColorMode::Elevation),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            PointCloudDataset::new(vec![0.0; 6], None, Some(vec![1; 3]), bounds, ColorMode::Elevation),
            Err(Error::InvalidData(_))
        ));
    }
}
