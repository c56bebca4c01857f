//! Merging decoded sources into one dense point buffer
//!
//! Sources are concatenated in the order given. Positions are normalized to
//! Y-up as they are copied and bounds are accumulated over the whole merge.
//! Optional attributes become dense arrays as soon as any source provides
//! them; sources without the attribute contribute a fill value.

use crate::decoder::DecodedSource;
use lidarview_core::{BoundingBox, BoundsAccumulator, CoordinateNormalizer, Error, Point3d, Result};
use std::fmt;
use tracing::{info, warn};

/// Intensity contributed by sources without intensity data
pub const INTENSITY_FILL: u16 = 0;

/// Color byte contributed by sources without RGB data (white, not black)
pub const RGB_FILL: u8 = u8::MAX;

/// Which optional attribute a [`MergeWarning`] refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeAttribute {
    Intensity,
    Rgb,
}

impl fmt::Display for MergeAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeAttribute::Intensity => f.write_str("intensity"),
            MergeAttribute::Rgb => f.write_str("rgb"),
        }
    }
}

/// A source attribute whose length disagreed with its point count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeWarning {
    pub source: String,
    pub attribute: MergeAttribute,
    pub expected: usize,
    pub actual: usize,
}

impl fmt::Display for MergeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} size mismatch in {}: expected {}, got {}",
            self.attribute, self.source, self.expected, self.actual
        )
    }
}

/// Output of [`merge_sources`]: dataset-ready buffers plus any recovered faults
#[derive(Debug, Clone)]
pub struct MergedPointData {
    pub positions: Vec<f32>,
    pub intensity: Option<Vec<u16>>,
    pub rgb: Option<Vec<u8>>,
    pub bounds: BoundingBox,
    pub total_points: usize,
    pub warnings: Vec<MergeWarning>,
}

/// Merge decoded sources into dense, pre-sized buffers
pub fn merge_sources(sources: &[DecodedSource]) -> Result<MergedPointData> {
    for source in sources {
        if source.positions.len() % 3 != 0 {
            return Err(Error::InvalidData(format!(
                "{}: position buffer length {} is not a multiple of 3",
                source.identifier,
                source.positions.len()
            )));
        }
    }

    let total_points: usize = sources.iter().map(DecodedSource::point_count).sum();
    info!(
        files = sources.len(),
        total_points, "Merging point cloud sources"
    );

    let mut positions = Vec::with_capacity(total_points * 3);
    let mut bounds = BoundsAccumulator::new();
    for source in sources {
        for xyz in source.positions.chunks_exact(3) {
            let [x, y, z] = CoordinateNormalizer::normalize_xyz(xyz[0], xyz[1], xyz[2]);
            // Bounds must cover the stored f32 values, not the source f64s
            let stored = [x as f32, y as f32, z as f32];
            bounds.extend(&Point3d::new(stored[0].into(), stored[1].into(), stored[2].into()));
            positions.extend_from_slice(&stored);
        }
    }
    let bounds = bounds.finish()?;

    let mut warnings = Vec::new();
    let intensity = merge_attribute(
        sources,
        1,
        INTENSITY_FILL,
        MergeAttribute::Intensity,
        |s| s.intensity.as_deref(),
        &mut warnings,
    );
    let rgb = merge_attribute(
        sources,
        3,
        RGB_FILL,
        MergeAttribute::Rgb,
        |s| s.rgb.as_deref(),
        &mut warnings,
    );

    Ok(MergedPointData {
        positions,
        intensity,
        rgb,
        bounds,
        total_points,
        warnings,
    })
}

/// Build a dense attribute array with `width` values per point, or `None` if no source has it
fn merge_attribute<T: Copy>(
    sources: &[DecodedSource],
    width: usize,
    fill: T,
    attribute: MergeAttribute,
    get: impl Fn(&DecodedSource) -> Option<&[T]>,
    warnings: &mut Vec<MergeWarning>,
) -> Option<Vec<T>> {
    if !sources.iter().any(|s| get(s).is_some()) {
        return None;
    }

    let total: usize = sources.iter().map(|s| s.point_count() * width).sum();
    let mut merged = Vec::with_capacity(total);
    for source in sources {
        let expected = source.point_count() * width;
        let start = merged.len();
        if let Some(values) = get(source) {
            if values.len() != expected {
                let warning = MergeWarning {
                    source: source.identifier.clone(),
                    attribute,
                    expected,
                    actual: values.len(),
                };
                warn!("{}", warning);
                warnings.push(warning);
            }
            merged.extend_from_slice(&values[..values.len().min(expected)]);
        }
        merged.resize(start + expected, fill);
    }
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str, points: usize, base: f64) -> DecodedSource {
        let positions = (0..points)
            .flat_map(|i| {
                let i = i as f64;
                [base + i, base + 2.0 * i, 10.0 + i]
            })
            .collect();
        DecodedSource::new(id, positions)
    }

    #[test]
    fn test_total_points_is_sum_of_sources() {
        for counts in [vec![7], vec![3, 4], vec![1, 0, 9, 2]] {
            let sources: Vec<_> = counts
                .iter()
                .enumerate()
                .map(|(i, &n)| source(&format!("s{i}"), n, i as f64 * 100.0))
                .collect();
            let merged = merge_sources(&sources).unwrap();
            let expected: usize = counts.iter().sum();
            assert_eq!(merged.total_points, expected);
            assert_eq!(merged.positions.len(), 3 * expected);
            assert!(merged.intensity.is_none());
            assert!(merged.rgb.is_none());
        }
    }

    #[test]
    fn test_bounds_match_stored_positions_at_survey_magnitudes() {
        // Northing 5456801.3 is stored as 5456801.5 in f32
        let utm = DecodedSource::new(
            "utm",
            vec![489400.3, 5456800.3, 61.3, 489401.1, 5456801.3, 62.7],
        );
        let merged = merge_sources(&[utm]).unwrap();

        let mut scan = BoundsAccumulator::new();
        for p in merged.positions.chunks_exact(3) {
            scan.extend(&Point3d::new(p[0].into(), p[1].into(), p[2].into()));
        }
        assert_eq!(merged.bounds, scan.result());
        assert_eq!(merged.bounds.max_z, f64::from(merged.positions[5]));
        assert!(merged.bounds.max_z > 5456801.3);
    }

    #[test]
    fn test_positions_are_normalized_in_order() {
        let merged = merge_sources(&[source("a", 2, 0.0), source("b", 1, 500.0)]).unwrap();
        // a[1] = (1, 2, 11) becomes (1, 11, 2)
        assert_eq!(&merged.positions[3..6], &[1.0, 11.0, 2.0]);
        // b[0] = (500, 500, 10) becomes (500, 10, 500)
        assert_eq!(&merged.positions[6..9], &[500.0, 10.0, 500.0]);
        assert_eq!(merged.bounds.min_y, 10.0);
        assert_eq!(merged.bounds.max_y, 11.0);
        assert_eq!(merged.bounds.max_x, 500.0);
        assert_eq!(merged.bounds.max_z, 500.0);
    }

    #[test]
    fn test_intensity_from_one_source_zero_fills_others() {
        let with = source("with", 3, 0.0).with_intensity(vec![11, 22, 33]);
        let merged = merge_sources(&[source("before", 2, 0.0), with, source("after", 1, 0.0)]).unwrap();
        assert_eq!(merged.intensity, Some(vec![0, 0, 11, 22, 33, 0]));
        assert!(merged.warnings.is_empty());
    }

    #[test]
    fn test_rgb_missing_is_white() {
        let colored = source("colored", 1, 0.0).with_rgb(vec![1, 2, 3]);
        let merged = merge_sources(&[colored, source("plain", 2, 0.0)]).unwrap();
        assert_eq!(merged.rgb, Some(vec![1, 2, 3, 255, 255, 255, 255, 255, 255]));
    }

    #[test]
    fn test_short_attribute_copies_prefix_and_fills() {
        let short = source("short", 3, 0.0).with_rgb(vec![9, 9, 9, 8]).with_intensity(vec![5]);
        let merged = merge_sources(&[short]).unwrap();
        assert_eq!(merged.rgb, Some(vec![9, 9, 9, 8, 255, 255, 255, 255, 255]));
        assert_eq!(merged.intensity, Some(vec![5, 0, 0]));
        assert_eq!(merged.warnings.len(), 2);
        assert_eq!(merged.warnings[0].attribute, MergeAttribute::Intensity);
        assert_eq!(merged.warnings[1].expected, 9);
        assert_eq!(merged.warnings[1].actual, 4);
    }

    #[test]
    fn test_long_attribute_is_truncated() {
        let long = source("long", 2, 0.0).with_intensity(vec![1, 2, 3, 4]);
        let merged = merge_sources(&[long, source("next", 1, 0.0)]).unwrap();
        assert_eq!(merged.intensity, Some(vec![1, 2, 0]));
        assert_eq!(merged.warnings.len(), 1);
    }

    #[test]
    fn test_no_points_is_an_error() {
        assert!(matches!(merge_sources(&[source("empty", 0, 0.0)]), Err(Error::EmptyPointSet)));
        assert!(matches!(merge_sources(&[]), Err(Error::EmptyPointSet)));
    }

    #[test]
    fn test_ragged_positions_rejected() {
        let ragged = DecodedSource::new("ragged", vec![1.0, 2.0]);
        assert!(matches!(merge_sources(&[ragged]), Err(Error::InvalidData(_))));
    }
}
