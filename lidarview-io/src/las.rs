//! LAS/LAZ decoding through the `las` crate

use crate::decoder::{DecodedSource, PointDecoder, SourceLocator};
use crate::error::IoError;
use las::Reader;
use std::io::Cursor;
use std::sync::Arc;
use tracing::debug;

/// Progress is reported once per this many source points
const PROGRESS_INTERVAL: usize = 1 << 16;

/// Decodes LAS and LAZ sources, keeping intensity and (when the point format has it) RGB
#[derive(Debug, Clone, Copy, Default)]
pub struct LasDecoder;

impl LasDecoder {
    pub fn new() -> Self {
        Self
    }

    async fn read_bytes(source: &SourceLocator) -> Result<Arc<[u8]>, IoError> {
        match source {
            SourceLocator::Memory { bytes, .. } => Ok(bytes.clone()),
            SourceLocator::File(path) => {
                crate::detect_format(path)?;
                match tokio::fs::read(path).await {
                    Ok(bytes) => Ok(bytes.into()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(IoError::FileNotFound {
                        path: path.display().to_string(),
                    }),
                    Err(e) => Err(e.into()),
                }
            }
        }
    }

    /// Decode an in-memory LAS/LAZ image
    pub fn decode_bytes(
        identifier: &str,
        bytes: Arc<[u8]>,
        stride: usize,
        progress: &mut dyn FnMut(f64),
    ) -> Result<DecodedSource, IoError> {
        let stride = stride.max(1);
        let mut reader = Reader::new(Cursor::new(bytes))?;
        let total = reader.header().number_of_points() as usize;
        let has_color = reader.header().point_format().has_color;

        let kept = total.div_ceil(stride);
        let mut positions = Vec::with_capacity(kept * 3);
        let mut intensity = Vec::with_capacity(kept);
        let mut colors: Vec<[u16; 3]> = if has_color { Vec::with_capacity(kept) } else { Vec::new() };

        progress(0.0);
        for (index, point) in reader.points().enumerate() {
            let point = point?;
            if index % PROGRESS_INTERVAL == 0 && total > 0 {
                progress(index as f64 / total as f64);
            }
            if index % stride != 0 {
                continue;
            }
            positions.extend_from_slice(&[point.x, point.y, point.z]);
            intensity.push(point.intensity);
            if has_color {
                let c = point.color.unwrap_or(las::Color::new(u16::MAX, u16::MAX, u16::MAX));
                colors.push([c.red, c.green, c.blue]);
            }
        }
        progress(1.0);

        debug!(
            source = identifier,
            total,
            kept = positions.len() / 3,
            has_color,
            "Decoded LAS source"
        );

        let mut decoded = DecodedSource::new(identifier, positions).with_intensity(intensity);
        if has_color {
            decoded = decoded.with_rgb(reduce_color_depth(&colors));
        }
        Ok(decoded)
    }
}

/// Flatten 16-bit LAS color channels to 8 bits by keeping the high byte
fn reduce_color_depth(colors: &[[u16; 3]]) -> Vec<u8> {
    colors.iter().flatten().map(|&c| (c >> 8) as u8).collect()
}

impl PointDecoder for LasDecoder {
    async fn decode(
        &self,
        source: &SourceLocator,
        stride: usize,
        progress: &mut dyn FnMut(f64),
    ) -> Result<DecodedSource, IoError> {
        let bytes = Self::read_bytes(source).await?;
        Self::decode_bytes(&source.identifier(), bytes, stride, progress)
    }
}
