//! The decoder boundary: what a byte-stream source yields before merging

use crate::error::IoError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Where a source's bytes come from
#[derive(Debug, Clone)]
pub enum SourceLocator {
    /// A file on disk
    File(PathBuf),
    /// Bytes already in memory, e.g. fetched by the host
    Memory { label: String, bytes: Arc<[u8]> },
}

impl SourceLocator {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        SourceLocator::File(path.into())
    }

    pub fn memory(label: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        SourceLocator::Memory {
            label: label.into(),
            bytes: bytes.into(),
        }
    }

    /// Human-readable identifier used in progress labels and failure reports
    pub fn identifier(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLocator::File(path) => write!(f, "{}", path.display()),
            SourceLocator::Memory { label, .. } => f.write_str(label),
        }
    }
}

/// One successfully decoded source, in source axis order.
///
/// `positions` is a flat `[x0, y0, z0, x1, ...]` buffer with elevation on the
/// third axis. Attribute buffers are whatever the decoder produced and may
/// disagree with the point count; the merger reconciles them.
#[derive(Debug, Clone, Default)]
pub struct DecodedSource {
    pub identifier: String,
    pub positions: Vec<f64>,
    pub intensity: Option<Vec<u16>>,
    pub rgb: Option<Vec<u8>>,
}

impl DecodedSource {
    pub fn new(identifier: impl Into<String>, positions: Vec<f64>) -> Self {
        Self {
            identifier: identifier.into(),
            positions,
            intensity: None,
            rgb: None,
        }
    }

    pub fn with_intensity(mut self, intensity: Vec<u16>) -> Self {
        self.intensity = Some(intensity);
        self
    }

    pub fn with_rgb(mut self, rgb: Vec<u8>) -> Self {
        self.rgb = Some(rgb);
        self
    }

    /// Declared point count, derived from the position buffer
    pub fn point_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Capability that turns a source into point attributes.
///
/// `progress` receives the decoded fraction in `[0, 1]`. Only one point in
/// every `stride` is kept; a stride of 0 or 1 keeps everything.
#[allow(async_fn_in_trait)]
pub trait PointDecoder {
    async fn decode(
        &self,
        source: &SourceLocator,
        stride: usize,
        progress: &mut dyn FnMut(f64),
    ) -> Result<DecodedSource, IoError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_identifiers() {
        assert_eq!(SourceLocator::file("data/tile_a.laz").identifier(), "data/tile_a.laz");
        let mem = SourceLocator::memory("upload.las", vec![1u8, 2, 3]);
        assert_eq!(mem.identifier(), "upload.las");
    }

    #[test]
    fn test_point_count_from_positions() {
        let source = DecodedSource::new("a", vec![0.0; 12]).with_intensity(vec![1, 2]);
        assert_eq!(source.point_count(), 4);
        assert_eq!(source.intensity.as_deref(), Some(&[1u16, 2][..]));
        assert!(source.rgb.is_none());
    }
}
