//! Point cloud ingestion for lidarview
//!
//! This crate decodes LAS/LAZ sources, merges any number of them into a
//! single normalized buffer and builds a [`lidarview_core::PointCloudDataset`]
//! from the result, reporting progress and per-source failures on the way.

pub mod decoder;
pub mod error;
pub mod ingest;
pub mod las;
pub mod merge;

pub use decoder::{DecodedSource, PointDecoder, SourceLocator};
pub use error::*;
pub use ingest::{IngestOptions, IngestOutcome, IngestionPipeline, ProgressEvent, SourceFailure};
pub use las::LasDecoder;
pub use merge::{merge_sources, MergeAttribute, MergeWarning, MergedPointData};

use std::path::Path;

/// File extensions the bundled decoder accepts
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["las", "laz"];

/// Check a path's extension against the supported point cloud formats
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<&'static str, IoError> {
    let path = path.as_ref();
    let Some(extension) = path
        .extension()
        .and_then(|s| s.to_str())
        .map(str::to_ascii_lowercase)
    else {
        return Err(IoError::InvalidFormat {
            format: "<none>".to_string(),
        });
    };
    SUPPORTED_EXTENSIONS
        .into_iter()
        .find(|&supported| supported == extension)
        .ok_or(IoError::InvalidFormat { format: extension })
}

/// Ingest files from disk with the LAS decoder
pub async fn ingest_files<P, F>(
    paths: &[P],
    options: IngestOptions,
    on_progress: F,
) -> lidarview_core::Result<IngestOutcome>
where
    P: AsRef<Path>,
    F: FnMut(&ProgressEvent),
{
    let sources: Vec<_> = paths
        .iter()
        .map(|p| SourceLocator::file(p.as_ref()))
        .collect();
    IngestionPipeline::new(LasDecoder::new())
        .with_options(options)
        .ingest(&sources, on_progress)
        .await
}
