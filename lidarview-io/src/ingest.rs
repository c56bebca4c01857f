//! Sequential multi-source ingestion with progress and partial-failure reporting

use crate::decoder::{DecodedSource, PointDecoder, SourceLocator};
use crate::error::IoError;
use crate::merge::{merge_sources, MergeWarning};
use lidarview_core::{ColorMode, Error, PerformanceProfile, PointCloudDataset, Result};
use tracing::{info, warn};

/// Label of the progress event emitted once all sources were attempted
pub const MERGING_LABEL: &str = "Merging...";

/// Label of the final progress event of a multi-source ingestion
pub const COMPLETE_LABEL: &str = "Complete";

/// Share of a file's progress window spent decoding in multi-source mode
const MULTI_FILE_DECODE_SHARE: f64 = 0.9;

/// Share of the whole bar spent decoding in single-source mode
const SINGLE_FILE_DECODE_SHARE: f64 = 0.7;

/// One progress notification
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Overall fraction in `[0, 1]`
    pub fraction: f64,
    /// 1-based index of the file being decoded (multi-source only)
    pub file_index: Option<usize>,
    pub file_count: Option<usize>,
    /// Source identifier, or a phase label such as [`MERGING_LABEL`]
    pub label: Option<String>,
}

/// Options for an ingestion pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IngestOptions {
    /// Keep one of every `decimation_stride` points while decoding
    pub decimation_stride: usize,
    /// Color mode the new dataset starts in
    pub color_mode: ColorMode,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            decimation_stride: 20,
            color_mode: ColorMode::Elevation,
        }
    }
}

impl IngestOptions {
    /// Options using the profile's decimation stride
    pub fn from_profile(profile: &PerformanceProfile) -> Self {
        Self {
            decimation_stride: profile.decimation_stride,
            ..Self::default()
        }
    }

    pub fn with_stride(mut self, stride: usize) -> Self {
        self.decimation_stride = stride;
        self
    }

    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }
}

/// A source that failed to decode and was left out of the merge
#[derive(Debug)]
pub struct SourceFailure {
    pub source: String,
    pub error: IoError,
}

/// Result of a successful ingestion, possibly with some sources missing
#[derive(Debug)]
pub struct IngestOutcome {
    pub dataset: PointCloudDataset,
    pub loaded_count: usize,
    pub failed_count: usize,
    pub errors: Vec<SourceFailure>,
    pub warnings: Vec<MergeWarning>,
}

impl IngestOutcome {
    /// True when at least one source was dropped
    pub fn is_partial(&self) -> bool {
        self.failed_count > 0
    }

    /// Non-blocking warning text such as "2 of 5 files failed"
    pub fn failure_summary(&self) -> Option<String> {
        self.is_partial().then(|| {
            format!(
                "{} of {} files failed",
                self.failed_count,
                self.loaded_count + self.failed_count
            )
        })
    }
}

/// Forwards progress to the caller, never letting the fraction go backwards
struct ProgressReporter<F> {
    callback: F,
    last: f64,
}

impl<F: FnMut(&ProgressEvent)> ProgressReporter<F> {
    fn new(callback: F) -> Self {
        Self { callback, last: 0.0 }
    }

    fn report(&mut self, fraction: f64, file: Option<(usize, usize)>, label: Option<&str>) {
        // Decoders are external; drop NaN or infinite readings
        if !fraction.is_finite() {
            return;
        }
        let fraction = fraction.clamp(self.last, 1.0);
        self.last = fraction;
        (self.callback)(&ProgressEvent {
            fraction,
            file_index: file.map(|(index, _)| index),
            file_count: file.map(|(_, count)| count),
            label: label.map(str::to_owned),
        });
    }
}

/// Decodes sources one at a time and merges them into a [`PointCloudDataset`]
#[derive(Debug, Clone)]
pub struct IngestionPipeline<D> {
    decoder: D,
    options: IngestOptions,
}

impl<D: PointDecoder> IngestionPipeline<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            options: IngestOptions::default(),
        }
    }

    pub fn with_options(mut self, options: IngestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Decode every source sequentially, then merge the ones that succeeded.
    ///
    /// Fails with [`Error::NoDataAvailable`] only when every source failed.
    pub async fn ingest<F>(&self, sources: &[SourceLocator], on_progress: F) -> Result<IngestOutcome>
    where
        F: FnMut(&ProgressEvent),
    {
        let mut reporter = ProgressReporter::new(on_progress);
        match sources {
            [] => Err(Error::NoDataAvailable {
                attempted: 0,
                causes: Vec::new(),
            }),
            [single] => self.ingest_single(single, &mut reporter).await,
            _ => self.ingest_multiple(sources, &mut reporter).await,
        }
    }

    async fn ingest_single<F: FnMut(&ProgressEvent)>(
        &self,
        source: &SourceLocator,
        reporter: &mut ProgressReporter<F>,
    ) -> Result<IngestOutcome> {
        reporter.report(0.0, None, None);
        info!(source = %source, "Loading point cloud");

        let decoded = self
            .decode_one(source, &mut |p: f64| {
                reporter.report(p * SINGLE_FILE_DECODE_SHARE, None, None)
            })
            .await;
        let decoded = match decoded {
            Ok(decoded) => decoded,
            Err(error) => {
                warn!(source = %source, %error, "Failed to load point cloud");
                return Err(Error::NoDataAvailable {
                    attempted: 1,
                    causes: vec![format!("{source}: {error}")],
                });
            }
        };
        reporter.report(SINGLE_FILE_DECODE_SHARE, None, None);

        let outcome = self.build_outcome(&[decoded], Vec::new())?;
        reporter.report(1.0, None, None);
        Ok(outcome)
    }

    async fn ingest_multiple<F: FnMut(&ProgressEvent)>(
        &self,
        sources: &[SourceLocator],
        reporter: &mut ProgressReporter<F>,
    ) -> Result<IngestOutcome> {
        let count = sources.len();
        let mut loaded = Vec::with_capacity(count);
        let mut errors = Vec::new();

        for (i, source) in sources.iter().enumerate() {
            let label = source.identifier();
            let base = i as f64 / count as f64;
            let mut per_file = |p: f64| {
                reporter.report(
                    base + p / count as f64 * MULTI_FILE_DECODE_SHARE,
                    Some((i + 1, count)),
                    Some(label.as_str()),
                )
            };

            let result = self.decode_one(source, &mut per_file).await;
            match result {
                Ok(decoded) => loaded.push(decoded),
                Err(error) => {
                    warn!(source = %label, %error, "Failed to load point cloud source");
                    errors.push(SourceFailure { source: label, error });
                }
            }
        }

        if loaded.is_empty() {
            return Err(Error::NoDataAvailable {
                attempted: count,
                causes: errors.iter().map(|f| format!("{}: {}", f.source, f.error)).collect(),
            });
        }

        reporter.report(MULTI_FILE_DECODE_SHARE, Some((count, count)), Some(MERGING_LABEL));
        let outcome = self.build_outcome(&loaded, errors)?;
        reporter.report(1.0, Some((count, count)), Some(COMPLETE_LABEL));

        info!(
            points = outcome.dataset.total_points(),
            loaded = outcome.loaded_count,
            failed = outcome.failed_count,
            "Point cloud created"
        );
        Ok(outcome)
    }

    async fn decode_one(
        &self,
        source: &SourceLocator,
        progress: &mut dyn FnMut(f64),
    ) -> std::result::Result<DecodedSource, IoError> {
        let decoded = self
            .decoder
            .decode(source, self.options.decimation_stride, progress)
            .await?;
        if decoded.positions.len() % 3 != 0 {
            return Err(IoError::ParseError {
                message: format!(
                    "{} position values do not form whole points",
                    decoded.positions.len()
                ),
            });
        }
        Ok(decoded)
    }

    fn build_outcome(&self, loaded: &[DecodedSource], errors: Vec<SourceFailure>) -> Result<IngestOutcome> {
        let merged = merge_sources(loaded)?;
        let dataset = PointCloudDataset::new(
            merged.positions,
            merged.intensity,
            merged.rgb,
            merged.bounds,
            self.options.color_mode,
        )?;
        Ok(IngestOutcome {
            dataset,
            loaded_count: loaded.len(),
            failed_count: errors.len(),
            errors,
            warnings: merged.warnings,
        })
    }
}
