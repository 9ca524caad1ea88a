#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line tools for the county longitude band map.
//!
//! Writes the enriched county layer, static band layers, and animated
//! band transitions (one `GeoJSON` feature collection per line, in the
//! `GeoJSONSeq` style) to the output directory, and hosts the
//! interactive map session.

pub mod config;
pub mod interactive;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use county_bands_animation::clock::FrameClock;
use county_bands_animation::display::DisplaySource;
use county_bands_animation::{AnimationDriver, AnimationOutcome};
use county_bands_bands::{BandCollection, BandConfig, BandWidth, aggregate};
use county_bands_county::{County, CountyError, write_counties};
use county_bands_county_models::Metric;
use county_bands_map::{HeadlessMap, MapError};

/// Output file for the enriched county layer.
pub const OUTPUT_COUNTIES: &str = "counties.geojson";

/// Output file for a single band layer.
pub const OUTPUT_BANDS: &str = "lonbands.geojson";

/// Output file for animated band frames.
pub const OUTPUT_FRAMES: &str = "lonbands.geojsonseq";

/// Output file for the final state of an interactive session.
pub const OUTPUT_MAP_SNAPSHOT: &str = "map.json";

/// Narrowest width the band width slider allows.
pub const SLIDER_MIN: f64 = 0.1;

/// Widest width the band width slider allows.
pub const SLIDER_MAX: f64 = 10.0;

/// Errors from the command line tools.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Loading or writing counties failed.
    #[error(transparent)]
    County(#[from] CountyError),

    /// Serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The map rejected an update.
    #[error("Map error: {0}")]
    Map(#[from] MapError),

    /// Configuration was invalid.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

/// Creates `output_dir` if needed and returns `output_dir/name`.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn output_path(output_dir: &Path, name: &str) -> Result<PathBuf, CliError> {
    std::fs::create_dir_all(output_dir)?;
    Ok(output_dir.join(name))
}

/// Writes the enriched county layer.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn enrich(counties: &[County], output_dir: &Path) -> Result<PathBuf, CliError> {
    let path = output_path(output_dir, OUTPUT_COUNTIES)?;
    write_counties(&path, counties)?;
    Ok(path)
}

/// Aggregates one band layer and writes it as a feature collection.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_bands(
    counties: &[County],
    config: &BandConfig,
    output_dir: &Path,
) -> Result<(PathBuf, BandCollection), CliError> {
    let bands = aggregate(counties, config);
    let path = output_path(output_dir, OUTPUT_BANDS)?;
    std::fs::write(&path, serde_json::to_string(&bands.to_feature_collection())?)?;

    log::info!(
        "Wrote {} bands ({}° wide, {}) to {}",
        bands.bands.len(),
        config.width,
        config.metric,
        path.display()
    );
    Ok((path, bands))
}

/// [`DisplaySource`] that records every published frame as one line of
/// `GeoJSON`.
#[derive(Debug, Default)]
pub struct FrameSeqWriter {
    lines: Mutex<Vec<String>>,
}

impl FrameSeqWriter {
    /// Creates an empty frame buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines().len()
    }

    /// Whether no frame has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Writes the recorded frames to `path`, one per line.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<(), CliError> {
        let lines = self.lines();
        let mut contents = lines.join("\n");
        if !lines.is_empty() {
            contents.push('\n');
        }
        drop(lines);
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn lines(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DisplaySource for FrameSeqWriter {
    fn publish(&self, bands: BandCollection) {
        match serde_json::to_string(&bands.to_feature_collection()) {
            Ok(line) => self.lines().push(line),
            Err(e) => log::error!("Failed to serialize frame at {}°: {e}", bands.config.width),
        }
    }
}

/// Renders a width transition from `from` to `to` and writes every frame
/// to the frames output file.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub async fn animate(
    counties: Arc<[County]>,
    from: BandWidth,
    to: BandWidth,
    metric: Metric,
    steps: usize,
    clock: Arc<dyn FrameClock>,
    output_dir: &Path,
) -> Result<(PathBuf, AnimationOutcome), CliError> {
    let frames = Arc::new(FrameSeqWriter::new());
    let display: Arc<dyn DisplaySource> = frames.clone();
    let driver = AnimationDriver::new(counties, display, clock, from, steps);

    let outcome = driver.request(to, metric).run().await;

    let path = output_path(output_dir, OUTPUT_FRAMES)?;
    frames.write_to(&path)?;
    log::info!(
        "Wrote {} frames ({from}° -> {to}°, {metric}) to {}",
        frames.len(),
        path.display()
    );
    Ok((path, outcome))
}

/// Writes the state of a headless map to the snapshot output file.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn write_snapshot(map: &HeadlessMap, output_dir: &Path) -> Result<PathBuf, CliError> {
    let path = output_path(output_dir, OUTPUT_MAP_SNAPSHOT)?;
    std::fs::write(&path, serde_json::to_string_pretty(map)?)?;
    log::info!("Wrote map snapshot to {}", path.display());
    Ok(path)
}

/// Parses a band width slider value.
///
/// The slider moves in 0.1° steps between [`SLIDER_MIN`] and
/// [`SLIDER_MAX`]; values are rounded to the nearest step.
///
/// # Errors
///
/// Returns an error message if the value is not a number or lies outside
/// the slider range.
pub fn parse_slider_width(input: &str) -> Result<BandWidth, String> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|e| format!("Invalid band width '{input}': {e}"))?;
    let rounded = (value * 10.0).round() / 10.0;

    if !(SLIDER_MIN..=SLIDER_MAX).contains(&rounded) {
        return Err(format!(
            "Band width must be between {SLIDER_MIN} and {SLIDER_MAX} degrees"
        ));
    }

    BandWidth::new(rounded).map_err(|e| e.to_string())
}
