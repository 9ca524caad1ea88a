#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Terminal output for the `county_bands` binary.
//!
//! Log records and the county preprocessing bar are drawn through one
//! [`MultiProgress`], so a warning about a skipped feature never tears
//! the bar.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use county_bands_county::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Counts enriched county features while the input file is preprocessed.
pub struct CountyProgressBar {
    bar: ProgressBar,
    counting: ProgressStyle,
}

impl CountyProgressBar {
    /// Spinner labelled with the input file name until the feature count
    /// arrives, then a `counties/total` bar.
    #[must_use]
    pub fn preprocessing(multi: &MultiProgress, input: &Path) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        let name = input
            .file_name()
            .map_or_else(|| input.display().to_string(), |name| name.to_string_lossy().into_owned());
        bar.set_message(format!("Reading {name}"));

        let counting = ProgressStyle::with_template(
            "  {msg} {wide_bar:.green/dim} {pos}/{len} counties [{elapsed}]",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");

        Arc::new(Self { bar, counting })
    }
}

impl ProgressCallback for CountyProgressBar {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.counting.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(format!("Enriched {msg}"));
    }
}

/// Installs `pretty_env_logger` (filtered by `RUST_LOG`) behind the
/// returned [`MultiProgress`].
///
/// Calling it twice keeps the first logger.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let multi = MultiProgress::new();

    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    if indicatif_log_bridge::LogWrapper::new(multi.clone(), logger)
        .try_init()
        .is_ok()
    {
        log::set_max_level(level);
    }

    multi
}
