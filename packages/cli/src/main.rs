#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line entry point for the county longitude band map.
//!
//! Loads and enriches the county `GeoJSON`, then writes the county layer,
//! a band layer, an animated band transition, or the legend, or starts
//! an interactive map session. Settings come from the TOML config file
//! and can be overridden per run with flags.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use county_bands_animation::clock::IntervalClock;
use county_bands_bands::{BandConfig, BandWidth};
use county_bands_cli::config::{MapConfig, load_config};
use county_bands_cli::{animate, enrich, interactive, write_bands};
use county_bands_cli_utils::{CountyProgressBar, MultiProgress};
use county_bands_county::{County, load_counties};
use county_bands_county_models::{Metric, ViewMode};
use county_bands_map::Legend;

#[derive(Parser)]
#[command(name = "county_bands", about = "County longitude band map tools")]
struct Cli {
    /// TOML config file (defaults to `$COUNTY_BANDS_CONFIG`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// County `GeoJSON` feature collection
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Directory to write outputs to
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write counties with derived area, centroid, population and density
    Enrich,
    /// Aggregate counties into longitude bands
    Bands {
        /// Band width in degrees
        #[arg(long)]
        width: Option<f64>,
        /// Metric to average (area, population, density)
        #[arg(long)]
        metric: Option<Metric>,
    },
    /// Render an animated band width transition as `GeoJSONSeq` frames
    Animate {
        /// Starting band width (defaults to the configured width)
        #[arg(long)]
        from: Option<f64>,
        /// Target band width
        #[arg(long)]
        to: f64,
        /// Metric to average (area, population, density)
        #[arg(long)]
        metric: Option<Metric>,
        /// Frames in the transition
        #[arg(long)]
        steps: Option<usize>,
    },
    /// Print the legend for a metric and view mode
    Legend {
        /// Metric to describe (area, population, density)
        #[arg(long)]
        metric: Option<Metric>,
        /// View mode (county, band)
        #[arg(long, default_value_t = ViewMode::County)]
        mode: ViewMode,
        /// Print HTML instead of text
        #[arg(long)]
        html: bool,
    },
    /// Explore the map from the terminal
    Interactive,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = county_bands_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(input) = cli.input {
        config.input = input;
    }
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }

    match cli.command {
        Commands::Enrich => {
            let counties = read_counties(&config, &multi)?;
            enrich(&counties, &config.output_dir)?;
        }
        Commands::Bands { width, metric } => {
            let counties = read_counties(&config, &multi)?;
            let band_config = BandConfig {
                width: width.map_or_else(|| config.band_width(), |w| Ok(BandWidth::new(w)?))?,
                metric: metric.unwrap_or(config.metric),
            };
            write_bands(&counties, &band_config, &config.output_dir)?;
        }
        Commands::Animate {
            from,
            to,
            metric,
            steps,
        } => {
            let from = from.map_or_else(|| config.band_width(), |w| Ok(BandWidth::new(w)?))?;
            let to = BandWidth::new(to)?;
            let counties: Arc<[County]> = read_counties(&config, &multi)?.into();
            animate(
                counties,
                from,
                to,
                metric.unwrap_or(config.metric),
                steps.unwrap_or(config.animation_steps),
                Arc::new(IntervalClock::new(config.frame_interval())),
                &config.output_dir,
            )
            .await?;
        }
        Commands::Legend { metric, mode, html } => {
            let legend = Legend::new(metric.unwrap_or(config.metric), mode);
            if html {
                println!("{}", legend.to_html());
            } else {
                println!("{legend}");
            }
        }
        Commands::Interactive => {
            let counties: Arc<[County]> = read_counties(&config, &multi)?.into();
            interactive::run(counties, &config).await?;
        }
    }

    Ok(())
}

fn read_counties(
    config: &MapConfig,
    multi: &MultiProgress,
) -> Result<Vec<County>, Box<dyn std::error::Error>> {
    let progress = CountyProgressBar::preprocessing(multi, &config.input);
    let counties = load_counties(&config.input, progress.as_ref())?;
    if counties.is_empty() {
        log::warn!("No polygon counties found in {}", config.input.display());
    }
    Ok(counties)
}
