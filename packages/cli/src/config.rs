//! TOML configuration for the county bands tools.
//!
//! Every field is optional in the file; missing fields take their
//! defaults. Command-line flags override whatever the file sets.
//!
//! ```toml
//! input = "data/countypops.geojson"
//! output_dir = "data/generated"
//! band_width = 2.0
//! metric = "density"
//! animation_steps = 10
//! frame_interval_ms = 16
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use county_bands_animation::DEFAULT_STEPS;
use county_bands_bands::{BandError, BandWidth};
use county_bands_county_models::Metric;
use county_bands_map::ViewOptions;
use serde::{Deserialize, Serialize};

/// Environment variable naming a config file when `--config` is absent.
pub const CONFIG_ENV: &str = "COUNTY_BANDS_CONFIG";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`MapConfig`].
    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The configured band width is unusable.
    #[error(transparent)]
    Band(#[from] BandError),
}

/// Settings shared by every subcommand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MapConfig {
    /// County `GeoJSON` feature collection.
    pub input: PathBuf,
    /// Directory generated files are written to.
    pub output_dir: PathBuf,
    /// Initial band width in degrees.
    pub band_width: f64,
    /// Initial coloring metric.
    pub metric: Metric,
    /// Frames per band width transition.
    pub animation_steps: usize,
    /// Delay between animation frames.
    pub frame_interval_ms: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("countypops.geojson"),
            output_dir: PathBuf::from("data/generated"),
            band_width: 2.0,
            metric: Metric::Area,
            animation_steps: DEFAULT_STEPS,
            frame_interval_ms: 16,
        }
    }
}

impl MapConfig {
    /// The configured band width, validated.
    ///
    /// # Errors
    ///
    /// Returns an error if `band_width` is not finite or is below
    /// [`county_bands_bands::MIN_BAND_WIDTH`].
    pub fn band_width(&self) -> Result<BandWidth, ConfigError> {
        Ok(BandWidth::new(self.band_width)?)
    }

    /// Delay between animation frames.
    #[must_use]
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Initial view settings for the map controller.
    ///
    /// # Errors
    ///
    /// Returns an error if `band_width` is not finite or is below
    /// [`county_bands_bands::MIN_BAND_WIDTH`].
    pub fn view_options(&self) -> Result<ViewOptions, ConfigError> {
        Ok(ViewOptions {
            width: self.band_width()?,
            metric: self.metric,
            steps: self.animation_steps,
        })
    }
}

/// Parses a TOML config string.
///
/// # Errors
///
/// Returns an error if the string is not valid TOML, contains unknown
/// keys, or has an invalid band width.
pub fn parse_config(toml_str: &str) -> Result<MapConfig, ConfigError> {
    let config: MapConfig = toml::de::from_str(toml_str)?;
    config.band_width()?;
    Ok(config)
}

/// Loads configuration from `path`, falling back to the file named by
/// [`CONFIG_ENV`], and finally to defaults.
///
/// # Errors
///
/// Returns an error if a named config file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<MapConfig, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    let Some(path) = path else {
        log::debug!("No config file given, using defaults");
        return Ok(MapConfig::default());
    };

    log::info!("Loading config from {}", path.display());
    let contents = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    parse_config(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        assert_eq!(parse_config("").unwrap(), MapConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let config = parse_config(
            r#"
            input = "data/countypops.geojson"
            output_dir = "out"
            band_width = 0.5
            metric = "density"
            animation_steps = 20
            frame_interval_ms = 8
            "#,
        )
        .unwrap();

        assert_eq!(config.input, PathBuf::from("data/countypops.geojson"));
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.metric, Metric::Density);
        assert_eq!(config.animation_steps, 20);
        assert_eq!(config.frame_interval(), Duration::from_millis(8));
        assert_eq!(config.band_width().unwrap(), BandWidth::new(0.5).unwrap());
    }

    #[test]
    fn rejects_unusable_widths() {
        assert!(matches!(
            parse_config("band_width = 0.0"),
            Err(ConfigError::Band(_))
        ));
        assert!(matches!(
            parse_config("band_width = 1e-18"),
            Err(ConfigError::Band(_))
        ));
    }

    #[test]
    fn rejects_unknown_metric_and_keys() {
        assert!(matches!(
            parse_config("metric = \"elevation\""),
            Err(ConfigError::Toml(_))
        ));
        assert!(matches!(
            parse_config("colour = \"red\""),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_config(Some(Path::new("/nonexistent/county_bands.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
