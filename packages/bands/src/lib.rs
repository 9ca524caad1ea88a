#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Longitude band aggregation.
//!
//! Groups counties into fixed-width longitude bands by centroid and
//! averages the selected metric per band. Only bands that contain at
//! least one county are produced. Every call builds a new
//! [`BandCollection`] from scratch, so a collection never mixes widths
//! or metrics.

use std::collections::BTreeMap;

use county_bands_county_models::{Metric, MetricSource};
use geo::{LineString, Polygon};
use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Southern edge of every band polygon.
pub const BAND_MIN_LAT: f64 = 25.0;

/// Northern edge of every band polygon.
pub const BAND_MAX_LAT: f64 = 49.0;

/// Narrowest accepted band width in degrees.
///
/// Keeps `lon / width` for any longitude well inside the `i64` band
/// index range.
pub const MIN_BAND_WIDTH: f64 = 1e-6;

/// Errors produced by band aggregation inputs.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum BandError {
    /// Band width must be finite and at least [`MIN_BAND_WIDTH`].
    #[error("invalid band width {width}: expected a finite number of degrees, at least 0.000001")]
    InvalidWidth {
        /// The rejected width.
        width: f64,
    },
}

/// A validated band width in degrees of longitude.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct BandWidth(f64);

impl BandWidth {
    /// Creates a band width.
    ///
    /// # Errors
    ///
    /// Returns [`BandError::InvalidWidth`] if `degrees` is not finite or
    /// is below [`MIN_BAND_WIDTH`].
    pub fn new(degrees: f64) -> Result<Self, BandError> {
        if degrees.is_finite() && degrees >= MIN_BAND_WIDTH {
            Ok(Self(degrees))
        } else {
            Err(BandError::InvalidWidth { width: degrees })
        }
    }

    /// Returns the width in degrees.
    #[must_use]
    pub const fn degrees(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for BandWidth {
    type Error = BandError;

    fn try_from(degrees: f64) -> Result<Self, Self::Error> {
        Self::new(degrees)
    }
}

impl From<BandWidth> for f64 {
    fn from(width: BandWidth) -> Self {
        width.0
    }
}

impl std::fmt::Display for BandWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}

/// View configuration for a single aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandConfig {
    /// Band width in degrees.
    pub width: BandWidth,
    /// Metric averaged per band.
    pub metric: Metric,
}

/// One longitude band and its averaged metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    /// Western edge (a multiple of the band width).
    pub start: f64,
    /// Eastern edge (`start + width`).
    pub end: f64,
    /// Mean of the strictly positive member values, or 0.
    pub avg_value: f64,
    /// Counties whose centroid falls in this band.
    pub member_count: usize,
    /// Members that contributed to the average.
    pub valid_count: usize,
}

impl Band {
    fn from_values(start: f64, width: f64, values: &[f64]) -> Self {
        let (avg_value, valid_count) = positive_mean(values);
        Self {
            start,
            end: start + width,
            avg_value,
            member_count: values.len(),
            valid_count,
        }
    }

    /// Whether `lon` falls in `[start, end)`.
    #[must_use]
    pub fn contains(&self, lon: f64) -> bool {
        self.start <= lon && lon < self.end
    }

    /// Rectangle covering this band between [`BAND_MIN_LAT`] and
    /// [`BAND_MAX_LAT`].
    #[must_use]
    pub fn polygon(&self) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (self.start, BAND_MIN_LAT),
                (self.end, BAND_MIN_LAT),
                (self.end, BAND_MAX_LAT),
                (self.start, BAND_MAX_LAT),
                (self.start, BAND_MIN_LAT),
            ]),
            vec![],
        )
    }

    /// Converts into a `GeoJSON` feature with `avg_value`, `bandStart`
    /// and `bandEnd` properties.
    #[must_use]
    pub fn to_feature(&self) -> Feature {
        let mut properties = JsonObject::new();
        properties.insert("avg_value".to_string(), JsonValue::from(self.avg_value));
        properties.insert("bandStart".to_string(), JsonValue::from(self.start));
        properties.insert("bandEnd".to_string(), JsonValue::from(self.end));

        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.polygon()))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

/// The bands produced by one aggregation pass, ordered west to east.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandCollection {
    /// Configuration the bands were computed with.
    pub config: BandConfig,
    /// Non-empty bands in ascending longitude order.
    pub bands: Vec<Band>,
}

impl BandCollection {
    /// Finds the band containing `lon`, if any county landed there.
    #[must_use]
    pub fn band_for(&self, lon: f64) -> Option<&Band> {
        self.bands.iter().find(|band| band.contains(lon))
    }

    /// Converts into the `GeoJSON` feature collection used as the band
    /// layer's data source.
    #[must_use]
    pub fn to_feature_collection(&self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.bands.iter().map(Band::to_feature).collect(),
            foreign_members: None,
        }
    }
}

/// Index of the band containing `lon`, i.e. `floor(lon / width)`.
///
/// Nudged by one when floating point division lands on the wrong side
/// of a boundary, so `index * width <= lon < index * width + width`.
/// Quotients beyond the `i64` range saturate instead of overflowing.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn band_index(lon: f64, width: f64) -> i64 {
    let index = (lon / width).floor() as i64;
    let start = index as f64 * width;
    if start > lon {
        index.saturating_sub(1)
    } else if start + width <= lon {
        index.saturating_add(1)
    } else {
        index
    }
}

/// Mean of the strictly positive values and how many there were.
///
/// Zero, negative and NaN values are treated as missing. An empty
/// selection averages to 0.
#[allow(clippy::cast_precision_loss)]
fn positive_mean(values: &[f64]) -> (f64, usize) {
    let (sum, count) = values
        .iter()
        .filter(|v| **v > 0.0)
        .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));

    if count == 0 {
        (0.0, 0)
    } else {
        (sum / count as f64, count)
    }
}

/// Groups `records` into longitude bands and averages the configured
/// metric per band.
///
/// The result depends only on the arguments. Records with a non-finite
/// centroid longitude are skipped.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate<T: MetricSource>(records: &[T], config: &BandConfig) -> BandCollection {
    let width = config.width.degrees();
    let mut groups: BTreeMap<i64, Vec<f64>> = BTreeMap::new();

    for record in records {
        let metrics = record.metrics();
        if !metrics.centroid_lon.is_finite() {
            log::warn!("Skipping county with non-finite centroid longitude");
            continue;
        }
        groups
            .entry(band_index(metrics.centroid_lon, width))
            .or_default()
            .push(metrics.value(config.metric));
    }

    let bands: Vec<Band> = groups
        .into_iter()
        .map(|(index, values)| Band::from_values(index as f64 * width, width, &values))
        .collect();

    log::debug!(
        "Aggregated {} counties into {} bands (width={}, metric={})",
        records.len(),
        bands.len(),
        config.width,
        config.metric
    );

    BandCollection {
        config: *config,
        bands,
    }
}
