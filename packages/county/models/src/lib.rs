#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County metric types shared across the county bands workspace.
//!
//! Defines the closed [`Metric`] selection that drives both county
//! coloring and band averaging, the derived per-county [`CountyMetrics`],
//! and the [`ViewMode`] toggled by the map controls.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Square meters in one square mile.
pub const SQ_METERS_PER_SQ_MILE: f64 = 2_589_988.11;

/// Source property holding the county population.
pub const POPULATION_PROPERTY: &str = "Total Population";

/// Source properties checked, in order, for a county display name.
pub const NAME_PROPERTIES: &[&str] = &["NAME", "County"];

/// The attribute used to color counties and to average bands.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Metric {
    /// Land area in square miles.
    #[default]
    Area,
    /// Total population.
    Population,
    /// Population per square mile.
    Density,
}

impl Metric {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Area, Self::Population, Self::Density]
    }

    /// Name of the enriched county property carrying this metric.
    #[must_use]
    pub const fn property(self) -> &'static str {
        match self {
            Self::Area => "area_sq_miles",
            Self::Population => "population",
            Self::Density => "density",
        }
    }

    /// Human-readable label (e.g. `"Population"`).
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Area => "Area",
            Self::Population => "Population",
            Self::Density => "Density",
        }
    }
}

/// Which layer pair the map is currently showing.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViewMode {
    /// Each county colored individually.
    #[default]
    County,
    /// Counties aggregated into longitude bands.
    Band,
}

impl ViewMode {
    /// Returns the other view mode.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::County => Self::Band,
            Self::Band => Self::County,
        }
    }
}

/// Derived numeric attributes of a single county.
///
/// Computed once during preprocessing and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountyMetrics {
    /// Land area in square miles, one decimal place.
    pub area_sq_miles: f64,
    /// Centroid longitude in signed degrees.
    pub centroid_lon: f64,
    /// Total population (0 when missing or unparsable).
    pub population: u64,
    /// Population per square mile, two decimal places (0 for zero area).
    pub density: f64,
}

impl CountyMetrics {
    /// Returns the value of the selected metric.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Area => self.area_sq_miles,
            Metric::Population => self.population as f64,
            Metric::Density => self.density,
        }
    }
}

/// Anything that carries precomputed [`CountyMetrics`].
pub trait MetricSource {
    /// Returns the derived metrics for this record.
    fn metrics(&self) -> &CountyMetrics;
}

impl MetricSource for CountyMetrics {
    fn metrics(&self) -> &CountyMetrics {
        self
    }
}
