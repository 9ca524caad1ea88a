#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! County loading and geometry metrics preprocessing.
//!
//! Reads a `GeoJSON` feature collection of county boundaries and
//! annotates every county once with its area, centroid longitude,
//! population and density. The resulting [`County`] records are
//! immutable and feed both the county layer and the band aggregator.

pub mod geometry;
pub mod progress;

use std::path::Path;

use county_bands_county_models::{
    CountyMetrics, MetricSource, NAME_PROPERTIES, POPULATION_PROPERTY, SQ_METERS_PER_SQ_MILE,
};
use geo::MultiPolygon;
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};

use crate::progress::ProgressCallback;

/// Errors that can occur while loading counties.
#[derive(Debug, thiserror::Error)]
pub enum CountyError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not valid `GeoJSON`.
    #[error("GeoJSON parse error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input parsed but is not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,
}

/// A county boundary with its derived metrics.
#[derive(Debug, Clone)]
pub struct County {
    /// Display name from `NAME` or `County`, if present.
    pub name: Option<String>,
    /// County boundary.
    pub geometry: MultiPolygon<f64>,
    /// Metrics derived from the geometry and population.
    pub metrics: CountyMetrics,
    /// Properties from the source feature.
    pub properties: JsonObject,
}

impl County {
    /// Builds a county from a source feature, computing its metrics.
    ///
    /// Returns `None` when the feature has no `Polygon` or `MultiPolygon`
    /// geometry, or when that geometry has no vertices.
    #[must_use]
    pub fn from_feature(feature: &Feature) -> Option<Self> {
        let geometry = geometry::to_multipolygon(feature.geometry.as_ref()?)?;
        let centroid_lon = geometry::vertex_centroid_lon(&geometry)?;

        let properties = feature.properties.clone().unwrap_or_default();
        let area_sq_miles = geometry::area_sq_meters(&geometry) / SQ_METERS_PER_SQ_MILE;
        let population = parse_population(properties.get(POPULATION_PROPERTY));

        let metrics = CountyMetrics {
            area_sq_miles: round_to(area_sq_miles, 1),
            centroid_lon,
            population,
            density: round_to(density(population, area_sq_miles), 2),
        };

        let name = NAME_PROPERTIES
            .iter()
            .filter_map(|key| properties.get(*key).and_then(JsonValue::as_str))
            .find(|name| !name.is_empty())
            .map(str::to_string);

        Some(Self {
            name,
            geometry,
            metrics,
            properties,
        })
    }

    /// Name shown in popups.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed County")
    }

    /// Converts back into a `GeoJSON` feature carrying the source
    /// properties plus `area_sq_miles`, `centroid_lon`, `population` and
    /// `density`.
    #[must_use]
    pub fn to_feature(&self) -> Feature {
        let mut properties = self.properties.clone();
        properties.insert(
            "area_sq_miles".to_string(),
            JsonValue::from(self.metrics.area_sq_miles),
        );
        properties.insert(
            "centroid_lon".to_string(),
            JsonValue::from(self.metrics.centroid_lon),
        );
        properties.insert(
            "population".to_string(),
            JsonValue::from(self.metrics.population),
        );
        properties.insert("density".to_string(), JsonValue::from(self.metrics.density));

        Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::from(&self.geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }
}

impl MetricSource for County {
    fn metrics(&self) -> &CountyMetrics {
        &self.metrics
    }
}

/// Coerces a population property into a non-negative integer.
///
/// Numbers and numeric strings are accepted. Missing, unparsable,
/// negative or non-finite values become 0.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn parse_population(value: Option<&JsonValue>) -> u64 {
    let number = match value {
        Some(JsonValue::Number(n)) => n.as_f64(),
        Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    number
        .filter(|n| n.is_finite() && *n > 0.0)
        .map_or(0, |n| n.round() as u64)
}

/// Population per square mile, or 0 when the area is zero.
#[allow(clippy::cast_precision_loss)]
fn density(population: u64, area_sq_miles: f64) -> f64 {
    if area_sq_miles <= 0.0 {
        return 0.0;
    }
    let density = population as f64 / area_sq_miles;
    if density.is_finite() { density } else { 0.0 }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Enriches every county feature in the collection.
///
/// Features without polygon geometry, or whose polygons have no
/// vertices, are skipped with a warning.
#[must_use]
pub fn preprocess(collection: &FeatureCollection, progress: &dyn ProgressCallback) -> Vec<County> {
    progress.set_total(collection.features.len() as u64);

    let mut counties = Vec::with_capacity(collection.features.len());
    let mut skipped = 0_usize;

    for (idx, feature) in collection.features.iter().enumerate() {
        if let Some(county) = County::from_feature(feature) {
            counties.push(county);
        } else {
            skipped += 1;
            log::warn!("Skipping feature {idx}: missing or empty polygon geometry");
        }
        progress.inc(1);
    }

    log::info!(
        "Preprocessed {} counties ({skipped} skipped)",
        counties.len()
    );
    progress.finish(format!("{} counties", counties.len()));

    counties
}

/// Parses a `GeoJSON` feature collection string into enriched counties.
///
/// # Errors
///
/// Returns an error if the string is not valid `GeoJSON` or is not a
/// `FeatureCollection`.
pub fn parse_counties(
    geojson_str: &str,
    progress: &dyn ProgressCallback,
) -> Result<Vec<County>, CountyError> {
    match geojson_str.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => Ok(preprocess(&collection, progress)),
        _ => Err(CountyError::NotFeatureCollection),
    }
}

/// Reads and enriches the county feature collection at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_counties(
    path: &Path,
    progress: &dyn ProgressCallback,
) -> Result<Vec<County>, CountyError> {
    log::info!("Loading counties from {}", path.display());
    let contents = std::fs::read_to_string(path)?;
    parse_counties(&contents, progress)
}

/// Builds the county layer data: every county with its derived
/// properties.
#[must_use]
pub fn counties_to_feature_collection(counties: &[County]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: counties.iter().map(County::to_feature).collect(),
        foreign_members: None,
    }
}

/// Writes the enriched counties to `path` as a `GeoJSON` feature
/// collection.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub fn write_counties(path: &Path, counties: &[County]) -> Result<(), CountyError> {
    let collection = counties_to_feature_collection(counties);
    std::fs::write(path, serde_json::to_string(&collection)?)?;
    log::info!("Wrote {} counties to {}", counties.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::progress::NullProgress;

    fn county_feature(name: &str, population: &JsonValue, min_lon: f64) -> JsonValue {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[
                    [min_lon, 38.0],
                    [min_lon + 0.5, 38.0],
                    [min_lon + 0.5, 38.5],
                    [min_lon, 38.5],
                    [min_lon, 38.0]
                ]]
            },
            "properties": { "NAME": name, "Total Population": population }
        })
    }

    fn collection(features: Vec<JsonValue>) -> String {
        json!({ "type": "FeatureCollection", "features": features }).to_string()
    }

    #[test]
    fn enriches_county_metrics() {
        let input = collection(vec![county_feature("Ellis", &json!(28_000), -99.5)]);
        let counties = parse_counties(&input, &NullProgress).unwrap();
        assert_eq!(counties.len(), 1);

        let county = &counties[0];
        assert_eq!(county.display_name(), "Ellis");
        assert_eq!(county.metrics.population, 28_000);
        assert!((county.metrics.centroid_lon - -99.25).abs() < 1e-9);
        assert!(county.metrics.area_sq_miles > 900.0 && county.metrics.area_sq_miles < 1_000.0);

        let expected_density = 28_000.0 / county.metrics.area_sq_miles;
        assert!((county.metrics.density - expected_density).abs() < 0.1);
    }

    #[test]
    fn area_and_density_are_rounded() {
        let input = collection(vec![county_feature("Trego", &json!(2_800), -100.0)]);
        let county = &parse_counties(&input, &NullProgress).unwrap()[0];
        let area_tenths = county.metrics.area_sq_miles * 10.0;
        let density_hundredths = county.metrics.density * 100.0;
        assert!((area_tenths - area_tenths.round()).abs() < 1e-6);
        assert!((density_hundredths - density_hundredths.round()).abs() < 1e-6);
    }

    #[test]
    fn unparsable_population_becomes_zero() {
        let input = collection(vec![county_feature("Unknown", &json!("N/A"), -97.0)]);
        let county = &parse_counties(&input, &NullProgress).unwrap()[0];
        assert_eq!(county.metrics.population, 0);
        assert!(county.metrics.density.abs() < f64::EPSILON);

        let feature = county.to_feature();
        let properties = feature.properties.unwrap();
        assert_eq!(properties["population"], json!(0));
    }

    #[test]
    fn parses_population_variants() {
        assert_eq!(parse_population(Some(&json!(1234))), 1234);
        assert_eq!(parse_population(Some(&json!(" 5678 "))), 5678);
        assert_eq!(parse_population(Some(&json!(""))), 0);
        assert_eq!(parse_population(Some(&json!("1,234"))), 0);
        assert_eq!(parse_population(Some(&json!(-12))), 0);
        assert_eq!(parse_population(Some(&json!(null))), 0);
        assert_eq!(parse_population(Some(&json!("NaN"))), 0);
        assert_eq!(parse_population(None), 0);
    }

    #[test]
    fn zero_area_yields_zero_density() {
        assert!(density(50_000, 0.0).abs() < f64::EPSILON);
        assert!(density(50_000, f64::MIN_POSITIVE / 1e10).is_finite());
        assert!(density(0, 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn degenerate_geometry_has_zero_density() {
        let input = collection(vec![json!({
            "type": "Feature",
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-98.0, 38.0], [-97.0, 38.0], [-98.0, 38.0]]]
            },
            "properties": { "County": "Sliver", "Total Population": 1000 }
        })]);
        let county = &parse_counties(&input, &NullProgress).unwrap()[0];
        assert_eq!(county.display_name(), "Sliver");
        assert!(county.metrics.area_sq_miles.abs() < f64::EPSILON);
        assert!(county.metrics.density.abs() < f64::EPSILON);
    }

    #[test]
    fn skips_features_without_polygons() {
        let input = collection(vec![
            county_feature("Kept", &json!(10), -96.0),
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-96.0, 38.0] },
                "properties": {}
            }),
            json!({ "type": "Feature", "geometry": null, "properties": {} }),
            json!({
                "type": "Feature",
                "geometry": { "type": "MultiPolygon", "coordinates": [] },
                "properties": { "NAME": "Empty" }
            }),
        ]);
        let counties = parse_counties(&input, &NullProgress).unwrap();
        assert_eq!(counties.len(), 1);
        assert_eq!(counties[0].display_name(), "Kept");
    }

    #[test]
    fn unnamed_county_falls_back() {
        let input = collection(vec![county_feature("", &json!(10), -96.0)]);
        let county = &parse_counties(&input, &NullProgress).unwrap()[0];
        assert_eq!(county.display_name(), "Unnamed County");
    }

    #[test]
    fn rejects_non_collection_input() {
        let input = json!({ "type": "Point", "coordinates": [0.0, 0.0] }).to_string();
        assert!(matches!(
            parse_counties(&input, &NullProgress),
            Err(CountyError::NotFeatureCollection)
        ));
    }

    #[test]
    fn enriched_features_keep_source_properties() {
        let input = collection(vec![county_feature("Ness", &json!(2_700), -100.0)]);
        let counties = parse_counties(&input, &NullProgress).unwrap();
        let fc = counties_to_feature_collection(&counties);
        let properties = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(properties["NAME"], json!("Ness"));
        assert_eq!(properties["Total Population"], json!(2_700));
        assert!(properties.contains_key("area_sq_miles"));
        assert!(properties.contains_key("centroid_lon"));
        assert!(properties.contains_key("density"));
    }
}
