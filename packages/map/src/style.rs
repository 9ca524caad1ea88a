//! Color ramps, paint expressions and layer definitions.

use county_bands_county_models::Metric;
use geojson::{JsonObject, JsonValue};
use serde_json::json;

use crate::adapter::{Layer, LayerKind};

/// Source holding the enriched counties.
pub const COUNTY_SOURCE: &str = "counties";
/// Source holding the aggregated longitude bands.
pub const BAND_SOURCE: &str = "lonbands";

/// County fill layer.
pub const COUNTY_FILL: &str = "county-fill";
/// County outline layer.
pub const COUNTY_BORDERS: &str = "county-borders";
/// Band fill layer.
pub const BAND_FILL: &str = "lonband-fill";
/// Band outline layer.
pub const BAND_BORDERS: &str = "lonband-borders";

/// Band property the band fill is colored by.
pub const BAND_VALUE_PROPERTY: &str = "avg_value";

/// Five-stop linear color ramp for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorRamp {
    /// Metric values at each stop, ascending.
    pub stops: [f64; 5],
    /// Hex color at each stop.
    pub colors: [&'static str; 5],
}

/// Returns the color ramp for a metric.
#[must_use]
pub const fn color_ramp(metric: Metric) -> ColorRamp {
    match metric {
        Metric::Area => ColorRamp {
            stops: [0.0, 500.0, 1_000.0, 2_000.0, 4_000.0],
            colors: ["#edf8fb", "#b2e2e2", "#66c2a4", "#238b45", "#00441b"],
        },
        Metric::Population => ColorRamp {
            stops: [0.0, 10_000.0, 50_000.0, 200_000.0, 1_000_000.0],
            colors: ["#fff5f0", "#fcbba1", "#fc9272", "#fb6a4a", "#a50f15"],
        },
        Metric::Density => ColorRamp {
            stops: [0.0, 10.0, 100.0, 500.0, 2_000.0],
            colors: ["#f7fcf5", "#c7e9c0", "#74c476", "#238b45", "#00441b"],
        },
    }
}

/// Builds an `interpolate`/`linear` expression over `property`.
#[must_use]
pub fn interpolate_expression(property: &str, ramp: &ColorRamp) -> JsonValue {
    let mut expression = vec![json!("interpolate"), json!(["linear"]), json!(["get", property])];
    for (stop, color) in ramp.stops.iter().zip(ramp.colors) {
        expression.push(json!(stop));
        expression.push(json!(color));
    }
    JsonValue::Array(expression)
}

/// Fill color expression for the county layer.
#[must_use]
pub fn county_fill_color(metric: Metric) -> JsonValue {
    interpolate_expression(metric.property(), &color_ramp(metric))
}

/// Fill color expression for the band layer.
#[must_use]
pub fn band_fill_color(metric: Metric) -> JsonValue {
    interpolate_expression(BAND_VALUE_PROPERTY, &color_ramp(metric))
}

/// `visibility` layout value.
#[must_use]
pub fn visibility(visible: bool) -> JsonValue {
    json!(if visible { "visible" } else { "none" })
}

fn object(value: JsonValue) -> JsonObject {
    match value {
        JsonValue::Object(map) => map,
        _ => JsonObject::new(),
    }
}

/// County fill and outline layers, visible.
#[must_use]
pub fn county_layers(metric: Metric) -> [Layer; 2] {
    [
        Layer {
            id: COUNTY_FILL.to_string(),
            kind: LayerKind::Fill,
            source: COUNTY_SOURCE.to_string(),
            paint: object(json!({
                "fill-color": county_fill_color(metric),
                "fill-opacity": 0.7,
            })),
            layout: JsonObject::new(),
        },
        Layer {
            id: COUNTY_BORDERS.to_string(),
            kind: LayerKind::Line,
            source: COUNTY_SOURCE.to_string(),
            paint: object(json!({ "line-color": "#333", "line-width": 0.4 })),
            layout: JsonObject::new(),
        },
    ]
}

/// Band fill and dashed outline layers, hidden.
#[must_use]
pub fn band_layers(metric: Metric) -> [Layer; 2] {
    [
        Layer {
            id: BAND_FILL.to_string(),
            kind: LayerKind::Fill,
            source: BAND_SOURCE.to_string(),
            paint: object(json!({
                "fill-color": band_fill_color(metric),
                "fill-opacity": 0.6,
            })),
            layout: object(json!({ "visibility": visibility(false) })),
        },
        Layer {
            id: BAND_BORDERS.to_string(),
            kind: LayerKind::Line,
            source: BAND_SOURCE.to_string(),
            paint: object(json!({
                "line-color": "#ff6600",
                "line-width": 1.5,
                "line-dasharray": [2, 2],
            })),
            layout: object(json!({ "visibility": visibility(false) })),
        },
    ]
}
