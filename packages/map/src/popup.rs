//! Popup content for clicked counties and bands.

use county_bands_bands::Band;
use county_bands_county::County;
use county_bands_county_models::Metric;

use crate::format::{escape_html, format_number};

/// An open popup anchored at a map position.
#[derive(Debug, Clone, PartialEq)]
pub struct Popup {
    /// Anchor as `[longitude, latitude]`.
    pub lng_lat: [f64; 2],
    /// Popup markup.
    pub html: String,
}

/// Popup markup for a county.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn county_popup_html(county: &County) -> String {
    let metrics = &county.metrics;
    format!(
        "<strong>{}</strong><br>\n\
         Area: {} sq mi<br>\n\
         Population: {}<br>\n\
         Density: {} /sq mi",
        escape_html(county.display_name()),
        format_number(metrics.area_sq_miles, 3),
        format_number(metrics.population as f64, 0),
        format_number(metrics.density, 3),
    )
}

/// Popup markup for a longitude band averaged over `metric`.
#[must_use]
pub fn band_popup_html(band: &Band, metric: Metric) -> String {
    format!(
        "<strong>Longitude Band</strong><br>\n\
         {:.1}° to {:.1}° W<br>\n\
         Average {metric}: {}",
        band.start,
        band.end,
        format_number(band.avg_value, 1),
    )
}

#[cfg(test)]
mod tests {
    use county_bands_county_models::CountyMetrics;
    use geo::MultiPolygon;
    use geojson::JsonObject;

    use super::*;

    fn county(name: Option<&str>, population: u64) -> County {
        County {
            name: name.map(str::to_string),
            geometry: MultiPolygon(vec![]),
            metrics: CountyMetrics {
                area_sq_miles: 1_234.5,
                centroid_lon: -99.0,
                population,
                density: 20.25,
            },
            properties: JsonObject::new(),
        }
    }

    #[test]
    fn county_popup_lists_metrics() {
        let html = county_popup_html(&county(Some("Ellis"), 28_553));
        assert_eq!(
            html,
            "<strong>Ellis</strong><br>\nArea: 1,234.5 sq mi<br>\n\
             Population: 28,553<br>\nDensity: 20.25 /sq mi"
        );
    }

    #[test]
    fn county_popup_shows_zero_population() {
        let html = county_popup_html(&county(None, 0));
        assert!(html.contains("<strong>Unnamed County</strong>"));
        assert!(html.contains("Population: 0<br>"));
    }

    #[test]
    fn county_name_is_escaped() {
        let html = county_popup_html(&county(Some("<script>"), 1));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn band_popup_rounds_values() {
        let band = Band {
            start: -100.0,
            end: -98.0,
            avg_value: 52_345.678,
            member_count: 3,
            valid_count: 3,
        };
        let html = band_popup_html(&band, Metric::Population);
        assert!(html.contains("-100.0° to -98.0° W"));
        assert!(html.ends_with("Average population: 52,345.7"));

        let tie = Band {
            avg_value: 12.25,
            ..band
        };
        assert!(band_popup_html(&tie, Metric::Density).ends_with("Average density: 12.3"));
    }
}
