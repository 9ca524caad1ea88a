//! Legend content for the current metric and view.

use county_bands_county_models::{Metric, ViewMode};

use crate::format::format_number;
use crate::style::color_ramp;

/// One swatch of the legend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendEntry {
    /// Metric value at this stop.
    pub value: f64,
    /// Swatch color.
    pub color: &'static str,
}

/// Legend for a metric in a view mode.
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    /// Metric the map is colored by.
    pub metric: Metric,
    /// Active view.
    pub mode: ViewMode,
    /// Swatches in ascending order.
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    /// Builds the legend for `metric` shown in `mode`.
    #[must_use]
    pub fn new(metric: Metric, mode: ViewMode) -> Self {
        let ramp = color_ramp(metric);
        let entries = ramp
            .stops
            .iter()
            .zip(ramp.colors)
            .map(|(value, color)| LegendEntry {
                value: *value,
                color,
            })
            .collect();

        Self {
            metric,
            mode,
            entries,
        }
    }

    /// Legend heading, e.g. `"Color by Population"`.
    #[must_use]
    pub fn title(&self) -> String {
        format!("Color by {}", self.metric.label())
    }

    /// Caveat shown when bands average population.
    #[must_use]
    pub fn note(&self) -> Option<&'static str> {
        (self.metric == Metric::Population && self.mode == ViewMode::Band).then_some(
            "Longitude bands show average county population, not population density.",
        )
    }

    /// Renders the legend markup.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = format!("<div class=\"legend-title\">{}</div>", self.title());
        for entry in &self.entries {
            html.push_str(&format!(
                "<div><span class=\"legend-color\" style=\"background:{}\"></span>{}</div>",
                entry.color,
                format_number(entry.value, 3)
            ));
        }
        if self.note().is_some() {
            html.push_str(
                "<div class=\"legend-note\">Note: Longitude bands show \
                 <strong>average county population</strong>, not population density.</div>",
            );
        }
        html
    }
}

impl std::fmt::Display for Legend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.title())?;
        for entry in &self.entries {
            writeln!(f, "  {} {}", entry.color, format_number(entry.value, 3))?;
        }
        if let Some(note) = self.note() {
            writeln!(f, "  Note: {note}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area_legend_html() {
        let html = Legend::new(Metric::Area, ViewMode::County).to_html();
        assert!(html.starts_with("<div class=\"legend-title\">Color by Area</div>"));
        assert!(html.contains("style=\"background:#00441b\"></span>4,000</div>"));
        assert!(!html.contains("legend-note"));
    }

    #[test]
    fn population_band_legend_has_note() {
        let legend = Legend::new(Metric::Population, ViewMode::Band);
        assert!(legend.note().is_some());
        let html = legend.to_html();
        assert!(html.contains("1,000,000"));
        assert!(html.contains("<strong>average county population</strong>"));

        assert!(Legend::new(Metric::Population, ViewMode::County).note().is_none());
        assert!(Legend::new(Metric::Density, ViewMode::Band).note().is_none());
    }

    #[test]
    fn text_rendering_lists_every_stop() {
        let text = Legend::new(Metric::Density, ViewMode::County).to_string();
        assert_eq!(text.lines().count(), 6);
        assert!(text.contains("#74c476 100"));
    }
}
