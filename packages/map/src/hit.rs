//! Point lookups against county boundaries.

use std::sync::Arc;

use county_bands_county::County;
use geo::{BoundingRect, Contains};
use rstar::{AABB, RTree, RTreeObject};

/// A county's bounding box stored in the R-tree.
struct CountyEntry {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for CountyEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over county bounding boxes for point-in-polygon hit testing.
pub struct CountyIndex {
    counties: Arc<[County]>,
    tree: RTree<CountyEntry>,
}

impl CountyIndex {
    /// Indexes every county with a non-empty boundary.
    #[must_use]
    pub fn build(counties: Arc<[County]>) -> Self {
        let entries = counties
            .iter()
            .enumerate()
            .filter_map(|(index, county)| {
                let rect = county.geometry.bounding_rect()?;
                Some(CountyEntry {
                    index,
                    envelope: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();

        Self {
            counties,
            tree: RTree::bulk_load(entries),
        }
    }

    /// Finds the county containing the point.
    ///
    /// Counties tile without overlap, so the first match wins.
    #[must_use]
    pub fn lookup(&self, lng: f64, lat: f64) -> Option<&County> {
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .map(|entry| &self.counties[entry.index])
            .find(|county| county.geometry.contains(&point))
    }
}

#[cfg(test)]
mod tests {
    use county_bands_county::progress::NullProgress;
    use county_bands_county::parse_counties;
    use serde_json::json;

    use super::*;

    fn counties() -> Arc<[County]> {
        let features: Vec<_> = [("West", -100.0), ("East", -99.0)]
            .iter()
            .map(|(name, min_lon)| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[
                            [min_lon, 38.0],
                            [min_lon + 1.0, 38.0],
                            [min_lon + 1.0, 39.0],
                            [min_lon, 39.0],
                            [min_lon, 38.0]
                        ]]
                    },
                    "properties": { "NAME": name }
                })
            })
            .collect();
        let input = json!({ "type": "FeatureCollection", "features": features }).to_string();
        parse_counties(&input, &NullProgress).unwrap().into()
    }

    #[test]
    fn finds_containing_county() {
        let index = CountyIndex::build(counties());
        assert_eq!(index.lookup(-99.5, 38.5).unwrap().display_name(), "West");
        assert_eq!(index.lookup(-98.5, 38.5).unwrap().display_name(), "East");
    }

    #[test]
    fn misses_outside_points() {
        let index = CountyIndex::build(counties());
        assert!(index.lookup(-97.5, 38.5).is_none());
        assert!(index.lookup(-99.5, 40.0).is_none());
    }
}
