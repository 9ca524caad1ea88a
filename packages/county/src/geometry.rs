//! Geometry measurements for county boundaries.

use geo::{ChamberlainDuquetteArea, Coord, LineString, MultiPolygon};

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
///
/// Handles both `Polygon` and `MultiPolygon`; anything else yields `None`.
#[must_use]
pub fn to_multipolygon(geometry: &geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Spherical area of the boundary in square meters.
///
/// Holes are subtracted from their exterior ring.
#[must_use]
pub fn area_sq_meters(mp: &MultiPolygon<f64>) -> f64 {
    mp.chamberlain_duquette_unsigned_area()
}

/// Mean longitude of every ring vertex, ignoring the closing vertex of
/// each ring.
///
/// Returns `None` for a geometry without coordinates.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn vertex_centroid_lon(mp: &MultiPolygon<f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0_usize;

    for polygon in &mp.0 {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            for coord in ring_vertices(ring) {
                sum += coord.x;
                count += 1;
            }
        }
    }

    (count > 0).then(|| sum / count as f64)
}

fn ring_vertices(ring: &LineString<f64>) -> &[Coord<f64>] {
    let coords = ring.0.as_slice();
    if coords.len() > 1 && coords.first() == coords.last() {
        &coords[..coords.len() - 1]
    } else {
        coords
    }
}

#[cfg(test)]
mod tests {
    use geo::{LineString, Polygon};

    use super::*;

    fn square(min_x: f64, min_y: f64, size: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (min_x, min_y),
                (min_x + size, min_y),
                (min_x + size, min_y + size),
                (min_x, min_y + size),
                (min_x, min_y),
            ]),
            vec![],
        )
    }

    #[test]
    fn centroid_ignores_closing_vertex() {
        let mp = MultiPolygon(vec![square(-100.0, 40.0, 2.0)]);
        let lon = vertex_centroid_lon(&mp).unwrap();
        assert!((lon - -99.0).abs() < 1e-12);
    }

    #[test]
    fn centroid_of_empty_geometry_is_none() {
        assert!(vertex_centroid_lon(&MultiPolygon::<f64>(vec![])).is_none());
    }

    #[test]
    fn one_degree_cell_area_is_plausible() {
        // A 1x1 degree cell at 40N covers roughly 3,640 square miles.
        let mp = MultiPolygon(vec![square(-100.0, 40.0, 1.0)]);
        let sq_mi = area_sq_meters(&mp) / county_bands_county_models::SQ_METERS_PER_SQ_MILE;
        assert!(sq_mi > 3_500.0 && sq_mi < 3_800.0, "{sq_mi}");
    }

    #[test]
    fn degenerate_polygon_has_zero_area() {
        let line = Polygon::new(
            LineString::from(vec![(-100.0, 40.0), (-99.0, 40.0), (-100.0, 40.0)]),
            vec![],
        );
        assert!(area_sq_meters(&MultiPolygon(vec![line])).abs() < 1e-6);
    }

    #[test]
    fn converts_polygon_geometry() {
        let geometry = geojson::Geometry::new(geojson::Value::Polygon(vec![vec![
            vec![-100.0, 40.0],
            vec![-99.0, 40.0],
            vec![-99.0, 41.0],
            vec![-100.0, 40.0],
        ]]));
        let mp = to_multipolygon(&geometry).unwrap();
        assert_eq!(mp.0.len(), 1);
    }

    #[test]
    fn rejects_point_geometry() {
        let geometry = geojson::Geometry::new(geojson::Value::Point(vec![-100.0, 40.0]));
        assert!(to_multipolygon(&geometry).is_none());
    }
}
