//! The rendering surface the map controls drive.
//!
//! [`MapAdapter`] mirrors the handful of map-library calls the controls
//! need: registering `GeoJSON` sources and layers, switching paint and
//! layout properties, and replacing a source's data. [`HeadlessMap`]
//! implements it in memory and can be serialized as a snapshot of the
//! final map state.

use std::collections::BTreeMap;

use geojson::{GeoJson, JsonObject, JsonValue};
use serde::{Deserialize, Serialize};

/// Errors raised by a [`MapAdapter`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    /// No source with this id has been added.
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// No layer with this id has been added.
    #[error("Unknown layer: {0}")]
    UnknownLayer(String),

    /// A source with this id already exists.
    #[error("Source already exists: {0}")]
    DuplicateSource(String),

    /// A layer with this id already exists.
    #[error("Layer already exists: {0}")]
    DuplicateLayer(String),
}

/// How a layer draws its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Filled polygons.
    Fill,
    /// Polygon outlines.
    Line,
}

/// A style layer bound to a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer id (e.g. `"county-fill"`).
    pub id: String,
    /// Drawing type.
    #[serde(rename = "type")]
    pub kind: LayerKind,
    /// Source id the layer draws.
    pub source: String,
    /// Paint properties.
    pub paint: JsonObject,
    /// Layout properties.
    pub layout: JsonObject,
}

/// Operations the map controls perform on the rendering library.
pub trait MapAdapter: Send {
    /// Registers a `GeoJSON` source.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateSource`] if the id is taken.
    fn add_source(&mut self, id: &str, data: GeoJson) -> Result<(), MapError>;

    /// Adds a style layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the layer id is taken or its source is unknown.
    fn add_layer(&mut self, layer: Layer) -> Result<(), MapError>;

    /// Sets one paint property of a layer.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnknownLayer`] if the layer does not exist.
    fn set_paint_property(
        &mut self,
        layer: &str,
        property: &str,
        value: JsonValue,
    ) -> Result<(), MapError>;

    /// Sets one layout property of a layer.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnknownLayer`] if the layer does not exist.
    fn set_layout_property(
        &mut self,
        layer: &str,
        property: &str,
        value: JsonValue,
    ) -> Result<(), MapError>;

    /// Replaces the data of an existing source.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnknownSource`] if the source does not exist.
    fn set_source_data(&mut self, id: &str, data: GeoJson) -> Result<(), MapError>;
}

/// In-memory [`MapAdapter`] that records the resulting map state.
#[derive(Debug, Default, Serialize)]
pub struct HeadlessMap {
    sources: BTreeMap<String, GeoJson>,
    layers: Vec<Layer>,
    /// Number of `set_source_data` calls per source.
    source_updates: BTreeMap<String, usize>,
}

impl HeadlessMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current data of a source.
    #[must_use]
    pub fn source(&self, id: &str) -> Option<&GeoJson> {
        self.sources.get(id)
    }

    /// A layer by id.
    #[must_use]
    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id == id)
    }

    /// All layers in insertion order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// How many times a source's data has been replaced.
    #[must_use]
    pub fn source_updates(&self, id: &str) -> usize {
        self.source_updates.get(id).copied().unwrap_or(0)
    }

    fn layer_mut(&mut self, id: &str) -> Result<&mut Layer, MapError> {
        self.layers
            .iter_mut()
            .find(|layer| layer.id == id)
            .ok_or_else(|| MapError::UnknownLayer(id.to_string()))
    }
}

impl MapAdapter for HeadlessMap {
    fn add_source(&mut self, id: &str, data: GeoJson) -> Result<(), MapError> {
        if self.sources.contains_key(id) {
            return Err(MapError::DuplicateSource(id.to_string()));
        }
        self.sources.insert(id.to_string(), data);
        Ok(())
    }

    fn add_layer(&mut self, layer: Layer) -> Result<(), MapError> {
        if self.layer(&layer.id).is_some() {
            return Err(MapError::DuplicateLayer(layer.id));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(MapError::UnknownSource(layer.source));
        }
        self.layers.push(layer);
        Ok(())
    }

    fn set_paint_property(
        &mut self,
        layer: &str,
        property: &str,
        value: JsonValue,
    ) -> Result<(), MapError> {
        self.layer_mut(layer)?
            .paint
            .insert(property.to_string(), value);
        Ok(())
    }

    fn set_layout_property(
        &mut self,
        layer: &str,
        property: &str,
        value: JsonValue,
    ) -> Result<(), MapError> {
        self.layer_mut(layer)?
            .layout
            .insert(property.to_string(), value);
        Ok(())
    }

    fn set_source_data(&mut self, id: &str, data: GeoJson) -> Result<(), MapError> {
        let Some(source) = self.sources.get_mut(id) else {
            return Err(MapError::UnknownSource(id.to_string()));
        };
        *source = data;
        *self.source_updates.entry(id.to_string()).or_default() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use geojson::FeatureCollection;
    use serde_json::json;

    use super::*;

    fn empty() -> GeoJson {
        GeoJson::FeatureCollection(FeatureCollection {
            bbox: None,
            features: vec![],
            foreign_members: None,
        })
    }

    fn fill_layer(id: &str, source: &str) -> Layer {
        Layer {
            id: id.to_string(),
            kind: LayerKind::Fill,
            source: source.to_string(),
            paint: JsonObject::new(),
            layout: JsonObject::new(),
        }
    }

    #[test]
    fn set_data_requires_existing_source() {
        let mut map = HeadlessMap::new();
        assert_eq!(
            map.set_source_data("lonbands", empty()),
            Err(MapError::UnknownSource("lonbands".to_string()))
        );

        map.add_source("lonbands", empty()).unwrap();
        map.set_source_data("lonbands", empty()).unwrap();
        map.set_source_data("lonbands", empty()).unwrap();
        assert_eq!(map.source_updates("lonbands"), 2);
    }

    #[test]
    fn rejects_duplicates_and_dangling_layers() {
        let mut map = HeadlessMap::new();
        map.add_source("counties", empty()).unwrap();
        assert!(matches!(
            map.add_source("counties", empty()),
            Err(MapError::DuplicateSource(_))
        ));
        assert!(matches!(
            map.add_layer(fill_layer("orphan", "missing")),
            Err(MapError::UnknownSource(_))
        ));

        map.add_layer(fill_layer("county-fill", "counties")).unwrap();
        assert!(matches!(
            map.add_layer(fill_layer("county-fill", "counties")),
            Err(MapError::DuplicateLayer(_))
        ));
    }

    #[test]
    fn records_paint_and_layout() {
        let mut map = HeadlessMap::new();
        map.add_source("counties", empty()).unwrap();
        map.add_layer(fill_layer("county-fill", "counties")).unwrap();

        map.set_paint_property("county-fill", "fill-opacity", json!(0.5))
            .unwrap();
        map.set_layout_property("county-fill", "visibility", json!("none"))
            .unwrap();

        let layer = map.layer("county-fill").unwrap();
        assert_eq!(layer.paint["fill-opacity"], json!(0.5));
        assert_eq!(layer.layout["visibility"], json!("none"));
        assert!(
            map.set_paint_property("nope", "fill-opacity", json!(1))
                .is_err()
        );
    }

    #[test]
    fn layer_serializes_type_field() {
        let json = serde_json::to_value(fill_layer("a", "b")).unwrap();
        assert_eq!(json["type"], json!("fill"));
    }
}
