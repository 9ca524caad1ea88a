//! View state and control handlers for the county bands map.
//!
//! [`MapController`] owns the current view mode and metric, wires the
//! band layer to the [`AnimationDriver`], and translates control input
//! (view toggle, metric select, width slider, clicks) into map adapter
//! calls.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use county_bands_animation::clock::FrameClock;
use county_bands_animation::display::DisplaySource;
use county_bands_animation::{AnimationDriver, AnimationOutcome};
use county_bands_bands::{
    BAND_MAX_LAT, BAND_MIN_LAT, Band, BandCollection, BandConfig, BandWidth, aggregate,
};
use county_bands_county::{County, counties_to_feature_collection};
use county_bands_county_models::{Metric, ViewMode};
use geojson::GeoJson;

use crate::adapter::{MapAdapter, MapError};
use crate::hit::CountyIndex;
use crate::legend::Legend;
use crate::popup::{Popup, band_popup_html, county_popup_html};
use crate::style::{
    BAND_BORDERS, BAND_FILL, BAND_SOURCE, COUNTY_BORDERS, COUNTY_FILL, COUNTY_SOURCE,
    band_fill_color, band_layers, county_fill_color, county_layers, visibility,
};

/// Initial view settings.
#[derive(Debug, Clone, Copy)]
pub struct ViewOptions {
    /// Starting band width.
    pub width: BandWidth,
    /// Starting metric.
    pub metric: Metric,
    /// Frames per width transition.
    pub steps: usize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The band layer's source, as seen by the animation driver.
///
/// Every publish replaces the `lonbands` source data and remembers the
/// collection for hit testing.
pub struct BandLayer<A> {
    map: Arc<Mutex<A>>,
    latest: Mutex<BandCollection>,
}

impl<A: MapAdapter> BandLayer<A> {
    /// Band under a map position, if the band layer covers it.
    #[must_use]
    pub fn band_at(&self, lng: f64, lat: f64) -> Option<Band> {
        if !(BAND_MIN_LAT..=BAND_MAX_LAT).contains(&lat) {
            return None;
        }
        lock(&self.latest).band_for(lng).cloned()
    }

    /// The most recently published bands.
    #[must_use]
    pub fn latest(&self) -> BandCollection {
        lock(&self.latest).clone()
    }
}

impl<A: MapAdapter> DisplaySource for BandLayer<A> {
    fn publish(&self, bands: BandCollection) {
        let data = GeoJson::FeatureCollection(bands.to_feature_collection());
        if let Err(e) = lock(&self.map).set_source_data(BAND_SOURCE, data) {
            log::error!("Failed to update band layer: {e}");
        }
        *lock(&self.latest) = bands;
    }
}

/// Handles the map controls.
pub struct MapController<A> {
    map: Arc<Mutex<A>>,
    bands: Arc<BandLayer<A>>,
    driver: AnimationDriver<County>,
    index: CountyIndex,
    mode: ViewMode,
    metric: Metric,
    popup: Option<Popup>,
}

impl<A: MapAdapter + 'static> MapController<A> {
    /// Adds the county and band sources and layers to `map` and starts in
    /// county view.
    ///
    /// # Errors
    ///
    /// Returns an error if the map already has sources or layers with the
    /// same ids.
    pub fn load(
        map: Arc<Mutex<A>>,
        counties: Arc<[County]>,
        clock: Arc<dyn FrameClock>,
        options: ViewOptions,
    ) -> Result<Self, MapError> {
        let initial = aggregate(
            &counties[..],
            &BandConfig {
                width: options.width,
                metric: options.metric,
            },
        );

        {
            let mut guard = lock(&map);
            guard.add_source(
                COUNTY_SOURCE,
                GeoJson::FeatureCollection(counties_to_feature_collection(&counties)),
            )?;
            for layer in county_layers(options.metric) {
                guard.add_layer(layer)?;
            }
            guard.add_source(
                BAND_SOURCE,
                GeoJson::FeatureCollection(initial.to_feature_collection()),
            )?;
            for layer in band_layers(options.metric) {
                guard.add_layer(layer)?;
            }
        }

        log::info!(
            "Loaded {} counties into {} initial bands",
            counties.len(),
            initial.bands.len()
        );

        let bands = Arc::new(BandLayer {
            map: map.clone(),
            latest: Mutex::new(initial),
        });
        let display: Arc<dyn DisplaySource> = bands.clone();
        let driver = AnimationDriver::new(
            counties.clone(),
            display,
            clock,
            options.width,
            options.steps,
        );

        Ok(Self {
            map,
            bands,
            driver,
            index: CountyIndex::build(counties),
            mode: ViewMode::County,
            metric: options.metric,
            popup: None,
        })
    }

    /// Active view mode.
    #[must_use]
    pub const fn mode(&self) -> ViewMode {
        self.mode
    }

    /// Active metric.
    #[must_use]
    pub const fn metric(&self) -> Metric {
        self.metric
    }

    /// Width of the bands currently on the map.
    #[must_use]
    pub fn displayed_width(&self) -> BandWidth {
        self.driver.displayed_width()
    }

    /// The band layer source.
    #[must_use]
    pub fn bands(&self) -> &BandLayer<A> {
        &self.bands
    }

    /// The underlying map adapter.
    #[must_use]
    pub const fn map(&self) -> &Arc<Mutex<A>> {
        &self.map
    }

    /// Currently open popup.
    #[must_use]
    pub const fn popup(&self) -> Option<&Popup> {
        self.popup.as_ref()
    }

    /// Label of the view toggle button for the current mode.
    #[must_use]
    pub const fn button_label(&self) -> &'static str {
        match self.mode {
            ViewMode::County => "Switch to Longitude Bands",
            ViewMode::Band => "Switch to County Coloring",
        }
    }

    /// Legend for the current metric and mode.
    #[must_use]
    pub fn legend(&self) -> Legend {
        Legend::new(self.metric, self.mode)
    }

    /// Switches between county and band view.
    ///
    /// # Errors
    ///
    /// Returns an error if the map is missing one of the layers.
    pub fn toggle_view(&mut self) -> Result<ViewMode, MapError> {
        let next = self.mode.toggled();
        let show_bands = next == ViewMode::Band;

        {
            let mut map = lock(&self.map);
            for layer in [COUNTY_FILL, COUNTY_BORDERS] {
                map.set_layout_property(layer, "visibility", visibility(!show_bands))?;
            }
            for layer in [BAND_FILL, BAND_BORDERS] {
                map.set_layout_property(layer, "visibility", visibility(show_bands))?;
            }
        }

        log::debug!("View mode: {} -> {next}", self.mode);
        self.mode = next;
        Ok(next)
    }

    /// Recolors both layers by `metric` and regenerates the bands at the
    /// current target width.
    ///
    /// # Errors
    ///
    /// Returns an error if the map is missing one of the fill layers.
    pub fn set_metric(&mut self, metric: Metric) -> Result<(), MapError> {
        {
            let mut map = lock(&self.map);
            map.set_paint_property(COUNTY_FILL, "fill-color", county_fill_color(metric))?;
            map.set_paint_property(BAND_FILL, "fill-color", band_fill_color(metric))?;
        }

        log::debug!("Metric: {} -> {metric}", self.metric);
        self.metric = metric;
        self.driver.publish_now(self.driver.target_width(), metric);
        Ok(())
    }

    /// Animates the bands to `width`.
    ///
    /// Returns [`AnimationOutcome::Superseded`] if another width or metric
    /// change arrives before the animation finishes.
    pub async fn set_band_width(&self, width: BandWidth) -> AnimationOutcome {
        self.driver.request(width, self.metric).run().await
    }

    /// Handles a click: opens a popup for the county or band under the
    /// point, or closes the open popup when nothing is there.
    pub fn click_at(&mut self, lng: f64, lat: f64) -> Option<&Popup> {
        let html = match self.mode {
            ViewMode::County => self.index.lookup(lng, lat).map(county_popup_html),
            ViewMode::Band => self
                .bands
                .band_at(lng, lat)
                .map(|band| band_popup_html(&band, self.metric)),
        };

        self.popup = html.map(|html| Popup {
            lng_lat: [lng, lat],
            html,
        });
        self.popup.as_ref()
    }

    /// Cursor to show while hovering a map position.
    #[must_use]
    pub fn hover_cursor(&self, lng: f64, lat: f64) -> &'static str {
        let hit = match self.mode {
            ViewMode::County => self.index.lookup(lng, lat).is_some(),
            ViewMode::Band => self.bands.band_at(lng, lat).is_some(),
        };
        if hit { "pointer" } else { "" }
    }
}
