//! The band layer's data slot.

use std::sync::Mutex;
use std::sync::PoisonError;
use std::sync::atomic::{AtomicUsize, Ordering};

use county_bands_bands::BandCollection;

/// Destination for freshly aggregated bands.
///
/// Acts as a single slot: every publish replaces whatever was shown
/// before.
pub trait DisplaySource: Send + Sync {
    /// Replaces the displayed bands.
    fn publish(&self, bands: BandCollection);
}

/// In-memory [`DisplaySource`] keeping only the latest collection.
#[derive(Debug, Default)]
pub struct LatestBands {
    latest: Mutex<Option<BandCollection>>,
    publishes: AtomicUsize,
}

impl LatestBands {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the most recently published collection.
    #[must_use]
    pub fn latest(&self) -> Option<BandCollection> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of collections published so far.
    #[must_use]
    pub fn publish_count(&self) -> usize {
        self.publishes.load(Ordering::Relaxed)
    }
}

impl DisplaySource for LatestBands {
    fn publish(&self, bands: BandCollection) {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(bands);
        self.publishes.fetch_add(1, Ordering::Relaxed);
    }
}
