#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Animated band width transitions.
//!
//! When the band width changes, [`AnimationDriver`] steps linearly from
//! the displayed width to the requested one, re-aggregating and
//! publishing the bands once per frame. Every request takes a new
//! generation number; a running animation checks its generation before
//! each publish and stops as soon as a newer request exists, so the most
//! recent request always wins.

pub mod clock;
pub mod display;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use county_bands_bands::{BandConfig, BandWidth, aggregate};
use county_bands_county_models::{Metric, MetricSource};

use crate::clock::FrameClock;
use crate::display::DisplaySource;

/// Number of intermediate widths drawn per transition.
pub const DEFAULT_STEPS: usize = 10;

/// Linearly interpolates `steps` widths from `from` (exclusive) to `to`
/// (inclusive).
///
/// The final value is exactly `to`. A `steps` of 0 is treated as 1.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn interpolate_widths(from: f64, to: f64, steps: usize) -> Vec<f64> {
    let steps = steps.max(1);
    let step_size = (to - from) / steps as f64;

    (1..=steps)
        .map(|step| {
            if step == steps {
                to
            } else {
                step_size.mul_add(step as f64, from)
            }
        })
        .collect()
}

/// How an animation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// Every frame was published and the width settled on the target.
    Completed {
        /// Frames published.
        frames: usize,
    },
    /// A newer request took over before the animation finished.
    Superseded {
        /// Frames published before stopping.
        frames: usize,
    },
}

struct DriverState {
    displayed: BandWidth,
    target: BandWidth,
}

/// Re-aggregates and publishes bands while the width animates.
pub struct AnimationDriver<T> {
    records: Arc<[T]>,
    display: Arc<dyn DisplaySource>,
    clock: Arc<dyn FrameClock>,
    steps: usize,
    generation: AtomicU64,
    state: Mutex<DriverState>,
}

impl<T: MetricSource + Send + Sync> AnimationDriver<T> {
    /// Creates a driver showing `initial_width`.
    ///
    /// Nothing is published until [`Self::publish_now`] or an animation
    /// runs.
    #[must_use]
    pub fn new(
        records: Arc<[T]>,
        display: Arc<dyn DisplaySource>,
        clock: Arc<dyn FrameClock>,
        initial_width: BandWidth,
        steps: usize,
    ) -> Self {
        Self {
            records,
            display,
            clock,
            steps: steps.max(1),
            generation: AtomicU64::new(0),
            state: Mutex::new(DriverState {
                displayed: initial_width,
                target: initial_width,
            }),
        }
    }

    /// Width of the most recently published bands.
    #[must_use]
    pub fn displayed_width(&self) -> BandWidth {
        self.lock_state().displayed
    }

    /// Width the latest request is heading for.
    #[must_use]
    pub fn target_width(&self) -> BandWidth {
        self.lock_state().target
    }

    /// Current generation; bumped by every request.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Frames drawn per transition.
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    /// Immediately aggregates and publishes bands for `width` and
    /// `metric`, cancelling any running animation.
    pub fn publish_now(&self, width: BandWidth, metric: Metric) {
        let mut state = self.lock_state();
        self.generation.fetch_add(1, Ordering::SeqCst);
        state.target = width;
        self.publish(&mut state, width, metric);
    }

    /// Starts a transition to `target`, superseding any animation still
    /// in flight.
    ///
    /// The generation is taken here, so of two requests the later one
    /// wins regardless of the order their animations are polled in.
    #[must_use]
    pub fn request(&self, target: BandWidth, metric: Metric) -> Animation<'_, T> {
        let mut state = self.lock_state();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let from = state.displayed;
        state.target = target;
        drop(state);

        let widths = if from == target {
            vec![target]
        } else {
            interpolate_widths(from.degrees(), target.degrees(), self.steps)
                .into_iter()
                .filter_map(|width| BandWidth::new(width).ok())
                .collect()
        };

        log::debug!(
            "Animation {generation}: {from} -> {target} over {} frames",
            widths.len()
        );

        Animation {
            driver: self,
            generation,
            metric,
            widths,
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DriverState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &mut DriverState, width: BandWidth, metric: Metric) {
        let bands = aggregate(&self.records[..], &BandConfig { width, metric });
        self.display.publish(bands);
        state.displayed = width;
    }

    /// Publishes one frame if `generation` is still the newest.
    fn publish_frame(&self, generation: u64, width: BandWidth, metric: Metric) -> bool {
        let mut state = self.lock_state();
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        self.publish(&mut state, width, metric);
        true
    }
}

/// A pending width transition returned by [`AnimationDriver::request`].
pub struct Animation<'a, T> {
    driver: &'a AnimationDriver<T>,
    generation: u64,
    metric: Metric,
    widths: Vec<BandWidth>,
}

impl<T: MetricSource + Send + Sync> Animation<'_, T> {
    /// Generation this animation publishes under.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Widths this animation will publish, in order.
    #[must_use]
    pub fn widths(&self) -> &[BandWidth] {
        &self.widths
    }

    /// Publishes one frame per width, waiting for the frame clock between
    /// frames.
    pub async fn run(self) -> AnimationOutcome {
        for (frame, width) in self.widths.iter().enumerate() {
            if frame > 0 {
                self.driver.clock.next_frame().await;
            }

            if !self
                .driver
                .publish_frame(self.generation, *width, self.metric)
            {
                log::debug!(
                    "Animation {} superseded after {frame} frames",
                    self.generation
                );
                return AnimationOutcome::Superseded { frames: frame };
            }
        }

        AnimationOutcome::Completed {
            frames: self.widths.len(),
        }
    }
}
