//! Frame pacing for animations.

use std::time::Duration;

use async_trait::async_trait;

/// Default frame spacing, roughly one display refresh at 60 Hz.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Suspends an animation until the next frame may be drawn.
#[async_trait]
pub trait FrameClock: Send + Sync {
    /// Resolves when the next frame is due.
    async fn next_frame(&self);
}

/// Paces frames with a fixed sleep between them.
#[derive(Debug, Clone, Copy)]
pub struct IntervalClock {
    frame: Duration,
}

impl IntervalClock {
    /// Creates a clock that waits `frame` between frames.
    #[must_use]
    pub const fn new(frame: Duration) -> Self {
        Self { frame }
    }
}

impl Default for IntervalClock {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_INTERVAL)
    }
}

#[async_trait]
impl FrameClock for IntervalClock {
    async fn next_frame(&self) {
        tokio::time::sleep(self.frame).await;
    }
}

/// Yields to the scheduler between frames without waiting.
///
/// Used for headless rendering and tests where wall-clock pacing is
/// irrelevant.
#[derive(Debug, Clone, Copy, Default)]
pub struct YieldClock;

#[async_trait]
impl FrameClock for YieldClock {
    async fn next_frame(&self) {
        tokio::task::yield_now().await;
    }
}
