//! Frame time tracking

use std::time::{Duration, Instant};

/// Largest delta handed to consumers; hitches and breakpoints otherwise
/// explode the first simulation step after them
const MAX_DELTA: Duration = Duration::from_millis(250);

/// Tracks elapsed and per-frame time for the update loop
#[derive(Debug)]
pub struct Time {
    startup: Instant,
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
}

impl Time {
    /// Create a new clock starting now
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            startup: now,
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advance to the next frame, measuring the delta since the last call
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = (now - self.last_frame).min(MAX_DELTA);
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Time the last frame took
    #[must_use]
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Time the last frame took, in seconds
    #[must_use]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Time since the clock was created
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.startup.elapsed()
    }

    /// Number of completed frames
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_advances_frame_count() {
        let mut time = Time::new();
        assert_eq!(time.frame_count(), 0);

        time.update();
        time.update();
        assert_eq!(time.frame_count(), 2);
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut time = Time::new();
        time.update();
        assert!(time.delta() <= MAX_DELTA);
    }
}
