use std::time::Instant;

/// Builds the host timing function: milliseconds in, scaled seconds out.
///
/// With reduced motion the result is pinned to `0.0` so animated shaders hold
/// their first frame.
pub fn remap(time_scale: f64, reduced_motion: bool) -> impl Fn(f64) -> f64 + 'static {
    move |elapsed_ms| {
        if reduced_motion {
            0.0
        } else {
            elapsed_ms / 1000.0 * time_scale
        }
    }
}

/// Wall-clock milliseconds since the preview started.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    start: Instant,
}

impl FrameClock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_milliseconds_to_scaled_seconds() {
        let timing = remap(1.0, false);
        assert_eq!(timing(1500.0), 1.5);
        let slow = remap(0.5, false);
        assert_eq!(slow(2000.0), 1.0);
    }

    #[test]
    fn reduced_motion_freezes_time() {
        let timing = remap(2.0, true);
        assert_eq!(timing(0.0), 0.0);
        assert_eq!(timing(123_456.0), 0.0);
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = FrameClock::start();
        let first = clock.elapsed_ms();
        let second = clock.elapsed_ms();
        assert!(first >= 0.0);
        assert!(second >= first);
    }
}
