/// Turns host timestamps into the elapsed time the color field animates with.
///
/// Timestamps are in milliseconds, either from `requestAnimationFrame` or from
/// a native `Instant`. The first timestamp marks the start of the effect.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    // A timestamp in milliseconds. None until the first frame.
    last_timestamp: Option<f64>,

    // Seconds since the first frame.
    elapsed_time: f64,

    max_frame_time: Option<f32>,
}

impl Clock {
    pub fn new(max_frame_time: Option<f32>) -> Self {
        Self {
            max_frame_time,
            ..Default::default()
        }
    }

    pub fn set_max_frame_time(&mut self, max_frame_time: Option<f32>) {
        self.max_frame_time = max_frame_time;
    }

    /// Advances to `timestamp` and returns the new elapsed time in seconds.
    ///
    /// Elapsed time never decreases: a timestamp older than the previous one
    /// counts as a zero-length frame, and so does a frame under a cap that is
    /// not positive.
    pub fn tick(&mut self, timestamp: f64) -> f32 {
        let timestep = match self.last_timestamp {
            Some(last) => (0.001 * (timestamp - last)).max(0.0),
            None => 0.0,
        };

        let timestep = match self.max_frame_time {
            Some(max_frame_time) => timestep.min(f64::from(max_frame_time)).max(0.0),
            None => timestep,
        };

        self.last_timestamp = Some(match self.last_timestamp {
            Some(last) => last.max(timestamp),
            None => timestamp,
        });
        self.elapsed_time += timestep;

        self.elapsed_time()
    }

    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time as f32
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::settings::Settings;
    use approx::assert_relative_eq;

    #[test]
    fn test_starts_at_zero() {
        let mut clock = Clock::new(None);
        assert_eq!(clock.elapsed_time(), 0.0);
        assert_eq!(clock.tick(123_456.0), 0.0);
    }

    #[test]
    fn test_accumulates_seconds() {
        let mut clock = Clock::new(None);
        clock.tick(1000.0);
        clock.tick(1016.0);
        assert_relative_eq!(clock.tick(2500.0), 1.5);
    }

    #[test]
    fn test_never_runs_backwards() {
        let mut clock = Clock::new(None);
        clock.tick(0.0);
        let before = clock.tick(2000.0);

        assert_eq!(clock.tick(1500.0), before);
        // The late frame is measured from the newest timestamp seen.
        assert_relative_eq!(clock.tick(2250.0), before + 0.25);
    }

    #[test]
    fn test_caps_long_frames() {
        let mut clock = Clock::new(Some(0.1));
        clock.tick(0.0);
        clock.tick(50.0);
        assert_relative_eq!(clock.tick(60_000.0), 0.15, epsilon = 1e-6);
    }

    #[test]
    fn test_negative_cap_never_runs_backwards() {
        assert!(Settings::from_json(r#"{ "maxFrameTime": -1.0 }"#).is_err());

        // A host that skips validation still gets a monotonic clock.
        let mut clock = Clock::new(Some(-1.0));
        let mut previous = clock.tick(0.0);
        for timestamp in [16.0, 32.0, 48.0, 1000.0] {
            let elapsed = clock.tick(timestamp);
            assert!(elapsed >= previous, "{} -> {}", previous, elapsed);
            previous = elapsed;
        }
        assert_eq!(previous, 0.0);
    }

    #[test]
    fn test_nan_cap_is_ignored() {
        let mut clock = Clock::new(Some(f32::NAN));
        clock.tick(0.0);
        assert_relative_eq!(clock.tick(500.0), 0.5);
    }
}
