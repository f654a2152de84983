//! Rolling frame-interval average.
//!
//! The driver feeds [`FrameClock::tick`] its own wall-clock time; the
//! clock never reads time itself. The average of the last few intervals
//! is what gets passed to [`crate::Simulation::step`], which smooths out
//! scheduler jitter.

use std::collections::VecDeque;

#[derive(Clone, Debug)]
pub struct FrameClock {
    /// Most recent intervals in seconds, oldest first.
    window: VecDeque<f64>,
    last_frame: Option<f64>,
}

impl FrameClock {
    /// Creates a clock averaging over `window_len` intervals.
    ///
    /// The window starts filled with zeros, so the first few averages
    /// ramp up from zero. A zero length is treated as one.
    pub fn new(window_len: usize) -> Self {
        Self {
            window: VecDeque::from(vec![0.0; window_len.max(1)]),
            last_frame: None,
        }
    }

    /// Records a frame at `now_seconds` and returns the new average
    /// interval.
    ///
    /// The first frame after construction or [`FrameClock::reset`]
    /// records an interval of zero. Time going backwards is also treated
    /// as zero.
    pub fn tick(&mut self, now_seconds: f64) -> f64 {
        let interval = match self.last_frame {
            Some(last) if now_seconds > last => now_seconds - last,
            _ => 0.0,
        };
        self.window.pop_front();
        self.window.push_back(interval);
        self.last_frame = Some(now_seconds);
        self.average()
    }

    /// Mean of the intervals in the window, in seconds.
    pub fn average(&self) -> f64 {
        self.window.iter().sum::<f64>() / self.window.len() as f64
    }

    /// Whole frames per second implied by the average, or 0.
    pub fn fps(&self) -> u32 {
        let avg = self.average();
        if avg > 0.0 { (1.0 / avg).floor() as u32 } else { 0 }
    }

    pub fn reset(&mut self) {
        self.window.iter_mut().for_each(|v| *v = 0.0);
        self.last_frame = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_tick_records_zero() {
        let mut clock = FrameClock::new(3);

        assert_eq!(clock.tick(12.5), 0.0);
        assert_eq!(clock.fps(), 0);
    }

    #[test]
    fn average_covers_last_three_intervals() {
        let mut clock = FrameClock::new(3);

        clock.tick(0.0);
        assert_relative_eq!(clock.tick(0.010), 0.010 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(clock.tick(0.030), 0.030 / 3.0, epsilon = 1e-12);
        // Window now holds [0.010, 0.020, 0.040]; the initial zero dropped out.
        assert_relative_eq!(clock.tick(0.070), 0.070 / 3.0, epsilon = 1e-12);
        assert_eq!(clock.fps(), 42);
    }

    #[test]
    fn reset_forgets_history() {
        let mut clock = FrameClock::new(3);
        clock.tick(1.0);
        clock.tick(1.5);

        clock.reset();

        assert_eq!(clock.average(), 0.0);
        assert_eq!(clock.tick(100.0), 0.0);
    }

    #[test]
    fn backwards_time_counts_as_zero() {
        let mut clock = FrameClock::new(1);
        clock.tick(5.0);
        assert_eq!(clock.tick(4.0), 0.0);
    }
}
