use serde::Deserialize;

/// Tunable simulation constants.
///
/// Every field has a default, so a scenario file may override any subset.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gravitational constant, chosen for on-screen scale rather than SI units.
    pub gravitational_constant: f64,
    /// Maximum number of positions kept in each body's trail.
    pub trail_length: usize,
    /// Number of frame intervals averaged by [`crate::clock::FrameClock`].
    pub lag_window: usize,
    /// Factor applied to the gravity vector when drawing the force overlay.
    pub force_overlay_scale: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gravitational_constant: 0.0006,
            trail_length: 300,
            lag_window: 3,
            force_overlay_scale: 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let cfg: Config = serde_yaml::from_str("trail_length: 50").unwrap();

        assert_eq!(cfg.trail_length, 50);
        assert_eq!(cfg.gravitational_constant, 0.0006);
        assert_eq!(cfg.lag_window, 3);
    }
}
