//! Scene descriptions loaded from YAML.
//!
//! A scenario lists the initial bodies and optionally overrides any
//! [`Config`] field:
//!
//! ```yaml
//! config:
//!   gravitational_constant: 0.0006
//!   trail_length: 300
//!
//! bodies:
//!   - mass: 25000
//!     radius: 10
//!     position: [900, 300]
//!     velocity: [300, 0]
//!   - mass: 400000
//!     radius: 20
//!     position: [600, 500]
//!     fixed: true
//!     color: "#FFD700"
//! ```
//!
//! Values are only checked when the scenario is turned into bodies, and
//! go through the same validation as [`Body::new`].

use crate::body::{Body, Color};
use crate::config::Config;
use crate::error::{SimError, SimResult};
use crate::simulation::Simulation;
use crate::vector::Vector2;
use rand::Rng;
use serde::Deserialize;
use std::io::Read;

/// Initial state of one body.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct BodyConfig {
    pub mass: f64,
    pub radius: f64,
    pub position: [f64; 2],
    #[serde(default)]
    pub velocity: [f64; 2],
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub color: Option<Color>,
}

impl BodyConfig {
    pub fn new(mass: f64, radius: f64, position: [f64; 2]) -> Self {
        Self {
            mass,
            radius,
            position,
            velocity: [0.0, 0.0],
            fixed: false,
            color: None,
        }
    }

    pub fn to_body(&self) -> SimResult<Body> {
        let mut body = Body::new(self.mass, self.radius, Vector2::from(self.position))?
            .with_velocity(Vector2::from(self.velocity))?
            .with_color(self.color.unwrap_or_default());
        if self.fixed {
            body = body.fixed();
        }
        Ok(body)
    }
}

/// Top-level scenario file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub config: Config,
    pub bodies: Vec<BodyConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(s: &str) -> SimResult<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    pub fn from_yaml_reader(reader: impl Read) -> SimResult<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    /// The built-in scene: a fixed heavy star with two orbiting bodies.
    pub fn default_orbits() -> Self {
        Self {
            config: Config::default(),
            bodies: vec![
                BodyConfig {
                    velocity: [300.0, 0.0],
                    ..BodyConfig::new(25_000.0, 10.0, [900.0, 300.0])
                },
                BodyConfig {
                    fixed: true,
                    ..BodyConfig::new(400_000.0, 20.0, [600.0, 500.0])
                },
                BodyConfig {
                    velocity: [-10.0, 180.0],
                    ..BodyConfig::new(3_000.0, 7.0, [800.0, 300.0])
                },
            ],
        }
    }

    /// Builds a stopped [`Simulation`] from this scenario.
    ///
    /// ### Errors
    /// The first body that fails validation aborts the build.
    pub fn build(&self) -> SimResult<Simulation> {
        let bodies = self
            .bodies
            .iter()
            .map(BodyConfig::to_body)
            .collect::<SimResult<Vec<_>>>()?;
        Simulation::with_bodies(self.config, bodies)
    }
}

/// Scatters `count` small bodies uniformly in a square around `center`.
///
/// Masses fall in `[100, 2000)` and radii in `[2, 5)`; all start at rest.
///
/// Fails with [`SimError::InvalidArgument`] when `half_range` is negative or
/// not finite.
pub fn random_bodies(
    count: usize,
    center: Vector2,
    half_range: f64,
    rng: &mut impl Rng,
) -> SimResult<Vec<BodyConfig>> {
    if !(half_range.is_finite() && half_range >= 0.0) {
        return Err(SimError::InvalidArgument(format!(
            "debris half range must be finite and non-negative, got {half_range}"
        )));
    }
    Ok((0..count)
        .map(|_| {
            let x = center.x + rng.random_range(-half_range..=half_range);
            let y = center.y + rng.random_range(-half_range..=half_range);
            let mass = rng.random_range(100.0..2000.0);
            let radius = rng.random_range(2.0..5.0);
            BodyConfig::new(mass, radius, [x, y])
        })
        .collect())
}
