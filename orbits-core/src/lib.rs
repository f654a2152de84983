//! Core 2-D gravitational n-body simulation library.
//!
//! Main components:
//! - [`vector`] - `Vector2` alias and the fallible vector helpers.
//! - [`body`] - simulated point masses and their identities.
//! - [`trail`] - bounded position history kept per body.
//! - [`forces`] - pairwise gravity accumulation.
//! - [`collisions`] - overlap detection and the merge-and-delete rule.
//! - [`simulation`] - run state and the per-tick integration step.
//! - [`clock`] - rolling frame-interval average used as the step size.
//! - [`config`] - tunable constants.
//! - [`scenario`] - scene descriptions loaded from YAML.
//! - [`error`] - error kinds shared by all of the above.

pub mod body;
pub mod clock;
pub mod collisions;
pub mod config;
pub mod error;
pub mod forces;
pub mod scenario;
pub mod simulation;
pub mod trail;
pub mod vector;

pub use body::{Body, BodyId, Color};
pub use config::Config;
pub use error::{SimError, SimResult};
pub use simulation::{RunState, Simulation, StepReport};
pub use vector::{Vector2, VectorExt};
