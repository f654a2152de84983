//! Run state and the per-tick integration step.
//!
//! A tick is computed in full from a snapshot of the body set and only
//! then committed, so a failing tick leaves every body untouched.

use crate::body::{Body, BodyId};
use crate::collisions::{Absorption, resolve_collisions};
use crate::config::Config;
use crate::error::{SimError, SimResult};
use crate::forces::{PointMass, acceleration_on};
use crate::vector::Vector2;

/// Whether [`Simulation::step`] is currently allowed to advance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

/// Summary of one committed tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepReport {
    /// Tick counter after this step.
    pub tick: u64,
    /// Merges applied this tick, in resolution order.
    pub absorptions: Vec<Absorption>,
    /// `true` if the body set ran empty and the simulation stopped.
    pub stopped: bool,
}

impl StepReport {
    /// Ids removed from the live set by this tick.
    pub fn removed(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.absorptions.iter().map(|a| a.absorbed)
    }
}

/// Fully computed update for one surviving body.
struct StagedUpdate {
    index: usize,
    mass: f64,
    motion: Option<Motion>,
}

struct Motion {
    position: Vector2,
    velocity: Vector2,
    acceleration: Vector2,
}

/// Owns the live bodies and advances them one tick at a time.
///
/// The simulation has no clock of its own: the driver decides when to call
/// [`Simulation::step`] and how much time passed.
#[derive(Debug, Default)]
pub struct Simulation {
    bodies: Vec<Body>,
    config: Config,
    state: RunState,
    tick: u64,
}

impl Simulation {
    pub fn new(config: Config) -> Self {
        Self {
            bodies: Vec::new(),
            config,
            state: RunState::Stopped,
            tick: 0,
        }
    }

    /// Creates a stopped simulation holding `bodies`.
    ///
    /// ### Errors
    /// Fails like [`Simulation::add_body`] on duplicate ids.
    pub fn with_bodies(config: Config, bodies: impl IntoIterator<Item = Body>) -> SimResult<Self> {
        let mut sim = Self::new(config);
        for body in bodies {
            sim.add_body(body)?;
        }
        Ok(sim)
    }

    /// Appends a body to the live set. Allowed while running; the body
    /// takes part from the next tick on.
    ///
    /// ### Errors
    /// [`SimError::InvalidArgument`] if a body with the same id is already
    /// live (e.g. a clone of one that was added before).
    pub fn add_body(&mut self, mut body: Body) -> SimResult<BodyId> {
        let id = body.id();
        if self.body(id).is_some() {
            return Err(SimError::InvalidArgument(format!(
                "body {id} is already part of the simulation"
            )));
        }
        body.set_trail_capacity(self.config.trail_length);
        log::debug!(
            "added body {id}: mass {}, radius {}, fixed {}",
            body.mass(),
            body.radius(),
            body.is_fixed()
        );
        self.bodies.push(body);
        Ok(id)
    }

    /// Live bodies in their stable order.
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id() == id)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Removes every body and stops.
    pub fn clear(&mut self) {
        self.stop();
        self.bodies.clear();
        self.tick = 0;
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Replaces the configuration; trails are re-bounded immediately.
    pub fn set_config(&mut self, config: Config) {
        self.config = config;
        for body in &mut self.bodies {
            body.set_trail_capacity(config.trail_length);
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// `Stopped -> Running`.
    ///
    /// ### Returns
    /// `false` if the simulation was already running (nothing changes).
    pub fn start(&mut self) -> bool {
        if self.is_running() {
            log::debug!("start ignored: already running");
            return false;
        }
        self.state = RunState::Running;
        log::info!("simulation started with {} bodies", self.bodies.len());
        true
    }

    /// `Running -> Stopped`. Stopping twice is a no-op.
    pub fn stop(&mut self) {
        if self.is_running() {
            self.state = RunState::Stopped;
            log::info!("simulation stopped at tick {}", self.tick);
        }
    }

    /// Net gravity currently acting on `id`, for the force overlay.
    ///
    /// ### Returns
    /// `None` if no live body has that id; zero for fixed bodies.
    pub fn gravity_on(&self, id: BodyId) -> Option<Vector2> {
        let body = self.body(id)?;
        Some(crate::forces::gravity_vector(
            body,
            &self.bodies,
            self.config.gravitational_constant,
        ))
    }

    /// Net gravity on every live body in one pass, in body order.
    ///
    /// Equivalent to calling [`Simulation::gravity_on`] for each body, but
    /// the source list is built once.
    pub fn gravity_field(&self) -> Vec<(BodyId, Vector2)> {
        let g = self.config.gravitational_constant;
        let sources: Vec<PointMass> = self.bodies.iter().map(PointMass::from).collect();

        self.bodies
            .iter()
            .zip(&sources)
            .map(|(body, target)| {
                let a = if body.is_fixed() {
                    Vector2::ZERO
                } else {
                    acceleration_on(target, sources.iter().copied(), g)
                };
                (body.id(), a)
            })
            .collect()
    }

    /// Advances the simulation by one tick.
    ///
    /// 1. Resolve collisions on the tick-start snapshot (masses and
    ///    acceleration corrections are staged, absorbed bodies flagged).
    /// 2. For every surviving free body:
    ///    `a = gravity(survivors) + correction`, `v += a`,
    ///    `p += v · elapsed_seconds`.
    /// 3. Commit masses and motion, extending each trail.
    /// 4. Drop absorbed bodies; stop if nothing is left.
    ///
    /// Gravity is evaluated against the survivors with their merged masses
    /// and tick-start positions, so the result does not depend on the
    /// order bodies are updated in.
    ///
    /// ### Parameters
    /// - `elapsed_seconds` - Time to advance positions by.
    ///
    /// ### Errors
    /// - [`SimError::StateError`] when stopped.
    /// - [`SimError::InvalidArgument`] for a negative or non-finite
    ///   `elapsed_seconds`.
    /// - [`SimError::NonFinite`] if any staged value overflows; nothing
    ///   is committed in that case.
    pub fn step(&mut self, elapsed_seconds: f64) -> SimResult<StepReport> {
        if !self.is_running() {
            return Err(SimError::StateError(
                "cannot step a stopped simulation".to_string(),
            ));
        }
        if !elapsed_seconds.is_finite() || elapsed_seconds < 0.0 {
            return Err(SimError::InvalidArgument(format!(
                "elapsed time must be finite and non-negative, got {elapsed_seconds}"
            )));
        }
        if self.bodies.is_empty() {
            self.stop();
            return Ok(StepReport {
                tick: self.tick,
                absorptions: Vec::new(),
                stopped: true,
            });
        }

        let outcome = resolve_collisions(&self.bodies);

        let sources: Vec<PointMass> = outcome
            .survivor_indices()
            .map(|i| PointMass {
                id: self.bodies[i].id(),
                mass: outcome.masses[i],
                position: self.bodies[i].position(),
            })
            .collect();

        let g = self.config.gravitational_constant;
        let mut staged = Vec::with_capacity(sources.len());

        for (target, i) in sources.iter().zip(outcome.survivor_indices()) {
            let body = &self.bodies[i];
            let mass = outcome.masses[i];
            if !mass.is_finite() {
                return Err(SimError::NonFinite { id: body.id() });
            }

            let motion = if body.is_fixed() {
                None
            } else {
                let acceleration = acceleration_on(target, sources.iter().copied(), g)
                    + outcome.corrections[i];
                let velocity = body.velocity() + acceleration;
                let position = body.position() + velocity * elapsed_seconds;

                if !(acceleration.is_finite() && velocity.is_finite() && position.is_finite()) {
                    return Err(SimError::NonFinite { id: body.id() });
                }
                Some(Motion {
                    position,
                    velocity,
                    acceleration,
                })
            };

            staged.push(StagedUpdate {
                index: i,
                mass,
                motion,
            });
        }

        // Commit.
        for update in staged {
            let body = &mut self.bodies[update.index];
            body.set_mass(update.mass);
            if let Some(m) = update.motion {
                body.apply_motion(m.position, m.velocity, m.acceleration);
            }
        }

        for a in &outcome.absorptions {
            log::info!(
                "body {} absorbed body {} (mass {})",
                a.survivor,
                a.absorbed,
                a.absorbed_mass
            );
        }

        let bodies = std::mem::take(&mut self.bodies);
        self.bodies = bodies
            .into_iter()
            .zip(&outcome.absorbed)
            .filter(|(_, gone)| !**gone)
            .map(|(b, _)| b)
            .collect();

        self.tick += 1;
        log::debug!(
            "tick {}: dt {:.4}s, {} bodies, {} merges",
            self.tick,
            elapsed_seconds,
            self.bodies.len(),
            outcome.absorptions.len()
        );

        let stopped = self.bodies.is_empty();
        if stopped {
            self.stop();
        }

        Ok(StepReport {
            tick: self.tick,
            absorptions: outcome.absorptions,
            stopped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn running(bodies: Vec<Body>) -> Simulation {
        let mut sim = Simulation::with_bodies(Config::default(), bodies).unwrap();
        sim.start();
        sim
    }

    #[test]
    fn step_requires_running_state() {
        let mut sim = Simulation::with_bodies(
            Config::default(),
            [Body::new(1.0, 1.0, Vector2::ZERO).unwrap()],
        )
        .unwrap();

        assert!(matches!(sim.step(0.016), Err(SimError::StateError(_))));
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let mut sim = Simulation::new(Config::default());

        assert!(sim.start());
        assert!(!sim.start());
        assert_eq!(sim.state(), RunState::Running);

        sim.stop();
        sim.stop();
        assert_eq!(sim.state(), RunState::Stopped);
    }

    #[test]
    fn invalid_elapsed_time_is_rejected_without_side_effects() {
        let mut sim = running(vec![
            Body::new(1.0, 1.0, Vector2::ZERO)
                .unwrap()
                .with_velocity(Vector2::new(1.0, 0.0))
                .unwrap(),
        ]);

        assert!(matches!(sim.step(-1.0), Err(SimError::InvalidArgument(_))));
        assert!(matches!(sim.step(f64::NAN), Err(SimError::InvalidArgument(_))));
        assert_eq!(sim.bodies()[0].position(), Vector2::ZERO);
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn free_body_drifts_by_velocity_times_elapsed() {
        let mut sim = running(vec![
            Body::new(1.0, 1.0, Vector2::new(10.0, 10.0))
                .unwrap()
                .with_velocity(Vector2::new(4.0, -2.0))
                .unwrap(),
        ]);

        sim.step(0.5).unwrap();

        let b = &sim.bodies()[0];
        assert_eq!(b.position(), Vector2::new(12.0, 9.0));
        assert_eq!(b.velocity(), Vector2::new(4.0, -2.0));
        assert_eq!(b.trail().last(), Some(Vector2::new(12.0, 9.0)));
    }

    #[test]
    fn acceleration_is_applied_as_a_velocity_delta() {
        let mut sim = running(vec![
            Body::new(1.0, 1.0, Vector2::new(0.0, 0.0)).unwrap(),
            Body::new(1000.0, 1.0, Vector2::new(10.0, 0.0)).unwrap().fixed(),
        ]);

        sim.step(0.1).unwrap();

        let b = &sim.bodies()[0];
        let expected_a = 0.0006 * 1000.0 / 100.0;
        assert_relative_eq!(b.acceleration().x, expected_a);
        assert_relative_eq!(b.velocity().x, expected_a);
        assert_relative_eq!(b.position().x, expected_a * 0.1);
    }

    #[test]
    fn zero_elapsed_keeps_trail_free_of_duplicates() {
        let mut sim = running(vec![Body::new(1.0, 1.0, Vector2::new(1.0, 1.0)).unwrap()]);

        for _ in 0..5 {
            sim.step(0.0).unwrap();
        }

        assert_eq!(sim.bodies()[0].trail().len(), 1);
        assert_eq!(sim.tick(), 5);
    }

    #[test]
    fn merge_updates_mass_and_removes_absorbed() {
        let a = Body::new(100.0, 10.0, Vector2::new(0.0, 0.0)).unwrap();
        let b = Body::new(50.0, 10.0, Vector2::new(15.0, 0.0)).unwrap();
        let (a_id, b_id) = (a.id(), b.id());
        let mut sim = running(vec![a, b]);

        let report = sim.step(0.016).unwrap();

        assert_eq!(sim.len(), 1);
        assert_eq!(sim.bodies()[0].id(), a_id);
        assert_eq!(sim.bodies()[0].mass(), 150.0);
        assert!(sim.body(b_id).is_none());
        assert_eq!(report.removed().collect::<Vec<_>>(), vec![b_id]);
        assert!(!report.stopped);
    }

    #[test]
    fn gravity_uses_merged_mass_of_survivors() {
        // A tracer far to the right of a merging pair should feel both masses.
        let big = Body::new(100.0, 10.0, Vector2::new(0.0, 0.0)).unwrap();
        let small = Body::new(50.0, 10.0, Vector2::new(1.0, 0.0)).unwrap();
        let tracer = Body::new(1.0, 1.0, Vector2::new(100.0, 0.0)).unwrap();
        let tracer_id = tracer.id();
        let mut sim = running(vec![big, small, tracer]);

        sim.step(0.0).unwrap();

        let a = sim.body(tracer_id).unwrap().acceleration();
        assert_relative_eq!(a.x, -0.0006 * 150.0 / 10_000.0);
    }

    #[test]
    fn fixed_body_survives_absorbing_without_moving() {
        let sun = Body::new(1000.0, 20.0, Vector2::new(5.0, 5.0)).unwrap().fixed();
        let rock = Body::new(10.0, 2.0, Vector2::new(10.0, 5.0))
            .unwrap()
            .with_velocity(Vector2::new(-50.0, 0.0))
            .unwrap();
        let sun_id = sun.id();
        let mut sim = running(vec![sun, rock]);

        sim.step(0.1).unwrap();

        let sun = sim.body(sun_id).unwrap();
        assert_eq!(sim.len(), 1);
        assert_eq!(sun.mass(), 1010.0);
        assert_eq!(sun.position(), Vector2::new(5.0, 5.0));
        assert_eq!(sun.velocity(), Vector2::ZERO);
        assert_eq!(sun.acceleration(), Vector2::ZERO);
    }

    #[test]
    fn empty_simulation_stops_on_step() {
        let mut sim = running(Vec::new());

        let report = sim.step(0.016).unwrap();

        assert!(report.stopped);
        assert_eq!(sim.state(), RunState::Stopped);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let body = Body::new(1.0, 1.0, Vector2::ZERO).unwrap();
        let mut sim = Simulation::new(Config::default());

        sim.add_body(body.clone()).unwrap();

        assert!(matches!(sim.add_body(body), Err(SimError::InvalidArgument(_))));
        assert_eq!(sim.len(), 1);
    }

    #[test]
    fn overflow_aborts_the_tick_without_committing() {
        let fast = Body::new(1.0, 1.0, Vector2::ZERO)
            .unwrap()
            .with_velocity(Vector2::new(f64::MAX, 0.0))
            .unwrap();
        let mut sim = running(vec![fast]);

        let err = sim.step(10.0).unwrap_err();

        assert!(matches!(err, SimError::NonFinite { .. }));
        assert_eq!(sim.bodies()[0].position(), Vector2::ZERO);
        assert!(sim.bodies()[0].trail().is_empty());
        assert_eq!(sim.tick(), 0);
    }

    #[test]
    fn trail_capacity_follows_config() {
        let cfg = Config {
            trail_length: 4,
            ..Config::default()
        };
        let mut sim = Simulation::with_bodies(
            cfg,
            [Body::new(1.0, 1.0, Vector2::ZERO)
                .unwrap()
                .with_velocity(Vector2::new(1.0, 0.0))
                .unwrap()],
        )
        .unwrap();
        sim.start();

        for _ in 0..10 {
            sim.step(1.0).unwrap();
        }

        let trail = sim.bodies()[0].trail();
        assert_eq!(trail.len(), 4);
        assert_eq!(trail.last(), Some(Vector2::new(10.0, 0.0)));
    }

    #[test]
    fn collision_correction_feeds_velocity() {
        let heavy = Body::new(200.0, 10.0, Vector2::new(0.0, 0.0)).unwrap();
        let light = Body::new(50.0, 10.0, Vector2::new(5.0, 0.0))
            .unwrap()
            .with_velocity(Vector2::new(8.0, -4.0))
            .unwrap();
        let heavy_id = heavy.id();
        let mut sim = running(vec![heavy, light]);

        sim.step(0.0).unwrap();

        // Lone survivor: no gravity left, only 8,-4 * 50/200.
        let survivor = sim.body(heavy_id).unwrap();
        assert_eq!(sim.len(), 1);
        assert_eq!(survivor.acceleration(), Vector2::new(2.0, -1.0));
        assert_eq!(survivor.velocity(), Vector2::new(2.0, -1.0));
        assert_eq!(survivor.position(), Vector2::ZERO);
    }

    #[test]
    fn corrections_from_several_merges_add_up() {
        let heavy = Body::new(100.0, 10.0, Vector2::new(0.0, 0.0)).unwrap();
        let east = Body::new(20.0, 2.0, Vector2::new(5.0, 0.0))
            .unwrap()
            .with_velocity(Vector2::new(10.0, 0.0))
            .unwrap();
        let west = Body::new(30.0, 2.0, Vector2::new(-5.0, 0.0))
            .unwrap()
            .with_velocity(Vector2::new(0.0, 12.0))
            .unwrap();
        let heavy_id = heavy.id();
        let mut sim = running(vec![heavy, east, west]);

        let report = sim.step(0.0).unwrap();

        // 10 * 20/100 on x, then 12 * 30/120 on y.
        let survivor = sim.body(heavy_id).unwrap();
        assert_eq!(report.absorptions.len(), 2);
        assert_eq!(survivor.mass(), 150.0);
        assert_relative_eq!(survivor.acceleration().x, 2.0);
        assert_relative_eq!(survivor.acceleration().y, 3.0);
        assert_eq!(survivor.velocity(), survivor.acceleration());
    }

    #[test]
    fn gravity_field_matches_per_body_queries() {
        let sim = Simulation::with_bodies(
            Config::default(),
            [
                Body::new(1000.0, 1.0, Vector2::new(0.0, 0.0)).unwrap().fixed(),
                Body::new(10.0, 1.0, Vector2::new(30.0, 40.0)).unwrap(),
                Body::new(20.0, 1.0, Vector2::new(-60.0, 10.0)).unwrap(),
            ],
        )
        .unwrap();

        let field = sim.gravity_field();

        assert_eq!(field.len(), 3);
        assert_eq!(field[0].1, Vector2::ZERO);
        for (id, a) in field {
            assert_eq!(Some(a), sim.gravity_on(id));
        }
    }

    #[test]
    fn gravity_on_unknown_body_is_none() {
        let sim = Simulation::new(Config::default());
        let other = Body::new(1.0, 1.0, Vector2::ZERO).unwrap();
        assert!(sim.gravity_on(other.id()).is_none());
    }
}
