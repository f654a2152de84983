//! Simulated point masses.
//!
//! A [`Body`] carries no reference to other bodies: gravity and collision
//! code is always handed the full body set for the current tick.

use crate::config::Config;
use crate::error::{SimError, SimResult};
use crate::trail::Trail;
use crate::vector::{Vector2, VectorExt};
use serde::Deserialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BODY_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identity issued once when a body is constructed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BodyId(u64);

impl BodyId {
    fn next() -> Self {
        Self(NEXT_BODY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Display colour. Ignored by the physics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BROWN: Color = Color::rgb(0x96, 0x4B, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a `#rrggbb` string.
    pub fn from_hex(s: &str) -> SimResult<Self> {
        let invalid = || SimError::InvalidArgument(format!("`{s}` is not a #rrggbb colour"));
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BROWN
    }
}

impl TryFrom<String> for Color {
    type Error = SimError;

    fn try_from(s: String) -> SimResult<Self> {
        Self::from_hex(&s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// A point mass with position, velocity, acceleration and a trail.
///
/// Vectors are plain values: every update replaces the whole field, so two
/// bodies can never share one.
#[derive(Clone, Debug)]
pub struct Body {
    id: BodyId,
    mass: f64,
    radius: f64,
    position: Vector2,
    velocity: Vector2,
    acceleration: Vector2,
    color: Color,
    fixed: bool,
    trail: Trail,
}

impl Body {
    /// Creates a free body at rest.
    ///
    /// ### Parameters
    /// - `mass` - Must be finite and strictly positive.
    /// - `radius` - Must be finite and strictly positive.
    /// - `position` - Must have finite components.
    ///
    /// ### Errors
    /// [`SimError::InvalidArgument`] if any parameter is out of range. No
    /// body (and no id) is produced in that case.
    pub fn new(mass: f64, radius: f64, position: Vector2) -> SimResult<Self> {
        check_positive("mass", mass)?;
        check_positive("radius", radius)?;
        check_finite("position", position)?;

        Ok(Self {
            id: BodyId::next(),
            mass,
            radius,
            position,
            velocity: Vector2::ZERO,
            acceleration: Vector2::ZERO,
            color: Color::default(),
            fixed: false,
            // Replaced by the owning simulation's setting in `add_body`.
            trail: Trail::with_capacity(Config::default().trail_length),
        })
    }

    /// Sets the initial velocity.
    pub fn with_velocity(mut self, velocity: Vector2) -> SimResult<Self> {
        check_finite("velocity", velocity)?;
        self.velocity = velocity;
        Ok(self)
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Pins the body in place. It still attracts others and takes part in
    /// collisions, but never moves.
    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self.velocity = Vector2::ZERO;
        self.acceleration = Vector2::ZERO;
        self
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn position(&self) -> Vector2 {
        self.position
    }

    /// Current velocity; always zero for fixed bodies.
    pub fn velocity(&self) -> Vector2 {
        if self.fixed { Vector2::ZERO } else { self.velocity }
    }

    /// Acceleration applied on the last tick; always zero for fixed bodies.
    pub fn acceleration(&self) -> Vector2 {
        if self.fixed { Vector2::ZERO } else { self.acceleration }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Surface density, `m / (2·π·r²)`.
    pub fn density(&self) -> f64 {
        self.mass / (2.0 * std::f64::consts::PI * self.radius * self.radius)
    }

    pub fn momentum(&self) -> Vector2 {
        self.velocity() * self.mass
    }

    /// Two bodies collide when their centres are closer than the sum of
    /// their radii.
    pub fn collides_with(&self, other: &Body) -> bool {
        overlaps(self.position, self.radius, other.position, other.radius)
    }

    pub(crate) fn set_mass(&mut self, mass: f64) {
        debug_assert!(mass > 0.0);
        self.mass = mass;
    }

    pub(crate) fn set_trail_capacity(&mut self, capacity: usize) {
        self.trail.set_capacity(capacity);
    }

    /// Commits one tick of motion and records the new position.
    pub(crate) fn apply_motion(&mut self, position: Vector2, velocity: Vector2, acceleration: Vector2) {
        if self.fixed {
            return;
        }
        self.acceleration = acceleration;
        self.velocity = velocity;
        self.position = position;
        self.trail.record(position);
    }
}

pub(crate) fn overlaps(pos_a: Vector2, radius_a: f64, pos_b: Vector2, radius_b: f64) -> bool {
    pos_a.distance_to(pos_b) < radius_a + radius_b
}

fn check_positive(name: &str, value: f64) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidArgument(format!(
            "{name} must be finite and positive, got {value}"
        )))
    }
}

fn check_finite(name: &str, v: Vector2) -> SimResult<()> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidArgument(format!(
            "{name} must have finite components, got ({}, {})",
            v.x, v.y
        )))
    }
}
