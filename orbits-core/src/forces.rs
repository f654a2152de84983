//! Pairwise Newtonian gravity.
//!
//! Bodies are summed in slice order, so the result for a given body set is
//! reproducible bit for bit.

use crate::body::{Body, BodyId};
use crate::vector::{Vector2, VectorExt};

/// The data gravity needs from a body.
///
/// The integrator builds these from a tick-start snapshot with merged
/// masses already applied, so force code never sees half-updated bodies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointMass {
    pub id: BodyId,
    pub mass: f64,
    pub position: Vector2,
}

impl From<&Body> for PointMass {
    fn from(b: &Body) -> Self {
        Self {
            id: b.id(),
            mass: b.mass(),
            position: b.position(),
        }
    }
}

/// Net gravitational acceleration on `target` from every other source.
///
/// For each source `b` with a different id:
///
/// `F = G · m_t · m_b / d²`, and the contribution is
/// `normalize(b.pos - t.pos) · F / m_t`.
///
/// Sources at exactly the target's position have no direction and are
/// skipped instead of producing NaN.
///
/// ### Parameters
/// - `target` - Body whose acceleration is computed.
/// - `sources` - All bodies, in a stable order; `target` itself may be
///   included.
/// - `g` - Gravitational constant.
///
/// ### Returns
/// The summed acceleration. Nothing is mutated.
pub fn acceleration_on(
    target: &PointMass,
    sources: impl IntoIterator<Item = PointMass>,
    g: f64,
) -> Vector2 {
    let mut acc = Vector2::ZERO;

    for b in sources.into_iter().filter(|b| b.id != target.id) {
        let distance = target.position.distance_to(b.position);
        let d2 = distance * distance;

        let direction = match (b.position - target.position).normalized() {
            Ok(dir) if d2 > 0.0 => dir,
            _ => {
                log::trace!(
                    "skipping coincident pair {} / {} at ({}, {})",
                    target.id,
                    b.id,
                    target.position.x,
                    target.position.y
                );
                continue;
            }
        };

        let force = g * target.mass * b.mass / d2;
        acc += direction * (force / target.mass);
    }

    acc
}

/// Net gravitational acceleration on `body` from `bodies`.
///
/// Fixed bodies are immovable, so the result for them is always zero.
/// They still pull on everything else.
pub fn gravity_vector(body: &Body, bodies: &[Body], g: f64) -> Vector2 {
    if body.is_fixed() {
        return Vector2::ZERO;
    }
    acceleration_on(&PointMass::from(body), bodies.iter().map(PointMass::from), g)
}
