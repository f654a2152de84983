//! Overlap detection and the mass-dominant merge rule.
//!
//! Resolution never touches the bodies themselves. It stages merged
//! masses, acceleration corrections and removal flags in a
//! [`CollisionOutcome`], which the integrator commits together with the
//! motion update.

use crate::body::{Body, BodyId, overlaps};
use crate::vector::Vector2;

/// One merge: `survivor` swallowed `absorbed`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Absorption {
    pub survivor: BodyId,
    pub absorbed: BodyId,
    /// Mass the absorbed body carried into the merge.
    pub absorbed_mass: f64,
}

/// Staged result of [`resolve_collisions`], indexed like the input slice.
#[derive(Clone, Debug)]
pub struct CollisionOutcome {
    /// Mass of every body after all merges of this tick.
    pub masses: Vec<f64>,
    /// Extra acceleration picked up from absorbed bodies.
    pub corrections: Vec<Vector2>,
    /// `true` for bodies to drop at the end of the tick.
    pub absorbed: Vec<bool>,
    /// Merges in the order they were applied.
    pub absorptions: Vec<Absorption>,
}

impl CollisionOutcome {
    pub fn is_absorbed(&self, index: usize) -> bool {
        self.absorbed[index]
    }

    pub fn survivor_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.absorbed
            .iter()
            .enumerate()
            .filter_map(|(i, &gone)| if gone { None } else { Some(i) })
    }

    pub fn absorbed_count(&self) -> usize {
        self.absorptions.len()
    }
}

/// Finds overlapping pairs and decides who absorbs whom.
///
/// Pairs are visited with the outer index ascending and the inner index
/// ascending. For a colliding pair `(i, j)`, `i` absorbs `j` when its
/// current staged mass is strictly greater:
///
/// 1. `correction[i] += velocity[j] · m_j / m_i` (`m_i` before this merge).
/// 2. `m_i += m_j`.
/// 3. `j` is flagged absorbed.
///
/// Equal masses never merge. Once flagged, a body neither absorbs nor is
/// absorbed again. Positions and velocities are read from `bodies` as
/// they were at the start of the tick.
///
/// ### Parameters
/// - `bodies` - Live bodies in their stable order.
///
/// ### Returns
/// A [`CollisionOutcome`] with one entry per input body.
pub fn resolve_collisions(bodies: &[Body]) -> CollisionOutcome {
    let n = bodies.len();
    let mut masses: Vec<f64> = bodies.iter().map(Body::mass).collect();
    let mut corrections = vec![Vector2::ZERO; n];
    let mut absorbed = vec![false; n];
    let mut absorptions = Vec::new();

    for i in 0..n {
        if absorbed[i] {
            continue;
        }
        for j in 0..n {
            if i == j || absorbed[j] {
                continue;
            }
            let (a, b) = (&bodies[i], &bodies[j]);
            if !overlaps(a.position(), a.radius(), b.position(), b.radius()) {
                continue;
            }
            if masses[i] > masses[j] {
                corrections[i] += b.velocity() * (masses[j] / masses[i]);
                masses[i] += masses[j];
                absorbed[j] = true;
                absorptions.push(Absorption {
                    survivor: a.id(),
                    absorbed: b.id(),
                    absorbed_mass: masses[j],
                });
            }
        }
    }

    CollisionOutcome {
        masses,
        corrections,
        absorbed,
        absorptions,
    }
}
