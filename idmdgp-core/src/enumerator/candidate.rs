//! At each BP order level, builds 0..2*N candidate positions for
//! `order[level]` by trilaterating against its three predecessors
//! within the lookback window, discretizing any one of those three
//! edges that is an interval rather than an exact distance.

use super::context::EnumContext;
use crate::graph::LOOKBACK;
use crate::value::Value;
use crate::vector::Vec3;

/// A candidate position together with the branch index that selects
/// it (spec.md §4.4's "branch bit", generalized from a strict 0/1 to
/// an index since interval discretization can produce more than two
/// siblings per level).
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub pos: Vec3,
}

/// Samples `n_samples >= 2` distances across `[l, u]`, symmetric about
/// the midpoint.
fn sample_interval(l: f64, u: f64, n_samples: u32) -> Vec<f64> {
    let n = n_samples.max(2);
    (0..n)
        .map(|k| l + (u - l) * (k as f64) / ((n - 1) as f64))
        .collect()
}

/// Expands a predecessor edge value into the set of scalar distances
/// to trilaterate against: a singleton for an exact edge, or
/// `interval_samples` samples for an interval edge.
fn expand_distance(value: Value, interval_samples: u32) -> Vec<f64> {
    match value {
        Value::Scalar(v) => vec![v],
        Value::Interval(l, u) => sample_interval(l, u, interval_samples),
        Value::Undefined => Vec::new(),
    }
}

/// Solves the three-sphere intersection for a point at distances
/// `d1, d2, d3` from `p1, p2, p3` respectively, returning the
/// reflection pair of candidates (or a single point when they
/// coincide within `ddf_tol`, or none when the discriminant is
/// negative beyond tolerance).
fn trilaterate(p1: Vec3, p2: Vec3, p3: Vec3, d1: f64, d2: f64, d3: f64, ddf_tol: f64) -> Vec<Vec3> {
    // Orthonormal frame anchored at p3: e1 along (p2 -> p3), e2 the
    // component of (p1 -> p3) orthogonal to e1, e3 completing the
    // right-handed frame.
    let e1 = match (p3 - p2).normalized() {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };
    let w = p3 - p1;
    let i = w.dot(&e1);
    let w_perp = w - e1 * i;
    let e2 = match w_perp.normalized() {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };
    let e3 = e1.cross(&e2);
    let j = w_perp.length();

    let b = (p3 - p2).length();

    let x = (d2 * d2 - d3 * d3 - b * b) / (2.0 * b);
    let y = if j.abs() < 1e-12 {
        return Vec::new();
    } else {
        (d1 * d1 - d3 * d3 - i * i - j * j - 2.0 * i * x) / (2.0 * j)
    };

    let z_sq = d3 * d3 - x * x - y * y;
    if z_sq < -ddf_tol {
        return Vec::new();
    }
    let z = z_sq.max(0.0).sqrt();

    let base = p3 + e1 * x + e2 * y;
    if z < ddf_tol {
        vec![base]
    } else {
        vec![base + e3 * z, base - e3 * z]
    }
}

/// Generates every candidate position for `order[level]`, trilaterating
/// against the three canonical lookback predecessors
/// `order[level-3..=level-1]`, whose already-embedded positions the
/// caller supplies (they live in the caller's
/// [`super::state::ThreadState`], not in this read-only context).
/// Returns an empty vector (a dead branch) if a predecessor edge is
/// undefined, or if every discretized trilateration attempt fails.
pub fn generate_candidates(
    ctx: &EnumContext,
    level: usize,
    p1_pos: Vec3,
    p2_pos: Vec3,
    p3_pos: Vec3,
) -> Vec<Candidate> {
    debug_assert!(level >= LOOKBACK);
    let order = &ctx.graph.order;
    let atom = order[level];
    let p1_atom = order[level - 3];
    let p2_atom = order[level - 2];
    let p3_atom = order[level - 1];

    let v1 = ctx.graph.has_edge_value(p1_atom, atom);
    let v2 = ctx.graph.has_edge_value(p2_atom, atom);
    let v3 = ctx.graph.has_edge_value(p3_atom, atom);
    if v1.is_undefined() || v2.is_undefined() || v3.is_undefined() {
        return Vec::new();
    }

    let samples1 = expand_distance(v1, ctx.config.interval_samples);
    let samples2 = expand_distance(v2, ctx.config.interval_samples);
    let samples3 = expand_distance(v3, ctx.config.interval_samples);

    let mut candidates = Vec::new();
    for &d1 in &samples1 {
        for &d2 in &samples2 {
            for &d3 in &samples3 {
                for pos in trilaterate(p1_pos, p2_pos, p3_pos, d1, d2, d3, ctx.config.ddf_tol) {
                    candidates.push(Candidate { pos });
                }
            }
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trilaterate_unit_tetrahedron() {
        // Three mutually unit-distant points in the xy-plane; the
        // fourth point at unit distance from all three should land at
        // the regular-tetrahedron apex (or its mirror).
        let p1 = Vec3::new(0.0, 0.0, 0.0);
        let p2 = Vec3::new(1.0, 0.0, 0.0);
        let p3 = Vec3::new(0.5, (3f64).sqrt() / 2.0, 0.0);
        let candidates = trilaterate(p1, p2, p3, 1.0, 1.0, 1.0, 1e-6);
        assert_eq!(candidates.len(), 2);
        for c in &candidates {
            assert!((c.distance_to(&p1) - 1.0).abs() < 1e-6);
            assert!((c.distance_to(&p2) - 1.0).abs() < 1e-6);
            assert!((c.distance_to(&p3) - 1.0).abs() < 1e-6);
        }
        // reflection pair is symmetric about the (p1,p2,p3) plane (z=0)
        assert!((candidates[0].z + candidates[1].z).abs() < 1e-9);
    }

    #[test]
    fn trilaterate_infeasible_returns_empty() {
        let p1 = Vec3::new(0.0, 0.0, 0.0);
        let p2 = Vec3::new(1.0, 0.0, 0.0);
        let p3 = Vec3::new(0.5, 0.1, 0.0);
        // Distances far too large to be mutually consistent in 3D from
        // these close-together points: forces a negative discriminant.
        let candidates = trilaterate(p1, p2, p3, 100.0, 0.01, 0.01, 1e-6);
        assert!(candidates.is_empty());
    }
}
