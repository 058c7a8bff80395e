//! Pruner registration and application.
//!
//! Two families of closures are registered, each time a new atom is
//! embedded at `level`:
//!
//! - **TAF** (torsion/improper angle feasibility): for every torsion or
//!   improper whose four atoms have all been embedded by `level`,
//!   registers a payload carrying the backward level offsets to each
//!   atom and the angle bound. Ported from `taf_init`/`enum_prune_taf`
//!   in `original_source/src/enum-prune-taf.c`.
//! - **DDF/IDDF** (distance feasibility): for every graph edge between
//!   the newly embedded atom and an earlier predecessor *not* one of
//!   the three lookback atoms already consumed by trilateration,
//!   registers a payload carrying the edge's target value. Grounded on
//!   the same init/apply/report shape as TAF (spec.md §4.5 describes
//!   DDF and IDDF as siblings of TAF sharing that structure; no C
//!   source for them survived distillation, so this module supplies it
//!   from the pattern TAF establishes).
//!
//! Per spec.md §4.5 and the offset arithmetic inherited from the C
//! source (`th->level - n[k]`, valid only when `th->level` equals the
//! level the closure was registered at), each payload is applied
//! exactly once, immediately at registration, rather than being
//! re-walked at every deeper level.

use super::context::EnumContext;
use super::state::{DdfPayload, LevelEntry, TafPayload};
use super::stats::PrunerStats;
use crate::graph::LOOKBACK;
use crate::value::Value;
use crate::vector::Vec3;

/// Finds the BP order level at which `atom` is embedded, scanning only
/// up to `lev` inclusive (mirrors `taf_level`: an atom not yet embedded
/// reports `lev + 1`, which the caller treats as "not ready").
fn level_of_upto(ctx: &EnumContext, lev: usize, atom: usize) -> usize {
    match ctx.level_of(atom) {
        Some(l) if l <= lev => l,
        _ => lev + 1,
    }
}

/// Registers every TAF/IMPR closure whose four atoms are all embedded
/// by `level`, appending their payloads to `entry.payloads`.
fn register_taf(ctx: &EnumContext, level: usize, entry: &mut LevelEntry) {
    let atom = ctx.graph.order[level];
    for (is_improper, arr) in [(false, &ctx.peptide.torsions), (true, &ctx.peptide.impropers)] {
        for (dihedral_index, dihed) in arr.iter().enumerate() {
            if !dihed.atom_id.contains(&atom) {
                continue;
            }
            let levs = dihed.atom_id.map(|id| level_of_upto(ctx, level, id));
            if levs.iter().any(|&l| l > level) {
                continue;
            }
            let offsets = levs.map(|l| level - l);
            entry.payloads.push(super::state::PrunerPayload::Taf(TafPayload {
                is_improper,
                dihedral_index,
                offsets,
                bound: dihed.ang,
            }));
        }
    }
}

/// Registers a DDF/IDDF closure for every defined edge from the newly
/// embedded atom to a predecessor that is not one of the three
/// trilateration atoms (those are enforced exactly by construction and
/// would be redundant to re-check).
fn register_ddf(ctx: &EnumContext, level: usize, entry: &mut LevelEntry) {
    let atom = ctx.graph.order[level];
    let skip_from = level.saturating_sub(LOOKBACK);
    for back_level in 0..level {
        if back_level >= skip_from {
            continue;
        }
        let other = ctx.graph.order[back_level];
        let target = ctx.graph.has_edge_value(other, atom);
        if target.is_undefined() {
            continue;
        }
        entry.payloads.push(super::state::PrunerPayload::Ddf(DdfPayload {
            self_atom: atom,
            other_atom: other,
            offset: level - back_level,
            target,
        }));
    }
}

/// Registers every applicable closure for the atom just embedded at
/// `level`, mirroring `enum_prune_dihe_init`/`enum_prune_impr_init`
/// plus the DDF/IDDF counterpart.
pub fn register_closures(ctx: &EnumContext, level: usize, entry: &mut LevelEntry) {
    register_taf(ctx, level, entry);
    register_ddf(ctx, level, entry);
}

/// The outcome of applying a single closure: whether it pruned the
/// branch, and the stable key to record the test against.
pub struct ApplyOutcome {
    pub key: super::state::PrunerKey,
    pub pruned: bool,
}

/// Computes the dihedral angle `omega` of the four positions
/// `x1, x2, x3, x4` via the plane-normal construction in
/// `enum_prune_taf`, then checks it against `bound` within `ddf_tol`.
fn apply_taf(positions: [Vec3; 4], bound: Value, ddf_tol: f64) -> bool {
    let [x1, x2, x3, x4] = positions;
    let b1 = x1 - x2;
    let b2 = x2 - x3;
    let b3 = x3 - x4;

    let n1 = match b1.cross(&b2).normalized() {
        Ok(v) => v,
        Err(_) => return false,
    };
    let n2 = match b2.cross(&b3).normalized() {
        Ok(v) => v,
        Err(_) => return false,
    };
    let b2_hat = match b2.normalized() {
        Ok(v) => v,
        Err(_) => return false,
    };
    let m = n1.cross(&b2_hat);

    let x = n1.dot(&n2);
    let y = m.dot(&n2);
    let omega = y.atan2(x);

    match bound.bounds() {
        Some((l, u)) => l - omega > ddf_tol || omega - u > ddf_tol,
        None => false,
    }
}

/// Checks the distance from `self_pos` to `other_pos` against `target`
/// within `ddf_tol`, covering both the exact (DDF) and interval (IDDF)
/// cases via a single [`Value`]-polymorphic comparison.
fn apply_ddf(self_pos: Vec3, other_pos: Vec3, target: Value, ddf_tol: f64) -> bool {
    let d = self_pos.distance_to(&other_pos);
    match target {
        Value::Scalar(v) => (d - v).abs() > ddf_tol,
        Value::Interval(l, u) => d < l - ddf_tol || d > u + ddf_tol,
        Value::Undefined => false,
    }
}

/// Applies every payload in `entry.payloads` (the closures just
/// registered for this level), recording test/prune outcomes into
/// `stats`. Returns `true` if the branch survives (no closure pruned
/// it).
pub fn apply_all(
    ctx: &EnumContext,
    level: usize,
    entry: &LevelEntry,
    pos_at: impl Fn(usize) -> Vec3,
    stats: &mut PrunerStats,
) -> bool {
    let mut survives = true;
    for payload in &entry.payloads {
        let key = payload.key();
        let pruned = match payload {
            super::state::PrunerPayload::Taf(p) => {
                let positions = p.offsets.map(|off| pos_at(level - off));
                apply_taf(positions, p.bound, ctx.config.ddf_tol)
            }
            super::state::PrunerPayload::Ddf(p) => {
                let other_pos = pos_at(level - p.offset);
                apply_ddf(pos_at(level), other_pos, p.target, ctx.config.ddf_tol)
            }
        };
        stats.record(key, pruned);
        if pruned {
            survives = false;
        }
    }
    survives
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taf_accepts_planar_cis_dihedral() {
        // Four coplanar points produce a dihedral of exactly 0 or pi;
        // this layout (a zig-zag in the xy-plane) gives 0.
        let x1 = Vec3::new(0.0, 1.0, 0.0);
        let x2 = Vec3::new(0.0, 0.0, 0.0);
        let x3 = Vec3::new(1.0, 0.0, 0.0);
        let x4 = Vec3::new(1.0, 1.0, 0.0);
        let bound = Value::interval(-0.01, 0.01);
        assert!(!apply_taf([x1, x2, x3, x4], bound, 1e-6));
    }

    #[test]
    fn taf_rejects_out_of_bound_dihedral() {
        let x1 = Vec3::new(0.0, 1.0, 0.0);
        let x2 = Vec3::new(0.0, 0.0, 0.0);
        let x3 = Vec3::new(1.0, 0.0, 0.0);
        let x4 = Vec3::new(1.0, -1.0, 0.3);
        let bound = Value::interval(3.0, 3.14159);
        assert!(apply_taf([x1, x2, x3, x4], bound, 1e-6));
    }

    #[test]
    fn ddf_exact_within_tolerance_survives() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.0, 0.0, 0.0);
        assert!(!apply_ddf(a, b, Value::scalar(1.0), 1e-3));
        assert!(apply_ddf(a, b, Value::scalar(2.0), 1e-3));
    }

    #[test]
    fn iddf_interval_bounds_checked() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(1.5, 0.0, 0.0);
        assert!(!apply_ddf(a, b, Value::interval(1.0, 2.0), 1e-3));
        assert!(apply_ddf(a, b, Value::interval(2.0, 3.0), 1e-3));
    }
}
