//! The depth-first search driver: an explicit `descend`/`backtrack`/
//! `emit`/`done` state machine rather than naive recursion, so
//! cancellation has a well-defined boundary (the top of `descend`)
//! instead of requiring an unwind path through arbitrary call depth.

use super::candidate::{generate_candidates, Candidate};
use super::context::EnumContext;
use super::pruner::{apply_all, register_closures};
use super::state::ThreadState;
use super::stats::PrunerStats;
use crate::error::{CoreError, Result};
use crate::value::{angle_from_sides, Value};
use crate::vector::Vec3;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Deterministically embeds the first three BP order positions: atom 0
/// at the origin, atom 1 along `+x` at distance `d(0,1)`, atom 2 in the
/// `xy`-plane (`z = 0`, `y >= 0`) using `d(0,2)` and `d(1,2)`. Requires
/// all three edges to be exact, per spec.md §3's invariant on the
/// deterministic prefix.
pub fn embed_prefix(ctx: &EnumContext) -> Result<[Vec3; 3]> {
    let order = &ctx.graph.order;
    let (a0, a1, a2) = (order[0], order[1], order[2]);

    let d01 = ctx.graph.has_edge_value(a0, a1);
    let d02 = ctx.graph.has_edge_value(a0, a2);
    let d12 = ctx.graph.has_edge_value(a1, a2);
    let (d01, d02, d12) = match (d01, d02, d12) {
        (Value::Scalar(a), Value::Scalar(b), Value::Scalar(c)) => (a, b, c),
        _ => return Err(CoreError::InvalidOrder { position: 0, atom: a2 }),
    };

    let theta = match angle_from_sides(Value::scalar(d01), Value::scalar(d02), Value::scalar(d12))? {
        Value::Scalar(t) => t,
        _ => return Err(CoreError::InvalidOrder { position: 2, atom: a2 }),
    };

    let p0 = Vec3::ZERO;
    let p1 = Vec3::new(d01, 0.0, 0.0);
    let p2 = Vec3::new(d02 * theta.cos(), d02 * theta.sin(), 0.0);
    Ok([p0, p1, p2])
}

/// Internal DFS control states, named after spec.md §4.7.
enum Step {
    Descend(usize),
    Backtrack(usize),
    Emit,
    Done,
}

/// Runs the depth-first search over levels `[root_level, leaf_level]`,
/// with levels `< root_level` already embedded by the caller (either
/// [`embed_prefix`] for a single-threaded run starting at level 3, or
/// a work item's prefix for a partitioned run). Invokes `on_leaf` for
/// every branch that reaches `leaf_level` without being pruned, which
/// is either a full solution (`leaf_level == n_order - 1`) or a
/// work-item prefix (`leaf_level == split_level`, see
/// [`super::partition`]). Polls `cancel` at each `descend` boundary and
/// stops without further emission once it is set.
pub struct SearchDriver<'a, 'b> {
    ctx: &'a EnumContext<'a>,
    state: ThreadState,
    stats: PrunerStats,
    cancel: Arc<AtomicBool>,
    root_level: usize,
    /// The level at which a fully placed branch counts as a leaf: the
    /// last BP order position for a real search, or the split level
    /// for the prefix-enumeration phase that builds work items.
    leaf_level: usize,
    emit_limit: u32,
    emitted: u32,
    candidates: Vec<Vec<Candidate>>,
    branch_idx: Vec<usize>,
    /// Receives the positions embedded at levels `0..=leaf_level` each
    /// time a branch reaches the leaf level without being pruned.
    on_leaf: Box<dyn FnMut(&[Vec3]) + 'b>,
}

impl<'a, 'b> SearchDriver<'a, 'b> {
    /// Builds a driver rooted at `root_level` with `prefix` already
    /// placed into levels `0..root_level` of the thread state, that
    /// treats reaching `leaf_level` (inclusive) as a solution.
    pub fn new(
        ctx: &'a EnumContext<'a>,
        root_level: usize,
        leaf_level: usize,
        prefix: &[Vec3],
        cancel: Arc<AtomicBool>,
        on_leaf: impl FnMut(&[Vec3]) + 'b,
    ) -> Self {
        let n_order = ctx.n_order();
        let mut state = ThreadState::new(n_order);
        for (level, &pos) in prefix.iter().enumerate() {
            state.entries[level].pos = pos;
        }
        SearchDriver {
            ctx,
            state,
            stats: PrunerStats::new(),
            cancel,
            root_level,
            leaf_level,
            emit_limit: ctx.config.emit_limit,
            emitted: 0,
            candidates: vec![Vec::new(); n_order],
            branch_idx: vec![0; n_order],
            on_leaf: Box::new(on_leaf),
        }
    }

    pub fn into_stats(self) -> PrunerStats {
        self.stats
    }

    /// Drives the search to completion (or cancellation, or the
    /// `emit_limit`).
    pub fn run(&mut self) {
        let mut step = Step::Descend(self.root_level);
        loop {
            step = match step {
                Step::Descend(level) => self.descend(level),
                Step::Backtrack(level) => self.backtrack(level),
                Step::Emit => self.emit(),
                Step::Done => break,
            };
        }
    }

    fn descend(&mut self, level: usize) -> Step {
        if self.cancel.load(Ordering::Relaxed) {
            return Step::Done;
        }
        if self.emit_limit > 0 && self.emitted >= self.emit_limit {
            return Step::Done;
        }

        if self.branch_idx[level] == 0 && self.candidates[level].is_empty() {
            let p1 = self.state.pos(level - 3);
            let p2 = self.state.pos(level - 2);
            let p3 = self.state.pos(level - 1);
            self.candidates[level] = generate_candidates(self.ctx, level, p1, p2, p3);
        }

        if self.branch_idx[level] >= self.candidates[level].len() {
            return Step::Backtrack(level);
        }

        let candidate = self.candidates[level][self.branch_idx[level]];
        self.state.entries[level].pos = candidate.pos;
        self.state.entries[level].branch = self.branch_idx[level];
        self.state.entries[level].payloads.clear();
        register_closures(self.ctx, level, &mut self.state.entries[level]);

        let survives = apply_all(
            self.ctx,
            level,
            &self.state.entries[level],
            |lvl| self.state.pos(lvl),
            &mut self.stats,
        );
        if !survives {
            self.branch_idx[level] += 1;
            return Step::Descend(level);
        }

        if level == self.leaf_level {
            Step::Emit
        } else {
            Step::Descend(level + 1)
        }
    }

    fn backtrack(&mut self, level: usize) -> Step {
        self.state.truncate_payloads_above(level.saturating_sub(1));
        self.candidates[level] = Vec::new();
        self.branch_idx[level] = 0;
        if level == self.root_level {
            return Step::Done;
        }
        self.branch_idx[level - 1] += 1;
        Step::Descend(level - 1)
    }

    fn emit(&mut self) -> Step {
        let positions: Vec<Vec3> = (0..=self.leaf_level).map(|l| self.state.pos(l)).collect();
        (self.on_leaf)(&positions);
        self.emitted += 1;
        // Continue as if this leaf were pruned: advance the branch at
        // the leaf level and keep exploring siblings.
        self.branch_idx[self.leaf_level] += 1;
        Step::Descend(self.leaf_level)
    }
}
