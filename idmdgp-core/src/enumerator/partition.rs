//! Thread partitioning: a shallow single-threaded split phase builds
//! work items at `split_level`, then a fixed pool of `std::thread`
//! workers drains them from a shared queue. Per spec.md §5 the only
//! synchronization points are work-item dequeue, solution enqueue,
//! cancellation-flag reads, and statistics aggregation at teardown —
//! no rayon/crossbeam work-stealing abstraction sits between those
//! points and the sequential, non-suspending DFS in
//! [`super::driver::SearchDriver`].

use super::context::EnumContext;
use super::driver::{embed_prefix, SearchDriver};
use super::stats::PrunerStats;
use crate::error::Result;
use crate::solution::Solution;
use crate::vector::Vec3;
use log::{debug, info};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

/// One unit of work for a worker thread: a BP order level to resume
/// at, and the positions already embedded for every level below it.
#[derive(Debug, Clone)]
struct WorkItem {
    root_level: usize,
    prefix: Vec<Vec3>,
}

/// Aggregate result of a partitioned run: every emitted solution (in
/// the order workers happened to enqueue them — per spec.md §5, the
/// merged stream across workers carries no cross-worker ordering
/// guarantee) and the merged pruner statistics.
pub struct PartitionReport {
    pub solutions: Vec<Solution>,
    pub stats: PrunerStats,
}

/// Single-threaded prefix phase: enumerates every feasible branch down
/// to `split_level` (`>= 3`) starting from the deterministic 3-atom
/// embedding, returning one [`WorkItem`] per surviving leaf.
fn build_work_items(ctx: &EnumContext, split_level: usize, cancel: &Arc<AtomicBool>) -> Result<Vec<WorkItem>> {
    debug_assert!(split_level >= 3);
    let prefix0 = embed_prefix(ctx)?;

    let items = Arc::new(Mutex::new(Vec::new()));
    {
        let items = Arc::clone(&items);
        let mut driver = SearchDriver::new(
            ctx,
            3,
            split_level,
            &prefix0,
            Arc::clone(cancel),
            move |positions: &[Vec3]| {
                items.lock().unwrap().push(WorkItem {
                    root_level: split_level + 1,
                    prefix: positions.to_vec(),
                });
            },
        );
        driver.run();
    }
    Ok(Arc::try_unwrap(items).unwrap().into_inner().unwrap())
}

/// Runs a full partitioned search, collecting every solution into the
/// returned [`PartitionReport`]. A thin wrapper over
/// [`run_partitioned_streaming`] with a no-op solution callback.
pub fn run_partitioned(ctx: &EnumContext, cancel: Arc<AtomicBool>) -> Result<PartitionReport> {
    run_partitioned_streaming(ctx, cancel, |_| {})
}

/// Runs a full partitioned search: builds the work-item queue at
/// `config.resolved_split_level()`, then spawns `config.thread_count`
/// workers (each owning its own [`SearchDriver`]/[`super::state::ThreadState`])
/// to drain it. Solutions are serialized behind a single mutex;
/// per-pruner statistics are merged at shutdown. `cancel` may be
/// shared with an external caller to cut the search short; a worker
/// hitting it stops emitting but finishes its current `descend` call.
///
/// `on_solution` is invoked once per emitted [`Solution`], inside the
/// same critical section that appends it to the report (spec.md §6's
/// "solution stream": the serialized emission point a consumer can
/// observe to decide when to set `cancel`). It runs on whichever
/// worker thread produced that solution, so it must be `Sync`.
pub fn run_partitioned_streaming(
    ctx: &EnumContext,
    cancel: Arc<AtomicBool>,
    on_solution: impl Fn(&Solution) + Send + Sync,
) -> Result<PartitionReport> {
    let n_order = ctx.n_order();

    // A graph with only the deterministic 3-atom prefix (or fewer
    // atoms than that) has no enumerator levels to descend into: the
    // prefix embedding itself is the unique solution.
    if n_order <= 3 {
        let prefix = embed_prefix(ctx)?;
        let positions = prefix[..n_order].to_vec();
        let solution = Solution::new(positions);
        on_solution(&solution);
        return Ok(PartitionReport { solutions: vec![solution], stats: PrunerStats::new() });
    }

    // The split phase must leave at least one level for the worker
    // phase to explore (root_level = split_level + 1 <= leaf_level =
    // n_order - 1); when the tree is too shallow for that, skip the
    // split phase and hand every worker the same single root item.
    let work_items = if n_order <= 4 {
        vec![WorkItem { root_level: 3, prefix: embed_prefix(ctx)?.to_vec() }]
    } else {
        let split_level = ctx.config.resolved_split_level().clamp(3, n_order - 2);
        let items = build_work_items(ctx, split_level, &cancel)?;
        debug!("split at level {split_level}: {} work items", items.len());
        items
    };

    let queue = Arc::new(Mutex::new(VecDeque::from(work_items)));
    let solutions = Arc::new(Mutex::new(Vec::new()));
    let stats = Arc::new(Mutex::new(PrunerStats::new()));
    let on_solution = Arc::new(on_solution);
    // Shared across every worker so `emit_limit` bounds the *total*
    // solution count (spec.md §6), not a per-worker budget that would
    // let a `thread_count`-way split emit up to `emit_limit * thread_count`.
    let emitted_total = Arc::new(AtomicU32::new(0));
    let emit_limit = ctx.config.emit_limit;

    let thread_count = ctx.config.thread_count.max(1) as usize;
    info!("starting search with {thread_count} worker thread(s)");
    thread::scope(|scope| {
        for _ in 0..thread_count {
            let queue = Arc::clone(&queue);
            let solutions = Arc::clone(&solutions);
            let stats = Arc::clone(&stats);
            let cancel = Arc::clone(&cancel);
            let on_solution = Arc::clone(&on_solution);
            let emitted_total = Arc::clone(&emitted_total);
            scope.spawn(move || {
                worker_loop(ctx, queue, solutions, stats, cancel, on_solution, emitted_total, emit_limit);
            });
        }
    });

    let solutions = Arc::try_unwrap(solutions).unwrap().into_inner().unwrap();
    let stats = Arc::try_unwrap(stats).unwrap().into_inner().unwrap();
    info!("search finished: {} solution(s) emitted", solutions.len());
    Ok(PartitionReport { solutions, stats })
}

fn worker_loop(
    ctx: &EnumContext,
    queue: Arc<Mutex<VecDeque<WorkItem>>>,
    solutions: Arc<Mutex<Vec<Solution>>>,
    stats: Arc<Mutex<PrunerStats>>,
    cancel: Arc<AtomicBool>,
    on_solution: Arc<dyn Fn(&Solution) + Send + Sync>,
    emitted_total: Arc<AtomicU32>,
    emit_limit: u32,
) {
    let n_order = ctx.n_order();
    // The most recently emitted solution *on this worker*, so
    // `rmsd_to_previous` measures deviation within this worker's own
    // DFS-ordered stream (spec.md §5: cross-worker emission order is
    // not guaranteed, so "previous" can only mean "previous on this
    // thread").
    let prev = RefCell::new(None::<Solution>);
    let prev = &prev;
    loop {
        if cancel.load(Ordering::Relaxed) {
            return;
        }
        let item = {
            let mut q = queue.lock().unwrap();
            q.pop_front()
        };
        let Some(item) = item else { return };

        let solutions_sink = Arc::clone(&solutions);
        let on_solution = Arc::clone(&on_solution);
        let cancel_for_limit = Arc::clone(&cancel);
        let emitted_total = Arc::clone(&emitted_total);
        let mut driver = SearchDriver::new(
            ctx,
            item.root_level,
            n_order - 1,
            &item.prefix,
            Arc::clone(&cancel),
            move |positions: &[Vec3]| {
                if emit_limit > 0 {
                    let already = emitted_total.fetch_add(1, Ordering::SeqCst);
                    if already >= emit_limit {
                        cancel_for_limit.store(true, Ordering::SeqCst);
                        return;
                    }
                    if already + 1 >= emit_limit {
                        cancel_for_limit.store(true, Ordering::SeqCst);
                    }
                }

                let mut solution = Solution::new(positions.to_vec());
                let mut slot = prev.borrow_mut();
                if let Some(previous) = slot.as_ref() {
                    solution.rmsd_to_previous = solution.rmsd(previous);
                }
                on_solution(&solution);
                solutions_sink.lock().unwrap().push(solution.clone());
                *slot = Some(solution);
            },
        );
        driver.run();
        stats.lock().unwrap().merge(&driver.into_stats());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::graph::Graph;
    use crate::peptide::Peptide;
    use crate::value::Value;

    fn triangle_graph() -> (Peptide, Graph) {
        let mut p = Peptide::new();
        let r = p.add_residue("GLY");
        for name in ["A", "B", "C"] {
            p.add_atom(r, name, "X", 1.0, 0.0, 1.0).unwrap();
        }
        let mut g = Graph::new(3);
        g.set_edge(0, 1, Value::scalar(1.0));
        g.set_edge(0, 2, Value::scalar(1.0));
        g.set_edge(1, 2, Value::scalar(1.0));
        g.set_order(vec![0, 1, 2]);
        (p, g)
    }

    #[test]
    fn single_thread_matches_multi_thread_solution_count() {
        let (peptide, graph) = triangle_graph();
        let config = Config { thread_count: 1, ..Config::default() };
        let ctx = EnumContext::new(&peptide, &graph, config).unwrap();
        let cancel = Arc::new(AtomicBool::new(false));
        let report = run_partitioned(&ctx, cancel).unwrap();
        assert_eq!(report.solutions.len(), 1);
        let s = &report.solutions[0];
        assert!((s.positions[0].length()).abs() < 1e-9);
        assert!((s.positions[1].distance_to(&Vec3::new(1.0, 0.0, 0.0))).abs() < 1e-9);
    }
}
