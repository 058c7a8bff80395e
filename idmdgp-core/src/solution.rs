use crate::vector::Vec3;

/// A complete embedding produced by the search driver when the last BP
/// order level is reached without pruning.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub positions: Vec<Vec3>,
    /// Number of constraints (distance or dihedral) that fell outside
    /// tolerance at emission time; always `0` for solutions produced by
    /// the driver itself, since a violation would have pruned the
    /// branch. Kept for consumers that re-check a solution after the
    /// fact (e.g. relaxed tolerances for reporting).
    pub violation_count: usize,
    /// Root-mean-square positional deviation from the previously
    /// emitted solution on the same worker thread, or `0.0` for the
    /// first one a thread emits (cross-thread emission order is not
    /// guaranteed, per spec.md §5, so "previous" is scoped per worker).
    pub rmsd_to_previous: f64,
}

impl Solution {
    pub fn new(positions: Vec<Vec3>) -> Self {
        Solution { positions, violation_count: 0, rmsd_to_previous: 0.0 }
    }

    /// Computes the RMSD between this solution and `previous`, assuming
    /// matching atom counts and no superposition (positions already
    /// share the same BP-order-0 frame, as every solution in a stream
    /// does since atoms 0..2 are placed deterministically).
    pub fn rmsd(&self, previous: &Solution) -> f64 {
        let n = self.positions.len().min(previous.positions.len());
        if n == 0 {
            return 0.0;
        }
        let sum_sq: f64 = (0..n)
            .map(|i| self.positions[i].distance_square_to(&previous.positions[i]))
            .sum();
        (sum_sq / n as f64).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rmsd_zero_for_identical() {
        let s = Solution::new(vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)]);
        assert_eq!(s.rmsd(&s), 0.0);
    }

    #[test]
    fn rmsd_nonzero_for_shifted() {
        let a = Solution::new(vec![Vec3::new(0.0, 0.0, 0.0)]);
        let b = Solution::new(vec![Vec3::new(1.0, 0.0, 0.0)]);
        assert!((a.rmsd(&b) - 1.0).abs() < 1e-12);
    }
}
