use crate::value::Value;

/// A torsion or improper dihedral constraint over four atom ids, with
/// an angle bound stored in radians (converted from degrees at
/// construction time by [`super::Peptide::add_torsion`]/
/// [`super::Peptide::add_improper`]).
///
/// `ang` may wrap across `+/-pi` (e.g. `[170 deg, -170 deg]`); per the
/// design note on wrap-around bounds, this is **not** interpreted as a
/// union interval — bound comparisons remain linear on `ang`'s
/// endpoints, matching the original source's behavior exactly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dihedral {
    pub atom_id: [usize; 4],
    pub ang: Value,
}
