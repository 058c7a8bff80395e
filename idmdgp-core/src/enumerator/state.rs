use crate::value::Value;
use crate::vector::Vec3;

/// A pruner payload allocated when a level is entered and released in
/// bulk when the search backtracks past that level (design note §9:
/// a tagged variant rather than an opaque pointer + function pointer).
#[derive(Debug, Clone)]
pub enum PrunerPayload {
    /// Torsion-angle feasibility, covering both proper torsions and
    /// improper dihedrals (they share the same geometry and bound
    /// check; only the reporting label differs).
    Taf(TafPayload),
    /// Distance feasibility against a predecessor not already used in
    /// trilateration.
    Ddf(DdfPayload),
}

#[derive(Debug, Clone)]
pub struct TafPayload {
    pub is_improper: bool,
    /// Index of this dihedral within `Peptide::torsions` or
    /// `Peptide::impropers` (whichever `is_improper` selects),
    /// kept so the shutdown report can recover the four atom ids.
    pub dihedral_index: usize,
    /// Backward level offsets `n[k] = level - level_of(atom_id[k])`
    /// for the four atoms of the dihedral, computed at registration.
    pub offsets: [usize; 4],
    /// Angle bound, already in radians.
    pub bound: Value,
}

#[derive(Debug, Clone)]
pub struct DdfPayload {
    /// Absolute atom id of the newly embedded atom (`order[level]` at
    /// registration time).
    pub self_atom: usize,
    /// Absolute atom id of the predecessor this closure checks against.
    pub other_atom: usize,
    /// Backward level offset to `other_atom` from the level this
    /// payload was registered at.
    pub offset: usize,
    /// The edge's stored value (exact or interval).
    pub target: Value,
}

/// A stable key identifying a pruner instance across repeated
/// registrations, used to aggregate `ntest`/`nprune` counters across
/// the whole search (registrations come and go with backtracking, but
/// the constraint they check is the same every time).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrunerKey {
    Taf { is_improper: bool, dihedral_index: usize },
    Ddf { a: usize, b: usize },
}

impl PrunerPayload {
    pub fn key(&self) -> PrunerKey {
        match self {
            PrunerPayload::Taf(p) => {
                PrunerKey::Taf { is_improper: p.is_improper, dihedral_index: p.dihedral_index }
            }
            PrunerPayload::Ddf(p) => {
                let (a, b) = if p.self_atom < p.other_atom {
                    (p.self_atom, p.other_atom)
                } else {
                    (p.other_atom, p.self_atom)
                };
                PrunerKey::Ddf { a, b }
            }
        }
    }
}

/// One entry in a [`ThreadState`] stack: the position assigned at that
/// level, the branch index currently being explored, and the pruner
/// payloads registered when the level was entered.
#[derive(Debug, Clone, Default)]
pub struct LevelEntry {
    pub pos: Vec3,
    pub branch: usize,
    pub payloads: Vec<PrunerPayload>,
}

/// The per-worker search stack, indexed by BP order level.
#[derive(Debug, Clone, Default)]
pub struct ThreadState {
    pub entries: Vec<LevelEntry>,
}

impl ThreadState {
    pub fn new(n_order: usize) -> Self {
        ThreadState { entries: vec![LevelEntry::default(); n_order] }
    }

    pub fn pos(&self, level: usize) -> Vec3 {
        self.entries[level].pos
    }

    /// Releases all payloads registered at levels `> level`, i.e. the
    /// bulk-free step performed on backtrack.
    pub fn truncate_payloads_above(&mut self, level: usize) {
        for entry in self.entries.iter_mut().skip(level + 1) {
            entry.payloads.clear();
        }
    }
}
