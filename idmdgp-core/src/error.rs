use thiserror::Error;

/// Errors that may be raised while building or searching an iDMDGP instance.
///
/// Per-branch numerical anomalies encountered deep inside the candidate
/// generator (a negative trilateration discriminant, an `acos` argument
/// that still falls outside its domain after clamping, a zero-length
/// normalize) are **not** represented here: they are interpreted as "no
/// candidate produced" and silently prune that branch of the search tree.
/// Only setup-time failures (model construction, order validation) and
/// worker-thread allocation failures reach this type.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A heap allocation failed while growing a per-level pruner payload
    /// list or a worker's thread state stack.
    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    /// The supplied Branch-and-Prune vertex order does not give every
    /// atom at position `k >= 3` at least three exact-distance
    /// predecessors within the lookback window.
    #[error("invalid BP order at position {position}: atom {atom} has fewer than 3 exact predecessors in the lookback window")]
    InvalidOrder { position: usize, atom: usize },

    /// An `acos` argument fell outside `[-1-eps, 1+eps]` even after
    /// clamping to the domain.
    #[error("invalid domain for acos: argument {value} outside [-1-eps, 1+eps]")]
    InvalidDomain { value: f64 },

    /// A vector had length below the numerical tolerance and could not
    /// be normalized.
    #[error("degenerate vector: length {length} below tolerance")]
    DegenerateVector { length: f64 },

    /// A lookup by `(residue_id, atom_name)` failed to find an atom.
    #[error("unknown atom: residue {residue} has no atom named '{name}'")]
    UnknownAtom { residue: usize, name: String },

    /// An attempt was made to register a torsion or improper that
    /// already exists for the same four atoms.
    #[error("duplicate dihedral over atoms {0:?}")]
    DuplicateDihedral([usize; 4]),

    /// The writer or reader failed an I/O operation.
    #[error("I/O failure: {0}")]
    IoFailure(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
