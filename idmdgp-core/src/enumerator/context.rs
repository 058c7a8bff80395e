use crate::config::Config;
use crate::error::{CoreError, Result};
use crate::graph::Graph;
use crate::peptide::Peptide;
use log::debug;

/// Read-only context shared by every worker thread during a search.
/// The peptide and graph are never mutated once the search starts, so
/// a single [`EnumContext`] may be shared across threads (spec.md §5:
/// "the peptide and graph are read-only throughout enumeration").
pub struct EnumContext<'a> {
    pub peptide: &'a Peptide,
    pub graph: &'a Graph,
    pub config: Config,
    /// Maps an atom id to its position in the BP order, or
    /// `usize::MAX` if the atom does not appear in the order.
    atom_level: Vec<usize>,
}

impl<'a> EnumContext<'a> {
    pub fn new(peptide: &'a Peptide, graph: &'a Graph, config: Config) -> Result<Self> {
        graph.validate_order()?;
        let mut atom_level = vec![usize::MAX; graph.n()];
        for (level, &atom) in graph.order.iter().enumerate() {
            atom_level[atom] = level;
        }
        let (n_exact, n_interval) = graph.count_edges();
        debug!(
            "enumerator context ready: {} atoms, {} ordered, {} exact edges, {} interval edges, {} torsions, {} impropers",
            graph.n(),
            graph.n_order(),
            n_exact,
            n_interval,
            peptide.torsions.len(),
            peptide.impropers.len(),
        );
        Ok(EnumContext { peptide, graph, config, atom_level })
    }

    /// Returns the BP order level at which `atom` is embedded.
    pub fn level_of(&self, atom: usize) -> Option<usize> {
        match self.atom_level[atom] {
            usize::MAX => None,
            l => Some(l),
        }
    }

    /// Returns the BP order level of `atom`, failing if it is not part
    /// of the order (a model-construction bug, not a search-time
    /// anomaly, hence a hard error rather than a silent prune).
    pub fn require_level_of(&self, atom: usize) -> Result<usize> {
        self.level_of(atom).ok_or(CoreError::InvalidOrder { position: usize::MAX, atom })
    }

    pub fn n_order(&self) -> usize {
        self.graph.n_order()
    }
}
