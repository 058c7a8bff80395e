//! Peptide model: atoms, residues, torsions and impropers.
//!
//! An [`Atom`] is identified within its [`Peptide`] by a stable integer
//! index assigned at insertion (insertion order defines the atom id, as
//! in the original C `peptide_t::atoms` array). Torsions and impropers
//! are keyed on four `(residue_id, atom_name)` pairs, matching
//! `peptide_torsion_add`/`peptide_torsion_delete` in
//! `original_source/src/peptide-torsions.h`.

mod atom;
mod dihedral;
mod residue;

pub use atom::Atom;
pub use dihedral::Dihedral;
pub use residue::Residue;

use crate::error::{CoreError, Result};
use crate::graph::Graph;
use crate::value::Value;

/// An ordered collection of residues and atoms, plus the torsion and
/// improper constraints defined over them.
#[derive(Debug, Default, Clone)]
pub struct Peptide {
    pub residues: Vec<Residue>,
    pub atoms: Vec<Atom>,
    pub torsions: Vec<Dihedral>,
    pub impropers: Vec<Dihedral>,
    /// Indices into `residues` of residues with an explicit (non-default)
    /// sidechain, as written in the DMDGP header's "explicit sidechains"
    /// section.
    pub explicit_sidechains: Vec<usize>,
}

impl Peptide {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new, empty residue and returns its index.
    pub fn add_residue(&mut self, code3: impl Into<String>) -> usize {
        let idx = self.residues.len();
        self.residues.push(Residue::new(code3, idx));
        idx
    }

    /// Finds the atom index for `(residue, name)`, if any.
    pub fn atom_find(&self, residue: usize, name: &str) -> Option<usize> {
        self.residues.get(residue)?.atom_ids.iter().copied().find(|&id| self.atoms[id].name == name)
    }

    fn atom_lookup(&self, residue: usize, name: &str) -> Result<usize> {
        self.atom_find(residue, name).ok_or_else(|| CoreError::UnknownAtom {
            residue,
            name: name.to_string(),
        })
    }

    /// Appends a new atom to `residue`, returning its peptide-wide id.
    pub fn add_atom(
        &mut self,
        residue: usize,
        name: impl Into<String>,
        ff_type: impl Into<String>,
        mass: f64,
        charge: f64,
        radius: f64,
    ) -> Result<usize> {
        if residue >= self.residues.len() {
            return Err(CoreError::UnknownAtom { residue, name: "<residue>".into() });
        }
        let id = self.atoms.len();
        self.atoms.push(Atom { residue, name: name.into(), ff_type: ff_type.into(), mass, charge, radius });
        self.residues[residue].atom_ids.push(id);
        Ok(id)
    }

    /// Overwrites the force-field parameters of an existing atom found
    /// by `(residue, name)`.
    pub fn modify_atom(
        &mut self,
        residue: usize,
        name: &str,
        ff_type: impl Into<String>,
        mass: f64,
        charge: f64,
        radius: f64,
    ) -> Result<()> {
        let id = self.atom_lookup(residue, name)?;
        let atom = &mut self.atoms[id];
        atom.ff_type = ff_type.into();
        atom.mass = mass;
        atom.charge = charge;
        atom.radius = radius;
        Ok(())
    }

    /// Removes an atom found by `(residue, name)`. Any torsions or
    /// impropers that reference it are also removed, mirroring
    /// `peptide_torsion_delete_any`.
    pub fn delete_atom(&mut self, residue: usize, name: &str) -> Result<()> {
        let id = self.atom_lookup(residue, name)?;
        self.delete_dihedrals_for_atom(id);
        self.atoms.remove(id);
        for res in &mut self.residues {
            res.atom_ids.retain(|&a| a != id);
            for a in &mut res.atom_ids {
                if *a > id {
                    *a -= 1;
                }
            }
        }
        for dihed in self.torsions.iter_mut().chain(self.impropers.iter_mut()) {
            for a in &mut dihed.atom_id {
                if *a > id {
                    *a -= 1;
                }
            }
        }
        Ok(())
    }

    fn resolve_quadruple(&self, ids: [(usize, &str); 4]) -> Result<[usize; 4]> {
        let mut out = [0usize; 4];
        for (k, (residue, name)) in ids.into_iter().enumerate() {
            out[k] = self.atom_lookup(residue, name)?;
        }
        Ok(out)
    }

    fn add_dihedral(
        &mut self,
        target: DihedralKind,
        ids: [(usize, &str); 4],
        bound: Value,
    ) -> Result<()> {
        let atom_id = self.resolve_quadruple(ids)?;
        let list = match target {
            DihedralKind::Torsion => &mut self.torsions,
            DihedralKind::Improper => &mut self.impropers,
        };
        if list.iter().any(|d| d.atom_id == atom_id) {
            return Err(CoreError::DuplicateDihedral(atom_id));
        }
        list.push(Dihedral { atom_id, ang: bound });
        Ok(())
    }

    pub fn add_torsion(&mut self, ids: [(usize, &str); 4], bound_degrees: Value) -> Result<()> {
        self.add_dihedral(DihedralKind::Torsion, ids, bound_degrees.scal(std::f64::consts::PI / 180.0))
    }

    pub fn add_improper(&mut self, ids: [(usize, &str); 4], bound_degrees: Value) -> Result<()> {
        self.add_dihedral(DihedralKind::Improper, ids, bound_degrees.scal(std::f64::consts::PI / 180.0))
    }

    pub fn delete_torsion(&mut self, ids: [(usize, &str); 4]) -> Result<()> {
        let atom_id = self.resolve_quadruple(ids)?;
        self.torsions.retain(|d| d.atom_id != atom_id);
        Ok(())
    }

    pub fn delete_improper(&mut self, ids: [(usize, &str); 4]) -> Result<()> {
        let atom_id = self.resolve_quadruple(ids)?;
        self.impropers.retain(|d| d.atom_id != atom_id);
        Ok(())
    }

    /// Removes every torsion and improper referencing atom id `id`,
    /// mirroring `peptide_torsion_delete_any`.
    pub fn delete_dihedrals_for_atom(&mut self, id: usize) {
        self.torsions.retain(|d| !d.atom_id.contains(&id));
        self.impropers.retain(|d| !d.atom_id.contains(&id));
    }

    /// Writes the edge induced by each torsion's angle bound into
    /// `graph`: given the already-known distances along the torsion's
    /// three consecutive bonds (a0-a1, a1-a2, a2-a3) and the two
    /// bond-angle diagonals (a0-a2, a1-a3), the angle bound on the
    /// torsion pins down the remaining non-bonded distance a0-a3 via
    /// [`crate::value::value_from_dihedral`]. The edge is written only
    /// when the graph does not already carry a better-than-undefined
    /// value for that pair, and only when every input distance is
    /// itself known. Ported from `peptide_graph_torsions`.
    pub fn graph_torsions(&self, graph: &mut Graph) -> Result<()> {
        for dihed in self.torsions.iter().chain(self.impropers.iter()) {
            let [a0, a1, a2, a3] = dihed.atom_id;
            if !graph.has_edge_value(a0, a3).is_undefined() {
                continue;
            }
            let d01 = graph.has_edge_value(a0, a1);
            let d02 = graph.has_edge_value(a0, a2);
            let d12 = graph.has_edge_value(a1, a2);
            let d13 = graph.has_edge_value(a1, a3);
            let d23 = graph.has_edge_value(a2, a3);
            if [d01, d02, d12, d13, d23].iter().any(Value::is_undefined) {
                continue;
            }
            let d03 = crate::value::value_from_dihedral(d01, d02, d12, d13, d23, dihed.ang)?;
            if !d03.is_undefined() {
                graph.set_edge(a0, a3, d03);
            }
        }
        Ok(())
    }

    /// Returns the one-letter code of the residue at `residue`, or `?`
    /// if unknown (used for pruner report formatting).
    pub fn residue_char(&self, residue: usize) -> char {
        self.residues.get(residue).map(|r| r.one_letter()).unwrap_or('?')
    }
}

#[derive(Clone, Copy)]
enum DihedralKind {
    Torsion,
    Improper,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_peptide() -> Peptide {
        let mut p = Peptide::new();
        let r0 = p.add_residue("ALA");
        p.add_atom(r0, "N", "N", 14.0, -0.3, 1.6).unwrap();
        p.add_atom(r0, "CA", "C", 12.0, 0.0, 1.7).unwrap();
        p.add_atom(r0, "C", "C", 12.0, 0.5, 1.7).unwrap();
        p.add_atom(r0, "O", "O", 16.0, -0.5, 1.5).unwrap();
        p
    }

    #[test]
    fn add_and_find_atom() {
        let p = sample_peptide();
        assert_eq!(p.atom_find(0, "CA"), Some(1));
        assert_eq!(p.atom_find(0, "missing"), None);
    }

    #[test]
    fn delete_atom_reindexes() {
        let mut p = sample_peptide();
        p.delete_atom(0, "N").unwrap();
        assert_eq!(p.atoms.len(), 3);
        assert_eq!(p.atom_find(0, "CA"), Some(0));
    }

    #[test]
    fn duplicate_torsion_rejected() {
        let mut p = sample_peptide();
        let ids = [(0, "N"), (0, "CA"), (0, "C"), (0, "O")];
        p.add_torsion(ids, Value::interval(-10.0, 10.0)).unwrap();
        let err = p.add_torsion(ids, Value::interval(-5.0, 5.0));
        assert!(matches!(err, Err(CoreError::DuplicateDihedral(_))));
    }
}
