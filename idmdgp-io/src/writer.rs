//! Writes the DMDGP text dump of a peptide/graph pair, ported
//! section-by-section from `dmdgp_write_header/vertices/edges/atoms/
//! residues/dihedrals/order` in `original_source/src/dmdgp.c`.

use crate::error::Result;
use crate::format::{atom_index_width, SEQUENCE_CODES_PER_LINE, SIDECHAINS_PER_LINE};
use crate::hash::group_by;
use idmdgp_core::graph::{EdgeKind, Graph};
use idmdgp_core::peptide::Peptide;
use idmdgp_core::value::Value;
use itertools::Itertools;
use log::debug;
use std::io::Write;

/// Writes the full DMDGP dump of `peptide`/`graph` to `w`. `fname` is
/// echoed into the header's first comment line, as the original
/// source does with its own output filename.
pub fn write_dmdgp<W: Write>(w: &mut W, peptide: &Peptide, graph: &Graph, fname: &str) -> Result<()> {
    debug!("writing DMDGP dump '{fname}': {} atoms, {} ordered", peptide.atoms.len(), graph.n_order());
    write_header(w, peptide, fname)?;
    write_vertices(w, peptide)?;
    write_edges(w, peptide, graph)?;
    write_atom_names(w, peptide)?;
    write_residues(w, peptide)?;
    write_dihedrals(w, peptide)?;
    write_order(w, peptide, graph)?;
    Ok(())
}

fn write_header<W: Write>(w: &mut W, peptide: &Peptide, fname: &str) -> Result<()> {
    writeln!(w, "# {fname}")?;
    writeln!(w, "# automatically generated by idmdgp\n")?;

    writeln!(w, "# sequence:")?;
    for chunk in &peptide.residues.iter().map(|r| r.code3.as_str()).chunks(SEQUENCE_CODES_PER_LINE) {
        writeln!(w, "# {}", chunk.collect::<Vec<_>>().join(" "))?;
    }
    writeln!(w)?;

    writeln!(w, "# explicit sidechains:")?;
    let tokens = peptide
        .explicit_sidechains
        .iter()
        .map(|&res| format!("{}{:<4}", peptide.residues[res].code3, res + 1));
    for chunk in &tokens.chunks(SIDECHAINS_PER_LINE) {
        writeln!(w, "# {}", chunk.collect::<Vec<_>>().join(" "))?;
    }
    writeln!(w)?;
    Ok(())
}

fn write_vertices<W: Write>(w: &mut W, peptide: &Peptide) -> Result<()> {
    let width = atom_index_width(peptide.atoms.len());
    writeln!(w, "# vertices: {}", peptide.atoms.len())?;
    writeln!(w, "begin vertices")?;
    for (i, atom) in peptide.atoms.iter().enumerate() {
        let residue = &peptide.residues[atom.residue];
        writeln!(
            w,
            "{:<width$}  *   *   *   # {}{:<4} {:<4} ({})",
            i + 1,
            residue.code3,
            atom.residue + 1,
            atom.name,
            atom.ff_type,
            width = width,
        )?;
    }
    writeln!(w, "end vertices\n")?;
    Ok(())
}

fn edge_label(peptide: &Peptide, atom: usize) -> String {
    let a = &peptide.atoms[atom];
    let residue = &peptide.residues[a.residue];
    format!("{}{:<4} {:<4}", residue.code3, a.residue + 1, a.name)
}

fn write_edges<W: Write>(w: &mut W, peptide: &Peptide, graph: &Graph) -> Result<()> {
    let width = atom_index_width(peptide.atoms.len());
    let (ne, ni) = graph.count_edges();
    writeln!(w, "# exact edges:    {ne}")?;
    writeln!(w, "# interval edges: {ni}")?;
    writeln!(w, "begin edges")?;
    let n = graph.n();
    for i in 0..n {
        for j in (i + 1)..n {
            match graph.has_edge(i, j) {
                EdgeKind::Exact => {
                    let Value::Scalar(d) = graph.has_edge_value(i, j) else { unreachable!() };
                    writeln!(
                        w,
                        "{:<width$}{:<width$}D {:11.6}             # {} -- {}",
                        i + 1,
                        j + 1,
                        d,
                        edge_label(peptide, i),
                        edge_label(peptide, j),
                        width = width,
                    )?;
                }
                EdgeKind::Interval => {
                    let Value::Interval(l, u) = graph.has_edge_value(i, j) else { unreachable!() };
                    writeln!(
                        w,
                        "{:<width$}{:<width$}I {:11.6} {:11.6} # {} -- {}",
                        i + 1,
                        j + 1,
                        l,
                        u,
                        edge_label(peptide, i),
                        edge_label(peptide, j),
                        width = width,
                    )?;
                }
                EdgeKind::Undefined => {}
            }
        }
    }
    writeln!(w, "end edges\n")?;
    Ok(())
}

fn write_atom_names<W: Write>(w: &mut W, peptide: &Peptide) -> Result<()> {
    writeln!(w, "# atoms: {}", peptide.atoms.len())?;
    writeln!(w, "begin atom_names")?;
    let pairs = peptide.atoms.iter().enumerate().map(|(i, a)| (a.name.clone(), i + 1));
    for (name, members) in group_by(pairs) {
        write!(w, "{name} :")?;
        for m in members {
            write!(w, " {m}")?;
        }
        writeln!(w)?;
    }
    writeln!(w, "end atom_names\n")?;
    Ok(())
}

fn write_residues<W: Write>(w: &mut W, peptide: &Peptide) -> Result<()> {
    writeln!(w, "# residues: {}", peptide.residues.len())?;
    writeln!(w, "begin residues")?;
    let pairs = peptide
        .atoms
        .iter()
        .enumerate()
        .map(|(i, a)| (peptide.residues[a.residue].code3.clone(), i + 1));
    for (code, members) in group_by(pairs) {
        write!(w, "{code} :")?;
        for m in members {
            write!(w, " {m}")?;
        }
        writeln!(w)?;
    }
    writeln!(w, "end residues\n")?;
    Ok(())
}

fn write_dihedrals<W: Write>(w: &mut W, peptide: &Peptide) -> Result<()> {
    writeln!(w, "# dihedrals: {}", peptide.torsions.len())?;
    writeln!(w, "# impropers: {}", peptide.impropers.len())?;
    writeln!(w, "begin dihedral_angles")?;

    for arr in [&peptide.torsions, &peptide.impropers] {
        for d in arr.iter().filter(|d| d.ang.is_scalar()) {
            let Value::Scalar(rad) = d.ang else { unreachable!() };
            let [a, b, c, e] = d.atom_id;
            writeln!(
                w,
                "{} {} {} {} D {:11.6}",
                a + 1,
                b + 1,
                c + 1,
                e + 1,
                rad.to_degrees(),
            )?;
        }
    }
    for arr in [&peptide.torsions, &peptide.impropers] {
        for d in arr.iter().filter(|d| d.ang.is_interval()) {
            let Value::Interval(lo, hi) = d.ang else { unreachable!() };
            let [a, b, c, e] = d.atom_id;
            writeln!(
                w,
                "{} {} {} {} I {:11.6} {:11.6}",
                a + 1,
                b + 1,
                c + 1,
                e + 1,
                lo.to_degrees(),
                hi.to_degrees(),
            )?;
        }
    }
    writeln!(w, "end dihedral_angles\n")?;
    Ok(())
}

fn write_order<W: Write>(w: &mut W, peptide: &Peptide, graph: &Graph) -> Result<()> {
    writeln!(w, "# reorder length: {}", graph.n_order())?;
    writeln!(w, "begin bp_order")?;
    for &atom in &graph.order {
        writeln!(w, "{} # {}", atom + 1, edge_label(peptide, atom))?;
    }
    writeln!(w, "end bp_order\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use idmdgp_core::graph::Graph;

    fn triangle() -> (Peptide, Graph) {
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
    fn writes_expected_sections() {
        let (p, g) = triangle();
        let mut buf = Vec::new();
        write_dmdgp(&mut buf, &p, &g, "triangle.dmdgp").unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("begin vertices"));
        assert!(text.contains("begin edges"));
        assert!(text.contains("begin atom_names"));
        assert!(text.contains("begin residues"));
        assert!(text.contains("begin dihedral_angles"));
        assert!(text.contains("begin bp_order"));
        assert!(text.contains("1.000000"));
        assert!(text.contains("1 2 D"));
    }
}
