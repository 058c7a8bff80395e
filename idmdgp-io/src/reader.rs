//! Parses the text format [`crate::writer`] emits back into an
//! [`idmdgp_core::Peptide`]/[`idmdgp_core::Graph`] pair.
//!
//! This is a supplement: no reader survived distillation from the
//! original source, which only ever wrote DMDGP dumps as an
//! intermediate debugging artifact. It exists here so the dump is
//! round-trippable, exactly inverting the grammar [`crate::writer`]
//! produces.

use crate::error::{IoError, Result};
use crate::format::atom_index_width;
use idmdgp_core::graph::Graph;
use idmdgp_core::peptide::Peptide;
use idmdgp_core::value::Value;
use log::debug;

struct Lines<'a> {
    inner: std::str::Lines<'a>,
    no: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        Lines { inner: text.lines(), no: 0 }
    }

    fn next_raw(&mut self) -> Option<&'a str> {
        let line = self.inner.next()?;
        self.no += 1;
        Some(line)
    }

    fn err(&self, message: impl Into<String>) -> IoError {
        IoError::Parse { line: self.no, message: message.into() }
    }

    /// Advances past blank and comment lines until one matching
    /// `begin <section>` is found, or EOF.
    fn seek_begin(&mut self, section: &str) -> Result<bool> {
        let marker = format!("begin {section}");
        while let Some(line) = self.next_raw() {
            if line.trim() == marker {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Collects every non-`end` line up to and including the matching
    /// `end <section>` marker.
    fn collect_body(&mut self, section: &str) -> Result<Vec<&'a str>> {
        let marker = format!("end {section}");
        let mut body = Vec::new();
        loop {
            let line = self.next_raw().ok_or_else(|| self.err(format!("unterminated section '{section}'")))?;
            if line.trim() == marker {
                return Ok(body);
            }
            if !line.trim().is_empty() {
                body.push(line);
            }
        }
    }
}

/// Splits a trailing `"label1 -- label2"` or single `"label"` comment
/// into `(code3, residue_1based, atom_name)` triples, inverting the
/// `"%s%-4u %-4s"` layout the writer uses for residue/atom labels.
fn parse_atom_label(label: &str) -> Option<(String, usize, String)> {
    let label = label.trim();
    let split_at = label.find(|c: char| c.is_ascii_digit())?;
    let code3 = label[..split_at].to_string();
    let rest = &label[split_at..];
    let digit_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let residue: usize = rest[..digit_end].parse().ok()?;
    let name = rest[digit_end..].trim().to_string();
    Some((code3, residue, name))
}

/// Parses a full DMDGP text dump, reconstructing its peptide and
/// distance graph. Atom mass/charge/radius are not recoverable from
/// the dump (the writer replaces them with `*` placeholders, as the
/// original format does) and are set to `0.0`.
pub fn parse_dmdgp(text: &str) -> Result<(Peptide, Graph)> {
    let mut lines = Lines::new(text);
    let mut peptide = Peptide::new();
    let mut residue_of: Vec<usize> = Vec::new();

    if !lines.seek_begin("vertices")? {
        return Err(lines.err("missing 'begin vertices' section"));
    }
    let mut residue_ids: std::collections::BTreeMap<(String, usize), usize> = std::collections::BTreeMap::new();
    for raw in lines.collect_body("vertices")? {
        let comment = raw.split_once('#').map(|(_, c)| c).ok_or_else(|| lines.err("vertex line missing '#' label"))?;
        let comment = comment.trim();
        let (label, ff_type) = comment
            .rsplit_once('(')
            .map(|(l, t)| (l.trim(), t.trim_end_matches(')').trim()))
            .ok_or_else(|| lines.err("vertex label missing '(type)'"))?;
        let (code3, res_idx, name) = parse_atom_label(label).ok_or_else(|| lines.err("malformed vertex label"))?;
        let residue = *residue_ids.entry((code3.clone(), res_idx)).or_insert_with(|| peptide.add_residue(code3));
        peptide.add_atom(residue, name, ff_type, 0.0, 0.0, 0.0).map_err(IoError::Core)?;
        residue_of.push(residue);
    }

    let n_atoms = peptide.atoms.len();
    let width = atom_index_width(n_atoms);
    let mut graph = Graph::new(n_atoms);

    if !lines.seek_begin("edges")? {
        return Err(lines.err("missing 'begin edges' section"));
    }
    for raw in lines.collect_body("edges")? {
        if raw.len() < 2 * width {
            return Err(lines.err("edge line shorter than the index field width"));
        }
        let i: usize = raw[0..width].trim().parse().map_err(|_| lines.err("malformed edge source index"))?;
        let j: usize = raw[width..2 * width].trim().parse().map_err(|_| lines.err("malformed edge target index"))?;
        let rest = raw[2 * width..].trim_start();
        let mut tokens = rest.split_whitespace();
        let kind = tokens.next().ok_or_else(|| lines.err("edge line missing kind letter"))?;
        let value = match kind {
            "D" => {
                let d: f64 = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(|| lines.err("malformed exact distance"))?;
                Value::scalar(d)
            }
            "I" => {
                let l: f64 = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(|| lines.err("malformed interval lower bound"))?;
                let u: f64 = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(|| lines.err("malformed interval upper bound"))?;
                Value::interval(l, u)
            }
            other => return Err(lines.err(format!("unknown edge kind '{other}'"))),
        };
        graph.set_edge(i - 1, j - 1, value);
    }

    // atom_names/residues sections are redundant with the vertex
    // labels already consumed above; skip over their bodies.
    if lines.seek_begin("atom_names")? {
        lines.collect_body("atom_names")?;
    }
    if lines.seek_begin("residues")? {
        lines.collect_body("residues")?;
    }

    if lines.seek_begin("dihedral_angles")? {
        for raw in lines.collect_body("dihedral_angles")? {
            let mut tokens = raw.split_whitespace();
            let mut atom_id = [0usize; 4];
            for slot in &mut atom_id {
                let n: usize = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(|| lines.err("malformed dihedral atom index"))?;
                *slot = n - 1;
            }
            let kind = tokens.next().ok_or_else(|| lines.err("dihedral line missing kind letter"))?;
            let bound = match kind {
                "D" => {
                    let deg: f64 = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(|| lines.err("malformed dihedral bound"))?;
                    Value::scalar(deg)
                }
                "I" => {
                    let l: f64 = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(|| lines.err("malformed dihedral lower bound"))?;
                    let u: f64 = tokens.next().and_then(|t| t.parse().ok()).ok_or_else(|| lines.err("malformed dihedral upper bound"))?;
                    Value::interval(l, u)
                }
                other => return Err(lines.err(format!("unknown dihedral kind '{other}'"))),
            };
            let quad: Vec<(usize, String)> = atom_id
                .iter()
                .map(|&id| (residue_of[id], peptide.atoms[id].name.clone()))
                .collect();
            let ids: [(usize, &str); 4] = [
                (quad[0].0, quad[0].1.as_str()),
                (quad[1].0, quad[1].1.as_str()),
                (quad[2].0, quad[2].1.as_str()),
                (quad[3].0, quad[3].1.as_str()),
            ];
            peptide.add_torsion(ids, bound).map_err(IoError::Core)?;
        }
    }

    if lines.seek_begin("bp_order")? {
        let mut order = Vec::new();
        for raw in lines.collect_body("bp_order")? {
            let token = raw.split_once('#').map(|(n, _)| n).unwrap_or(raw).trim();
            let atom: usize = token.parse().map_err(|_| lines.err("malformed bp_order atom index"))?;
            order.push(atom - 1);
        }
        graph.set_order(order);
    }

    debug!(
        "parsed DMDGP instance: {} atoms, {} residues, {} torsions, {} ordered",
        peptide.atoms.len(),
        peptide.residues.len(),
        peptide.torsions.len(),
        graph.n_order(),
    );
    Ok((peptide, graph))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::write_dmdgp;

    fn triangle() -> (Peptide, Graph) {
        let mut p = Peptide::new();
        let r = p.add_residue("GLY");
        for name in ["A", "B", "C"] {
            p.add_atom(r, name, "X", 1.0, 0.0, 1.0).unwrap();
        }
        let mut g = Graph::new(3);
        g.set_edge(0, 1, Value::scalar(1.0));
        g.set_edge(0, 2, Value::scalar(1.5));
        g.set_edge(1, 2, Value::interval(0.9, 1.1));
        g.set_order(vec![0, 1, 2]);
        (p, g)
    }

    #[test]
    fn round_trips_graph_and_order() {
        let (p, g) = triangle();
        let mut buf = Vec::new();
        write_dmdgp(&mut buf, &p, &g, "triangle.dmdgp").unwrap();
        let text = String::from_utf8(buf).unwrap();

        let (p2, g2) = parse_dmdgp(&text).unwrap();
        assert_eq!(p2.atoms.len(), p.atoms.len());
        assert_eq!(p2.residues.len(), p.residues.len());
        assert_eq!(g2.order, g.order);
        assert_eq!(g2.has_edge_value(0, 1), g.has_edge_value(0, 1));
        assert_eq!(g2.has_edge_value(0, 2), g.has_edge_value(0, 2));
        assert_eq!(g2.has_edge_value(1, 2), g.has_edge_value(1, 2));
    }

    #[test]
    fn round_trips_dihedral_bounds() {
        let mut p = Peptide::new();
        let r = p.add_residue("ALA");
        p.add_atom(r, "N", "N", 14.0, 0.0, 1.5).unwrap();
        p.add_atom(r, "CA", "C", 12.0, 0.0, 1.7).unwrap();
        p.add_atom(r, "C", "C", 12.0, 0.0, 1.7).unwrap();
        p.add_atom(r, "O", "O", 16.0, 0.0, 1.5).unwrap();
        let ids = [(0, "N"), (0, "CA"), (0, "C"), (0, "O")];
        p.add_torsion(ids, Value::interval(-5.0, 5.0)).unwrap();
        let mut g = Graph::new(4);
        for (i, j) in [(0, 1), (0, 2), (1, 2), (0, 3), (1, 3), (2, 3)] {
            g.set_edge(i, j, Value::scalar(1.5));
        }
        g.set_order(vec![0, 1, 2, 3]);

        let mut buf = Vec::new();
        write_dmdgp(&mut buf, &p, &g, "ala.dmdgp").unwrap();
        let text = String::from_utf8(buf).unwrap();

        let (p2, _g2) = parse_dmdgp(&text).unwrap();
        assert_eq!(p2.torsions.len(), 1);
        match p2.torsions[0].ang {
            Value::Interval(l, u) => {
                assert!((l - (-5.0f64).to_radians()).abs() < 1e-6);
                assert!((u - 5.0f64.to_radians()).abs() < 1e-6);
            }
            other => panic!("expected interval, got {other:?}"),
        }
    }
}
