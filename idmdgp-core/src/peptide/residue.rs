/// A residue: a 3-letter code, its sequence index, and the atoms
/// belonging to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Residue {
    pub code3: String,
    pub seq_index: usize,
    pub atom_ids: Vec<usize>,
}

impl Residue {
    pub fn new(code3: impl Into<String>, seq_index: usize) -> Self {
        Residue { code3: code3.into(), seq_index, atom_ids: Vec::new() }
    }

    /// A single-letter abbreviation used in pruner report lines;
    /// falls back to `?` for unrecognized codes.
    pub fn one_letter(&self) -> char {
        match self.code3.to_ascii_uppercase().as_str() {
            "ALA" => 'A', "ARG" => 'R', "ASN" => 'N', "ASP" => 'D',
            "CYS" => 'C', "GLN" => 'Q', "GLU" => 'E', "GLY" => 'G',
            "HIS" => 'H', "ILE" => 'I', "LEU" => 'L', "LYS" => 'K',
            "MET" => 'M', "PHE" => 'F', "PRO" => 'P', "SER" => 'S',
            "THR" => 'T', "TRP" => 'W', "TYR" => 'Y', "VAL" => 'V',
            _ => '?',
        }
    }
}
