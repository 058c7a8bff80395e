//! Layout constants shared by [`crate::writer`] and [`crate::reader`],
//! ported from the literal constants in `dmdgp_write_header`
//! (`original_source/src/dmdgp.c`).

/// Residue codes per line in the header's `# sequence:` block.
pub const SEQUENCE_CODES_PER_LINE: usize = 15;

/// Sidechain tokens per line in the header's `# explicit sidechains:`
/// block.
pub const SIDECHAINS_PER_LINE: usize = 5;

/// Computes the left-justified field width used for atom indices
/// throughout the file, mirroring the digit-counting loop in
/// `dmdgp_write`: one more than the number of decimal digits needed to
/// print `n_atoms`.
pub fn atom_index_width(n_atoms: usize) -> usize {
    let mut width = 1usize;
    let mut threshold: u64 = 1;
    while threshold <= n_atoms as u64 {
        width += 1;
        threshold *= 10;
    }
    width
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_grows_at_powers_of_ten() {
        assert_eq!(atom_index_width(4), 2);
        assert_eq!(atom_index_width(9), 2);
        assert_eq!(atom_index_width(10), 3);
    }
}
