//! Nucleotide alphabet and complement operations.
//!
//! Only the unambiguous bases and `N` may be entered into an alteration, so
//! the alphabet here is deliberately smaller than the full IUPAC code.

/// The residues allowed in an inserted or substituted sequence.
pub const RESIDUES: [char; 5] = ['A', 'C', 'G', 'T', 'N'];

/// Return whether `base` is an allowed residue, ignoring case.
pub fn is_residue(base: char) -> bool {
    RESIDUES.contains(&base.to_ascii_uppercase())
}

/// Complement a single base, preserving its case. Characters outside the
/// residue alphabet are returned unchanged.
pub fn complement_base(base: char) -> char {
    match base {
        'A' => 'T',
        'T' => 'A',
        'C' => 'G',
        'G' => 'C',
        'a' => 't',
        't' => 'a',
        'c' => 'g',
        'g' => 'c',
        other => other,
    }
}

/// Complement each base of `seq` in place order, i.e. *without* reversing.
///
/// This is what the paired strand field shows by default: the base opposite
/// each typed base, read in the same direction.
pub fn complement(seq: &str) -> String {
    seq.chars().map(complement_base).collect()
}

/// The reverse complement of `seq`, i.e. the opposite strand read 5' to 3'.
pub fn reverse_complement(seq: &str) -> String {
    seq.chars().rev().map(complement_base).collect()
}
