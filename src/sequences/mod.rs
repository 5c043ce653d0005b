//! Functionality for working with the nucleotide text a user types into an
//! alteration dialog.
//!
//! ## Main Functionality
//!
//!  - The residue alphabet accepted for insertions and substitutions, see
//!    [`nucleotide::is_residue()`].
//!  - Per-base [`nucleotide::complement()`], which mirrors one strand field
//!    into the other, and the biological [`nucleotide::reverse_complement()`].

pub mod nucleotide;

pub use nucleotide::{complement, is_residue, reverse_complement, RESIDUES};
