//! Codon translation tables, and loading them from the annotation service.
//!
//! A track starts out with the standard genetic code and asks the service
//! for the table of its reference sequence in the background. If the load
//! fails the standard code stays in place; the failure is only logged.

use indexmap::IndexMap;
use serde::Serialize;
use std::thread::{self, JoinHandle};
use tracing::{info, warn};

use crate::{
    error::AlterationError, request::TranslationTableRequest, traits::TranslationTableSource,
};

/// Base order of the NCBI translation table strings.
const NCBI_BASES: [char; 4] = ['T', 'C', 'A', 'G'];

/// The standard genetic code (NCBI translation table 1), in NCBI order.
pub const STANDARD_CODE: &str = "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

/// Amino acid for codons that cannot be translated.
pub const UNKNOWN_AMINO_ACID: char = 'X';

/// A mapping of the 64 codons to one-letter amino acids (`*` for stop).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CodonTable {
    table: IndexMap<String, char>,
}

impl Default for CodonTable {
    fn default() -> Self {
        let mut table = IndexMap::with_capacity(64);
        let mut amino_acids = STANDARD_CODE.chars();
        for first in NCBI_BASES {
            for second in NCBI_BASES {
                for third in NCBI_BASES {
                    let codon: String = [first, second, third].iter().collect();
                    let amino_acid = amino_acids.next().unwrap_or(UNKNOWN_AMINO_ACID);
                    table.insert(codon, amino_acid);
                }
            }
        }
        Self { table }
    }
}

impl CodonTable {
    /// The amino acid `codon` translates to, ignoring case.
    pub fn get(&self, codon: &str) -> Option<char> {
        self.table.get(codon.to_ascii_uppercase().as_str()).copied()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, char)> {
        self.table.iter().map(|(codon, aa)| (codon.as_str(), *aa))
    }

    /// Translate `seq` in its first frame. A trailing partial codon is
    /// dropped; codons containing anything but `A`, `C`, `G`, `T` become `X`.
    pub fn translate(&self, seq: &str) -> String {
        let bases: Vec<char> = seq.chars().collect();
        bases
            .chunks_exact(3)
            .map(|codon| {
                let codon: String = codon.iter().collect();
                self.get(&codon).unwrap_or(UNKNOWN_AMINO_ACID)
            })
            .collect()
    }
}

/// Build a codon table from the standard code, replacing the entries given
/// in `overrides` (codon to one-letter amino acid).
pub fn generate_codon_table(overrides: &IndexMap<String, String>) -> Result<CodonTable, AlterationError> {
    let mut codon_table = CodonTable::default();
    for (codon, amino_acid) in overrides {
        let key = codon.to_ascii_uppercase();
        if key.len() != 3 || !key.chars().all(|c| NCBI_BASES.contains(&c)) {
            return Err(AlterationError::InvalidCodon(codon.clone()));
        }
        let mut chars = amino_acid.chars();
        let aa = match (chars.next(), chars.next()) {
            (Some(aa), None) => aa.to_ascii_uppercase(),
            _ => {
                return Err(AlterationError::InvalidAminoAcid(
                    codon.clone(),
                    amino_acid.clone(),
                ))
            }
        };
        codon_table.table.insert(key, aa);
    }
    Ok(codon_table)
}

/// Fetch and build the translation table, returning any failure.
pub fn try_load_translation_table<S: TranslationTableSource + ?Sized>(
    source: &S,
    request: &TranslationTableRequest,
) -> Result<CodonTable, AlterationError> {
    let response = source.fetch_translation_table(request)?;
    generate_codon_table(&response.translation_table)
}

/// Fetch and build the translation table, falling back to the standard code
/// if that fails.
pub fn load_translation_table<S: TranslationTableSource + ?Sized>(
    source: &S,
    request: &TranslationTableRequest,
) -> CodonTable {
    match try_load_translation_table(source, request) {
        Ok(codon_table) => {
            info!(track = %request.track, "loaded translation table");
            codon_table
        }
        Err(e) => {
            warn!(track = %request.track, "Failed to load translation table. Setting default: {}", e);
            CodonTable::default()
        }
    }
}

/// Load the translation table on a background thread, calling `on_loaded`
/// with it if the load succeeds. On failure nothing is called and the
/// caller keeps whatever table it already has.
pub fn load_in_background<S, F>(
    source: S,
    request: TranslationTableRequest,
    on_loaded: F,
) -> JoinHandle<()>
where
    S: TranslationTableSource + Send + 'static,
    F: FnOnce(CodonTable) + Send + 'static,
{
    thread::spawn(move || match try_load_translation_table(&source, &request) {
        Ok(codon_table) => {
            info!(track = %request.track, "loaded translation table");
            on_loaded(codon_table)
        }
        Err(e) => {
            warn!(track = %request.track, "Failed to load translation table. Setting default: {}", e)
        }
    })
}
