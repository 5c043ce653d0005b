//! Request and response bodies exchanged with the annotation editor service.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::alteration::SequenceAlterationFeature;

/// Operations understood by the annotation editor service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    AddSequenceAlteration,
    GetTranslationTable,
}

/// An edit request submitted to an annotation track.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub track: String,
    pub features: Vec<SequenceAlterationFeature>,
    pub operation: Operation,
}

impl UpdateRequest {
    /// Create a request adding a single sequence alteration to `track`.
    pub fn add_sequence_alteration(track: String, feature: SequenceAlterationFeature) -> Self {
        Self {
            track,
            features: vec![feature],
            operation: Operation::AddSequenceAlteration,
        }
    }
}

/// Request for the codon translation table of one reference sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationTableRequest {
    pub track: String,
    pub operation: Operation,
}

impl TranslationTableRequest {
    /// The track name is the annotation prefix followed by the reference
    /// sequence name, e.g. `Annotations-chr1`.
    pub fn new(annotation_prefix: &str, seqname: &str) -> Self {
        Self {
            track: format!("{}{}", annotation_prefix, seqname),
            operation: Operation::GetTranslationTable,
        }
    }
}

/// The service's answer to a [`TranslationTableRequest`]: a mapping of
/// codons to one-letter amino acids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationTableResponse {
    pub translation_table: IndexMap<String, String>,
}
