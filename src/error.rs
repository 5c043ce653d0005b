//! The [`AlterationError`] `enum` definition and error messages.
//!
use crate::alteration::AlterationType;
use crate::Position;
use std::num::ParseIntError;
use thiserror::Error;

/// The [`AlterationError`] defines the standard set of errors that should
/// be passed to the user.
#[derive(Debug, Error)]
pub enum AlterationError {
    // IO related errors
    #[error("File reading error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Integer parsing error: {0}")]
    ParseIntError(#[from] ParseIntError),
    #[error("Genome file is invalid: {0}")]
    InvalidGenomeFile(String),
    #[error("Alterations file is invalid: {0}")]
    InvalidAlterationsFile(String),

    // Input validation errors, reported to the user before anything is submitted
    #[error("Input cannot be empty for {0}")]
    EmptyInput(AlterationType),
    #[error("The length must be a number")]
    LengthNotNumeric,
    #[error("The length must be a positive number")]
    LengthNotPositive,
    #[error("The length '{0}' is too large")]
    LengthOutOfRange(String),
    #[error("The sequence should only contain A, C, G, T, N")]
    InvalidResidues,
    #[error("Unknown sequence alteration type '{0}': must be insertion, deletion, or substitution")]
    UnknownAlterationType(String),
    #[error("Cannot create overlapping sequence alterations: [{0}, {1}) overlaps {2} existing alteration(s)")]
    OverlappingAlteration(Position, Position, usize),

    // Invalid genomic range errors
    #[error("Alteration at {0} with length {1} extends past the largest representable position")]
    CoordinateOverflow(Position, usize),
    #[error("Range invalid: start ({0}) must not be greater than end ({1})")]
    InvalidGenomicRange(Position, Position),
    #[error("Range [{0}, {1}) is invalid for sequence of length {2}")]
    InvalidGenomicRangeForSequence(Position, Position, Position),
    #[error("Sequence name '{0}' is not in the annotation store")]
    MissingSequence(String),
    #[error("Sequence alteration '{0}' is already in the annotation store")]
    DuplicateAlteration(String),

    // Translation table errors
    #[error("Invalid codon '{0}': codons must be three of A, C, G, T")]
    InvalidCodon(String),
    #[error("Invalid amino acid '{1}' for codon '{0}': must be a single character")]
    InvalidAminoAcid(String, String),

    // Serialization and service errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Config file error: {0}")]
    ConfigError(#[from] toml::de::Error),
    #[error("Annotation service request failed: {0}")]
    ServiceError(#[from] reqwest::Error),

    // Command line tool related errors
    #[error("Command line argument error: {0}")]
    ArgumentError(#[from] clap::error::Error),
}
