//! Sequence alteration types, input validation and feature construction.
//!
//! A [`SequenceAlterationFeature`] is built from a genomic coordinate and an
//! already-validated [`AlterationInput`]:
//!
//! | type         | `fmin` | `fmax`                  | `residues` |
//! |--------------|--------|-------------------------|------------|
//! | insertion    | `C`    | `C`                     | yes        |
//! | deletion     | `C`    | `C + length`            | no         |
//! | substitution | `C`    | `C + residues.len()`    | yes        |
//!
//! All coordinates are 0-based, right-exclusive.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::{error::AlterationError, sequences::is_residue, traits::GenericRange, Position};

/// Strand of every sequence alteration; alterations are always recorded on
/// the forward strand.
pub const PLUS_STRAND: i8 = 1;

/// Name of the controlled vocabulary alteration types belong to.
pub const SEQUENCE_CV: &str = "sequence";

/// The kind of sequence alteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum AlterationType {
    Insertion,
    Deletion,
    Substitution,
}

impl AlterationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlterationType::Insertion => "insertion",
            AlterationType::Deletion => "deletion",
            AlterationType::Substitution => "substitution",
        }
    }

    /// Whether an alteration of this type carries residues (i.e. is
    /// entered as a sequence rather than a length).
    pub fn has_residues(&self) -> bool {
        !matches!(self, AlterationType::Deletion)
    }
}

impl fmt::Display for AlterationType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlterationType {
    type Err = AlterationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "insertion" => Ok(AlterationType::Insertion),
            "deletion" => Ok(AlterationType::Deletion),
            "substitution" => Ok(AlterationType::Substitution),
            _ => Err(AlterationError::UnknownAlterationType(s.to_string())),
        }
    }
}

/// Validated user input for one alteration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AlterationInput {
    Insertion(String),
    Deletion(Position),
    Substitution(String),
}

impl AlterationInput {
    /// Validate the raw text entered for an alteration of `alteration_type`.
    ///
    /// The text is uppercased first. A deletion must be a positive decimal
    /// length; an insertion or substitution must be a non-empty sequence of
    /// `A`, `C`, `G`, `T`, `N`.
    pub fn parse(alteration_type: AlterationType, text: &str) -> Result<Self, AlterationError> {
        let input = text.to_uppercase();
        if input.is_empty() {
            return Err(AlterationError::EmptyInput(alteration_type));
        }

        match alteration_type {
            AlterationType::Deletion => {
                if !input.chars().all(|c| c.is_ascii_digit()) {
                    return Err(AlterationError::LengthNotNumeric);
                }
                // all digits, so the only possible parse failure is overflow
                let length: Position = input
                    .parse()
                    .map_err(|_| AlterationError::LengthOutOfRange(input.clone()))?;
                if length == 0 {
                    return Err(AlterationError::LengthNotPositive);
                }
                Ok(AlterationInput::Deletion(length))
            }
            AlterationType::Insertion | AlterationType::Substitution => {
                if !input.chars().all(is_residue) {
                    return Err(AlterationError::InvalidResidues);
                }
                if alteration_type == AlterationType::Insertion {
                    Ok(AlterationInput::Insertion(input))
                } else {
                    Ok(AlterationInput::Substitution(input))
                }
            }
        }
    }

    pub fn alteration_type(&self) -> AlterationType {
        match self {
            AlterationInput::Insertion(_) => AlterationType::Insertion,
            AlterationInput::Deletion(_) => AlterationType::Deletion,
            AlterationInput::Substitution(_) => AlterationType::Substitution,
        }
    }

    /// The residues of an insertion or substitution.
    pub fn residues(&self) -> Option<&str> {
        match self {
            AlterationInput::Insertion(residues) | AlterationInput::Substitution(residues) => {
                Some(residues)
            }
            AlterationInput::Deletion(_) => None,
        }
    }

    /// Number of reference bases this alteration spans.
    pub fn reference_span(&self) -> usize {
        match self {
            AlterationInput::Insertion(_) => 0,
            AlterationInput::Deletion(length) => *length as usize,
            AlterationInput::Substitution(residues) => residues.len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub fmin: Position,
    pub fmax: Position,
    pub strand: i8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlledVocabulary {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureType {
    pub name: AlterationType,
    pub cv: ControlledVocabulary,
}

impl FeatureType {
    pub fn new(name: AlterationType) -> Self {
        Self {
            name,
            cv: ControlledVocabulary {
                name: SEQUENCE_CV.to_string(),
            },
        }
    }
}

/// A sequence alteration feature, in the shape the annotation store expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceAlterationFeature {
    pub location: Location,
    #[serde(rename = "type")]
    pub feature_type: FeatureType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residues: Option<String>,
}

impl SequenceAlterationFeature {
    /// Build the feature for `input` placed at `coordinate`.
    pub fn new(coordinate: Position, input: &AlterationInput) -> Result<Self, AlterationError> {
        let span = input.reference_span();
        let fmax = Position::try_from(span)
            .ok()
            .and_then(|span| coordinate.checked_add(span))
            .ok_or(AlterationError::CoordinateOverflow(coordinate, span))?;

        Ok(Self {
            location: Location {
                fmin: coordinate,
                fmax,
                strand: PLUS_STRAND,
            },
            feature_type: FeatureType::new(input.alteration_type()),
            residues: input.residues().map(|residues| residues.to_string()),
        })
    }

    pub fn alteration_type(&self) -> AlterationType {
        self.feature_type.name
    }
}

impl GenericRange for SequenceAlterationFeature {
    fn start(&self) -> Position {
        self.location.fmin
    }
    fn end(&self) -> Position {
        self.location.fmax
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AlterationType::Deletion, "")]
    #[case(AlterationType::Insertion, "")]
    #[case(AlterationType::Substitution, "")]
    fn test_empty_input(#[case] alteration_type: AlterationType, #[case] text: &str) {
        assert!(matches!(
            AlterationInput::parse(alteration_type, text),
            Err(AlterationError::EmptyInput(t)) if t == alteration_type
        ));
    }

    #[rstest]
    #[case("5a")]
    #[case("-5")]
    #[case("1.5")]
    #[case(" 3")]
    fn test_deletion_not_numeric(#[case] text: &str) {
        assert!(matches!(
            AlterationInput::parse(AlterationType::Deletion, text),
            Err(AlterationError::LengthNotNumeric)
        ));
    }

    #[rstest]
    #[case("0")]
    #[case("000")]
    fn test_deletion_not_positive(#[case] text: &str) {
        assert!(matches!(
            AlterationInput::parse(AlterationType::Deletion, text),
            Err(AlterationError::LengthNotPositive)
        ));
    }

    #[test]
    fn test_deletion_too_long() {
        assert!(matches!(
            AlterationInput::parse(AlterationType::Deletion, "99999999999"),
            Err(AlterationError::LengthOutOfRange(_))
        ));
    }

    #[rstest]
    #[case(AlterationType::Insertion, "ACGX")]
    #[case(AlterationType::Substitution, "AC GT")]
    #[case(AlterationType::Substitution, "ACGU")]
    #[case(AlterationType::Insertion, "12")]
    fn test_invalid_residues(#[case] alteration_type: AlterationType, #[case] text: &str) {
        assert!(matches!(
            AlterationInput::parse(alteration_type, text),
            Err(AlterationError::InvalidResidues)
        ));
    }

    #[test]
    fn test_residues_are_uppercased() {
        let input = AlterationInput::parse(AlterationType::Insertion, "acgtn").unwrap();
        assert_eq!(input, AlterationInput::Insertion("ACGTN".to_string()));
    }

    #[test]
    fn test_deletion_feature() {
        let input = AlterationInput::parse(AlterationType::Deletion, "5").unwrap();
        let feature = SequenceAlterationFeature::new(1000, &input).unwrap();
        assert_eq!(feature.location.fmin, 1000);
        assert_eq!(feature.location.fmax, 1005);
        assert_eq!(feature.location.strand, 1);
        assert_eq!(feature.residues, None);
        assert_eq!(feature.alteration_type(), AlterationType::Deletion);
    }

    #[test]
    fn test_insertion_feature() {
        let input = AlterationInput::parse(AlterationType::Insertion, "GATT").unwrap();
        let feature = SequenceAlterationFeature::new(42, &input).unwrap();
        assert_eq!(feature.location.fmin, 42);
        assert_eq!(feature.location.fmax, 42);
        assert_eq!(feature.residues.as_deref(), Some("GATT"));
        assert_eq!(feature.width(), 0);
        assert_eq!(feature.occupied_range(), (42, 43));
    }

    #[test]
    fn test_substitution_feature() {
        let input = AlterationInput::parse(AlterationType::Substitution, "NNA").unwrap();
        let feature = SequenceAlterationFeature::new(7, &input).unwrap();
        assert_eq!(feature.location.fmin, 7);
        assert_eq!(feature.location.fmax, 10);
        assert_eq!(feature.residues.as_deref(), Some("NNA"));
    }

    #[test]
    fn test_coordinate_overflow() {
        let input = AlterationInput::Deletion(10);
        let result = SequenceAlterationFeature::new(Position::MAX - 5, &input);
        assert!(matches!(
            result,
            Err(AlterationError::CoordinateOverflow(_, 10))
        ));
    }

    #[test]
    fn test_deletion_serializes_without_residues() {
        let input = AlterationInput::Deletion(5);
        let feature = SequenceAlterationFeature::new(1000, &input).unwrap();
        let json = serde_json::to_value(&feature).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "location": {"fmin": 1000, "fmax": 1005, "strand": 1},
                "type": {"name": "deletion", "cv": {"name": "sequence"}}
            })
        );
    }

    #[test]
    fn test_alteration_type_from_str() {
        assert_eq!(
            "substitution".parse::<AlterationType>().unwrap(),
            AlterationType::Substitution
        );
        assert!(matches!(
            "inversion".parse::<AlterationType>(),
            Err(AlterationError::UnknownAlterationType(_))
        ));
    }
}
