//! Parsing of alteration TSV files, which wraps the [`csv`] crate's
//! deserialization method using [`serde`].
//!
//! Each line is one stored alteration, with six tab-separated columns:
//!
//! ```text
//! seqname  fmin  fmax  type  residues  uniquename
//! chr1     100   110   deletion      .     del1
//! chr1     200   200   insertion     ACG   ins1
//! ```
//!
//! `.` marks a missing value; a missing unique name is replaced by one
//! derived from the line number. Lines starting with `#` are skipped.

use csv::{Reader, ReaderBuilder, StringRecord, StringRecordsIntoIter};
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer};
use std::io::Read;
use std::path::PathBuf;
use std::str::FromStr;

use crate::{
    alteration::{AlterationInput, AlterationType, SequenceAlterationFeature},
    error::AlterationError,
    io::file::InputFile,
    store::StoredAlteration,
    Position,
};

/// Build a TSV reader which works on gzip-compressed files, etc.
///
/// Comment lines come back as records (see [`is_comment`]) rather than being
/// dropped by the reader, so every record's position is the line it is on.
pub fn build_tsv_reader(filepath: impl Into<PathBuf>) -> Result<Reader<Box<dyn Read>>, AlterationError> {
    let stream = InputFile::new(filepath).stream()?;
    let reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .from_reader(stream);
    Ok(reader)
}

/// Whether `record` is a `#` comment line.
pub fn is_comment(record: &StringRecord) -> bool {
    record.get(0).map_or(false, |field| field.starts_with('#'))
}

/// Deserializes some value of type `t` with some possible missing
/// character `missing_chars` into [`Option<T>`].
pub fn deserialize_option_generic<'de, D, T>(
    deserializer: D,
    missing_chars: &'de [&'de str],
) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    if missing_chars.contains(&s.as_str()) {
        Ok(None)
    } else {
        s.parse::<T>()
            .map(Some)
            .map_err(|e| DeError::custom(format!("parsing error: {}", e)))
    }
}

/// [`serde`] deserializer for a column with a possibly missing (`.`) value.
pub fn tsv_missing<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    let missing_chars = &["."];
    deserialize_option_generic(deserializer, missing_chars)
}

/// One parsed line of an alterations file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct AlterationRecord {
    pub seqname: String,
    pub fmin: Position,
    pub fmax: Position,
    #[serde(rename = "type")]
    pub alteration_type: AlterationType,
    #[serde(deserialize_with = "tsv_missing")]
    pub residues: Option<String>,
    #[serde(deserialize_with = "tsv_missing")]
    pub uniquename: Option<String>,
}

impl AlterationRecord {
    /// Convert this record into a [`StoredAlteration`], checking it describes
    /// a well-formed alteration. `line` names the alteration if the record
    /// has no unique name.
    pub fn into_stored(self, line: usize) -> Result<StoredAlteration, AlterationError> {
        let invalid = |reason: &str| {
            AlterationError::InvalidAlterationsFile(format!(
                "line {}: {} {} at [{}, {}): {}",
                line, self.seqname, self.alteration_type, self.fmin, self.fmax, reason
            ))
        };

        if self.fmin > self.fmax {
            return Err(invalid("fmin is greater than fmax"));
        }
        let text = match (&self.residues, self.alteration_type) {
            (None, AlterationType::Deletion) => (self.fmax - self.fmin).to_string(),
            (Some(_), AlterationType::Deletion) => return Err(invalid("deletions have no residues")),
            (Some(residues), _) => residues.clone(),
            (None, _) => return Err(invalid("residues are missing")),
        };
        let input = AlterationInput::parse(self.alteration_type, &text)
            .map_err(|e| invalid(&e.to_string()))?;
        let feature = SequenceAlterationFeature::new(self.fmin, &input)?;
        if feature.location.fmax != self.fmax {
            return Err(invalid(&format!(
                "fmax should be {} for this alteration",
                feature.location.fmax
            )));
        }

        Ok(StoredAlteration {
            uniquename: self
                .uniquename
                .unwrap_or_else(|| format!("{}-alteration-{}", self.seqname, line)),
            seqname: self.seqname,
            feature,
        })
    }
}

/// An iterator over the [`StoredAlteration`] entries of an alterations file.
pub struct AlterationsIterator {
    inner: StringRecordsIntoIter<Box<dyn Read>>,
}

impl std::fmt::Debug for AlterationsIterator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlterationsIterator").finish_non_exhaustive()
    }
}

impl AlterationsIterator {
    pub fn new(filepath: impl Into<PathBuf>) -> Result<Self, AlterationError> {
        let reader = build_tsv_reader(filepath)?;
        let inner = reader.into_records();
        Ok(Self { inner })
    }
}

impl Iterator for AlterationsIterator {
    type Item = Result<StoredAlteration, AlterationError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = loop {
            match self.inner.next()? {
                Ok(record) if is_comment(&record) => continue,
                Ok(record) => break record,
                Err(e) => return Some(Err(AlterationError::InvalidAlterationsFile(e.to_string()))),
            }
        };
        let line = record.position().map_or(0, |position| position.line()) as usize;
        Some(
            record
                .deserialize::<AlterationRecord>(None)
                .map_err(|e| AlterationError::InvalidAlterationsFile(format!("line {}: {}", line, e)))
                .and_then(|record| record.into_stored(line)),
        )
    }
}
