//! An in-memory store of the sequence alterations already on an annotation
//! track, indexed for overlap queries.
//!
//! The store is kept in sync with the annotation track through change
//! notifications: [`AnnotationStore::annotations_added()`],
//! [`AnnotationStore::annotations_deleted()`] and
//! [`AnnotationStore::annotations_updated()`] (which is handled as a delete
//! followed by an add). Each sequence's [`COITrees`] index is rebuilt after
//! a notification touches it.
//!
//! For overlap purposes a zero-width alteration (an insertion) occupies the
//! single base at its position, the same widening the editor applies to its
//! overlap query; two insertions at one position therefore conflict.

use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::debug;

use crate::{
    alteration::SequenceAlterationFeature,
    error::AlterationError,
    io::tsv::AlterationsIterator,
    ranges::{
        coitrees::{COITrees, MAX_INDEXED_POSITION},
        validate_range, RangeIndexed,
    },
    traits::{FeatureCounter, GenericRange},
    Position,
};

/// A sequence alteration with its store-assigned identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredAlteration {
    pub seqname: String,
    pub uniquename: String,
    pub feature: SequenceAlterationFeature,
}

#[derive(Debug)]
struct SequenceAlterations {
    length: Position,
    features: IndexMap<String, SequenceAlterationFeature>,
    index: COITrees,
}

impl SequenceAlterations {
    fn new(length: Position) -> Self {
        Self {
            length,
            features: IndexMap::new(),
            index: COITrees::empty(length),
        }
    }

    fn reindex(&mut self) {
        let ranges: Vec<RangeIndexed> = self
            .features
            .values()
            .enumerate()
            .map(|(i, feature)| {
                let (start, end) = feature.occupied_range();
                RangeIndexed::new(start, end, i)
            })
            .collect();
        self.index = COITrees::new(&ranges, self.length);
    }
}

/// The stored sequence alterations of every reference sequence.
#[derive(Debug)]
pub struct AnnotationStore {
    sequences: IndexMap<String, SequenceAlterations>,
}

impl AnnotationStore {
    /// Create an empty store over the sequences in `seqlens`.
    pub fn new(seqlens: &IndexMap<String, Position>) -> Self {
        let sequences = seqlens
            .iter()
            .map(|(seqname, length)| (seqname.clone(), SequenceAlterations::new(*length)))
            .collect();
        Self { sequences }
    }

    /// Load a store from a TSV file of alterations (see [`AlterationsIterator`]).
    pub fn from_alterations_file(
        filepath: impl Into<PathBuf>,
        seqlens: &IndexMap<String, Position>,
    ) -> Result<Self, AlterationError> {
        let mut store = Self::new(seqlens);
        let alterations = AlterationsIterator::new(filepath)?.collect::<Result<Vec<_>, _>>()?;
        store.annotations_added(alterations)?;
        Ok(store)
    }

    /// Total number of stored alterations.
    pub fn len(&self) -> usize {
        self.sequences.values().map(|seq| seq.features.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The sequence names in this store.
    pub fn seqnames(&self) -> Vec<String> {
        self.sequences.keys().cloned().collect()
    }

    /// The length of `seqname`.
    pub fn sequence_length(&self, seqname: &str) -> Result<Position, AlterationError> {
        self.sequences
            .get(seqname)
            .map(|seq| seq.length)
            .ok_or(AlterationError::MissingSequence(seqname.to_string()))
    }

    /// Look up an alteration by its unique name.
    pub fn get(&self, uniquename: &str) -> Option<StoredAlteration> {
        self.sequences.iter().find_map(|(seqname, seq)| {
            seq.features.get(uniquename).map(|feature| StoredAlteration {
                seqname: seqname.clone(),
                uniquename: uniquename.to_string(),
                feature: feature.clone(),
            })
        })
    }

    pub fn contains(&self, uniquename: &str) -> bool {
        self.sequences
            .values()
            .any(|seq| seq.features.contains_key(uniquename))
    }

    /// The alterations stored on `seqname` overlapping `[start, end)`.
    pub fn overlapping(&self, seqname: &str, start: Position, end: Position) -> Vec<StoredAlteration> {
        let Some(seq) = self.sequences.get(seqname) else {
            return Vec::new();
        };
        let mut hits = Vec::new();
        seq.index.query(start, end, |range| {
            if let Some((uniquename, feature)) = seq.features.get_index(range.index) {
                hits.push(StoredAlteration {
                    seqname: seqname.to_string(),
                    uniquename: uniquename.clone(),
                    feature: feature.clone(),
                });
            }
        });
        hits.sort_by_key(|alteration| alteration.feature.location.fmin);
        hits
    }

    /// Count the stored features on `seqname` overlapping `[start, end)`,
    /// where a missing `start` or `end` defaults to the bounds of the sequence.
    pub fn stored_feature_count(
        &self,
        seqname: &str,
        start: Option<Position>,
        end: Option<Position>,
    ) -> usize {
        let Some(seq) = self.sequences.get(seqname) else {
            return 0;
        };
        let start = start.unwrap_or(0);
        let end = end.unwrap_or(seq.length);
        seq.index.count_overlaps(start, end)
    }

    /// Add newly created alterations.
    ///
    /// Fails if an alteration's sequence is unknown, its interval does not fit
    /// the sequence, or its unique name is already stored. Alterations before
    /// the failing one remain added.
    pub fn annotations_added(
        &mut self,
        alterations: impl IntoIterator<Item = StoredAlteration>,
    ) -> Result<(), AlterationError> {
        let mut touched = Vec::new();
        let mut result = Ok(());
        for alteration in alterations {
            let seqname = alteration.seqname.clone();
            if let Err(e) = self.insert(alteration) {
                result = Err(e);
                break;
            }
            if !touched.contains(&seqname) {
                touched.push(seqname);
            }
        }
        self.reindex(&touched);
        result
    }

    /// Remove alterations by unique name, returning how many were removed.
    /// Unknown names are ignored.
    pub fn annotations_deleted<S: AsRef<str>>(&mut self, uniquenames: &[S]) -> usize {
        let mut touched = Vec::new();
        let mut removed = 0;
        for uniquename in uniquenames {
            let uniquename = uniquename.as_ref();
            let found = self
                .sequences
                .iter_mut()
                .find(|(_, seq)| seq.features.contains_key(uniquename));
            match found {
                Some((seqname, seq)) => {
                    seq.features.shift_remove(uniquename);
                    removed += 1;
                    if !touched.contains(seqname) {
                        touched.push(seqname.clone());
                    }
                }
                None => debug!(uniquename, "deleted alteration was not in the store"),
            }
        }
        self.reindex(&touched);
        removed
    }

    /// Replace alterations with their updated versions: a delete of each
    /// alteration's unique name followed by an add.
    pub fn annotations_updated(
        &mut self,
        alterations: Vec<StoredAlteration>,
    ) -> Result<(), AlterationError> {
        let uniquenames: Vec<&str> = alterations
            .iter()
            .map(|alteration| alteration.uniquename.as_str())
            .collect();
        self.annotations_deleted(&uniquenames);
        self.annotations_added(alterations)
    }

    fn insert(&mut self, alteration: StoredAlteration) -> Result<(), AlterationError> {
        if self.contains(&alteration.uniquename) {
            return Err(AlterationError::DuplicateAlteration(alteration.uniquename));
        }
        let seq = self
            .sequences
            .get_mut(&alteration.seqname)
            .ok_or(AlterationError::MissingSequence(alteration.seqname.clone()))?;

        let feature = alteration.feature;
        validate_range(feature.start(), feature.end(), seq.length)?;
        let (start, end) = feature.occupied_range();
        if end > MAX_INDEXED_POSITION {
            return Err(AlterationError::InvalidGenomicRangeForSequence(
                start,
                end,
                MAX_INDEXED_POSITION,
            ));
        }

        debug!(
            seqname = %alteration.seqname,
            uniquename = %alteration.uniquename,
            fmin = feature.location.fmin,
            fmax = feature.location.fmax,
            "alteration added"
        );
        seq.features.insert(alteration.uniquename, feature);
        Ok(())
    }

    fn reindex(&mut self, seqnames: &[String]) {
        for seqname in seqnames {
            if let Some(seq) = self.sequences.get_mut(seqname) {
                seq.reindex();
            }
        }
    }
}

impl FeatureCounter for AnnotationStore {
    fn count_features(&self, seqname: &str, start: Position, end: Position) -> usize {
        self.stored_feature_count(seqname, Some(start), Some(end))
    }
}
