//! Traits used by the seqalter library.
//!
//! The editor never looks its collaborators up; it is handed a
//! [`FeatureCounter`] and an [`UpdateService`] when it is built.

use crate::{
    error::AlterationError,
    request::{TranslationTableRequest, TranslationTableResponse, UpdateRequest},
    Position,
};

/// The [`GenericRange`] trait defines common functionality for all
/// 0-indexed, right-exclusive range types.
pub trait GenericRange {
    fn start(&self) -> Position;
    fn end(&self) -> Position;
    fn width(&self) -> Position {
        self.end() - self.start()
    }

    /// The interval this range occupies for overlap purposes. Zero-width
    /// ranges (e.g. insertions) occupy the single base at their start.
    fn occupied_range(&self) -> (Position, Position) {
        let start = self.start();
        (start, self.end().max(start.saturating_add(1)))
    }

    /// Return whether this range overlaps another, using their occupied ranges.
    fn overlaps<R: GenericRange>(&self, other: &R) -> bool {
        let (start, end) = self.occupied_range();
        let (other_start, other_end) = other.occupied_range();
        start < other_end && other_start < end
    }
}

/// Counts the stored features overlapping a range. Used as the guard that
/// keeps two sequence alterations from occupying overlapping intervals.
pub trait FeatureCounter {
    /// Count features on `seqname` overlapping the right-exclusive range `[start, end)`.
    fn count_features(&self, seqname: &str, start: Position, end: Position) -> usize;
}

impl<T: FeatureCounter + ?Sized> FeatureCounter for &T {
    fn count_features(&self, seqname: &str, start: Position, end: Position) -> usize {
        (**self).count_features(seqname, start, end)
    }
}

/// The annotation track that receives edit requests.
///
/// Submission is fire-and-forget: whether the store accepts the operation
/// is the implementor's concern, and is not reported back to the editor.
pub trait UpdateService {
    /// The unique name of the annotation track requests are addressed to.
    fn unique_track_name(&self) -> String;

    /// Submit an update request.
    fn execute_update_operation(&mut self, request: &UpdateRequest);

    /// Close the input dialog after a successful submission.
    fn close_dialog(&mut self) {}
}

impl<T: UpdateService + ?Sized> UpdateService for &mut T {
    fn unique_track_name(&self) -> String {
        (**self).unique_track_name()
    }
    fn execute_update_operation(&mut self, request: &UpdateRequest) {
        (**self).execute_update_operation(request)
    }
    fn close_dialog(&mut self) {
        (**self).close_dialog()
    }
}

/// A source of codon translation tables, e.g. the annotation editor service.
pub trait TranslationTableSource {
    fn fetch_translation_table(
        &self,
        request: &TranslationTableRequest,
    ) -> Result<TranslationTableResponse, AlterationError>;
}
