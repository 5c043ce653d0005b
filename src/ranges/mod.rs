//! Ranges and the interval index used for overlap queries.
//!

use crate::{error::AlterationError, traits::GenericRange, Position};

pub mod coitrees;

/// [`RangeIndexed`] is a range with an index to the feature it came from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RangeIndexed {
    pub start: Position,
    pub end: Position,
    pub index: usize,
}

impl RangeIndexed {
    /// Create a new 0-indexed right-exclusive range.
    pub fn new(start: Position, end: Position, index: usize) -> Self {
        Self { start, end, index }
    }
}

impl GenericRange for RangeIndexed {
    fn start(&self) -> Position {
        self.start
    }
    fn end(&self) -> Position {
        self.end
    }
}

/// Validates whether a given range is valid for a sequence of a given `length`.
///
/// Ranges are 0-indexed and right-exclusive, so `end == length` is valid.
pub fn validate_range(start: Position, end: Position, length: Position) -> Result<(), AlterationError> {
    if start > end {
        return Err(AlterationError::InvalidGenomicRange(start, end));
    }

    if end > length {
        return Err(AlterationError::InvalidGenomicRangeForSequence(
            start, end, length,
        ));
    }
    Ok(())
}
