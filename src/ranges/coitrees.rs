use coitrees::{BasicCOITree, GenericInterval, IntervalNode, IntervalTree};

use crate::Position;

use super::RangeIndexed;

/// Largest position that can be stored in a [`COITrees`] index, since
/// [`coitrees`] works in `i32`.
pub const MAX_INDEXED_POSITION: Position = i32::MAX as Position;

fn to_coord(position: Position) -> i32 {
    i32::try_from(position).unwrap_or(i32::MAX)
}

impl GenericInterval<usize> for RangeIndexed {
    fn first(&self) -> i32 {
        to_coord(self.start)
    }
    fn last(&self) -> i32 {
        // coitrees intervals are right-inclusive
        to_coord(self.end) - 1
    }
    fn metadata(&self) -> &usize {
        &self.index
    }
}

/// A [`coitrees::BasicCOITree`] interval tree over a single sequence's
/// ranges, with each node carrying the index of its feature.
pub struct COITrees {
    pub(crate) ranges: BasicCOITree<usize, usize>,
    /// The sequence length.
    pub length: Position,
}

impl std::fmt::Debug for COITrees {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("COITrees")
            .field("number of ranges:", &self.ranges.len())
            .field("length", &self.length)
            .finish()
    }
}

impl COITrees {
    /// Build the index. Every range must be non-empty and end at or before
    /// [`MAX_INDEXED_POSITION`].
    pub fn new(ranges: &[RangeIndexed], length: Position) -> Self {
        let ranges = BasicCOITree::new(ranges);
        Self { ranges, length }
    }

    /// An index with no ranges.
    pub fn empty(length: Position) -> Self {
        Self::new(&[], length)
    }

    /// Query this range container for a particular range, and call a visit function on all
    /// overlapping ranges.
    pub fn query<F>(&self, start: Position, end: Position, mut visit: F)
    where
        F: FnMut(RangeIndexed),
    {
        if start >= end || self.is_empty() {
            return;
        }
        // Note the terminology change to match coitrees (and uses i32s)
        self.ranges.query(to_coord(start), to_coord(end) - 1, |node: &IntervalNode<usize, usize>| {
            visit(RangeIndexed::new(
                node.first() as Position,
                (node.last() + 1) as Position,
                *node.metadata(),
            ))
        })
    }

    /// Count the ranges overlapping the right-exclusive range `[start, end)`.
    pub fn count_overlaps(&self, start: Position, end: Position) -> usize {
        if start >= end || self.is_empty() {
            return 0;
        }
        self.ranges.query_count(to_coord(start), to_coord(end) - 1)
    }

    /// Return the number of ranges in this [`COITrees`] container.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Return whether the [`COITrees`] object is empty (contains no ranges).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
