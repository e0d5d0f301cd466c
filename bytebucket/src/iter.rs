//! Traversal over the allocated part of a [`crate::ByteBucketArray`]

use crate::bucket_array::mem::Allocated;
use crate::bucket_array::shape::Shape;
use crate::{Storage, BUCKET_WIDTH};
use std::iter::{Enumerate, FusedIterator};
use std::slice;

/// Iterator over every slot of every allocated bucket, in index order
///
/// Yields `(index, &value)` pairs. Absent buckets contribute nothing, so the
/// number of items is always a multiple of [`BUCKET_WIDTH`] and the cost of a
/// full traversal scales with the allocated buckets, not the domain size.
///
/// Created by [`crate::ByteBucketArray::items`].
#[derive(Clone, Debug)]
pub struct Items<'a, T> {
    /// Allocated buckets not yet started
    buckets: Allocated<'a, T, BUCKET_WIDTH>,
    /// First index of the bucket in progress, and its remaining slots
    current: Option<(usize, Enumerate<slice::Iter<'a, T>>)>,
    /// Items left to yield across all buckets
    remaining: usize,
}

impl<'a, T> Items<'a, T> {
    /// Start a traversal at the lowest allocated bucket.
    pub(crate) fn new(storage: &'a Storage<T>) -> Self {
        Self {
            buckets: storage.allocated(),
            current: None,
            remaining: storage.allocated_count() * BUCKET_WIDTH,
        }
    }
}

impl<'a, T> Iterator for Items<'a, T> {
    type Item = (usize, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((start, slots)) = &mut self.current {
                if let Some((offset, value)) = slots.next() {
                    self.remaining -= 1;
                    return Some((*start + offset, value));
                }
            }
            let (bucket, items) = self.buckets.next()?;
            self.current = Some((Storage::<T>::join_index(bucket, 0), items.iter().enumerate()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Items<'a, T> {}

impl<'a, T> FusedIterator for Items<'a, T> {}
