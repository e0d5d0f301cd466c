//! Memory management internals for the bucket array
//!
//! A bucket array describes `N` buckets of `CAP` item slots each, but only
//! pays for the buckets that are in use. Each bucket is a separate boxed
//! `[T; CAP]`, created the first time one of its slots is written and freed
//! as a unit. There is no partial bucket: a bucket is either absent, or owns
//! all `CAP` of its slots, each holding an initialized `T`.
//!
//! The [`BucketArray`] exclusively owns every bucket it allocates. Borrows
//! handed out by [`BucketArray::bucket`] and [`BucketArray::allocated`] are
//! tied to a shared reference, so no bucket can be released while someone
//! is still looking at it.
//!
//! Nothing here knows about default values or trimming predicates. The
//! public container in the crate root supplies those policies.

// We need to allow this warning because we conditionally make some private
// functions public, but their documentation links to private types.
#![allow(rustdoc::private_intra_doc_links)]

use crate::bucket_array::shape::Shape;
use std::iter::{Enumerate, FusedIterator};
use std::slice;

/// Optional, independently allocated storage for every bucket
///
/// Describes `N` buckets which each hold exactly `CAP` items of type `T`
/// once allocated.
#[cfg_attr(feature = "bucket-array", visibility::make(pub))]
#[derive(Clone, Debug)]
pub(crate) struct BucketArray<
    // Item type
    T,
    // Number of buckets
    const N: usize,
    // Number of item slots in each bucket
    const CAP: usize,
> {
    /// One allocation per bucket in use, indexed by bucket number
    buckets: [Option<Box<[T; CAP]>>; N],
}

impl<T, const N: usize, const CAP: usize> BucketArray<T, N, CAP> {
    /// Create a new bucket array with every bucket absent.
    #[cfg_attr(feature = "bucket-array", visibility::make(pub))]
    pub(crate) fn new() -> Self {
        Self {
            buckets: std::array::from_fn(|_| None),
        }
    }

    /// Look up the items of one bucket, if it's allocated.
    ///
    /// Panics if the bucket index is out of range.
    #[cfg_attr(feature = "bucket-array", visibility::make(pub))]
    #[inline(always)]
    pub(crate) fn bucket(&self, bucket: usize) -> Option<&[T; CAP]> {
        self.buckets[bucket].as_deref()
    }

    /// Check whether a bucket is currently allocated.
    ///
    /// Panics if the bucket index is out of range.
    #[cfg_attr(feature = "bucket-array", visibility::make(pub))]
    #[inline(always)]
    pub(crate) fn is_allocated(&self, bucket: usize) -> bool {
        self.buckets[bucket].is_some()
    }

    /// Count the buckets that are currently allocated.
    #[cfg_attr(feature = "bucket-array", visibility::make(pub))]
    pub(crate) fn allocated_count(&self) -> usize {
        self.buckets.iter().filter(|slot| slot.is_some()).count()
    }

    /// Iterate over allocated buckets only, in bucket order.
    #[cfg_attr(feature = "bucket-array", visibility::make(pub))]
    pub(crate) fn allocated(&self) -> Allocated<'_, T, CAP> {
        Allocated {
            inner: self.buckets.iter().enumerate(),
        }
    }

    /// Free one bucket, returning it to the absent state.
    ///
    /// Returns `false` if there was nothing to free. Panics if the bucket
    /// index is out of range.
    #[cfg_attr(feature = "bucket-array", visibility::make(pub))]
    pub(crate) fn release(&mut self, bucket: usize) -> bool {
        let released = self.buckets[bucket].take().is_some();
        if released {
            log::trace!("released bucket {}", bucket);
        }
        released
    }

    /// Free every bucket, returning the number that were allocated.
    #[cfg_attr(feature = "bucket-array", visibility::make(pub))]
    pub(crate) fn release_all(&mut self) -> usize {
        (0..N).filter(|&bucket| self.release(bucket)).count()
    }

    /// Free each allocated bucket for which `releasable` returns `Ok(true)`.
    ///
    /// Buckets are visited in order. The callback sees a bucket's items
    /// before anything about that bucket changes, so if it fails, the
    /// bucket is left allocated and the error is returned right away.
    /// Buckets already released earlier in the same pass stay released.
    ///
    /// Returns the number of buckets released.
    #[cfg_attr(feature = "bucket-array", visibility::make(pub))]
    pub(crate) fn try_release_if<E, F>(&mut self, mut releasable: F) -> Result<usize, E>
    where
        F: FnMut(&[T; CAP]) -> Result<bool, E>,
    {
        let mut released = 0;
        for (bucket, slot) in self.buckets.iter_mut().enumerate() {
            let Some(items) = slot.as_deref() else {
                continue;
            };
            if releasable(items)? {
                *slot = None;
                released += 1;
                log::trace!("released bucket {}", bucket);
            }
        }
        Ok(released)
    }
}

impl<T: Default, const N: usize, const CAP: usize> BucketArray<T, N, CAP> {
    /// Get mutable access to one bucket, allocating it if it's absent.
    ///
    /// New buckets have every slot set to `T::default()`. At most one bucket
    /// is allocated per call. Panics if the bucket index is out of range.
    #[cfg_attr(feature = "bucket-array", visibility::make(pub))]
    pub(crate) fn bucket_or_alloc(&mut self, bucket: usize) -> &mut [T; CAP] {
        self.buckets[bucket].get_or_insert_with(|| {
            log::trace!("allocating bucket {}", bucket);
            Box::new(std::array::from_fn(|_| T::default()))
        })
    }
}

impl<T, const N: usize, const CAP: usize> Default for BucketArray<T, N, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize, const CAP: usize> Shape for BucketArray<T, N, CAP> {
    /// Number of buckets in the array
    const NUM_BUCKETS: usize = N;

    /// Number of item slots in each bucket
    const BUCKET_WIDTH: usize = CAP;
}

/// Iterator over the allocated buckets of a [`BucketArray`]
///
/// Yields each allocated bucket's index alongside its items. Absent buckets
/// are skipped without being reported.
#[cfg_attr(feature = "bucket-array", visibility::make(pub))]
#[derive(Clone, Debug)]
pub(crate) struct Allocated<'a, T, const CAP: usize> {
    /// Bucket slots not yet visited, with their bucket numbers
    inner: Enumerate<slice::Iter<'a, Option<Box<[T; CAP]>>>>,
}

impl<'a, T, const CAP: usize> Iterator for Allocated<'a, T, CAP> {
    type Item = (usize, &'a [T; CAP]);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .by_ref()
            .find_map(|(bucket, slot)| slot.as_deref().map(|items| (bucket, items)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

impl<'a, T, const CAP: usize> FusedIterator for Allocated<'a, T, CAP> {}

#[cfg(test)]
mod test {
    use super::BucketArray;
    use crate::bucket_array::shape::Shape;

    type Small = BucketArray<u32, 7, 12>;

    #[test]
    fn lazy_allocation() {
        let mut array = Small::new();
        assert_eq!(Small::DOMAIN, 84);
        assert_eq!(array.allocated_count(), 0);
        assert!(array.bucket(3).is_none());

        array.bucket_or_alloc(3)[5] = 9;
        assert!(array.is_allocated(3));
        assert_eq!(array.allocated_count(), 1);

        // A second access reuses the same bucket
        array.bucket_or_alloc(3)[6] = 10;
        assert_eq!(array.allocated_count(), 1);

        let items = array.bucket(3).unwrap();
        assert_eq!(items[4], 0);
        assert_eq!(items[5], 9);
        assert_eq!(items[6], 10);
    }

    #[test]
    fn allocated_in_order() {
        let mut array = Small::new();
        for bucket in [6, 0, 4] {
            array.bucket_or_alloc(bucket)[0] = bucket as u32;
        }
        let seen: Vec<_> = array.allocated().map(|(b, items)| (b, items[0])).collect();
        assert_eq!(seen, vec![(0, 0), (4, 4), (6, 6)]);
    }

    #[test]
    fn release() {
        let mut array = Small::new();
        array.bucket_or_alloc(1);
        array.bucket_or_alloc(2);
        assert!(array.release(1));
        assert!(!array.release(1));
        assert!(!array.is_allocated(1));
        assert!(array.is_allocated(2));
        assert_eq!(array.release_all(), 1);
        assert_eq!(array.allocated_count(), 0);
        assert_eq!(array.release_all(), 0);
    }

    #[test]
    fn release_if_error_keeps_bucket() {
        let mut array = Small::new();
        array.bucket_or_alloc(0);
        array.bucket_or_alloc(2)[1] = 1;
        array.bucket_or_alloc(5);

        let result = array.try_release_if(|items| {
            if items[1] == 1 {
                Err("bucket two")
            } else {
                Ok(true)
            }
        });
        assert_eq!(result, Err("bucket two"));
        assert!(!array.is_allocated(0));
        assert!(array.is_allocated(2));
        assert!(array.is_allocated(5));

        let released: Result<usize, ()> = array.try_release_if(|items| Ok(items[1] == 0));
        assert_eq!(released, Ok(1));
        assert!(array.is_allocated(2));
        assert!(!array.is_allocated(5));
    }

    #[test]
    #[should_panic]
    fn bucket_out_of_range() {
        let array = Small::new();
        let _ = array.bucket(7);
    }
}
