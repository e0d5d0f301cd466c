//! Addressing layer
//!
//! A flat index is split into the number of the bucket that owns it and the
//! slot offset inside that bucket. This is integer division and remainder by
//! the compile-time bucket width, so it never depends on which buckets happen
//! to be allocated at the time.
//!
//! This also defines [`DomainIndex`], the conversion used at the API boundary
//! to accept any primitive integer as a candidate index. Candidates are
//! checked against the domain, never truncated or wrapped into it.

use num_traits::PrimInt;
use std::ops::Range;

/// Trait for accessing the overall shape of a bucket array
#[cfg_attr(feature = "bucket-array", visibility::make(pub))]
pub(crate) trait Shape {
    /// The number of buckets in this array
    const NUM_BUCKETS: usize;

    /// The number of item slots in each bucket
    const BUCKET_WIDTH: usize;

    /// The number of addressable indices, covering every slot of every bucket
    const DOMAIN: usize = Self::NUM_BUCKETS * Self::BUCKET_WIDTH;

    /// Check whether a flat index is addressable.
    #[inline(always)]
    fn contains(index: usize) -> bool {
        index < Self::DOMAIN
    }

    /// Split a flat index into the bucket index and the slot offset.
    ///
    /// No range checking is done here; callers check [`Self::contains`].
    #[inline(always)]
    fn split_index(index: usize) -> (usize, usize) {
        (index / Self::BUCKET_WIDTH, index % Self::BUCKET_WIDTH)
    }

    /// Rebuild a flat index from its split components.
    #[inline(always)]
    fn join_index(bucket: usize, slot: usize) -> usize {
        bucket * Self::BUCKET_WIDTH + slot
    }

    /// Get the range of flat indices owned by a single bucket.
    #[inline(always)]
    fn bucket_range(bucket: usize) -> Range<usize> {
        let start = Self::join_index(bucket, 0);
        start..(start + Self::BUCKET_WIDTH)
    }
}

/// Integer types that may name a position in a bucket array
///
/// Implemented for every primitive integer type, signed or unsigned. Negative
/// values, and values too large for a `usize`, are never inside any domain.
pub trait DomainIndex: PrimInt {
    /// Convert into a flat index if it's below `domain`.
    #[inline(always)]
    fn to_domain(self, domain: usize) -> Option<usize> {
        self.to_usize().filter(|&index| index < domain)
    }

    /// Widen for error reporting.
    ///
    /// Only `u128` values above `i128::MAX` don't fit; they saturate.
    #[inline(always)]
    fn to_wide(self) -> i128 {
        self.to_i128().unwrap_or(i128::MAX)
    }
}

impl<T: PrimInt> DomainIndex for T {}
