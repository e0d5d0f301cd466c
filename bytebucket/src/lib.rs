#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![doc = include_str!("../README.md")]
// @@ begin lint list maintained by maint/add_warning @@
#![allow(renamed_and_removed_lints)] // @@REMOVE_WHEN(ci_arti_stable)
#![allow(unknown_lints)] // @@REMOVE_WHEN(ci_arti_nightly)
#![warn(missing_docs)]
#![warn(noop_method_call)]
#![warn(unreachable_pub)]
#![warn(clippy::all)]
#![deny(clippy::await_holding_lock)]
#![deny(clippy::cargo_common_metadata)]
#![deny(clippy::cast_lossless)]
#![deny(clippy::checked_conversions)]
#![warn(clippy::cognitive_complexity)]
#![deny(clippy::debug_assert_with_mut_call)]
#![deny(clippy::exhaustive_enums)]
#![deny(clippy::exhaustive_structs)]
#![deny(clippy::expl_impl_clone_on_copy)]
#![deny(clippy::fallible_impl_from)]
#![deny(clippy::implicit_clone)]
#![deny(clippy::large_stack_arrays)]
#![warn(clippy::manual_ok_or)]
#![deny(clippy::missing_docs_in_private_items)]
#![warn(clippy::needless_borrow)]
#![warn(clippy::needless_pass_by_value)]
#![warn(clippy::option_option)]
#![deny(clippy::print_stderr)]
#![deny(clippy::print_stdout)]
#![warn(clippy::rc_buffer)]
#![deny(clippy::ref_option_ref)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::trait_duplication_in_bounds)]
#![deny(clippy::unchecked_duration_subtraction)]
#![deny(clippy::unnecessary_wraps)]
#![warn(clippy::unseparated_literal_suffix)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::mod_module_files)]
#![allow(clippy::let_unit_value)] // This can reasonably be done for explicitness
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::significant_drop_in_scrutinee)] // arti/-/merge_requests/588/#note_2812945
#![allow(clippy::result_large_err)] // temporary workaround for arti#587
#![allow(clippy::needless_raw_string_hashes)] // complained-about code is fine, often best
#![allow(clippy::needless_lifetimes)] // See arti#1765
//! <!-- @@ end lint list maintained by maint/add_warning @@ -->

mod bucket_array;
mod err;
mod iter;

// Export the raw bucket storage API only to the fuzzer.
// (This is not stable; you should not use it except for testing.)
#[cfg(feature = "bucket-array")]
pub use bucket_array::{
    mem::{Allocated, BucketArray},
    shape::Shape,
};

pub use bucket_array::shape::DomainIndex;
pub use err::Error;
pub use iter::Items;

use bucket_array::shape::Shape as _;
use std::convert::Infallible;
use std::fmt;
use std::ops::Index;

/// Number of addressable indices, one for each byte value
pub const DOMAIN: usize = 256;

/// Number of buckets the domain is divided into
pub const NUM_BUCKETS: usize = 16;

/// Number of contiguous indices owned by each bucket
pub const BUCKET_WIDTH: usize = 16;

/// Buckets tile the domain exactly
const _: () = assert!(NUM_BUCKETS * BUCKET_WIDTH == DOMAIN);

/// Bucket storage with the byte-domain shape
pub(crate) type Storage<T> = bucket_array::mem::BucketArray<T, NUM_BUCKETS, BUCKET_WIDTH>;

/// Sparse table with one slot for each byte value
///
/// The [`DOMAIN`] is split into [`NUM_BUCKETS`] runs of [`BUCKET_WIDTH`]
/// contiguous indices. A bucket's memory is only allocated the first time
/// one of its slots is written, and it's released as a whole by
/// [`Self::trim_buckets`] or [`Self::clear`]. Reads from an absent bucket see
/// `T::default()`.
///
/// Any successful write allocates, even a write of `T::default()`. Such a
/// bucket looks unchanged through [`Self::get`] but shows up in
/// [`Self::items`] and [`Self::allocated_buckets`].
///
/// There is no internal synchronization. Writes need `&mut self`, so sharing
/// one array between threads means wrapping it in a lock of your choosing.
#[derive(Clone)]
pub struct ByteBucketArray<T> {
    /// Lazily allocated buckets
    buckets: Storage<T>,
    /// Value reported for every slot of an absent bucket
    zero: T,
}

impl<T: Default> ByteBucketArray<T> {
    /// Create a new [`ByteBucketArray`] with no buckets allocated.
    pub fn new() -> Self {
        Self {
            buckets: Storage::new(),
            zero: T::default(),
        }
    }

    /// Store a value at `index`.
    ///
    /// The index may be any primitive integer. If it's outside the
    /// [`DOMAIN`], returns [`Error::OutOfDomain`] without allocating or
    /// writing anything. Otherwise allocates the owning bucket if necessary,
    /// stores `value`, and returns `Ok`.
    pub fn set<I: DomainIndex>(&mut self, index: I, value: T) -> Result<(), Error> {
        let Some(flat) = index.to_domain(DOMAIN) else {
            return Err(Error::OutOfDomain {
                index: index.to_wide(),
            });
        };
        *self.item_mut(flat) = value;
        Ok(())
    }

    /// Get mutable access to the value at `index`, allocating its bucket if
    /// it's absent.
    ///
    /// Panics if `index` is not below [`DOMAIN`].
    pub fn item_mut(&mut self, index: usize) -> &mut T {
        assert!(
            Storage::<T>::contains(index),
            "index {} is outside the byte domain",
            index
        );
        let (bucket, slot) = Storage::<T>::split_index(index);
        &mut self.buckets.bucket_or_alloc(bucket)[slot]
    }
}

impl<T> ByteBucketArray<T> {
    /// Look up the value at `index`.
    ///
    /// Returns the default value if the owning bucket isn't allocated.
    /// Panics if `index` is not below [`DOMAIN`]; callers validate indices
    /// first, as with slice indexing.
    #[inline]
    pub fn get(&self, index: usize) -> &T {
        assert!(
            Storage::<T>::contains(index),
            "index {} is outside the byte domain",
            index
        );
        let (bucket, slot) = Storage::<T>::split_index(index);
        match self.buckets.bucket(bucket) {
            Some(items) => &items[slot],
            None => &self.zero,
        }
    }

    /// Size of the address space, always [`DOMAIN`].
    ///
    /// This says nothing about how many slots are allocated or written.
    #[inline]
    pub fn size(&self) -> usize {
        DOMAIN
    }

    /// Iterate over every slot of every allocated bucket, in index order.
    pub fn items(&self) -> Items<'_, T> {
        Items::new(&self.buckets)
    }

    /// Call `visitor` with the index and value of every slot in every
    /// allocated bucket, in index order.
    ///
    /// Absent buckets are skipped entirely.
    pub fn for_each_item<F: FnMut(usize, &T)>(&self, mut visitor: F) {
        for (index, value) in self.items() {
            visitor(index, value);
        }
    }

    /// Release every bucket whose values all satisfy `is_removable`.
    ///
    /// Trimming is all-or-nothing per bucket. A single slot that fails the
    /// predicate keeps its whole bucket allocated and unchanged.
    pub fn trim_buckets<F: FnMut(&T) -> bool>(&mut self, mut is_removable: F) {
        let result: Result<(), Infallible> = self.try_trim_buckets(|value| Ok(is_removable(value)));
        match result {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    /// Like [`Self::trim_buckets`], with a predicate that may fail.
    ///
    /// The first error ends the pass and is returned as-is. The bucket being
    /// checked when it happened is never released. Buckets released earlier
    /// in the pass stay released.
    pub fn try_trim_buckets<E, F>(&mut self, mut is_removable: F) -> Result<(), E>
    where
        F: FnMut(&T) -> Result<bool, E>,
    {
        let before = self.buckets.allocated_count();
        let released = self.buckets.try_release_if::<E, _>(|items| {
            for value in items {
                if !is_removable(value)? {
                    return Ok(false);
                }
            }
            Ok(true)
        })?;
        log::debug!("trimmed {} of {} allocated buckets", released, before);
        Ok(())
    }

    /// Release every bucket.
    ///
    /// Afterwards the array behaves exactly like a new one.
    pub fn clear(&mut self) {
        let released = self.buckets.release_all();
        log::debug!("cleared {} buckets", released);
    }

    /// Count the buckets that are currently allocated.
    pub fn allocated_buckets(&self) -> usize {
        self.buckets.allocated_count()
    }

    /// Check whether one bucket is currently allocated.
    ///
    /// Panics if `bucket` is not below [`NUM_BUCKETS`].
    pub fn is_bucket_allocated(&self, bucket: usize) -> bool {
        assert!(
            bucket < NUM_BUCKETS,
            "bucket {} is out of range, there are only {}",
            bucket,
            NUM_BUCKETS
        );
        self.buckets.is_allocated(bucket)
    }
}

impl<T: Default> Default for ByteBucketArray<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for ByteBucketArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        self.get(index)
    }
}

impl<T: fmt::Debug> fmt::Debug for ByteBucketArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.items()).finish()
    }
}

impl<'a, T> IntoIterator for &'a ByteBucketArray<T> {
    type Item = (usize, &'a T);
    type IntoIter = Items<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items()
    }
}

/// Byte keys are always inside the domain, so extending can't fail.
impl<T: Default> Extend<(u8, T)> for ByteBucketArray<T> {
    fn extend<I: IntoIterator<Item = (u8, T)>>(&mut self, iter: I) {
        for (byte, value) in iter {
            *self.item_mut(usize::from(byte)) = value;
        }
    }
}

impl<T: Default> FromIterator<(u8, T)> for ByteBucketArray<T> {
    fn from_iter<I: IntoIterator<Item = (u8, T)>>(iter: I) -> Self {
        let mut array = Self::new();
        array.extend(iter);
        array
    }
}
