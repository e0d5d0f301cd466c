//! Bucketed storage behind [`crate::ByteBucketArray`]
//!
//! This module is split into two layers. The [`shape`] layer is pure
//! addressing: it turns a flat index into a bucket number and a slot offset,
//! and checks candidate indices against the domain. The [`mem`] layer owns
//! the buckets themselves, as an array of optional boxed chunks that are
//! allocated on first write and released whole.
//!
//! Both layers are generic over the bucket count and width, but the crate
//! only ever instantiates the 16 by 16 byte-domain shape. Fuzzing uses other
//! shapes through the `bucket-array` feature.

pub(crate) mod mem;
pub(crate) mod shape;
