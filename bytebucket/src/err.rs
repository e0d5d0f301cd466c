//! Error types for the `bytebucket` crate

/// Errors applicable to writing into a [`crate::ByteBucketArray`]
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An index was outside the byte domain.
    ///
    /// The write was rejected before anything was allocated or modified.
    /// Indices are never clamped or wrapped into range.
    #[error("index {index} is outside the byte domain [0, {})", crate::DOMAIN)]
    OutOfDomain {
        /// The rejected index, widened to `i128`
        index: i128,
    },
}
