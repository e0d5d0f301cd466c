//! Benchmarks for `bytebucket` live in `benches/`; this crate has no library code.
