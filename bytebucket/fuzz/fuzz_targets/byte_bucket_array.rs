//! Fuzzer for the public `ByteBucketArray` API.
//!
//! Indices are arbitrary `i32`s so most writes land outside the domain,
//! which must be rejected without touching the array.

#![no_main]
use arbitrary::Arbitrary;
use bytebucket::{ByteBucketArray, BUCKET_WIDTH, DOMAIN, NUM_BUCKETS};
use libfuzzer_sys::fuzz_target;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Set(i32, u16),
    Get(u8),
    Trim(u16),
    TryTrim(u16, u16),
    Clear,
}

fuzz_target!(|ex: Vec<Op>| {
    let mut array = ByteBucketArray::<u16>::new();
    let mut values = [0u16; DOMAIN];
    let mut allocated = [false; NUM_BUCKETS];

    for op in ex {
        match op {
            Op::Set(index, value) => {
                let result = array.set(index, value);
                match usize::try_from(index).ok().filter(|&i| i < DOMAIN) {
                    Some(i) => {
                        assert!(result.is_ok());
                        values[i] = value;
                        allocated[i / BUCKET_WIDTH] = true;
                    }
                    None => assert!(result.is_err()),
                }
            }
            Op::Get(index) => {
                assert_eq!(array[usize::from(index)], values[usize::from(index)]);
            }
            Op::Trim(threshold) => {
                array.trim_buckets(|&v| v < threshold);
                for bucket in 0..NUM_BUCKETS {
                    let range = bucket * BUCKET_WIDTH..(bucket + 1) * BUCKET_WIDTH;
                    if allocated[bucket] && values[range.clone()].iter().all(|&v| v < threshold) {
                        allocated[bucket] = false;
                        values[range].fill(0);
                    }
                }
            }
            Op::TryTrim(threshold, poison) => {
                let result = array.try_trim_buckets(|&v| {
                    if v == poison {
                        Err(v)
                    } else {
                        Ok(v < threshold)
                    }
                });
                let mut failed = false;
                for bucket in 0..NUM_BUCKETS {
                    if !allocated[bucket] {
                        continue;
                    }
                    let range = bucket * BUCKET_WIDTH..(bucket + 1) * BUCKET_WIDTH;
                    let mut removable = true;
                    for &v in &values[range.clone()] {
                        if v == poison {
                            failed = true;
                            break;
                        }
                        if v >= threshold {
                            removable = false;
                            break;
                        }
                    }
                    if failed {
                        break;
                    }
                    if removable {
                        allocated[bucket] = false;
                        values[range].fill(0);
                    }
                }
                assert_eq!(result.is_err(), failed);
            }
            Op::Clear => {
                array.clear();
                values = [0; DOMAIN];
                allocated = [false; NUM_BUCKETS];
            }
        }

        for (bucket, &expected) in allocated.iter().enumerate() {
            assert_eq!(array.is_bucket_allocated(bucket), expected);
        }
        assert_eq!(array.items().len(), array.allocated_buckets() * BUCKET_WIDTH);
    }
});
