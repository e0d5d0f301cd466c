//! Property tests against a flat model of the byte table
//!
//! The model keeps all 256 values plus a flag per bucket recording whether
//! the real array should have it allocated.

use bytebucket::{ByteBucketArray, BUCKET_WIDTH, DOMAIN, NUM_BUCKETS};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Set(i32, u8),
    Trim(u8),
    Clear,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => (-64i32..320, any::<u8>()).prop_map(|(index, value)| Op::Set(index, value)),
        2 => any::<u8>().prop_map(Op::Trim),
        1 => Just(Op::Clear),
    ]
}

struct Model {
    values: [u8; DOMAIN],
    allocated: [bool; NUM_BUCKETS],
}

impl Model {
    fn new() -> Self {
        Self {
            values: [0; DOMAIN],
            allocated: [false; NUM_BUCKETS],
        }
    }

    fn apply(&mut self, op: &Op) -> Option<bool> {
        match *op {
            Op::Set(index, value) => {
                let Ok(index) = usize::try_from(index) else {
                    return Some(false);
                };
                if index >= DOMAIN {
                    return Some(false);
                }
                self.values[index] = value;
                self.allocated[index / BUCKET_WIDTH] = true;
                Some(true)
            }
            Op::Trim(threshold) => {
                for bucket in 0..NUM_BUCKETS {
                    let range = bucket * BUCKET_WIDTH..(bucket + 1) * BUCKET_WIDTH;
                    let removable = self.values[range.clone()].iter().all(|&v| v < threshold);
                    if self.allocated[bucket] && removable {
                        self.allocated[bucket] = false;
                        self.values[range].fill(0);
                    }
                }
                None
            }
            Op::Clear => {
                *self = Self::new();
                None
            }
        }
    }

    fn items(&self) -> Vec<(usize, u8)> {
        (0..DOMAIN)
            .filter(|index| self.allocated[index / BUCKET_WIDTH])
            .map(|index| (index, self.values[index]))
            .collect()
    }
}

fn apply(array: &mut ByteBucketArray<u8>, op: &Op) -> Option<bool> {
    match *op {
        Op::Set(index, value) => Some(array.set(index, value).is_ok()),
        Op::Trim(threshold) => {
            array.trim_buckets(|&value| value < threshold);
            None
        }
        Op::Clear => {
            array.clear();
            None
        }
    }
}

proptest! {
    #[test]
    fn matches_flat_model(ops in prop::collection::vec(op(), 0..200)) {
        let mut array = ByteBucketArray::<u8>::new();
        let mut model = Model::new();

        for op in &ops {
            prop_assert_eq!(apply(&mut array, op), model.apply(op), "op {:?}", op);
        }

        for index in 0..DOMAIN {
            prop_assert_eq!(array[index], model.values[index]);
        }
        for bucket in 0..NUM_BUCKETS {
            prop_assert_eq!(array.is_bucket_allocated(bucket), model.allocated[bucket]);
        }
        let items: Vec<(usize, u8)> = array.items().map(|(index, &value)| (index, value)).collect();
        prop_assert_eq!(items, model.items());
    }

    #[test]
    fn set_then_get(index in 0usize..DOMAIN, value in any::<u64>()) {
        let mut array = ByteBucketArray::<u64>::new();
        prop_assert!(array.set(index, value).is_ok());
        prop_assert_eq!(*array.get(index), value);
        prop_assert_eq!(array.allocated_buckets(), 1);
        prop_assert_eq!(array.items().len(), BUCKET_WIDTH);
    }

    #[test]
    fn out_of_domain_set_changes_nothing(
        writes in prop::collection::vec((0usize..DOMAIN, any::<u16>()), 0..20),
        index in prop_oneof![i64::MIN..0i64, 256i64..i64::MAX],
        value in any::<u16>(),
    ) {
        let mut array = ByteBucketArray::<u16>::new();
        for (i, v) in writes {
            array.set(i, v).unwrap();
        }
        let before: Vec<(usize, u16)> = array.items().map(|(i, &v)| (i, v)).collect();
        prop_assert!(array.set(index, value).is_err());
        let after: Vec<(usize, u16)> = array.items().map(|(i, &v)| (i, v)).collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn items_are_strictly_increasing(indices in prop::collection::vec(0u8..=255, 0..64)) {
        let array: ByteBucketArray<u8> = indices.iter().map(|&byte| (byte, 1)).collect();
        let visited: Vec<usize> = array.items().map(|(index, _)| index).collect();
        prop_assert_eq!(visited.len(), array.allocated_buckets() * BUCKET_WIDTH);
        prop_assert!(visited.windows(2).all(|pair| pair[0] < pair[1]));
        for byte in indices {
            prop_assert_eq!(array[usize::from(byte)], 1);
        }
    }
}
