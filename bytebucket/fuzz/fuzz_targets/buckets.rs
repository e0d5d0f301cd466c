//! Fuzzer for the "bucket_array::mem" API.
//!
//! Runs the same operations against two differently shaped raw bucket
//! arrays and a simulated model of each, checking that allocation state and
//! stored values always agree.

#![no_main]
use arbitrary::Arbitrary;
use arrayvec::ArrayVec;
use bytebucket::{BucketArray, Shape};
use libfuzzer_sys::fuzz_target;

type BucketIdx = u8;
type ItemIdx = u8;
type Val = u64;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Value(BucketIdx, ItemIdx),
    Write(BucketIdx, ItemIdx, Val),
    Release(BucketIdx),
    ReleaseIf(Val),
    ReleaseAll,
}

#[derive(Debug)]
struct SimulatedArray<const N: usize, const CAP: usize>(ArrayVec<Option<[Val; CAP]>, N>);

impl<const N: usize, const CAP: usize> Default for SimulatedArray<N, CAP> {
    fn default() -> Self {
        let mut r = ArrayVec::new();
        for _ in 0..N {
            r.push(None);
        }
        Self(r)
    }
}

struct Sim<const N: usize, const CAP: usize> {
    b: BucketArray<Val, N, CAP>,
    s: SimulatedArray<N, CAP>,
}

impl<const N: usize, const CAP: usize> Sim<N, CAP> {
    fn new() -> Self {
        Self {
            b: BucketArray::new(),
            s: Default::default(),
        }
    }

    fn idx(&self, idx: BucketIdx) -> usize {
        (idx as usize) % N
    }

    fn item(&self, item: ItemIdx) -> usize {
        (item as usize) % CAP
    }

    fn check(&self) {
        let count = self.s.0.iter().filter(|b| b.is_some()).count();
        assert_eq!(self.b.allocated_count(), count);
        let allocated: Vec<usize> = self.b.allocated().map(|(bucket, _)| bucket).collect();
        let expected: Vec<usize> = (0..N).filter(|&b| self.s.0[b].is_some()).collect();
        assert_eq!(allocated, expected);
        assert_eq!(BucketArray::<Val, N, CAP>::DOMAIN, N * CAP);
    }

    fn apply(&mut self, op: &Op) {
        match *op {
            Op::Value(bi, ii) => {
                let (bi, ii) = (self.idx(bi), self.item(ii));
                assert_eq!(self.b.is_allocated(bi), self.s.0[bi].is_some());
                let v1 = self.b.bucket(bi).map(|items| items[ii]);
                let v2 = self.s.0[bi].map(|items| items[ii]);
                assert_eq!(v1, v2);
            }
            Op::Write(bi, ii, v) => {
                let (bi, ii) = (self.idx(bi), self.item(ii));
                self.b.bucket_or_alloc(bi)[ii] = v;
                self.s.0[bi].get_or_insert([0; CAP])[ii] = v;
            }
            Op::Release(bi) => {
                let bi = self.idx(bi);
                let r1 = self.b.release(bi);
                let r2 = self.s.0[bi].take().is_some();
                assert_eq!(r1, r2);
            }
            Op::ReleaseIf(threshold) => {
                let r1: Result<usize, ()> = self
                    .b
                    .try_release_if(|items| Ok(items.iter().all(|&v| v < threshold)));
                let mut r2 = 0;
                for bucket in self.s.0.iter_mut() {
                    if bucket.is_some_and(|items| items.iter().all(|&v| v < threshold)) {
                        *bucket = None;
                        r2 += 1;
                    }
                }
                assert_eq!(r1, Ok(r2));
            }
            Op::ReleaseAll => {
                let r1 = self.b.release_all();
                let r2 = self.s.0.iter_mut().filter_map(|b| b.take()).count();
                assert_eq!(r1, r2);
            }
        }
        self.check();
    }
}

fuzz_target!(|ex: Vec<Op>| {
    let mut shape1: Sim<7, 12> = Sim::new();
    let mut shape2: Sim<16, 16> = Sim::new();

    for o in &ex {
        shape1.apply(o);
        shape2.apply(o);
    }
});
