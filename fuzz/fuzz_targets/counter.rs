#![no_main]

use std::collections::HashSet;

use ip_cardinality::{AdaptiveCounter, ExactSet, RepresentationKind};
use libfuzzer_sys::fuzz_target;
use wyhash::wyhash;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let split_index = wyhash(data, 0) as usize % data.len();
    let (first_half, second_half) = data.split_at(split_index);
    let keys = |half: &[u8]| -> ExactSet {
        half.chunks(4)
            .map(|chunk| {
                let mut buf = [0u8; 4];
                buf[..chunk.len()].copy_from_slice(chunk);
                u32::from_le_bytes(buf)
            })
            .collect()
    };
    let (lhs, rhs) = (keys(first_half), keys(second_half));
    let expected: HashSet<u32> = lhs.iter().chain(rhs.iter()).collect();

    let threshold = usize::from(data[0]);
    let mut counter = AdaptiveCounter::new(threshold);
    counter.merge(&lhs);
    counter.merge(&rhs);

    assert_eq!(counter.count(), expected.len());
    assert!(expected.iter().all(|&key| counter.contains(key)));
    if expected.len() > threshold {
        assert_eq!(counter.representation(), RepresentationKind::Bitmap);
    }
});
