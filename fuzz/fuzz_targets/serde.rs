#![no_main]

use ip_cardinality::AdaptiveCounter;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(mut counter) = serde_json::from_slice::<AdaptiveCounter>(data) {
        let before = counter.count();
        counter.insert(1);
        assert!(counter.count() > 0);
        assert!(counter.count() <= before + 1);
    }
});
