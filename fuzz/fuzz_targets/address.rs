#![no_main]

use ip_cardinality::{format_address, parse_address, parse_line};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(key) = parse_line(data) {
        // any accepted token must render back to an equivalent address
        let rendered = format_address(key);
        assert_eq!(parse_address(rendered.as_bytes()), Ok(key));
        assert_eq!(data.iter().filter(|&&b| b == b'.').count(), 3);
    }
});
