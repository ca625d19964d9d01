#![no_main]

use days_core::date;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        let days = date::days_since(text);
        if date::parse(text).is_err() {
            assert!(date::is_unparseable(days));
        }
    }
});
