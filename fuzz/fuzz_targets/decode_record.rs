#![no_main]

use days_core::RecordCodec;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let codec = RecordCodec::new();
    if let Ok(day) = codec.decode(data) {
        // Anything that decodes must re-encode to a full slot that decodes the same.
        let encoded = codec.encode(&day);
        assert_eq!(encoded.len(), codec.stride());
        assert_eq!(codec.decode(encoded.as_bytes()).ok(), Some(day));
    }
});
