#![no_main]
use libfuzzer_sys::fuzz_target;
use retrigger_core::params::parse_pairs;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let params = parse_pairs(s.split(','));
        for (key, value) in &params {
            assert!(!key.contains('='));
            assert!(!value.contains('='));
        }
    }
});
