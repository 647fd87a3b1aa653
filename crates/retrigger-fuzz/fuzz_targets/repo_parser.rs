#![no_main]
use libfuzzer_sys::fuzz_target;
use retrigger_core::RepoId;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        match RepoId::parse(s) {
            Ok(repo) => assert_eq!(repo.to_string(), s),
            Err(_) => assert_ne!(s.matches('/').count(), 1),
        }
    }
});
