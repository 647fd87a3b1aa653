#![no_main]
use libfuzzer_sys::fuzz_target;
use retrigger_core::{RawOptions, Resolver, TriggerConfig};

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // Every line is NAME=VALUE in the fake environment
        let env: Vec<(String, String)> = s
            .lines()
            .filter_map(|l| l.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let resolver = Resolver::new(move |name: &str| {
            env.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone())
        });
        if let Ok(config) = TriggerConfig::resolve(&RawOptions::default(), &resolver) {
            assert!(!config.repos.is_empty());
            assert!(config.filters.validate().is_ok());
        }
    }
});
