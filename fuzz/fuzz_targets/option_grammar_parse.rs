#![no_main]

use gitbot_command::parse_options;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let raw = String::from_utf8_lossy(data);

    match parse_options(&raw) {
        Ok(parsed) => {
            if raw.is_empty() {
                assert!(parsed.is_empty());
            }
            for (key, values) in &parsed {
                assert!(!key.is_empty());
                assert_eq!(key.trim(), key);
                assert!(values.iter().all(|value| !value.contains(';')));
            }
        }
        Err(error) => {
            assert!(!raw.is_empty());
            assert!(!error.to_string().trim().is_empty());
        }
    }
});
