#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(content) = std::str::from_utf8(data) {
        // Settings parsing and manifest building should never panic
        if let Ok(settings) = serde_json::from_str::<siteforge::SiteSettings>(content) {
            let _ = siteforge::ManifestBuilder::new().build(&[], &settings);
        }
    }
});
