#![no_main]

use libfuzzer_sys::fuzz_target;
use siteforge::domain::value_objects::{patch_id, PatchId};

fuzz_target!(|data: &[u8]| {
    if let Ok(locator) = std::str::from_utf8(data) {
        if let Ok(id) = PatchId::parse(locator) {
            assert_eq!(id.to_string(), locator);
            assert_eq!(patch_id::decode(locator).unwrap(), id.internal_id());
        }
        let _ = patch_id::decode_blob_id(locator);
    }
});
