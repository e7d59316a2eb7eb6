#![no_main]

use libfuzzer_sys::fuzz_target;
use siteforge::domain::services::routes_codec;

fuzz_target!(|data: &[u8]| {
    let _ = routes_codec::decode_routes_field(data);
    let _ = routes_codec::decode_route_list(data);
});
