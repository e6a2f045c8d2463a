#![no_main]

use libfuzzer_sys::fuzz_target;
use vulnfeed_nvd::CpeUri;

fuzz_target!(|data: &[u8]| {
    if let Ok(uri) = std::str::from_utf8(data) {
        if let Ok(cpe) = CpeUri::parse(uri) {
            let _ = cpe.index_key();
        }
    }
});
