#![no_main]

use joinscope_core::{normalize, parse_fallback, RawAst};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(sql) = std::str::from_utf8(data) {
        let ast = parse_fallback(sql);
        let _ = normalize(RawAst::from(ast));
    }
});
