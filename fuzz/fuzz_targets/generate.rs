#![no_main]

use joinscope_core::{generate_graph, GraphRequest, ParserPreference};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(sql) = std::str::from_utf8(data) {
        for parser in [ParserPreference::Auto, ParserPreference::Fallback] {
            let request = GraphRequest {
                parser,
                ..GraphRequest::new(sql)
            };

            if let Ok(result) = generate_graph(&request) {
                assert!(!result.graph.nodes.is_empty());
                assert!(result.graph.validate().is_ok());
            }
        }
    }
});
