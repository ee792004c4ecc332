#![no_main]

use arbitrary::Arbitrary;
use fieldguard::{Flow, MemoryExchange, Validator, check, checks, sanitizers};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    path: String,
    body: String,
    optional: bool,
}

fuzz_target!(|input: Input| {
    let rule = if input.optional {
        check(input.path.as_str()).maybe()
    } else {
        check(input.path.as_str())
    };
    let rule = rule
        .sanitize_with([sanitizers::trim(), sanitizers::escape()])
        .if_value([checks::has_length(fieldguard::SizeBounds::max(64))]);

    let guard = Validator::new().body([rule]);
    let mut exchange = MemoryExchange::new().with_body(input.body);
    if guard.apply(&mut exchange) == Flow::Halt {
        assert!(exchange.status().is_some());
    }
});
