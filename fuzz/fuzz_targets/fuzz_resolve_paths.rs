#![no_main]

use fieldguard::primitives::resolve;
use fieldguard::types::{Node, Path};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks where the path ends and the JSON document begins.
    let split = data[0] as usize % data.len();
    let (path_bytes, value_bytes) = data[1..].split_at(split.min(data.len() - 1));

    let path = Path::parse(String::from_utf8_lossy(path_bytes));
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(value_bytes) {
        let root = Node::from(value);
        for located in resolve(&root, &path) {
            if let Some(target) = &located.target {
                assert_eq!(root.pointer(target), Some(&*located.value));
            }
        }
    }
});
