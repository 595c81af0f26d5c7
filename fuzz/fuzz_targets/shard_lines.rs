#![no_main]

use guwen_core::jsonl::RecordLines;
use libfuzzer_sys::fuzz_target;

// Line numbering is 1-based and strictly increasing; nothing panics.
fuzz_target!(|data: &[u8]| {
    let mut last = 0;
    for (line_no, _) in RecordLines::new(data) {
        assert!(line_no > last);
        last = line_no;
    }
});
