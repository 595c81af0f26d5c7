#![no_main]

use guwen_core::record::Record;
use libfuzzer_sys::fuzz_target;

// Whatever decodes must encode and decode back to the same record.
fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(record) = Record::decode_line(line) else {
        return;
    };
    let encoded = record.encode_line().expect("decoded record encodes");
    let again = Record::decode_line(&encoded).expect("encoded record decodes");
    assert_eq!(record, again);
});
