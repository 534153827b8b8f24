//! Fuzz target: `Record::decode`
//!
//! Feeds arbitrary text lines to the record decoder and checks that:
//! - it never panics
//! - anything it accepts re-encodes to a line that decodes to the same
//!   subsystem, device flags, and interval
//!
//! cargo fuzz run fuzz_record_decoder

#![no_main]

use greenhouse::record::Record;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(Some(record)) = Record::decode(line) else {
        return;
    };

    let again = Record::decode(&record.encode())
        .expect("re-encoded record must parse")
        .expect("re-encoded record must keep its tag");
    assert_eq!(again.subsystem(), record.subsystem());
    assert_eq!(again.interval_secs, record.interval_secs);
    assert_eq!(again.snapshot.device_status(), record.snapshot.device_status());
});
