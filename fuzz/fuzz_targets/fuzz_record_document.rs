//! Fuzz target: stored record decoding
//!
//! Feeds arbitrary bytes through the same path a record file takes on
//! load and checks:
//! - No panics on any JSON object
//! - A decoded record re-encodes to a document that decodes to itself
//! - Every decoded pin is inside the GPIO range
//!
//! cargo fuzz run fuzz_record_document

#![no_main]

use libfuzzer_sys::fuzz_target;
use remotes::app::ports::Document;
use remotes::pins::{MAX_GPIO, MIN_GPIO};
use remotes::record::RemoteRecord;

fuzz_target!(|data: &[u8]| {
    let Ok(doc) = serde_json::from_slice::<Document>(data) else {
        return;
    };
    let Ok(record) = RemoteRecord::from_dic(&doc) else {
        return;
    };
    assert!((MIN_GPIO..=MAX_GPIO).contains(&record.pin.number()));
    let again = RemoteRecord::from_dic(&record.to_dic()).expect("re-encoded record must decode");
    assert_eq!(again, record);
});
