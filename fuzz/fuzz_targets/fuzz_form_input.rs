//! Fuzz target: form validation
//!
//! Splits the input into `field=value` lines, submits them as every
//! remote kind, and checks a form is either rejected with at least one
//! field error or produces an in-range record.
//!
//! cargo fuzz run fuzz_form_input

#![no_main]

use libfuzzer_sys::fuzz_target;
use remotes::forms::{FormData, FormSchema};
use remotes::pins::{MAX_GPIO, MIN_GPIO};
use remotes::record::RemoteKind;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let form: FormData = text
        .lines()
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

    for kind in RemoteKind::ALL {
        match FormSchema::for_kind(kind).validate(&form) {
            Ok(record) => {
                assert_eq!(record.kind(), kind);
                assert!((MIN_GPIO..=MAX_GPIO).contains(&record.pin.number()));
                assert!(!record.name.trim().is_empty());
            }
            Err(errors) => assert!(!errors.is_empty()),
        }
    }
});
