//! Fuzz target: form import.
//!
//! Arbitrary bytes must never panic the JSON import path. Anything that
//! parses must also pass schema validation and survive export.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(form) = formstore::parse_form(json) {
        assert!(formstore::schema::validate_form(&form).is_ok());
        let exported = form.to_json().expect("parsed form must serialize");
        let reparsed = formstore::parse_form(&exported).expect("export must re-import");
        assert_eq!(reparsed.questions.len(), form.questions.len());
    }

    let _ = formstore::parse_question(json);
});
