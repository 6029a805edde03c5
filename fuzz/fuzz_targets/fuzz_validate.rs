//! Fuzz target: submission validation over arbitrary input strings.

#![no_main]

use std::collections::HashMap;

use formstore::{validate, Question, QuestionType};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let value = String::from_utf8_lossy(data).into_owned();

    let questions: Vec<Question> = QuestionType::ALL
        .into_iter()
        .map(|kind| {
            Question::new(kind.as_str(), kind.as_str(), kind)
                .with_required(true)
                .with_bounds(Some(-1.0e9), Some(1.0e9))
        })
        .collect();
    let values: HashMap<String, String> = questions
        .iter()
        .map(|q| (q.id().to_string(), value.clone()))
        .collect();

    let errors = validate(&questions, &values);
    assert!(errors.len() <= questions.len());
});
