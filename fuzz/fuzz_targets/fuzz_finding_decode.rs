// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use arbitrary::Arbitrary;
use fuzzrun::engine::reconciler::{collapse, remote_to_local};
use fuzzrun::engine_core::models::{FindingList, RunStatusResponse};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Payload<'a> {
    Findings(&'a [u8]),
    Status(&'a [u8]),
}

fuzz_target!(|payload: Payload| {
    // Backend documents must never panic the decoder or the reconciler.
    match payload {
        Payload::Findings(data) => {
            if let Ok(list) = serde_json::from_slice::<FindingList>(data) {
                for report in &list.findings {
                    let _ = remote_to_local(report);
                }
                let _ = collapse(list.findings);
            }
        }
        Payload::Status(data) => {
            if let Ok(status) = serde_json::from_slice::<RunStatusResponse>(data) {
                let _ = status.status().is_terminal();
            }
        }
    }
});
