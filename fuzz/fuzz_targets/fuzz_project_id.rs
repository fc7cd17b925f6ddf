// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use fuzzrun::engine::project::resolve_project;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Any accepted reference must resolve to a fixed point.
    if let Ok(id) = resolve_project(data) {
        let again = resolve_project(id.as_str()).expect("canonical id must resolve");
        assert_eq!(id, again);
        assert!(id.as_str().starts_with("prj-"));
    }
});
