// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Severity threshold filter.

use tracing::warn;

use crate::engine_core::models::RemoteFinding;
use crate::engine_core::severity::{Severity, SeverityClassifier, SeverityLevel};

/// Classify a finding, substituting the default level for unknown error ids.
pub fn severity_of(classifier: &dyn SeverityClassifier, finding: &RemoteFinding) -> Severity {
    match classifier.classify(&finding.error_id) {
        Some(level) => Severity {
            level,
            resolved: true,
        },
        None => {
            warn!(
                error_id = %finding.error_id,
                "Finding with unknown severity found (using {}): {}, NID: {}",
                SeverityLevel::UNRESOLVED_DEFAULT,
                finding.display_name,
                finding.nid
            );
            Severity {
                level: SeverityLevel::UNRESOLVED_DEFAULT,
                resolved: false,
            }
        }
    }
}

/// Keep the findings at or above `threshold`.
///
/// Without a threshold the input is returned as is and the classifier is
/// never consulted.
pub fn filter_by_severity(
    findings: Vec<RemoteFinding>,
    threshold: Option<SeverityLevel>,
    classifier: &dyn SeverityClassifier,
) -> Vec<RemoteFinding> {
    let Some(threshold) = threshold else {
        return findings;
    };

    findings
        .into_iter()
        .filter(|finding| severity_of(classifier, finding).level.meets(threshold))
        .collect()
}
