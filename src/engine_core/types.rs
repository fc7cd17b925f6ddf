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

//! Identifier Types.
//!
//! Strongly typed wrappers so an unresolved project reference can never be
//! passed where a canonical identifier is expected. Project references are
//! resolved here; `engine::project` re-exports the resolver.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::engine_core::constants::project::{
    ESCAPED_RESOURCE_PREFIX, LEGACY_SUFFIX_WIDTH, NID_PREFIX, RESOURCE_PREFIX,
};
use crate::engine_core::errors::ControllerError;

/// Canonical project identifier, always `prj-<suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `projects/<id>`, the resource name used by v1 endpoints.
    pub fn resource_name(&self) -> String {
        format!("{}{}", RESOURCE_PREFIX, self.0)
    }
}

impl FromStr for ProjectId {
    type Err = ControllerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        resolve_project(s)
    }
}

impl TryFrom<String> for ProjectId {
    type Error = ControllerError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        resolve_project(&s)
    }
}

impl From<ProjectId> for String {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}

impl AsRef<str> for ProjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalize any accepted project reference to its canonical identifier.
pub fn resolve_project(input: &str) -> Result<ProjectId, ControllerError> {
    let invalid = || ControllerError::InvalidProject(input.to_string());

    let reference = strip_resource_prefix(input.trim());

    if let Some(id) = reference.strip_prefix(NID_PREFIX) {
        if is_nid_body(id) {
            return Ok(ProjectId(reference.to_string()));
        }
        return Err(invalid());
    }

    let (name, suffix) = reference.rsplit_once('-').ok_or_else(invalid)?;
    if !is_slug_name(name) || !is_legacy_suffix(suffix) {
        return Err(invalid());
    }

    Ok(ProjectId(format!(
        "{}{:0>width$}",
        NID_PREFIX,
        suffix.to_ascii_lowercase(),
        width = LEGACY_SUFFIX_WIDTH
    )))
}

fn strip_resource_prefix(reference: &str) -> &str {
    reference
        .strip_prefix(RESOURCE_PREFIX)
        .or_else(|| reference.strip_prefix(ESCAPED_RESOURCE_PREFIX))
        .unwrap_or(reference)
}

fn is_nid_body(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Display-name slugs only use ASCII alphanumerics, `-` and `_`.
fn is_slug_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_legacy_suffix(suffix: &str) -> bool {
    !suffix.is_empty()
        && suffix.len() <= LEGACY_SUFFIX_WIDTH
        && suffix.chars().all(|c| c.is_ascii_hexdigit())
}
