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

//! Project reference resolution.
//!
//! Accepted shapes:
//! - `prj-<id>` (canonical, returned unchanged)
//! - `<name>-<hex>` legacy slugs, hex of at most 12 digits
//! - either of the above behind `projects/` or `projects%2F`
//!
//! Legacy slugs map to `prj-` followed by the hex suffix left-padded with
//! zeros to 12 digits, which is also how the backend derived NIDs for
//! projects created before NIDs existed.

pub use crate::engine_core::types::resolve_project;
