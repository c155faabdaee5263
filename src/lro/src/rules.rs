// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The per-verb polling rules.
//!
//! ARM services use different conventions depending on the HTTP method that
//! started the operation. The differences are captured as data, the
//! [Tracker][crate::tracker::Tracker] interprets them.
//!
//! | Verb   | Default URL | `201 Created`         | `202 Accepted`               | Final URL from `Location` | Body required | Provisioning state on |
//! |--------|-------------|-----------------------|------------------------------|---------------------------|---------------|-----------------------|
//! | DELETE | none        | `Location` required   | AO, else `Location`          | yes                       | no            | 200, 204              |
//! | POST   | none        | `Location` required   | AO, else `Location`          | yes                       | no            | 200, 204              |
//! | PATCH  | request URL | AO overrides default  | AO, else `Location` required | no                        | no            | 200, 201              |
//! | PUT    | request URL | AO overrides default  | AO, else `Location` required | no                        | yes           | 200, 201              |

use crate::state::Verb;
use http::StatusCode;

/// The rules used to track operations started by one HTTP method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VerbRules {
    /// Poll, and fetch the final result from, the request URL unless the
    /// headers say otherwise.
    pub request_url_is_default: bool,

    /// A `201 Created` response must include a `Location` header, which is
    /// used for polling and for the final result.
    ///
    /// When `false`, an `Azure-AsyncOperation` header on a `201 Created`
    /// response overrides the default polling URL.
    pub created_requires_location: bool,

    /// A `Location` header on a `202 Accepted` response is the URL of the
    /// final result, even if the operation is polled via
    /// `Azure-AsyncOperation`.
    pub location_is_final: bool,

    /// A response without polling headers must include a body.
    pub body_required_without_headers: bool,

    /// The status codes where the provisioning state in the body determines
    /// the state of the operation.
    pub provisioning_state_codes: [StatusCode; 2],
}

impl VerbRules {
    pub const DELETE: VerbRules = VerbRules {
        request_url_is_default: false,
        created_requires_location: true,
        location_is_final: true,
        body_required_without_headers: false,
        provisioning_state_codes: [StatusCode::OK, StatusCode::NO_CONTENT],
    };

    pub const POST: VerbRules = VerbRules::DELETE;

    pub const PATCH: VerbRules = VerbRules {
        request_url_is_default: true,
        created_requires_location: false,
        location_is_final: false,
        body_required_without_headers: false,
        provisioning_state_codes: [StatusCode::OK, StatusCode::CREATED],
    };

    pub const PUT: VerbRules = VerbRules {
        body_required_without_headers: true,
        ..VerbRules::PATCH
    };

    pub fn for_verb(verb: Verb) -> &'static VerbRules {
        match verb {
            Verb::Delete => &Self::DELETE,
            Verb::Post => &Self::POST,
            Verb::Patch => &Self::PATCH,
            Verb::Put => &Self::PUT,
        }
    }

    /// Returns true if the provisioning state determines the operation state
    /// for a response with this status code.
    pub fn checks_provisioning_state(&self, status: StatusCode) -> bool {
        self.provisioning_state_codes.contains(&status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Verb::Delete, StatusCode::OK, true)]
    #[test_case(Verb::Delete, StatusCode::CREATED, false)]
    #[test_case(Verb::Delete, StatusCode::ACCEPTED, false)]
    #[test_case(Verb::Delete, StatusCode::NO_CONTENT, true)]
    #[test_case(Verb::Post, StatusCode::OK, true)]
    #[test_case(Verb::Post, StatusCode::CREATED, false)]
    #[test_case(Verb::Post, StatusCode::NO_CONTENT, true)]
    #[test_case(Verb::Patch, StatusCode::OK, true)]
    #[test_case(Verb::Patch, StatusCode::CREATED, true)]
    #[test_case(Verb::Patch, StatusCode::ACCEPTED, false)]
    #[test_case(Verb::Patch, StatusCode::NO_CONTENT, false)]
    #[test_case(Verb::Put, StatusCode::OK, true)]
    #[test_case(Verb::Put, StatusCode::CREATED, true)]
    #[test_case(Verb::Put, StatusCode::NO_CONTENT, false)]
    fn provisioning_state_codes(verb: Verb, status: StatusCode, want: bool) {
        let rules = VerbRules::for_verb(verb);
        assert_eq!(rules.checks_provisioning_state(status), want, "{rules:?}");
    }

    #[test]
    fn delete_and_post_match() {
        assert_eq!(
            VerbRules::for_verb(Verb::Delete),
            VerbRules::for_verb(Verb::Post)
        );
    }

    #[test]
    fn put_differs_from_patch_only_in_body() {
        let put = VerbRules::for_verb(Verb::Put);
        let patch = VerbRules::for_verb(Verb::Patch);
        assert!(put.body_required_without_headers, "{put:?}");
        assert!(!patch.body_required_without_headers, "{patch:?}");
        assert_eq!(
            &VerbRules {
                body_required_without_headers: false,
                ..*put
            },
            patch
        );
    }

    #[test_case(Verb::Delete, false, true, true)]
    #[test_case(Verb::Post, false, true, true)]
    #[test_case(Verb::Patch, true, false, false)]
    #[test_case(Verb::Put, true, false, false)]
    fn header_rules(verb: Verb, default: bool, created: bool, final_location: bool) {
        let rules = VerbRules::for_verb(verb);
        assert_eq!(rules.request_url_is_default, default, "{rules:?}");
        assert_eq!(rules.created_requires_location, created, "{rules:?}");
        assert_eq!(rules.location_is_final, final_location, "{rules:?}");
    }
}
