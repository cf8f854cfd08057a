// Copyright (c) 2026 MCU-Debug Authors.
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

//! Wildcard matching for name queries.
//!
//! `*` matches any run of characters (including none) and `?` matches exactly
//! one character. Everything else is literal. The whole candidate has to match
//! the whole pattern.

/// Matches any sequence of zero or more characters.
pub const MULTIPLE_WILDCARD: u8 = b'*';
/// Matches exactly one character.
pub const SINGLE_WILDCARD: u8 = b'?';

/// Match `candidate` against a glob `pattern`.
///
/// With `check_case` unset, letters are folded ASCII-only (`A-Z` against `a-z`).
/// Any string is a legal pattern. Runs of `*` against long candidates that do not
/// match backtrack exponentially; there is no memoisation.
pub fn pattern_match(pattern: &str, candidate: &str, check_case: bool) -> bool {
    match_bytes(pattern.as_bytes(), candidate.as_bytes(), check_case)
}

fn match_bytes(mut p: &[u8], mut s: &[u8], check_case: bool) -> bool {
    loop {
        let Some((&pc, p_rest)) = p.split_first() else {
            return s.is_empty();
        };

        if pc == MULTIPLE_WILDCARD {
            if p_rest.is_empty() {
                return true;
            }
            // Leftmost first: try every suffix of s, the empty one last.
            return (0..=s.len()).any(|skip| match_bytes(p_rest, &s[skip..], check_case));
        }

        let Some((&sc, s_rest)) = s.split_first() else {
            return false;
        };

        if pc != SINGLE_WILDCARD && !chars_equal(pc, sc, check_case) {
            return false;
        }
        p = p_rest;
        s = s_rest;
    }
}

fn chars_equal(p: u8, s: u8, check_case: bool) -> bool {
    if check_case {
        p == s
    } else {
        p.eq_ignore_ascii_case(&s)
    }
}
