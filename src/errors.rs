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

//! Error taxonomy for lookups and for bulk population.
//!
//! Lookups report misses as values. Nothing here is retried or logged by the
//! table itself; the caller decides what a miss means.

use crate::symbols::SymbolId;
use thiserror::Error;

/// Why a name query came back empty. All reasons render the same way to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// There were no symbols to search at all.
    EmptyTable,
    /// No symbol carried a matching name in any requested scheme.
    NoNameMatch,
    /// Names matched, but every hit was dropped by the symbol-kind filter.
    FilteredByKind,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("no such symbol")]
    NoSuchSymbol(MissReason),

    #[error("no such function")]
    NoSuchFunction,

    #[error("no such variable")]
    NoSuchVariable,

    #[error("no such module")]
    NoSuchModule,

    #[error("no such region")]
    NoSuchRegion,

    #[error("no such exception block")]
    NoSuchException,

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A query ran before the table was finalized. Indicates a loader bug.
    #[error("index not built")]
    IndexNotBuilt,
}

impl LookupError {
    /// True for the plain "query ran, nothing matched" outcomes.
    pub fn is_not_found(&self) -> bool {
        !matches!(self, LookupError::InvalidQuery(_) | LookupError::IndexNotBuilt)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("unknown symbol handle {0:?}")]
    UnknownSymbol(SymbolId),

    #[error("a function or variable needs at least one symbol")]
    EmptyAggregate,

    #[error("symbol {symbol:?} is at 0x{found:x}, expected 0x{expected:x}")]
    AddressMismatch {
        symbol: SymbolId,
        expected: u64,
        found: u64,
    },

    #[error("symbol {0:?} already belongs to another {1}")]
    AlreadyAssociated(SymbolId, &'static str),

    #[error("module {0} already exists")]
    DuplicateModule(String),
}
