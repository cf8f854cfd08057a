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

//! Name → symbol maps, one per name scheme, queried together.

use std::collections::HashMap;

use crate::errors::{LookupError, MissReason};
use crate::pattern::pattern_match;
use crate::symbols::{NameType, NameTypes, Symbol, SymbolId, SymbolType};

/// A name query against one or more name schemes.
#[derive(Debug, Clone, Copy)]
pub struct NameQuery<'a> {
    pub name: &'a str,
    pub schemes: NameTypes,
    /// `SymbolType::Unknown` means any kind.
    pub kind: SymbolType,
    /// Treat `name` as a `*`/`?` wildcard pattern.
    pub is_pattern: bool,
    /// Only consulted for patterns; exact lookups always compare bytes.
    pub check_case: bool,
}

impl<'a> NameQuery<'a> {
    /// Exact lookup of `name` in every scheme, any kind.
    pub fn exact(name: &'a str) -> Self {
        Self {
            name,
            schemes: NameTypes::ANY,
            kind: SymbolType::Unknown,
            is_pattern: false,
            check_case: true,
        }
    }

    /// Case-insensitive wildcard lookup in every scheme, any kind.
    pub fn pattern(pattern: &'a str) -> Self {
        Self {
            is_pattern: true,
            check_case: false,
            ..Self::exact(pattern)
        }
    }

    pub fn schemes(mut self, schemes: impl Into<NameTypes>) -> Self {
        self.schemes = schemes.into();
        self
    }

    pub fn kind(mut self, kind: SymbolType) -> Self {
        self.kind = kind;
        self
    }

    pub fn check_case(mut self, check_case: bool) -> Self {
        self.check_case = check_case;
        self
    }
}

#[derive(Default)]
pub struct NameIndex {
    by_mangled: HashMap<String, Vec<SymbolId>>,
    by_pretty: HashMap<String, Vec<SymbolId>>,
    by_typed: HashMap<String, Vec<SymbolId>>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, which: NameType) -> &HashMap<String, Vec<SymbolId>> {
        match which {
            NameType::Mangled => &self.by_mangled,
            NameType::Pretty => &self.by_pretty,
            NameType::Typed => &self.by_typed,
        }
    }

    fn map_mut(&mut self, which: NameType) -> &mut HashMap<String, Vec<SymbolId>> {
        match which {
            NameType::Mangled => &mut self.by_mangled,
            NameType::Pretty => &mut self.by_pretty,
            NameType::Typed => &mut self.by_typed,
        }
    }

    /// Register `sym` under each of its non-empty names.
    pub fn insert(&mut self, sym: &Symbol) {
        for which in NameType::ALL {
            let name = sym.name(which);
            if name.is_empty() {
                continue;
            }
            let bucket = self.map_mut(which).entry(name.to_string()).or_default();
            if !bucket.contains(&sym.id()) {
                bucket.push(sym.id());
            }
        }
    }

    /// Symbols registered under exactly `name` in scheme `which`.
    pub fn lookup(&self, which: NameType, name: &str) -> &[SymbolId] {
        self.map(which).get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct names known in scheme `which`.
    pub fn name_count(&self, which: NameType) -> usize {
        self.map(which).len()
    }

    /// Run `query`. Exact queries hit the maps; pattern queries test every symbol in
    /// `defined` against the pattern, once per requested scheme. `symbols` is the
    /// arena the handles point into.
    ///
    /// Results are ordered by handle with duplicates removed.
    pub fn find(
        &self,
        query: &NameQuery<'_>,
        symbols: &[Symbol],
        defined: &[SymbolId],
    ) -> Result<Vec<SymbolId>, LookupError> {
        let mut hits: Vec<SymbolId> = Vec::new();

        if query.is_pattern {
            for &id in defined {
                let Some(sym) = symbols.get(id.0 as usize) else {
                    continue;
                };
                for which in query.schemes.iter() {
                    let name = sym.name(which);
                    if !name.is_empty() && pattern_match(query.name, name, query.check_case) {
                        hits.push(id);
                    }
                }
            }
        } else {
            for which in query.schemes.iter() {
                hits.extend_from_slice(self.lookup(which, query.name));
            }
        }

        if hits.is_empty() {
            let reason = if defined.is_empty() {
                MissReason::EmptyTable
            } else {
                MissReason::NoNameMatch
            };
            return Err(LookupError::NoSuchSymbol(reason));
        }

        hits.retain(|id| {
            symbols
                .get(id.0 as usize)
                .is_some_and(|sym| sym.is_kind(query.kind))
        });
        if hits.is_empty() {
            return Err(LookupError::NoSuchSymbol(MissReason::FilteredByKind));
        }

        hits.sort_unstable();
        hits.dedup();
        Ok(hits)
    }
}
