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

use serde_json::{json, Value};

use crate::aggregates::{FunctionId, ModuleId, VariableId};
use crate::memory::RegionId;

/// Handle of a symbol inside its table. Handles are handed out in insertion order,
/// which is also the identity order used when deduplicating query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SymbolType {
    /// Also the "any kind" filter value in queries.
    #[default]
    Unknown,
    Function,
    Object,
    Module,
    NoType,
}

impl SymbolType {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolType::Unknown => "ST_UNKNOWN",
            SymbolType::Function => "ST_FUNCTION",
            SymbolType::Object => "ST_OBJECT",
            SymbolType::Module => "ST_MODULE",
            SymbolType::NoType => "ST_NOTYPE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SymbolLinkage {
    #[default]
    Unknown,
    Global,
    Local,
    Weak,
}

impl SymbolLinkage {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolLinkage::Unknown => "SL_UNKNOWN",
            SymbolLinkage::Global => "SL_GLOBAL",
            SymbolLinkage::Local => "SL_LOCAL",
            SymbolLinkage::Weak => "SL_WEAK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SymbolTag {
    #[default]
    Unknown,
    User,
    Library,
    Internal,
}

impl SymbolTag {
    pub fn as_str(self) -> &'static str {
        match self {
            SymbolTag::Unknown => "TAG_UNKNOWN",
            SymbolTag::User => "TAG_USER",
            SymbolTag::Library => "TAG_LIBRARY",
            SymbolTag::Internal => "TAG_INTERNAL",
        }
    }
}

/// One of the three textual forms a symbol is known by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameType {
    /// Raw linker-level name.
    Mangled,
    /// Demangled, without parameter list or version suffix.
    Pretty,
    /// Demangled with signature.
    Typed,
}

impl NameType {
    pub const ALL: [NameType; 3] = [NameType::Mangled, NameType::Pretty, NameType::Typed];

    fn bit(self) -> u8 {
        match self {
            NameType::Mangled => 0b001,
            NameType::Pretty => 0b010,
            NameType::Typed => 0b100,
        }
    }
}

/// A non-empty set of name schemes to search. There is no way to build an empty
/// set, so every name query searches at least one map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NameTypes(u8);

impl NameTypes {
    pub const MANGLED: NameTypes = NameTypes(0b001);
    pub const PRETTY: NameTypes = NameTypes(0b010);
    pub const TYPED: NameTypes = NameTypes(0b100);
    pub const ANY: NameTypes = NameTypes(0b111);

    pub fn only(which: NameType) -> Self {
        NameTypes(which.bit())
    }

    pub fn with(self, which: NameType) -> Self {
        NameTypes(self.0 | which.bit())
    }

    pub fn contains(self, which: NameType) -> bool {
        self.0 & which.bit() != 0
    }

    /// Selected schemes in mangled, pretty, typed order.
    pub fn iter(self) -> impl Iterator<Item = NameType> {
        NameType::ALL.into_iter().filter(move |&t| self.contains(t))
    }
}

impl From<NameType> for NameTypes {
    fn from(which: NameType) -> Self {
        NameTypes::only(which)
    }
}

/// Everything the object-file parser knows about a symbol when it hands it over.
/// Pretty and typed names are derived from the mangled name when left `None`.
#[derive(Debug, Clone, Default)]
pub struct SymbolDef {
    pub mangled_name: String,
    pub pretty_name: Option<String>,
    pub typed_name: Option<String>,
    pub kind: SymbolType,
    pub linkage: SymbolLinkage,
    pub tag: SymbolTag,
    pub address: u64,
    pub size: u64,
    pub region: Option<RegionId>,
    pub module: Option<ModuleId>,
    pub in_dynamic_table: bool,
    pub in_static_table: bool,
    pub is_absolute: bool,
}

impl SymbolDef {
    pub fn new(mangled_name: impl Into<String>, kind: SymbolType, address: u64) -> Self {
        Self {
            mangled_name: mangled_name.into(),
            kind,
            address,
            in_static_table: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    id: SymbolId,
    mangled_name: String,
    pretty_name: String,
    typed_name: String,
    kind: SymbolType,
    linkage: SymbolLinkage,
    tag: SymbolTag,
    address: u64,
    size: u64,
    region: Option<RegionId>,
    module: Option<ModuleId>,
    in_dynamic_table: bool,
    in_static_table: bool,
    is_absolute: bool,
    // Non-owning links to the facades this symbol belongs to
    pub(crate) function: Option<FunctionId>,
    pub(crate) variable: Option<VariableId>,
}

impl Symbol {
    pub(crate) fn from_def(id: SymbolId, def: SymbolDef) -> Self {
        let (pretty, typed) = match (def.pretty_name, def.typed_name) {
            (Some(pretty), Some(typed)) => (pretty, typed),
            (pretty, typed) => {
                let derived = crate::demangle::derive_names(&def.mangled_name);
                (
                    pretty.unwrap_or(derived.pretty),
                    typed.unwrap_or(derived.typed),
                )
            }
        };
        Self {
            id,
            mangled_name: def.mangled_name,
            pretty_name: pretty,
            typed_name: typed,
            kind: def.kind,
            linkage: def.linkage,
            tag: def.tag,
            address: def.address,
            size: def.size,
            region: def.region,
            module: def.module,
            in_dynamic_table: def.in_dynamic_table,
            in_static_table: def.in_static_table,
            is_absolute: def.is_absolute,
            function: None,
            variable: None,
        }
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }
    pub fn mangled_name(&self) -> &str {
        &self.mangled_name
    }
    pub fn pretty_name(&self) -> &str {
        &self.pretty_name
    }
    pub fn typed_name(&self) -> &str {
        &self.typed_name
    }

    pub fn name(&self, which: NameType) -> &str {
        match which {
            NameType::Mangled => &self.mangled_name,
            NameType::Pretty => &self.pretty_name,
            NameType::Typed => &self.typed_name,
        }
    }

    pub fn kind(&self) -> SymbolType {
        self.kind
    }
    pub fn linkage(&self) -> SymbolLinkage {
        self.linkage
    }
    pub fn tag(&self) -> SymbolTag {
        self.tag
    }
    pub fn address(&self) -> u64 {
        self.address
    }
    pub fn size(&self) -> u64 {
        self.size
    }
    pub fn region(&self) -> Option<RegionId> {
        self.region
    }
    pub fn module(&self) -> Option<ModuleId> {
        self.module
    }
    pub fn in_dynamic_table(&self) -> bool {
        self.in_dynamic_table
    }
    pub fn in_static_table(&self) -> bool {
        self.in_static_table
    }
    pub fn is_absolute(&self) -> bool {
        self.is_absolute
    }
    pub fn function(&self) -> Option<FunctionId> {
        self.function
    }
    pub fn variable(&self) -> Option<VariableId> {
        self.variable
    }

    /// Whether `kind` passes a query filter; `Unknown` lets everything through.
    pub fn is_kind(&self, kind: SymbolType) -> bool {
        kind == SymbolType::Unknown || self.kind == kind
    }

    pub fn to_json(&self) -> Value {
        json!({
            "mangled": self.mangled_name,
            "pretty": self.pretty_name,
            "typed": self.typed_name,
            "kind": self.kind.as_str(),
            "linkage": self.linkage.as_str(),
            "address": format!("0x{:x}", self.address),
            "size": format!("0x{:x}", self.size),
            "dynamic": self.in_dynamic_table,
            "static": self.in_static_table,
            "absolute": self.is_absolute,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_type_sets_are_never_empty() {
        let set = NameTypes::only(NameType::Pretty);
        assert!(set.contains(NameType::Pretty));
        assert!(!set.contains(NameType::Mangled));
        assert_eq!(set.iter().count(), 1);

        let both = set.with(NameType::Mangled);
        assert_eq!(
            both.iter().collect::<Vec<_>>(),
            vec![NameType::Mangled, NameType::Pretty]
        );
        assert_eq!(NameTypes::ANY.iter().count(), 3);
    }

    #[test]
    fn explicit_names_are_kept() {
        let def = SymbolDef {
            pretty_name: Some("pretty".to_string()),
            typed_name: Some("typed(int)".to_string()),
            ..SymbolDef::new("_Zraw", SymbolType::Function, 0x40)
        };
        let sym = Symbol::from_def(SymbolId(7), def);
        assert_eq!(sym.id(), SymbolId(7));
        assert_eq!(sym.name(NameType::Mangled), "_Zraw");
        assert_eq!(sym.name(NameType::Pretty), "pretty");
        assert_eq!(sym.name(NameType::Typed), "typed(int)");
        assert!(sym.in_static_table());
        assert!(sym.function().is_none());
    }

    #[test]
    fn versioned_names_derive_a_shared_pretty_name() {
        let v1 = Symbol::from_def(SymbolId(0), SymbolDef::new("foo@V1", SymbolType::Function, 0));
        let v2 = Symbol::from_def(SymbolId(1), SymbolDef::new("foo@@V2", SymbolType::Function, 0));
        assert_eq!(v1.pretty_name(), "foo");
        assert_eq!(v2.pretty_name(), "foo");
        assert_eq!(v1.mangled_name(), "foo@V1");
    }

    #[test]
    fn unknown_kind_filter_passes_everything() {
        let sym = Symbol::from_def(SymbolId(0), SymbolDef::new("x", SymbolType::Object, 0));
        assert!(sym.is_kind(SymbolType::Unknown));
        assert!(sym.is_kind(SymbolType::Object));
        assert!(!sym.is_kind(SymbolType::Function));
        assert_eq!(sym.kind().as_str(), "ST_OBJECT");
    }
}
