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

//! Function, variable and module facades over the symbol arena.
//!
//! A function or variable groups the symbols (aliases, versioned names) that share
//! one address. The facade stores handles, never the symbols themselves.

use serde_json::{json, Value};

use crate::symbols::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FunctionId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub u32);

#[derive(Debug, Clone)]
pub struct Function {
    id: FunctionId,
    address: u64,
    size: u64,
    symbols: Vec<SymbolId>,
}

impl Function {
    pub(crate) fn new(id: FunctionId, address: u64, size: u64, symbols: Vec<SymbolId>) -> Self {
        Self {
            id,
            address,
            size,
            symbols,
        }
    }

    pub fn id(&self) -> FunctionId {
        self.id
    }

    /// Entry address; the key used for address-ordered lookups.
    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.address && addr - self.address < self.size
    }

    /// Member symbols, representative first.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    pub fn to_json(&self, name: &str) -> Value {
        json!({
            "name": name,
            "address": format!("0x{:x}", self.address),
            "size": format!("0x{:x}", self.size),
            "symbols": self.symbols.len(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    id: VariableId,
    offset: u64,
    size: u64,
    symbols: Vec<SymbolId>,
}

impl Variable {
    pub(crate) fn new(id: VariableId, offset: u64, size: u64, symbols: Vec<SymbolId>) -> Self {
        Self {
            id,
            offset,
            size,
            symbols,
        }
    }

    pub fn id(&self) -> VariableId {
        self.id
    }
    pub fn offset(&self) -> u64 {
        self.offset
    }
    pub fn size(&self) -> u64 {
        self.size
    }
    pub fn symbols(&self) -> &[SymbolId] {
        &self.symbols
    }

    pub fn to_json(&self, name: &str) -> Value {
        json!({
            "name": name,
            "offset": format!("0x{:x}", self.offset),
            "size": format!("0x{:x}", self.size),
            "symbols": self.symbols.len(),
        })
    }
}

/// What the parser supplies for a module.
#[derive(Debug, Clone, Default)]
pub struct ModuleDef {
    /// Base name, e.g. `libc.so.6`.
    pub file_name: String,
    /// Path-qualified name.
    pub full_name: String,
    pub address: u64,
}

#[derive(Debug, Clone)]
pub struct Module {
    id: ModuleId,
    file_name: String,
    full_name: String,
    address: u64,
}

impl Module {
    pub(crate) fn from_def(id: ModuleId, def: ModuleDef) -> Self {
        Self {
            id,
            file_name: def.file_name,
            full_name: def.full_name,
            address: def.address,
        }
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
    pub fn full_name(&self) -> &str {
        &self.full_name
    }
    pub fn address(&self) -> u64 {
        self.address
    }

    pub fn to_json(&self) -> Value {
        json!({
            "file_name": self.file_name,
            "full_name": self.full_name,
            "address": format!("0x{:x}", self.address),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_extent_is_half_open() {
        let f = Function::new(FunctionId(0), 0x100, 0x20, vec![SymbolId(4)]);
        assert!(f.contains(0x100));
        assert!(f.contains(0x11f));
        assert!(!f.contains(0x120));
        assert!(!f.contains(0xff));
        assert_eq!(f.symbols(), &[SymbolId(4)]);
    }

    #[test]
    fn module_json_uses_hex_addresses() {
        let m = Module::from_def(
            ModuleId(0),
            ModuleDef {
                file_name: "app".to_string(),
                full_name: "/opt/app".to_string(),
                address: 0x400000,
            },
        );
        let v = m.to_json();
        assert_eq!(v["address"], "0x400000");
        assert_eq!(v["full_name"], "/opt/app");
    }
}
