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

//! The symbol table: entity arenas plus every index built over them.
//!
//! Population goes through the `add_*` methods (`&mut self`), queries through
//! `&self`. Address indices sort themselves on the first query after an append;
//! the exception table is sorted once by [`SymbolTable::finalize`].

use std::collections::{BTreeMap, HashMap};

use log::debug;
use object::BinaryFormat;
use serde::{Deserialize, Serialize};

use crate::address_index::AddressIndex;
use crate::aggregates::{Function, FunctionId, Module, ModuleDef, ModuleId, Variable, VariableId};
use crate::errors::{LoadError, LookupError, MissReason};
use crate::exceptions::{ExceptionBlock, ExceptionTable};
use crate::memory::{MemoryRegion, RegionId, RegionIndex};
use crate::name_index::{NameIndex, NameQuery};
use crate::symbols::{Symbol, SymbolDef, SymbolId, SymbolType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Regions may overlap (several sections at address 0), so enclosing-region
    /// queries scan instead of binary searching.
    pub regions_may_overlap: bool,
}

impl TableConfig {
    /// XCOFF places loadable sections at address 0; everything else keeps regions
    /// disjoint.
    pub fn for_format(format: BinaryFormat) -> Self {
        Self {
            regions_may_overlap: format == BinaryFormat::Xcoff,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Facade {
    Function,
    Variable,
}

impl Facade {
    fn as_str(self) -> &'static str {
        match self {
            Facade::Function => "function",
            Facade::Variable => "variable",
        }
    }
}

pub struct SymbolTable {
    config: TableConfig,
    symbols: Vec<Symbol>,
    defined: Vec<SymbolId>,
    // Keyed by mangled name
    undefined: BTreeMap<String, Vec<SymbolId>>,
    names: NameIndex,
    functions: Vec<Function>,
    function_index: AddressIndex<FunctionId>,
    variables: Vec<Variable>,
    variables_by_offset: HashMap<u64, VariableId>,
    modules: Vec<Module>,
    modules_by_file_name: HashMap<String, ModuleId>,
    modules_by_full_name: HashMap<String, ModuleId>,
    regions: RegionIndex,
    exceptions: ExceptionTable,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::with_config(TableConfig::default())
    }

    pub fn with_config(config: TableConfig) -> Self {
        Self {
            config,
            symbols: Vec::new(),
            defined: Vec::new(),
            undefined: BTreeMap::new(),
            names: NameIndex::new(),
            functions: Vec::new(),
            function_index: AddressIndex::new("functions"),
            variables: Vec::new(),
            variables_by_offset: HashMap::new(),
            modules: Vec::new(),
            modules_by_file_name: HashMap::new(),
            modules_by_full_name: HashMap::new(),
            regions: RegionIndex::new(config.regions_may_overlap),
            exceptions: ExceptionTable::new(),
        }
    }

    pub fn config(&self) -> TableConfig {
        self.config
    }

    // ---------------------------------------------------------------------
    // Population
    // ---------------------------------------------------------------------

    fn push_symbol(&mut self, def: SymbolDef) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol::from_def(id, def));
        id
    }

    /// Add a defined symbol and register it under all of its names.
    pub fn add_symbol(&mut self, def: SymbolDef) -> SymbolId {
        let id = self.push_symbol(def);
        self.names.insert(&self.symbols[id.0 as usize]);
        self.defined.push(id);
        id
    }

    /// Add an undefined (imported) symbol. These only show up in the all-symbols
    /// listings, never in name queries.
    pub fn add_undefined_symbol(&mut self, def: SymbolDef) -> SymbolId {
        let name = def.mangled_name.clone();
        let id = self.push_symbol(def);
        self.undefined.entry(name).or_default().push(id);
        id
    }

    /// Validate the members of a new facade and return its representative extent.
    fn check_members(&self, members: &[SymbolId], facade: Facade) -> Result<(u64, u64), LoadError> {
        let first = *members.first().ok_or(LoadError::EmptyAggregate)?;
        let head = self.symbol(first).ok_or(LoadError::UnknownSymbol(first))?;
        for &id in members {
            let sym = self.symbol(id).ok_or(LoadError::UnknownSymbol(id))?;
            if sym.address() != head.address() {
                return Err(LoadError::AddressMismatch {
                    symbol: id,
                    expected: head.address(),
                    found: sym.address(),
                });
            }
            let linked = match facade {
                Facade::Function => sym.function.is_some(),
                Facade::Variable => sym.variable.is_some(),
            };
            if linked {
                return Err(LoadError::AlreadyAssociated(id, facade.as_str()));
            }
        }
        Ok((head.address(), head.size()))
    }

    fn dedup_members(members: &[SymbolId]) -> Vec<SymbolId> {
        let mut out: Vec<SymbolId> = Vec::with_capacity(members.len());
        for &id in members {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }

    /// Group symbols sharing one address into a function. The first symbol is the
    /// representative.
    pub fn add_function(&mut self, members: &[SymbolId]) -> Result<FunctionId, LoadError> {
        let members = Self::dedup_members(members);
        let (address, size) = self.check_members(&members, Facade::Function)?;
        let id = FunctionId(self.functions.len() as u32);
        for sym in &members {
            self.symbols[sym.0 as usize].function = Some(id);
        }
        self.functions.push(Function::new(id, address, size, members));
        self.function_index.insert(address, size, id);
        Ok(id)
    }

    pub fn add_variable(&mut self, members: &[SymbolId]) -> Result<VariableId, LoadError> {
        let members = Self::dedup_members(members);
        let (offset, size) = self.check_members(&members, Facade::Variable)?;
        let id = VariableId(self.variables.len() as u32);
        for sym in &members {
            self.symbols[sym.0 as usize].variable = Some(id);
        }
        self.variables.push(Variable::new(id, offset, size, members));
        self.variables_by_offset.entry(offset).or_insert(id);
        Ok(id)
    }

    /// Add a module. File names and full names must each be unique.
    pub fn add_module(&mut self, def: ModuleDef) -> Result<ModuleId, LoadError> {
        if self.modules_by_file_name.contains_key(&def.file_name) {
            return Err(LoadError::DuplicateModule(def.file_name));
        }
        if self.modules_by_full_name.contains_key(&def.full_name) {
            return Err(LoadError::DuplicateModule(def.full_name));
        }
        let id = ModuleId(self.modules.len() as u32);
        self.modules_by_file_name.insert(def.file_name.clone(), id);
        self.modules_by_full_name.insert(def.full_name.clone(), id);
        self.modules.push(Module::from_def(id, def));
        Ok(id)
    }

    pub fn add_region(&mut self, region: MemoryRegion) -> RegionId {
        self.regions.insert(region)
    }

    /// Queue an exception block. Catch-block queries fail until `finalize` runs.
    pub fn add_exception_block(&mut self, block: ExceptionBlock) {
        self.exceptions.push(block);
    }

    /// End of a bulk load: sort the exception table and build the address indices.
    pub fn finalize(&mut self) {
        self.exceptions.finalize();
        self.function_index.sorted();
        self.regions.build();
        debug!(
            "Symbol table finalized: {} symbols ({} undefined), {} functions, {} variables, {} modules, {} regions, {} exception blocks",
            self.symbols.len(),
            self.symbols.len() - self.defined.len(),
            self.functions.len(),
            self.variables.len(),
            self.modules.len(),
            self.regions.len(),
            self.exceptions.blocks().len()
        );
    }

    // ---------------------------------------------------------------------
    // Handle resolution
    // ---------------------------------------------------------------------

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0 as usize)
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.0 as usize)
    }

    pub fn variable(&self, id: VariableId) -> Option<&Variable> {
        self.variables.get(id.0 as usize)
    }

    pub fn module(&self, id: ModuleId) -> Option<&Module> {
        self.modules.get(id.0 as usize)
    }

    pub fn region(&self, id: RegionId) -> Option<&MemoryRegion> {
        self.regions.get(id)
    }

    /// Pretty name of the representative symbol of a function.
    pub fn function_name(&self, func: &Function) -> &str {
        func.symbols()
            .first()
            .and_then(|&id| self.symbol(id))
            .map(Symbol::pretty_name)
            .unwrap_or("")
    }

    pub fn variable_name(&self, var: &Variable) -> &str {
        var.symbols()
            .first()
            .and_then(|&id| self.symbol(id))
            .map(Symbol::pretty_name)
            .unwrap_or("")
    }

    fn resolve_symbols(&self, ids: &[SymbolId]) -> Vec<&Symbol> {
        ids.iter().filter_map(|&id| self.symbol(id)).collect()
    }

    // ---------------------------------------------------------------------
    // Symbols
    // ---------------------------------------------------------------------

    /// Symbols matching `query`, ordered by handle, without duplicates.
    pub fn find_symbols_by_name(&self, query: &NameQuery<'_>) -> Result<Vec<&Symbol>, LookupError> {
        let ids = self.names.find(query, &self.symbols, &self.defined)?;
        Ok(self.resolve_symbols(&ids))
    }

    /// Defined symbols followed by undefined ones.
    pub fn all_symbols(&self) -> Result<Vec<&Symbol>, LookupError> {
        let mut out = self.resolve_symbols(&self.defined);
        out.extend(self.undefined_ids().filter_map(|id| self.symbol(id)));
        if out.is_empty() {
            return Err(LookupError::NoSuchSymbol(MissReason::EmptyTable));
        }
        Ok(out)
    }

    pub fn all_symbols_of_kind(&self, kind: SymbolType) -> Result<Vec<&Symbol>, LookupError> {
        if kind == SymbolType::Unknown {
            return self.all_symbols();
        }
        let out: Vec<&Symbol> = self
            .all_symbols()?
            .into_iter()
            .filter(|sym| sym.kind() == kind)
            .collect();
        if out.is_empty() {
            return Err(LookupError::NoSuchSymbol(MissReason::FilteredByKind));
        }
        Ok(out)
    }

    pub fn all_defined_symbols(&self) -> Result<Vec<&Symbol>, LookupError> {
        if self.defined.is_empty() {
            return Err(LookupError::NoSuchSymbol(MissReason::EmptyTable));
        }
        Ok(self.resolve_symbols(&self.defined))
    }

    pub fn all_undefined_symbols(&self) -> Result<Vec<&Symbol>, LookupError> {
        let out: Vec<&Symbol> = self.undefined_ids().filter_map(|id| self.symbol(id)).collect();
        if out.is_empty() {
            return Err(LookupError::NoSuchSymbol(MissReason::EmptyTable));
        }
        Ok(out)
    }

    fn undefined_ids(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.undefined.values().flatten().copied()
    }

    // ---------------------------------------------------------------------
    // Functions and variables
    // ---------------------------------------------------------------------

    /// Functions owning a function symbol that matches `query`. The query's kind
    /// filter is replaced by `SymbolType::Function`.
    pub fn find_functions_by_name(&self, query: &NameQuery<'_>) -> Result<Vec<&Function>, LookupError> {
        let query = query.kind(SymbolType::Function);
        let ids = self
            .names
            .find(&query, &self.symbols, &self.defined)
            .map_err(|_| LookupError::NoSuchFunction)?;
        let mut funcs: Vec<FunctionId> = ids
            .iter()
            .filter_map(|&id| self.symbol(id).and_then(Symbol::function))
            .collect();
        funcs.sort_unstable();
        funcs.dedup();
        if funcs.is_empty() {
            return Err(LookupError::NoSuchFunction);
        }
        Ok(funcs.into_iter().filter_map(|id| self.function(id)).collect())
    }

    /// Variables owning an object symbol that matches `query`.
    pub fn find_variables_by_name(&self, query: &NameQuery<'_>) -> Result<Vec<&Variable>, LookupError> {
        let query = query.kind(SymbolType::Object);
        let ids = self
            .names
            .find(&query, &self.symbols, &self.defined)
            .map_err(|_| LookupError::NoSuchVariable)?;
        let mut vars: Vec<VariableId> = ids
            .iter()
            .filter_map(|&id| self.symbol(id).and_then(Symbol::variable))
            .collect();
        vars.sort_unstable();
        vars.dedup();
        if vars.is_empty() {
            return Err(LookupError::NoSuchVariable);
        }
        Ok(vars.into_iter().filter_map(|id| self.variable(id)).collect())
    }

    pub fn all_functions(&self) -> Result<&[Function], LookupError> {
        if self.functions.is_empty() {
            return Err(LookupError::NoSuchFunction);
        }
        Ok(&self.functions)
    }

    pub fn all_variables(&self) -> Result<&[Variable], LookupError> {
        if self.variables.is_empty() {
            return Err(LookupError::NoSuchVariable);
        }
        Ok(&self.variables)
    }

    pub fn find_function_by_exact_address(&self, addr: u64) -> Result<&Function, LookupError> {
        self.function_index
            .find_exact(addr)
            .and_then(|id| self.function(id))
            .ok_or(LookupError::NoSuchFunction)
    }

    /// The function with the greatest entry address not above `addr`.
    ///
    /// `addr` has to be inside a code region. The function's size is not checked, so
    /// an address past the end of the last function before it still resolves to that
    /// function; callers that care must check [`Function::contains`] themselves.
    pub fn find_nearest_function(&self, addr: u64) -> Result<&Function, LookupError> {
        if !self.regions.is_code(addr) {
            return Err(LookupError::InvalidQuery(format!(
                "0x{:x} is not in a code region",
                addr
            )));
        }
        self.function_index
            .find_nearest_at_or_below(addr)
            .and_then(|id| self.function(id))
            .ok_or(LookupError::NoSuchFunction)
    }

    pub fn find_variable_by_exact_offset(&self, offset: u64) -> Result<&Variable, LookupError> {
        self.variables_by_offset
            .get(&offset)
            .and_then(|&id| self.variable(id))
            .ok_or(LookupError::NoSuchVariable)
    }

    // ---------------------------------------------------------------------
    // Modules
    // ---------------------------------------------------------------------

    /// Match against file names first, then full names.
    pub fn find_module_by_name(&self, name: &str) -> Result<&Module, LookupError> {
        self.modules_by_file_name
            .get(name)
            .or_else(|| self.modules_by_full_name.get(name))
            .and_then(|&id| self.module(id))
            .ok_or(LookupError::NoSuchModule)
    }

    pub fn find_module_by_address(&self, addr: u64) -> Result<&Module, LookupError> {
        self.modules
            .iter()
            .find(|m| m.address() == addr)
            .ok_or(LookupError::NoSuchModule)
    }

    pub fn all_modules(&self) -> Result<&[Module], LookupError> {
        if self.modules.is_empty() {
            return Err(LookupError::NoSuchModule);
        }
        Ok(&self.modules)
    }

    // ---------------------------------------------------------------------
    // Regions
    // ---------------------------------------------------------------------

    pub fn find_enclosing_region(&self, addr: u64) -> Result<&MemoryRegion, LookupError> {
        self.regions
            .find_enclosing(addr)
            .and_then(|id| self.region(id))
            .ok_or(LookupError::NoSuchRegion)
    }

    pub fn find_region_by_name(&self, name: &str) -> Result<&MemoryRegion, LookupError> {
        self.regions
            .find_by_name(name)
            .and_then(|id| self.region(id))
            .ok_or(LookupError::NoSuchRegion)
    }

    pub fn find_region_by_entry(&self, addr: u64) -> Result<&MemoryRegion, LookupError> {
        self.regions
            .find_by_entry(addr)
            .and_then(|id| self.region(id))
            .ok_or(LookupError::NoSuchRegion)
    }

    pub fn is_code(&self, addr: u64) -> bool {
        self.regions.is_code(addr)
    }

    pub fn is_data(&self, addr: u64) -> bool {
        self.regions.is_data(addr)
    }

    fn collect_regions(
        &self,
        ids: impl Iterator<Item = RegionId>,
    ) -> Result<Vec<&MemoryRegion>, LookupError> {
        let out: Vec<&MemoryRegion> = ids.filter_map(|id| self.region(id)).collect();
        if out.is_empty() {
            return Err(LookupError::NoSuchRegion);
        }
        Ok(out)
    }

    pub fn all_regions(&self) -> Result<Vec<&MemoryRegion>, LookupError> {
        self.collect_regions(self.regions.all())
    }

    pub fn code_regions(&self) -> Result<Vec<&MemoryRegion>, LookupError> {
        self.collect_regions(self.regions.code_regions())
    }

    pub fn data_regions(&self) -> Result<Vec<&MemoryRegion>, LookupError> {
        self.collect_regions(self.regions.data_regions())
    }

    // ---------------------------------------------------------------------
    // Exceptions
    // ---------------------------------------------------------------------

    /// Block whose handler range overlaps `[addr, addr + size)`, or starts exactly at
    /// `addr` when `size` is zero.
    pub fn find_catch_block(&self, addr: u64, size: u64) -> Result<&ExceptionBlock, LookupError> {
        self.exceptions.find_catch_block(addr, size)
    }

    /// Block whose try range contains `addr`.
    pub fn find_exception(&self, addr: u64) -> Result<&ExceptionBlock, LookupError> {
        self.exceptions
            .find_containing(addr)
            .ok_or(LookupError::NoSuchException)
    }

    pub fn all_exceptions(&self) -> Result<&[ExceptionBlock], LookupError> {
        let blocks = self.exceptions.blocks();
        if blocks.is_empty() {
            return Err(LookupError::NoSuchException);
        }
        Ok(blocks)
    }
}
