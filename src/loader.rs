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

//! Populate a [`SymbolTable`] from an object file on disk.
//!
//! Sections become regions, symbol-table entries become symbols, symbols of one
//! kind sharing an address become one function or variable, and the file itself
//! becomes a module. Exception tables are not decoded.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};
use memmap2::Mmap;
use object::{Object, ObjectSection, ObjectSymbol, SectionIndex, SectionKind, SymbolKind, SymbolSection};

use crate::aggregates::{ModuleDef, ModuleId};
use crate::memory::{MemoryRegion, RegionId, RegionKind};
use crate::symbols::{SymbolDef, SymbolId, SymbolLinkage, SymbolType};
use crate::symtab::{SymbolTable, TableConfig};
use crate::utils::{canonicalize_path, file_name_of};

/// Load a single object file into a fresh table configured for its container format.
pub fn load_object_file(path: &Path) -> Result<SymbolTable> {
    with_object(path, |obj| {
        let mut table = SymbolTable::with_config(TableConfig::for_format(obj.format()));
        ingest(&mut table, obj, path)?;
        table.finalize();
        Ok(table)
    })
}

/// Add one more object file (a module) to an existing table.
pub fn load_into(table: &mut SymbolTable, path: &Path) -> Result<ModuleId> {
    with_object(path, |obj| {
        let module = ingest(table, obj, path)?;
        table.finalize();
        Ok(module)
    })
}

fn with_object<T>(path: &Path, f: impl FnOnce(&object::File<'_>) -> Result<T>) -> Result<T> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    // SAFETY: the mapping is read-only and dropped before this function returns;
    // nothing we hand out borrows from it.
    let data = unsafe { Mmap::map(&file) }
        .with_context(|| format!("Failed to map {}", path.display()))?;
    let obj = object::File::parse(&*data)
        .with_context(|| format!("Failed to parse object file {}", path.display()))?;
    f(&obj)
}

fn region_kind(kind: SectionKind) -> RegionKind {
    match kind {
        SectionKind::Text => RegionKind::Code,
        SectionKind::Data
        | SectionKind::ReadOnlyData
        | SectionKind::ReadOnlyDataWithRel
        | SectionKind::ReadOnlyString
        | SectionKind::UninitializedData
        | SectionKind::Common
        | SectionKind::Tls
        | SectionKind::UninitializedTls => RegionKind::Data,
        _ => RegionKind::Other,
    }
}

fn symbol_type(kind: SymbolKind) -> SymbolType {
    match kind {
        SymbolKind::Text => SymbolType::Function,
        SymbolKind::Data | SymbolKind::Tls => SymbolType::Object,
        SymbolKind::File => SymbolType::Module,
        _ => SymbolType::NoType,
    }
}

/// Symbols read from the object file, merged across the static and dynamic tables.
struct PendingSymbol {
    def: SymbolDef,
    undefined: bool,
}

fn ingest(table: &mut SymbolTable, obj: &object::File<'_>, path: &Path) -> Result<ModuleId> {
    let full_name = canonicalize_path(&path.to_string_lossy());

    // Base address: lowest allocated section
    let base = obj
        .sections()
        .filter(|s| region_kind(s.kind()) != RegionKind::Other && s.size() > 0)
        .map(|s| s.address())
        .min();

    // The module goes in first so a rejected duplicate leaves the table untouched
    let module = table.add_module(ModuleDef {
        file_name: file_name_of(&full_name).to_string(),
        full_name: full_name.clone(),
        address: base.unwrap_or(0),
    })?;

    // Regions
    let mut regions: HashMap<SectionIndex, RegionId> = HashMap::new();
    for section in obj.sections() {
        let name = match section.name() {
            Ok(name) => name.to_string(),
            Err(e) => {
                warn!("Skipping section {:?} in {}: {}", section.index(), full_name, e);
                continue;
            }
        };
        let id = table.add_region(MemoryRegion::new(
            name,
            section.address(),
            section.size(),
            section.align(),
            region_kind(section.kind()),
        ));
        regions.insert(section.index(), id);
    }

    // Symbols, merged by (name, address) so a symbol in both tables is one entity
    let mut pending: Vec<PendingSymbol> = Vec::new();
    let mut seen: HashMap<(String, u64), usize> = HashMap::new();
    let tables = obj
        .symbols()
        .map(|s| (s, false))
        .chain(obj.dynamic_symbols().map(|s| (s, true)));
    for (sym, dynamic) in tables {
        if sym.kind() == SymbolKind::Section {
            continue;
        }
        let name = match sym.name() {
            Ok("") => continue,
            Ok(name) => name,
            Err(e) => {
                warn!("Skipping unnamed symbol {:?} in {}: {}", sym.index(), full_name, e);
                continue;
            }
        };

        let key = (name.to_string(), sym.address());
        if let Some(&idx) = seen.get(&key) {
            let def = &mut pending[idx].def;
            if dynamic {
                def.in_dynamic_table = true;
            } else {
                def.in_static_table = true;
            }
            continue;
        }

        let linkage = if sym.is_weak() {
            SymbolLinkage::Weak
        } else if sym.is_global() {
            SymbolLinkage::Global
        } else if sym.is_local() {
            SymbolLinkage::Local
        } else {
            SymbolLinkage::Unknown
        };

        let def = SymbolDef {
            linkage,
            size: sym.size(),
            region: sym.section_index().and_then(|idx| regions.get(&idx).copied()),
            module: Some(module),
            in_dynamic_table: dynamic,
            in_static_table: !dynamic,
            is_absolute: matches!(sym.section(), SymbolSection::Absolute),
            ..SymbolDef::new(name, symbol_type(sym.kind()), sym.address())
        };
        seen.insert(key, pending.len());
        pending.push(PendingSymbol {
            def,
            undefined: sym.is_undefined(),
        });
    }

    // Facades group same-kind symbols at one address, in symbol-table order
    let mut functions: BTreeMap<u64, Vec<SymbolId>> = BTreeMap::new();
    let mut variables: BTreeMap<u64, Vec<SymbolId>> = BTreeMap::new();
    let (mut defined, mut undefined) = (0usize, 0usize);
    for PendingSymbol { def, undefined: is_undef } in pending {
        if is_undef {
            table.add_undefined_symbol(def);
            undefined += 1;
            continue;
        }
        let (kind, address) = (def.kind, def.address);
        let id = table.add_symbol(def);
        defined += 1;
        match kind {
            SymbolType::Function => functions.entry(address).or_default().push(id),
            SymbolType::Object => variables.entry(address).or_default().push(id),
            _ => {}
        }
    }
    for members in functions.values() {
        table.add_function(members)?;
    }
    for members in variables.values() {
        table.add_variable(members)?;
    }

    info!(
        "Loaded {} ({:?}): {} regions, {} defined symbols, {} undefined, {} functions, {} variables",
        full_name,
        obj.format(),
        regions.len(),
        defined,
        undefined,
        functions.len(),
        variables.len()
    );
    Ok(module)
}
