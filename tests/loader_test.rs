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

use std::path::{Path, PathBuf};

use object::write::{Object as ObjectWriter, StandardSection, Symbol, SymbolSection};
use object::{Architecture, BinaryFormat, Endianness, SymbolFlags, SymbolKind, SymbolScope};
use symtab_lookup::{
    load_into, load_object_file, LookupError, NameQuery, NameType, SymbolLinkage, SymbolTable,
    SymbolType, TableConfig,
};

fn symbol(name: &str, value: u64, size: u64, kind: SymbolKind, section: SymbolSection) -> Symbol {
    Symbol {
        name: name.as_bytes().to_vec(),
        value,
        size,
        kind,
        scope: SymbolScope::Linkage,
        weak: false,
        section,
        flags: SymbolFlags::None,
    }
}

/// Write a small x86-64 ELF relocatable:
/// - `.text` (0x40 bytes): `main` and weak alias `main_alias` at 0, `_Z3addii` at 0x20
/// - `.data` (0x20 bytes): `counter` at 0x8
/// - undefined `printf`
fn write_sample_object(dir: &Path, file_name: &str) -> PathBuf {
    let mut obj = ObjectWriter::new(BinaryFormat::Elf, Architecture::X86_64, Endianness::Little);
    let text = obj.section_id(StandardSection::Text);
    obj.append_section_data(text, &[0xc3; 0x40], 16);
    let data = obj.section_id(StandardSection::Data);
    obj.append_section_data(data, &[0u8; 0x20], 8);

    let text_sec = SymbolSection::Section(text);
    let data_sec = SymbolSection::Section(data);
    obj.add_symbol(symbol("main", 0, 0x10, SymbolKind::Text, text_sec));
    obj.add_symbol(Symbol {
        weak: true,
        ..symbol("main_alias", 0, 0x10, SymbolKind::Text, text_sec)
    });
    obj.add_symbol(symbol("_Z3addii", 0x20, 0x10, SymbolKind::Text, text_sec));
    obj.add_symbol(symbol("counter", 0x8, 4, SymbolKind::Data, data_sec));
    obj.add_symbol(symbol("printf", 0, 0, SymbolKind::Text, SymbolSection::Undefined));

    let path = dir.join(file_name);
    std::fs::write(&path, obj.write().unwrap()).unwrap();
    path
}

fn overlapping_table() -> SymbolTable {
    // Every section of a relocatable object starts at address 0.
    SymbolTable::with_config(TableConfig {
        regions_may_overlap: true,
    })
}

#[test]
fn loads_symbols_functions_and_variables() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample_object(dir.path(), "sample.o");
    let table = load_object_file(&path).expect("Failed to load object");

    assert!(!table.config().regions_may_overlap);

    let main = table
        .find_symbols_by_name(&NameQuery::exact("main").schemes(NameType::Mangled))
        .unwrap();
    assert_eq!(main.len(), 1);
    assert_eq!(main[0].kind(), SymbolType::Function);
    assert_eq!(main[0].linkage(), SymbolLinkage::Global);
    assert!(main[0].in_static_table());
    assert!(!main[0].in_dynamic_table());

    // main and its weak alias are one function.
    let f = table.find_function_by_exact_address(0).unwrap();
    assert_eq!(f.symbols().len(), 2);
    assert_eq!(table.function_name(f), "main");

    let add = table
        .find_functions_by_name(&NameQuery::exact("add").schemes(NameType::Pretty))
        .unwrap();
    assert_eq!(add.len(), 1);
    assert_eq!(add[0].address(), 0x20);
    let typed = table
        .find_symbols_by_name(&NameQuery::exact("add(int, int)").schemes(NameType::Typed))
        .unwrap();
    assert_eq!(typed[0].mangled_name(), "_Z3addii");

    let counter = table.find_variable_by_exact_offset(0x8).unwrap();
    assert_eq!(table.variable_name(counter), "counter");
    assert_eq!(counter.size(), 4);

    let undefined = table.all_undefined_symbols().unwrap();
    assert_eq!(undefined.len(), 1);
    assert_eq!(undefined[0].mangled_name(), "printf");

    let module = table.find_module_by_name("sample.o").unwrap();
    assert!(module.full_name().ends_with("/sample.o"));
    assert_eq!(main[0].module(), Some(module.id()));
}

#[test]
fn regions_come_from_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_sample_object(dir.path(), "sample.o");
    let mut table = overlapping_table();
    load_into(&mut table, &path).unwrap();

    let text = table.find_region_by_name(".text").unwrap();
    assert_eq!(text.size, 0x40);
    assert_eq!(table.find_region_by_name(".data").unwrap().size, 0x20);

    // Code wins over data when both start at 0.
    assert_eq!(table.find_enclosing_region(0x10).unwrap().name, ".text");
    assert_eq!(table.find_nearest_function(0x28).unwrap().address(), 0x20);
    assert!(matches!(
        table.find_nearest_function(0x40),
        Err(LookupError::InvalidQuery(_))
    ));

    let main = table
        .find_symbols_by_name(&NameQuery::exact("main"))
        .unwrap();
    let region = main[0].region().and_then(|id| table.region(id)).unwrap();
    assert_eq!(region.name, ".text");
}

#[test]
fn modules_accumulate_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_sample_object(dir.path(), "first.o");
    let second = write_sample_object(dir.path(), "second.o");

    let mut table = overlapping_table();
    load_into(&mut table, &first).unwrap();
    load_into(&mut table, &second).unwrap();

    assert_eq!(table.all_modules().unwrap().len(), 2);
    let mains = table
        .find_symbols_by_name(&NameQuery::exact("main").schemes(NameType::Mangled))
        .unwrap();
    assert_eq!(mains.len(), 2);
    assert_ne!(mains[0].module(), mains[1].module());

    // The same file cannot be loaded twice.
    assert!(load_into(&mut table, &first).is_err());
}
