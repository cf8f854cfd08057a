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

use symtab_lookup::{
    ExceptionBlock, LookupError, MemoryRegion, MissReason, ModuleDef, NameQuery, NameType,
    RegionKind, SymbolDef, SymbolTable, SymbolType, TableConfig,
};

fn code_region(table: &mut SymbolTable, start: u64, size: u64) {
    table.add_region(MemoryRegion::new(
        ".text".to_string(),
        start,
        size,
        16,
        RegionKind::Code,
    ));
}

fn add_function(table: &mut SymbolTable, name: &str, addr: u64, size: u64) {
    let def = SymbolDef {
        size,
        ..SymbolDef::new(name, SymbolType::Function, addr)
    };
    let sym = table.add_symbol(def);
    table.add_function(&[sym]).unwrap();
}

#[test]
fn every_inserted_name_is_found_exactly_once() {
    let mut table = SymbolTable::new();
    table.add_undefined_symbol(SymbolDef::new("puts", SymbolType::Function, 0));

    let names: Vec<String> = (0..50).map(|i| format!("sym_{:03}", i)).collect();
    for (i, name) in names.iter().enumerate() {
        table.add_symbol(SymbolDef::new(name.as_str(), SymbolType::Object, 0x1000 + i as u64 * 8));
    }

    for name in &names {
        let query = NameQuery::exact(name).schemes(NameType::Mangled);
        let found = table.find_symbols_by_name(&query).unwrap();
        assert_eq!(found.len(), 1, "{}", name);
        assert_eq!(found[0].mangled_name(), name.as_str());
    }

    let all = table.all_symbols().unwrap();
    assert_eq!(all.len(), names.len() + 1);
    // Defined symbols come first.
    assert_eq!(all.last().unwrap().mangled_name(), "puts");

    // Undefined symbols are not reachable by name.
    assert_eq!(
        table
            .find_symbols_by_name(&NameQuery::exact("puts"))
            .unwrap_err(),
        LookupError::NoSuchSymbol(MissReason::NoNameMatch)
    );
}

#[test]
fn versioned_aliases_share_a_pretty_name() {
    let mut table = SymbolTable::new();
    let v1 = table.add_symbol(SymbolDef::new("foo@V1", SymbolType::Function, 0x10));
    let v2 = table.add_symbol(SymbolDef::new("foo@V2", SymbolType::Function, 0x10));

    let exact = NameQuery::exact("foo").schemes(NameType::Pretty);
    let ids: Vec<_> = table
        .find_symbols_by_name(&exact)
        .unwrap()
        .iter()
        .map(|s| s.id())
        .collect();
    assert_eq!(ids, vec![v1, v2]);

    let pattern = NameQuery::pattern("fo?").schemes(NameType::Pretty);
    assert_eq!(table.find_symbols_by_name(&pattern).unwrap().len(), 2);

    let wrong_case = NameQuery::exact("FOO")
        .schemes(NameType::Pretty)
        .check_case(true);
    assert!(table.find_symbols_by_name(&wrong_case).is_err());
}

#[test]
fn aliases_collapse_into_one_function() {
    let mut table = SymbolTable::new();
    let v1 = table.add_symbol(SymbolDef::new("foo@V1", SymbolType::Function, 0x10));
    let v2 = table.add_symbol(SymbolDef::new("foo@V2", SymbolType::Function, 0x10));
    let f = table.add_function(&[v1, v2]).unwrap();

    let funcs = table
        .find_functions_by_name(&NameQuery::pattern("foo*"))
        .unwrap();
    assert_eq!(funcs.len(), 1);
    assert_eq!(funcs[0].id(), f);
    assert_eq!(table.function_name(funcs[0]), "foo");

    // Function symbols never surface as variables.
    assert_eq!(
        table
            .find_variables_by_name(&NameQuery::exact("foo"))
            .unwrap_err(),
        LookupError::NoSuchVariable
    );
}

#[test]
fn wildcard_patterns_cover_names_by_length() {
    let mut table = SymbolTable::new();
    for name in ["a", "b", "ab", "abc"] {
        table.add_symbol(SymbolDef::new(name, SymbolType::NoType, 0));
    }
    let every = NameQuery::pattern("*").schemes(NameType::Mangled);
    assert_eq!(table.find_symbols_by_name(&every).unwrap().len(), 4);

    let single = NameQuery::pattern("?").schemes(NameType::Mangled);
    let names: Vec<&str> = table
        .find_symbols_by_name(&single)
        .unwrap()
        .iter()
        .map(|s| s.mangled_name())
        .collect();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn kind_listings() {
    let mut table = SymbolTable::new();
    assert_eq!(
        table.all_symbols().unwrap_err(),
        LookupError::NoSuchSymbol(MissReason::EmptyTable)
    );
    table.add_symbol(SymbolDef::new("f", SymbolType::Function, 0));
    table.add_symbol(SymbolDef::new("v", SymbolType::Object, 8));
    table.add_undefined_symbol(SymbolDef::new("ext", SymbolType::Function, 0));

    assert_eq!(table.all_symbols_of_kind(SymbolType::Function).unwrap().len(), 2);
    assert_eq!(table.all_symbols_of_kind(SymbolType::Object).unwrap().len(), 1);
    assert_eq!(table.all_symbols_of_kind(SymbolType::Unknown).unwrap().len(), 3);
    assert_eq!(
        table.all_symbols_of_kind(SymbolType::Module).unwrap_err(),
        LookupError::NoSuchSymbol(MissReason::FilteredByKind)
    );
}

#[test]
fn nearest_function_scenario() {
    let mut table = SymbolTable::new();
    code_region(&mut table, 0, 0x1000);
    for (name, addr) in [("c", 300), ("a", 100), ("b", 200)] {
        add_function(&mut table, name, addr, 10);
    }

    let hit = table.find_nearest_function(250).unwrap();
    assert_eq!(hit.address(), 200);
    assert!(!hit.contains(250));
    // Same answer on a second call.
    assert_eq!(table.find_nearest_function(250).unwrap().id(), hit.id());

    assert_eq!(
        table.find_nearest_function(50).unwrap_err(),
        LookupError::NoSuchFunction
    );
    assert!(matches!(
        table.find_nearest_function(0x2000),
        Err(LookupError::InvalidQuery(_))
    ));

    assert_eq!(table.find_function_by_exact_address(300).unwrap().address(), 300);
    assert_eq!(
        table.find_function_by_exact_address(301).unwrap_err(),
        LookupError::NoSuchFunction
    );
}

#[test]
fn variables_by_offset_and_name() {
    let mut table = SymbolTable::new();
    let counter = table.add_symbol(SymbolDef {
        size: 4,
        ..SymbolDef::new("counter", SymbolType::Object, 0x2000)
    });
    let v = table.add_variable(&[counter]).unwrap();

    assert_eq!(table.find_variable_by_exact_offset(0x2000).unwrap().id(), v);
    assert_eq!(
        table.find_variable_by_exact_offset(0x2001).unwrap_err(),
        LookupError::NoSuchVariable
    );
    let found = table
        .find_variables_by_name(&NameQuery::exact("counter"))
        .unwrap();
    assert_eq!(found[0].offset(), 0x2000);
    assert_eq!(table.all_variables().unwrap().len(), 1);
}

#[test]
fn enclosing_region_excludes_the_end_address() {
    let mut table = SymbolTable::new();
    table.add_region(MemoryRegion::new(".data".into(), 0x2000, 0x800, 8, RegionKind::Data));
    table.add_region(MemoryRegion::new(".text".into(), 0x1000, 0x1000, 16, RegionKind::Code));
    table.add_region(MemoryRegion::new(".bss".into(), 0x3000, 0x100, 8, RegionKind::Data));

    for addr in [0x1000u64, 0x1800, 0x1fff, 0x2000, 0x27ff, 0x3000, 0x30ff] {
        let region = table.find_enclosing_region(addr).unwrap();
        assert!(region.contains(addr), "0x{:x} in {}", addr, region.name);
    }
    assert_eq!(table.find_enclosing_region(0x2000).unwrap().name, ".data");
    assert_eq!(
        table.find_enclosing_region(0x2800).unwrap_err(),
        LookupError::NoSuchRegion
    );
    assert_eq!(
        table.find_enclosing_region(0x3100).unwrap_err(),
        LookupError::NoSuchRegion
    );

    assert_eq!(table.find_region_by_name(".bss").unwrap().start, 0x3000);
    assert_eq!(table.find_region_by_entry(0x1000).unwrap().name, ".text");
    assert_eq!(table.code_regions().unwrap().len(), 1);
    assert_eq!(table.data_regions().unwrap().len(), 2);
    assert!(table.is_data(0x3000));
    assert!(!table.is_code(0x3000));
}

#[test]
fn overlapping_regions_fall_back_to_prioritised_scan() {
    let mut table = SymbolTable::with_config(TableConfig {
        regions_may_overlap: true,
    });
    table.add_region(MemoryRegion::new(".loader".into(), 0, 0x1000, 4, RegionKind::Other));
    table.add_region(MemoryRegion::new(".data".into(), 0, 0x400, 4, RegionKind::Data));
    table.add_region(MemoryRegion::new(".text".into(), 0, 0x200, 4, RegionKind::Code));

    assert_eq!(table.find_enclosing_region(0x10).unwrap().name, ".text");
    assert_eq!(table.find_enclosing_region(0x300).unwrap().name, ".data");
    assert_eq!(table.find_enclosing_region(0x800).unwrap().name, ".loader");
    assert!(table.find_enclosing_region(0x1000).is_err());
}

#[test]
fn catch_block_scenario() {
    let mut table = SymbolTable::new();
    table.add_exception_block(ExceptionBlock::catch_only(50, 10));
    table.add_exception_block(ExceptionBlock::catch_only(10, 5));
    assert_eq!(
        table.find_catch_block(12, 1).unwrap_err(),
        LookupError::IndexNotBuilt
    );
    table.finalize();

    assert_eq!(table.find_catch_block(12, 1).unwrap().catch_start(), 10);
    assert_eq!(
        table.find_catch_block(20, 1).unwrap_err(),
        LookupError::NoSuchException
    );
    assert_eq!(table.find_catch_block(50, 0).unwrap().catch_start(), 50);
    assert!(table.find_catch_block(55, 0).is_err());
    assert_eq!(table.all_exceptions().unwrap()[0].catch_start(), 10);
}

#[test]
fn modules_by_name_and_address() {
    let mut table = SymbolTable::new();
    table
        .add_module(ModuleDef {
            file_name: "app".to_string(),
            full_name: "/srv/app".to_string(),
            address: 0x400000,
        })
        .unwrap();
    table
        .add_module(ModuleDef {
            file_name: "libc.so.6".to_string(),
            full_name: "/lib/libc.so.6".to_string(),
            address: 0x7f0000,
        })
        .unwrap();

    assert_eq!(table.find_module_by_name("app").unwrap().full_name(), "/srv/app");
    assert_eq!(
        table.find_module_by_name("/lib/libc.so.6").unwrap().file_name(),
        "libc.so.6"
    );
    assert_eq!(table.find_module_by_address(0x7f0000).unwrap().file_name(), "libc.so.6");
    assert_eq!(
        table.find_module_by_name("ld.so").unwrap_err(),
        LookupError::NoSuchModule
    );
    assert_eq!(table.all_modules().unwrap().len(), 2);
}

#[test]
fn built_table_serves_concurrent_readers() {
    let mut table = SymbolTable::new();
    code_region(&mut table, 0, 0x10000);
    for i in 0..256u64 {
        add_function(&mut table, &format!("fn_{}", i), i * 0x40, 0x20);
    }
    table.finalize();

    std::thread::scope(|scope| {
        for t in 0..4u64 {
            let table = &table;
            scope.spawn(move || {
                for i in 0..256u64 {
                    let addr = i * 0x40 + 0x30 + t;
                    let f = table.find_nearest_function(addr).unwrap();
                    assert_eq!(f.address(), i * 0x40);
                    let name = format!("fn_{}", i);
                    assert_eq!(table.find_symbols_by_name(&NameQuery::exact(&name)).unwrap().len(), 1);
                }
            });
        }
    });
}
