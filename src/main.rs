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

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};

use symtab_lookup::{
    load_into, load_object_file, LookupError, NameQuery, NameType, NameTypes, SymbolTable,
    SymbolType, TableConfig,
};

/// Query the symbol table of one or more object files.
#[derive(Parser, Debug)]
#[command(name = "symtab-lookup", version)]
struct Cli {
    /// Object files to load, in order. Each becomes a module of the same table.
    #[arg(short, long = "file", required = true)]
    files: Vec<PathBuf>,

    /// Scan regions linearly instead of binary searching them. Implied for XCOFF input.
    #[arg(long)]
    regions_may_overlap: bool,

    /// Log level (overridden by RUST_LOG).
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    query: Query,
}

#[derive(Subcommand, Debug)]
enum Query {
    /// Symbols by name
    Symbols(NameArgs),
    /// Functions by name
    Functions(NameArgs),
    /// Variables by name
    Variables(NameArgs),
    /// Function starting exactly at an address
    FunctionAt { addr: String },
    /// Closest function at or below an address (the address must be code)
    Nearest { addr: String },
    /// Variable starting exactly at an offset
    VariableAt { addr: String },
    /// Module by file name or full name
    Module { name: String },
    /// Module by its base address
    ModuleAt { addr: String },
    /// Region by section name
    Region { name: String },
    /// Region enclosing an address
    RegionAt { addr: String },
    /// Catch block overlapping [addr, addr + size)
    Catch {
        addr: String,
        #[arg(default_value = "0")]
        size: String,
    },
    /// Entity counts
    Stats,
}

#[derive(Args, Debug)]
struct NameArgs {
    name: String,
    /// Treat NAME as a `*` / `?` wildcard pattern
    #[arg(short, long)]
    pattern: bool,
    /// Case-sensitive pattern matching
    #[arg(short = 'c', long)]
    check_case: bool,
    /// Name schemes to search (default: all)
    #[arg(short, long = "scheme", value_enum)]
    schemes: Vec<Scheme>,
    /// Restrict to one symbol kind
    #[arg(short, long, value_enum)]
    kind: Option<Kind>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Scheme {
    Mangled,
    Pretty,
    Typed,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Function,
    Object,
    Module,
    Notype,
}

impl NameArgs {
    fn query(&self) -> NameQuery<'_> {
        let base = if self.pattern {
            NameQuery::pattern(&self.name)
        } else {
            NameQuery::exact(&self.name)
        };
        let mut schemes: Option<NameTypes> = None;
        for scheme in &self.schemes {
            let which = match scheme {
                Scheme::Mangled => NameType::Mangled,
                Scheme::Pretty => NameType::Pretty,
                Scheme::Typed => NameType::Typed,
            };
            schemes = Some(schemes.map_or(NameTypes::only(which), |s| s.with(which)));
        }
        let kind = match self.kind {
            None => SymbolType::Unknown,
            Some(Kind::Function) => SymbolType::Function,
            Some(Kind::Object) => SymbolType::Object,
            Some(Kind::Module) => SymbolType::Module,
            Some(Kind::Notype) => SymbolType::NoType,
        };
        base.schemes(schemes.unwrap_or(NameTypes::ANY))
            .kind(kind)
            .check_case(self.check_case)
    }
}

#[derive(Serialize)]
struct TableStats {
    config: TableConfig,
    symbols: usize,
    undefined_symbols: usize,
    functions: usize,
    variables: usize,
    modules: usize,
    regions: usize,
    code_regions: usize,
    data_regions: usize,
    exception_blocks: usize,
}

/// Parse hex address from string (supports "0x1234" or "1234" format)
fn parse_hex_address(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let hex_str = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    u64::from_str_radix(hex_str, 16).with_context(|| format!("Invalid hex address: {}", input))
}

fn count<T>(result: Result<Vec<T>, LookupError>) -> usize {
    result.map(|v| v.len()).unwrap_or(0)
}

fn run_query(table: &SymbolTable, query: &Query) -> Result<Value> {
    let value = match query {
        Query::Symbols(args) => Value::Array(
            table
                .find_symbols_by_name(&args.query())?
                .iter()
                .map(|s| s.to_json())
                .collect(),
        ),
        Query::Functions(args) => Value::Array(
            table
                .find_functions_by_name(&args.query())?
                .iter()
                .map(|f| f.to_json(table.function_name(f)))
                .collect(),
        ),
        Query::Variables(args) => Value::Array(
            table
                .find_variables_by_name(&args.query())?
                .iter()
                .map(|v| v.to_json(table.variable_name(v)))
                .collect(),
        ),
        Query::FunctionAt { addr } => {
            let f = table.find_function_by_exact_address(parse_hex_address(addr)?)?;
            f.to_json(table.function_name(f))
        }
        Query::Nearest { addr } => {
            let addr = parse_hex_address(addr)?;
            let f = table.find_nearest_function(addr)?;
            let mut value = f.to_json(table.function_name(f));
            // The match is not checked against the function's extent.
            value["contains"] = json!(f.contains(addr));
            value
        }
        Query::VariableAt { addr } => {
            let v = table.find_variable_by_exact_offset(parse_hex_address(addr)?)?;
            v.to_json(table.variable_name(v))
        }
        Query::Module { name } => table.find_module_by_name(name)?.to_json(),
        Query::ModuleAt { addr } => table
            .find_module_by_address(parse_hex_address(addr)?)?
            .to_json(),
        Query::Region { name } => table.find_region_by_name(name)?.to_json(),
        Query::RegionAt { addr } => table
            .find_enclosing_region(parse_hex_address(addr)?)?
            .to_json(),
        Query::Catch { addr, size } => table
            .find_catch_block(parse_hex_address(addr)?, parse_hex_address(size)?)?
            .to_json(),
        Query::Stats => {
            let stats = TableStats {
                config: table.config(),
                symbols: count(table.all_defined_symbols()),
                undefined_symbols: count(table.all_undefined_symbols()),
                functions: table.all_functions().map(|f| f.len()).unwrap_or(0),
                variables: table.all_variables().map(|v| v.len()).unwrap_or(0),
                modules: table.all_modules().map(|m| m.len()).unwrap_or(0),
                regions: count(table.all_regions()),
                code_regions: count(table.code_regions()),
                data_regions: count(table.data_regions()),
                exception_blocks: table.all_exceptions().map(|e| e.len()).unwrap_or(0),
            };
            serde_json::to_value(stats).context("Failed to serialize table stats")?
        }
    };
    Ok(value)
}

/// A lookup that ran and found nothing, as opposed to a bad argument or I/O failure.
fn is_miss(err: &anyhow::Error) -> bool {
    err.downcast_ref::<LookupError>().is_some_and(LookupError::is_not_found)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _logger = flexi_logger::Logger::try_with_env_or_str(&cli.log_level)
        .context("Invalid log specification")?
        .start()
        .context("Failed to start logger")?;

    let (first, rest) = cli.files.split_first().context("No input files")?;
    let mut table = if cli.regions_may_overlap {
        let mut table = SymbolTable::with_config(TableConfig {
            regions_may_overlap: true,
        });
        load_into(&mut table, first)?;
        table
    } else {
        // The first file's container format decides the region policy.
        load_object_file(first)?
    };
    for path in rest {
        load_into(&mut table, path)?;
    }

    match run_query(&table, &cli.query) {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(e) if is_miss(&e) => {
            println!("{}", json!({ "error": e.to_string() }));
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}
