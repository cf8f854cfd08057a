// Crate root: declare modules and control visibility
pub mod address_index;
pub mod aggregates;
pub mod demangle;
pub mod errors;
pub mod exceptions;
pub mod loader;
pub mod memory;
pub mod name_index;
pub mod pattern;
pub mod symbols;
pub mod symtab;
pub mod utils;

// Re-export commonly used API from the library for binaries/tests
pub use aggregates::{Function, FunctionId, Module, ModuleDef, ModuleId, Variable, VariableId};
pub use errors::{LoadError, LookupError, MissReason};
pub use exceptions::ExceptionBlock;
pub use loader::{load_into, load_object_file};
pub use memory::{MemoryRegion, RegionId, RegionKind};
pub use name_index::NameQuery;
pub use pattern::pattern_match;
pub use symbols::{NameType, NameTypes, Symbol, SymbolDef, SymbolId, SymbolLinkage, SymbolType};
pub use symtab::{SymbolTable, TableConfig};
pub use utils::canonicalize_path;
