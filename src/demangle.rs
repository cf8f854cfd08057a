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

//! Pretty and typed name derivation from linker-level names.

/// The two demangled forms of a mangled name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    pub pretty: String,
    pub typed: String,
}

/// Drop an ELF symbol-version suffix (`foo@V1`, `foo@@V2`).
pub fn strip_version(name: &str) -> &str {
    match name.find('@') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Derive pretty and typed names. Rust names keep their hash only in the typed form,
/// C++ names lose their parameter list in the pretty form. Anything that does not
/// demangle is used as-is for both.
pub fn derive_names(mangled: &str) -> DerivedNames {
    let base = strip_version(mangled);

    if let Ok(demangled) = rustc_demangle::try_demangle(base) {
        return DerivedNames {
            pretty: format!("{:#}", demangled),
            typed: format!("{}", demangled),
        };
    }

    if base.starts_with("_Z") {
        if let Ok(sym) = cpp_demangle::Symbol::new(base.as_bytes()) {
            if let Ok(typed) = sym.demangle() {
                return DerivedNames {
                    pretty: strip_params(&typed).to_string(),
                    typed,
                };
            }
        }
    }

    DerivedNames {
        pretty: base.to_string(),
        typed: base.to_string(),
    }
}

/// Cut the trailing parameter list (and any qualifiers after it) off a demangled
/// C++ signature.
fn strip_params(typed: &str) -> &str {
    let Some(close) = typed.rfind(')') else {
        return typed;
    };
    let mut depth = 0usize;
    for (idx, c) in typed[..=close].char_indices().rev() {
        match c {
            ')' => depth += 1,
            '(' => {
                depth -= 1;
                if depth == 0 {
                    return if idx == 0 { typed } else { &typed[..idx] };
                }
            }
            _ => {}
        }
    }
    typed
}
