// Symbol table built while parsing declarations

use rustc_hash::FxHashMap;
use std::fmt;

/// Declared type of a variable (or of an array's elements)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredType {
    Integer,
    Boolean,
    /// Placeholder until the type clause of the declaration has been parsed
    Unresolved,
}

impl DeclaredType {
    pub fn from_name(name: &str) -> DeclaredType {
        match name {
            "integer" => DeclaredType::Integer,
            "boolean" => DeclaredType::Boolean,
            _ => DeclaredType::Unresolved,
        }
    }

    /// Storage size of one value in bytes
    pub fn size(self) -> i64 {
        match self {
            DeclaredType::Integer => 4,
            DeclaredType::Boolean => 1,
            DeclaredType::Unresolved => 0,
        }
    }
}

impl fmt::Display for DeclaredType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclaredType::Integer => write!(f, "integer"),
            DeclaredType::Boolean => write!(f, "boolean"),
            DeclaredType::Unresolved => write!(f, "?"),
        }
    }
}

/// Per-identifier metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub declared_type: DeclaredType,
    pub is_array: bool,
    pub range: (i64, i64),
}

impl Symbol {
    fn placeholder(name: &str) -> Self {
        Symbol {
            name: name.to_string(),
            declared_type: DeclaredType::Unresolved,
            is_array: false,
            range: (0, 0),
        }
    }

    /// Number of array elements, or 1 for scalars. `None` when the range
    /// is empty or its size does not fit an `i64`.
    pub fn element_count(&self) -> Option<i64> {
        if self.is_array {
            Self::count_in_range(self.range)
        } else {
            Some(1)
        }
    }

    /// `max - min + 1` for an inclusive range
    pub fn count_in_range((min, max): (i64, i64)) -> Option<i64> {
        max.checked_sub(min)?
            .checked_add(1)
            .filter(|count| *count > 0)
    }

    /// Whether a constant index lies inside the declared range
    pub fn in_range(&self, index: i64) -> bool {
        self.range.0 <= index && index <= self.range.1
    }
}

/// Flat identifier table for one compilation unit
///
/// Entries are never removed. Iteration follows declaration order.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: FxHashMap<String, Symbol>,
    order: Vec<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable::default()
    }

    /// Register `name` with an unresolved type.
    ///
    /// Returns `false` and leaves the existing entry untouched if the name is
    /// already declared.
    pub fn declare(&mut self, name: &str) -> bool {
        if self.symbols.contains_key(name) {
            return false;
        }
        self.symbols.insert(name.to_string(), Symbol::placeholder(name));
        self.order.push(name.to_string());
        true
    }

    /// Back-fill the scalar type of a declared name
    pub fn resolve(&mut self, name: &str, declared_type: DeclaredType) {
        if let Some(symbol) = self.symbols.get_mut(name) {
            symbol.declared_type = declared_type;
        }
    }

    /// Back-fill the element type and bounds of a declared array
    pub fn resolve_array(&mut self, name: &str, element_type: DeclaredType, range: (i64, i64)) {
        if let Some(symbol) = self.symbols.get_mut(name) {
            symbol.declared_type = element_type;
            symbol.is_array = true;
            symbol.range = range;
        }
    }

    pub fn is_var_exist(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Symbols in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.order.iter().filter_map(|name| self.symbols.get(name))
    }
}
