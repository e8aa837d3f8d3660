//! Scoped symbol table: a stack of name maps with shadowing, innermost-first
//! lookup, and in-place initialization tracking.

use std::collections::HashMap;

use crate::front::ast::{BaseType, SymbolKind};

#[derive(Debug, Clone)]
pub struct SymbolInfo {
    pub name: String,
    pub ty: BaseType,
    pub kind: SymbolKind,
    pub scope_level: usize,
    pub initialized: bool,
    /// Parameter base types, recorded for function symbols so call sites can
    /// be checked for arity and argument types.
    pub params: Option<Vec<BaseType>>,
}

pub struct SymbolTable {
    scopes: Vec<HashMap<String, SymbolInfo>>,
}

impl SymbolTable {
    /// Starts with the global scope (level 0) already open.
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Popping the global scope is a no-op.
    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn current_level(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Insert a symbol into the current scope. Returns a handle for setting
    /// the initialization flag or a function signature, or `None` when the
    /// name is already declared in this scope (shadowing outer scopes is
    /// allowed, redeclaration within one is not).
    pub fn declare(
        &mut self,
        name: &str,
        ty: BaseType,
        kind: SymbolKind,
    ) -> Option<&mut SymbolInfo> {
        let level = self.current_level();
        let scope = self.scopes.last_mut().expect("scope stack is never empty");
        if scope.contains_key(name) {
            return None;
        }
        Some(scope.entry(name.to_string()).or_insert(SymbolInfo {
            name: name.to_string(),
            ty,
            kind,
            scope_level: level,
            initialized: false,
            params: None,
        }))
    }

    /// Innermost-first lookup across all open scopes.
    pub fn lookup(&self, name: &str) -> Option<&SymbolInfo> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn lookup_mut(&mut self, name: &str) -> Option<&mut SymbolInfo> {
        self.scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.get_mut(name))
    }

    pub fn lookup_in_current_scope(&self, name: &str) -> Option<&SymbolInfo> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
