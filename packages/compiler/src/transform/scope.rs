//! Declaration Scope Tracker
//!
//! Nested variable scopes and the provenance of the implicit dot.

use std::collections::HashMap;

use super::provenance::Provenance;

/// Name of the variable bound to a template's initial dot
pub const ROOT_VARIABLE: &str = "$";

#[derive(Debug, Default)]
struct Scope {
    vars: HashMap<String, Provenance>,
    /// `None` inherits the enclosing dot
    dot: Option<Provenance>,
}

/// Lexical scope stack for one template body
#[derive(Debug)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl ScopeStack {
    /// Root scope with `$` and the dot bound to `root_dot`
    pub fn new(root_dot: Provenance) -> Self {
        let mut vars = HashMap::new();
        vars.insert(ROOT_VARIABLE.to_string(), root_dot);
        ScopeStack {
            scopes: vec![Scope {
                vars,
                dot: Some(root_dot),
            }],
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Push a scope that keeps the current dot
    pub fn enter_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Push a scope whose dot is `dot`
    pub fn enter_scope_with_dot(&mut self, dot: Provenance) {
        self.scopes.push(Scope {
            vars: HashMap::new(),
            dot: Some(dot),
        });
    }

    /// Pop the innermost scope. The root scope is never popped.
    pub fn leave_scope(&mut self) {
        debug_assert!(self.scopes.len() > 1, "leave_scope on the root scope");
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Declare `name` in the innermost scope
    pub fn bind(&mut self, name: &str, provenance: Provenance) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.vars.insert(name.to_string(), provenance);
        }
    }

    /// Update the nearest existing binding of `name`, or declare it innermost
    pub fn assign(&mut self, name: &str, provenance: Provenance) {
        match self
            .scopes
            .iter_mut()
            .rev()
            .find_map(|scope| scope.vars.get_mut(name))
        {
            Some(slot) => *slot = provenance,
            None => self.bind(name, provenance),
        }
    }

    /// Resolve `name` outward; unresolved names are unclassified
    pub fn lookup(&self, name: &str) -> Provenance {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.vars.get(name).copied())
            .unwrap_or_default()
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.scopes.iter().any(|scope| scope.vars.contains_key(name))
    }

    pub fn current_dot(&self) -> Provenance {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.dot)
            .unwrap_or_default()
    }

    /// Replace the dot of the innermost scope
    pub fn set_dot(&mut self, dot: Provenance) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.dot = Some(dot);
        }
    }
}
