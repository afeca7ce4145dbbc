//! Symbol Table and Scope Chain
//!
//! Every lexical scope owns one `SymbolTable`. Tables live in a `ScopeTree`
//! and refer to their enclosing scope by `ScopeId`, so the chain is a set of
//! non-owning back-references ending at the global table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::domain::ast::Prototype;
use crate::domain::data_type::DataType;
use crate::domain::error::{AstError, Result};

/// Index of a scope inside its `ScopeTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
    /// The global scope is always the first table of a tree.
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a name was declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolKind {
    Variable,
    Parameter,
    Function,
}

/// Input to `declare`: everything a later pass needs to know about a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub data_type: DataType,
    pub kind: SymbolKind,
    pub line: u32,
}

impl Declaration {
    pub fn variable(name: impl Into<String>, data_type: DataType, line: u32) -> Self {
        Self {
            name: name.into(),
            data_type,
            kind: SymbolKind::Variable,
            line,
        }
    }

    pub fn parameter(name: impl Into<String>, data_type: DataType, line: u32) -> Self {
        Self {
            name: name.into(),
            data_type,
            kind: SymbolKind::Parameter,
            line,
        }
    }

    /// A function is declared under its name with its return type.
    pub fn function(prototype: &Prototype, line: u32) -> Self {
        Self {
            name: prototype.name.clone(),
            data_type: prototype.return_type,
            kind: SymbolKind::Function,
            line,
        }
    }
}

/// A declared name as stored in a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    pub data_type: DataType,
    pub kind: SymbolKind,
    /// Declaration line
    pub line: u32,
    /// Scope the entry was declared in
    pub scope: ScopeId,
}

/// Names declared directly in one scope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolTable {
    id: ScopeId,
    parent: Option<ScopeId>,
    // Declaration order is kept for deterministic dumps.
    entries: Vec<SymbolEntry>,
    index: HashMap<String, usize>,
}

impl SymbolTable {
    fn new(id: ScopeId, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            parent,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// Enclosing scope; `None` only for the global table.
    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    pub fn is_global(&self) -> bool {
        self.parent.is_none()
    }

    /// Search this table only.
    pub fn local_lookup(&self, name: &str) -> Option<&SymbolEntry> {
        self.index.get(name).and_then(|&i| self.entries.get(i))
    }

    /// Insert a new name. Enclosing tables are not consulted.
    pub fn declare(&mut self, decl: Declaration) -> Result<&SymbolEntry> {
        if let Some(existing) = self.local_lookup(&decl.name) {
            return Err(AstError::DuplicateSymbol {
                name: decl.name,
                scope: self.id,
                previous_line: existing.line,
            });
        }

        debug!(scope = %self.id, name = %decl.name, data_type = %decl.data_type, "declare");
        let slot = self.entries.len();
        self.index.insert(decl.name.clone(), slot);
        self.entries.push(SymbolEntry {
            name: decl.name,
            data_type: decl.data_type,
            kind: decl.kind,
            line: decl.line,
            scope: self.id,
        });
        Ok(&self.entries[slot])
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &SymbolEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn pop_last(&mut self) {
        if let Some(entry) = self.entries.pop() {
            self.index.remove(&entry.name);
        }
    }

    pub(crate) fn check_index(&self) -> bool {
        self.index.len() == self.entries.len()
            && self
                .entries
                .iter()
                .enumerate()
                .all(|(i, e)| self.index.get(&e.name) == Some(&i) && e.scope == self.id)
    }
}

/// Marker into a `ScopeTree`'s history, see `ScopeTree::truncate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeMark {
    tables: usize,
    journal: usize,
}

/// All symbol tables of one program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeTree {
    tables: Vec<SymbolTable>,
    // Scope of every successful declaration, in order; lets `truncate`
    // undo declarations made into tables that survive it.
    journal: Vec<ScopeId>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// A tree holding only the global table.
    pub fn new() -> Self {
        Self {
            tables: vec![SymbolTable::new(ScopeId::GLOBAL, None)],
            journal: Vec::new(),
        }
    }

    /// Create a new scope nested in `parent`.
    pub fn open(&mut self, parent: ScopeId) -> Result<ScopeId> {
        self.table(parent)?;
        let id = ScopeId(self.tables.len() as u32);
        trace!(scope = %id, parent = %parent, "open scope");
        self.tables.push(SymbolTable::new(id, Some(parent)));
        Ok(id)
    }

    /// The global table is created with the tree and never truncated.
    pub fn global(&self) -> &SymbolTable {
        &self.tables[ScopeId::GLOBAL.index()]
    }

    pub fn get(&self, scope: ScopeId) -> Option<&SymbolTable> {
        self.tables.get(scope.index())
    }

    pub fn table(&self, scope: ScopeId) -> Result<&SymbolTable> {
        self.get(scope).ok_or(AstError::UnknownScope(scope))
    }

    pub fn declare(&mut self, scope: ScopeId, decl: Declaration) -> Result<&SymbolEntry> {
        let table = self
            .tables
            .get_mut(scope.index())
            .ok_or(AstError::UnknownScope(scope))?;
        let entry = table.declare(decl)?;
        self.journal.push(scope);
        Ok(entry)
    }

    /// Innermost-first search from `scope` out to the global table.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Result<&SymbolEntry> {
        self.table(scope)?;
        self.chain(scope)
            .find_map(|table| table.local_lookup(name))
            .ok_or_else(|| AstError::UndefinedSymbol {
                name: name.to_string(),
                scope,
            })
    }

    /// Search `scope` only.
    pub fn local_lookup(&self, scope: ScopeId, name: &str) -> Result<Option<&SymbolEntry>> {
        Ok(self.table(scope)?.local_lookup(name))
    }

    /// Tables from `scope` outward, ending with the global table.
    pub fn chain(&self, scope: ScopeId) -> ScopeChain<'_> {
        ScopeChain {
            tree: self,
            next: self.get(scope).map(|t| t.id),
        }
    }

    /// Number of enclosing scopes; the global table has depth 0.
    pub fn depth(&self, scope: ScopeId) -> Result<usize> {
        self.table(scope)?;
        Ok(self.chain(scope).count() - 1)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolTable> {
        self.tables.iter()
    }

    pub fn mark(&self) -> ScopeMark {
        ScopeMark {
            tables: self.tables.len(),
            journal: self.journal.len(),
        }
    }

    /// Drop every table opened and every declaration made after `mark`.
    /// The global table is never removed.
    pub fn truncate(&mut self, mark: ScopeMark) {
        while self.journal.len() > mark.journal {
            if let Some(scope) = self.journal.pop() {
                if let Some(table) = self.tables.get_mut(scope.index()) {
                    table.pop_last();
                }
            }
        }
        self.tables.truncate(mark.tables.max(1));
    }

    /// Chain and index consistency, used by `Program::validate`.
    pub(crate) fn check(&self) -> Result<()> {
        let global = self
            .tables
            .first()
            .ok_or_else(|| AstError::Malformed("scope tree has no global table".to_string()))?;
        if !global.is_global() || global.id != ScopeId::GLOBAL {
            return Err(AstError::Malformed("first table is not the global scope".to_string()));
        }
        for (i, table) in self.tables.iter().enumerate() {
            if table.id.index() != i {
                return Err(AstError::Malformed(format!("scope {} stored at slot {}", table.id, i)));
            }
            if !table.check_index() {
                return Err(AstError::Malformed(format!("scope {} index out of sync", table.id)));
            }
            if i > 0 {
                // Parents are always created first, so the chain strictly shrinks.
                match table.parent {
                    Some(parent) if parent.index() < i => {}
                    _ => {
                        return Err(AstError::Malformed(format!(
                            "scope {} has no valid enclosing scope",
                            table.id
                        )))
                    }
                }
            }
        }
        Ok(())
    }
}

/// Iterator over a scope and its enclosing scopes.
pub struct ScopeChain<'a> {
    tree: &'a ScopeTree,
    next: Option<ScopeId>,
}

impl<'a> Iterator for ScopeChain<'a> {
    type Item = &'a SymbolTable;

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.tree.get(self.next?)?;
        self.next = table.parent;
        Some(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_index_does_not_panic() {
        // Index entry pointing past the entries, as a hand-edited snapshot could carry.
        let table: SymbolTable = serde_json::from_str(
            r#"{"id":1,"parent":0,"entries":[],"index":{"ghost":3}}"#,
        )
        .unwrap();
        assert!(table.local_lookup("ghost").is_none());
        assert!(!table.check_index());
    }

    #[test]
    fn test_declare_and_local_lookup() {
        let mut tree = ScopeTree::new();
        tree.declare(ScopeId::GLOBAL, Declaration::variable("x", DataType::Int, 1))
            .unwrap();

        let entry = tree.local_lookup(ScopeId::GLOBAL, "x").unwrap().unwrap();
        assert_eq!(entry.data_type, DataType::Int);
        assert_eq!(entry.scope, ScopeId::GLOBAL);
        assert!(tree.local_lookup(ScopeId::GLOBAL, "y").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_rejected_in_same_table() {
        let mut tree = ScopeTree::new();
        tree.declare(ScopeId::GLOBAL, Declaration::variable("x", DataType::Int, 1))
            .unwrap();
        let err = tree
            .declare(ScopeId::GLOBAL, Declaration::variable("x", DataType::Float, 4))
            .unwrap_err();
        assert_eq!(
            err,
            AstError::DuplicateSymbol {
                name: "x".to_string(),
                scope: ScopeId::GLOBAL,
                previous_line: 1,
            }
        );
        // The first entry is untouched.
        let entry = tree.lookup(ScopeId::GLOBAL, "x").unwrap();
        assert_eq!(entry.data_type, DataType::Int);
    }

    #[test]
    fn test_lookup_walks_chain_innermost_first() {
        let mut tree = ScopeTree::new();
        let outer = tree.open(ScopeId::GLOBAL).unwrap();
        let inner = tree.open(outer).unwrap();
        tree.declare(ScopeId::GLOBAL, Declaration::function_like("g"))
            .unwrap();
        tree.declare(outer, Declaration::variable("x", DataType::Int, 2))
            .unwrap();
        tree.declare(inner, Declaration::variable("x", DataType::Bool, 3))
            .unwrap();

        assert_eq!(tree.lookup(inner, "x").unwrap().data_type, DataType::Bool);
        assert_eq!(tree.lookup(outer, "x").unwrap().data_type, DataType::Int);
        assert_eq!(tree.lookup(inner, "g").unwrap().scope, ScopeId::GLOBAL);
        assert!(matches!(
            tree.lookup(inner, "nope"),
            Err(AstError::UndefinedSymbol { .. })
        ));
        assert_eq!(tree.depth(inner).unwrap(), 2);
        assert_eq!(tree.chain(inner).count(), 3);
    }

    #[test]
    fn test_open_under_unknown_scope() {
        let mut tree = ScopeTree::new();
        assert_eq!(tree.open(ScopeId(7)), Err(AstError::UnknownScope(ScopeId(7))));
        assert!(matches!(
            tree.lookup(ScopeId(7), "x"),
            Err(AstError::UnknownScope(_))
        ));
    }

    #[test]
    fn test_truncate_undoes_tables_and_declarations() {
        let mut tree = ScopeTree::new();
        tree.declare(ScopeId::GLOBAL, Declaration::variable("a", DataType::Int, 1))
            .unwrap();
        let mark = tree.mark();

        let inner = tree.open(ScopeId::GLOBAL).unwrap();
        tree.declare(inner, Declaration::variable("a", DataType::Float, 2))
            .unwrap();
        tree.declare(ScopeId::GLOBAL, Declaration::variable("b", DataType::Int, 3))
            .unwrap();

        tree.truncate(mark);
        assert_eq!(tree.len(), 1);
        assert!(tree.get(inner).is_none());
        assert!(tree.local_lookup(ScopeId::GLOBAL, "b").unwrap().is_none());
        assert_eq!(tree.lookup(ScopeId::GLOBAL, "a").unwrap().line, 1);
        assert!(tree.check().is_ok());
    }

    impl Declaration {
        fn function_like(name: &str) -> Self {
            Self {
                name: name.to_string(),
                data_type: DataType::Void,
                kind: SymbolKind::Function,
                line: 1,
            }
        }
    }
}
