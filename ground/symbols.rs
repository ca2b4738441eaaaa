//! Symbol tables: dense integer numbering for types, constants, and
//! predicates, plus the type→object-extension map the expander
//! enumerates.

use std::collections::HashMap;

use pavane_syntax::Symbol;

/// String ↔ dense id interning with reverse lookup. Numbering the
/// same string twice yields the same id both times; the table only
/// grows.
#[derive(Debug, Default)]
pub struct SymbolTable {
    names: Vec<Symbol>,
    ids: HashMap<String, usize>,
}

impl SymbolTable {
    /// Get or allocate the id for a name.
    pub fn number(&mut self, name: &Symbol) -> usize {
        if let Some(&id) = self.ids.get(name.name()) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.clone());
        self.ids.insert(name.name().to_owned(), id);
        id
    }

    /// The id of an already-numbered name, if any. Never allocates.
    pub fn lookup(&self, name: &Symbol) -> Option<usize> {
        self.ids.get(name.name()).copied()
    }

    /// Reverse lookup. Only defined for ids this table issued.
    pub fn resolve(&self, id: usize) -> &Symbol {
        &self.names[id]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Type numbering plus, per type, its declared super-types and its
/// object extension. The implicit root type `object` is seeded at
/// id [`TypeTable::OBJECT`].
#[derive(Debug)]
pub struct TypeTable {
    table: SymbolTable,
    supers: Vec<Vec<usize>>,
    objects: Vec<Vec<usize>>,
}

impl TypeTable {
    /// Id of the implicit root type `object`.
    pub const OBJECT: usize = 0;

    pub fn new() -> Self {
        let mut table = SymbolTable::default();
        table.number(&Symbol::from("object"));
        Self {
            table,
            supers: vec![Vec::new()],
            objects: vec![Vec::new()],
        }
    }

    pub fn number(&mut self, name: &Symbol) -> usize {
        let id = self.table.number(name);
        if id == self.supers.len() {
            self.supers.push(Vec::new());
            self.objects.push(Vec::new());
        }
        id
    }

    pub fn lookup(&self, name: &Symbol) -> Option<usize> {
        self.table.lookup(name)
    }

    pub fn resolve(&self, id: usize) -> &Symbol {
        self.table.resolve(id)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Record a type's direct super-types.
    pub fn set_supers(&mut self, id: usize, supers: Vec<usize>) {
        self.supers[id] = supers;
    }

    pub fn supers(&self, id: usize) -> &[usize] {
        &self.supers[id]
    }

    /// Add an object to a type's extension and, transitively, to every
    /// super-type's. Each extension admits an object at most once, at
    /// its first declaration, even if later re-declared.
    pub fn add_object(&mut self, ty: usize, object: usize) {
        if self.objects[ty].contains(&object) {
            return;
        }
        self.objects[ty].push(object);
        let supers = self.supers[ty].clone();
        for s in supers {
            self.add_object(s, object);
        }
    }

    /// A type's objects, in first-declaration order.
    pub fn extension(&self, ty: usize) -> &[usize] {
        &self.objects[ty]
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}

/// The pipeline-scoped bundle of tables. Each grounding run gets a
/// fresh one; nothing here is global.
#[derive(Debug, Default)]
pub struct SymbolTables {
    pub types: TypeTable,
    pub constants: SymbolTable,
    pub predicates: SymbolTable,
}
