//! Symbols
//!
//! Symbols are unique property keys compared by identity. Registered
//! symbols (`Symbol.for(key)`) are shared per description within a thread.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rustc_hash::FxHashMap;

/// Description of the well-known metadata symbol
pub const METADATA_SYMBOL_DESCRIPTION: &str = "Symbol.metadata";

thread_local! {
    static REGISTRY: RefCell<FxHashMap<String, Symbol>> = RefCell::new(FxHashMap::default());
    static WELL_KNOWN_METADATA: Symbol = Symbol::new(METADATA_SYMBOL_DESCRIPTION);
}

/// A unique property key
#[derive(Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    /// Create a fresh symbol, distinct from every other symbol
    pub fn new(description: &str) -> Self {
        Symbol(Rc::from(description))
    }

    /// Look up (or register) the shared symbol for `key`
    pub fn for_key(key: &str) -> Self {
        REGISTRY.with(|registry| {
            registry
                .borrow_mut()
                .entry(key.to_string())
                .or_insert_with(|| Symbol::new(key))
                .clone()
        })
    }

    /// The well-known metadata symbol
    pub fn metadata() -> Self {
        WELL_KNOWN_METADATA.with(Symbol::clone)
    }

    /// Symbol description
    pub fn description(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Rc::as_ptr(&self.0) as *const u8 as usize).hash(state);
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}
