//! Interned string keys.
//!
//! Port names and blackboard keys are looked up on every tick, so they are
//! interned once and compared by address afterwards.

use ::once_cell::sync::Lazy;
use std::collections::HashSet;
use std::fmt::{Debug, Display, Formatter, Result as FmtResult};
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Mutex;

static SYMBOL_HEAP: Lazy<Mutex<HashSet<&'static str>>> =
    Lazy::new(|| Mutex::new(HashSet::new()));

/// An interned string with O(1) equality and hashing.
#[derive(Clone, Copy, Eq)]
pub struct Symbol {
    s: &'static str,
}

impl Symbol {
    /// Retrieves the string from the Symbol.
    pub fn as_str(self) -> &'static str {
        self.s
    }

    /// Retrieves the address of the backing string.
    pub fn addr(self) -> usize {
        self.s.as_ptr() as usize
    }
}

impl<S: AsRef<str>> From<S> for Symbol {
    fn from(s: S) -> Symbol {
        let s = s.as_ref();
        let mut heap = SYMBOL_HEAP.lock().unwrap();
        let interned = match heap.get(s) {
            Some(interned) => *interned,
            None => {
                let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
                heap.insert(leaked);
                leaked
            }
        };
        Symbol { s: interned }
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }
}

impl<S: AsRef<str>> PartialEq<S> for Symbol {
    fn eq(&self, other: &S) -> bool {
        self.s == other.as_ref()
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl Deref for Symbol {
    type Target = str;
    fn deref(&self) -> &str {
        self.s
    }
}

impl Debug for Symbol {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        Debug::fmt(self.s, fmt)
    }
}

impl Display for Symbol {
    fn fmt(&self, fmt: &mut Formatter) -> FmtResult {
        fmt.write_str(self.s)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn interned_symbols_share_the_backing_string() {
        let a = Symbol::from("tick");
        let b = Symbol::from(String::from("tick"));
        assert_eq!(a.addr(), b.addr());
        assert_eq!(a, b);
        assert_ne!(a, Symbol::from("tock"));
    }

    #[test]
    fn compares_against_plain_strings() {
        let sym = Symbol::from("cursor");
        assert_eq!(sym, "cursor");
        assert_eq!(sym.as_str(), "cursor");
    }
}
