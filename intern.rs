/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Process-wide interned string table.
//!
//! Tag names, attribute names, namespaces, counter names and page names are
//! all looked up and compared far more often than they are created, so they
//! are interned once into a shared arena and thereafter compared by pointer
//! equality. The table is append-only and safe to share across documents
//! (see `SPEC_FULL.md` §10.3 / §5 "process-wide state").

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::arena::StringArena;

/// An immutable handle into the process-wide string table.
///
/// Two `InternedString`s are equal iff they were interned from
/// byte-for-byte identical text; comparison is a single pointer/length
/// check, never a `memcmp` over the text.
#[derive(Clone, Copy)]
pub struct InternedString(&'static str);

impl InternedString {
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for InternedString {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.0, other.0) || (self.0.as_ptr() == other.0.as_ptr() && self.0.len() == other.0.len())
    }
}

impl Eq for InternedString {}

impl Hash for InternedString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (self.0.as_ptr() as usize).hash(state);
        self.0.len().hash(state);
    }
}

impl fmt::Debug for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.0, f)
    }
}

impl fmt::Display for InternedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.0, f)
    }
}

impl AsRef<str> for InternedString {
    fn as_ref(&self) -> &str {
        self.0
    }
}

impl Default for InternedString {
    fn default() -> Self {
        intern("")
    }
}

/// Append-only, mutex-guarded interning table shared by every document in
/// this process. `intern` never removes entries and never invalidates a
/// previously returned `InternedString`.
pub struct StringInterner {
    arena: Mutex<StringArena>,
    table: Mutex<FxHashMap<&'static str, ()>>,
}

impl StringInterner {
    fn new() -> Self {
        Self {
            arena: Mutex::new(StringArena::new()),
            table: Mutex::new(FxHashMap::default()),
        }
    }

    /// Interns `text`, returning a handle stable for the lifetime of the
    /// process. Lookups that hit the table take only the table lock; a
    /// miss additionally takes the arena lock to copy the bytes in.
    pub fn intern(&self, text: &str) -> InternedString {
        {
            let table = self.table.lock();
            if let Some((&existing, _)) = table.get_key_value(text) {
                return InternedString(existing);
            }
        }
        let mut arena = self.arena.lock();
        let mut table = self.table.lock();
        // Re-check under the write lock in case of a race between the
        // read above and acquiring both locks here.
        if let Some((&existing, _)) = table.get_key_value(text) {
            return InternedString(existing);
        }
        let owned: &'static str = arena.alloc_str(text);
        table.insert(owned, ());
        InternedString(owned)
    }
}

static GLOBAL_INTERNER: OnceLock<StringInterner> = OnceLock::new();

/// Returns the process-wide interner, initializing it on first use.
pub fn interner() -> &'static StringInterner {
    GLOBAL_INTERNER.get_or_init(StringInterner::new)
}

/// Convenience wrapper around `interner().intern(text)`.
pub fn intern(text: &str) -> InternedString {
    interner().intern(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent_by_pointer() {
        let a = intern("table-row");
        let b = intern("table-row");
        assert!(std::ptr::eq(a.as_str(), b.as_str()));
    }

    #[test]
    fn distinct_text_interns_distinct() {
        let a = intern("left");
        let b = intern("right");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_string_round_trips() {
        let e = intern("");
        assert!(e.is_empty());
    }
}
