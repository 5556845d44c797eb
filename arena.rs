/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Arena allocation for one document's nodes, boxes and copied text.
//!
//! A `Heap` is a monotonic bump allocator: it owns all `Node` and `Box`
//! storage for a single document and frees everything at once when the
//! document is dropped. Nothing inside is individually freed (§3 "Arena
//! heap").

use std::cell::UnsafeCell;

use atomic_refcell::{AtomicRef, AtomicRefCell, AtomicRefMut};

/// A chunked bump allocator used both by the process-wide string table
/// (`StringArena`) and, typed, by a document's node/box storage (`Arena<T>`).
pub struct StringArena {
    chunks: Vec<String>,
    chunk_size: usize,
}

const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

impl StringArena {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Copies `text` into the arena and returns a `'static`-lifetime slice
    /// into it. Safe because the arena never moves or frees a chunk once
    /// allocated; chunks are boxed strings kept alive for the process
    /// lifetime (the global interner never tears down).
    pub fn alloc_str(&mut self, text: &str) -> &'static str {
        if text.is_empty() {
            return "";
        }
        let needs_new_chunk = match self.chunks.last() {
            Some(chunk) => chunk.capacity() - chunk.len() < text.len(),
            None => true,
        };
        if needs_new_chunk {
            let capacity = self.chunk_size.max(text.len());
            self.chunks.push(String::with_capacity(capacity));
        }
        let chunk = self.chunks.last_mut().expect("chunk just pushed");
        let start = chunk.len();
        chunk.push_str(text);
        // SAFETY: chunks are append-only and never reallocated out from
        // under a returned slice (we only ever `push_str`, which is
        // guaranteed not to reallocate because we pre-sized the chunk),
        // and the `StringArena` itself lives for the process in the
        // global interner, so the borrow is sound to widen to `'static`.
        unsafe {
            let ptr = chunk.as_ptr().add(start);
            let bytes = std::slice::from_raw_parts(ptr, text.len());
            std::str::from_utf8_unchecked(bytes)
        }
    }
}

/// Index into a document-scoped `Arena<T>`. Stable for the life of the
/// document; never reused even if an entry becomes logically unreachable,
/// because entries are never removed (Design Notes: "indices into a
/// per-document arena of box records").
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Id<T> {
    index: u32,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Id({})", self.index)
    }
}

impl<T> Id<T> {
    pub fn index(self) -> usize {
        self.index as usize
    }
}

/// Entries per chunk. Fixed so that `index / ARENA_CHUNK_LEN` /
/// `index % ARENA_CHUNK_LEN` stay valid for the life of the arena: a chunk's
/// backing `Vec` is allocated at this capacity up front and never grown past
/// it, so pushing into it (which only ever happens while it has spare
/// capacity) never reallocates and never invalidates a slot address handed
/// out earlier.
const ARENA_CHUNK_LEN: usize = 4096;

struct Chunk<T> {
    slots: Vec<AtomicRefCell<T>>,
}

impl<T> Chunk<T> {
    fn new() -> Self {
        Self { slots: Vec::with_capacity(ARENA_CHUNK_LEN) }
    }
}

/// A document-scoped, append-only arena of `T`, addressed by `Id<T>`.
///
/// Storage is chunked (mirroring `StringArena`'s chunking): each `Chunk<T>`
/// is a fixed-capacity `Vec` of `AtomicRefCell<T>` slots that is filled but
/// never reallocated, so an entry's address is stable for the life of the
/// arena even though `alloc` keeps handing out new ids as layout and box
/// construction run. The outer `Vec<Box<Chunk<T>>>` can itself grow and
/// reallocate freely — only the `Box` pointers move, not the chunks they
/// point to. `get`/`get_mut` hand out `AtomicRefCell` borrows rather than
/// raw `&T`/`&mut T`, so an aliased access (the one way construction and
/// layout could go wrong while holding an id across an `alloc`) panics
/// instead of silently breaking aliasing.
pub struct Arena<T> {
    chunks: UnsafeCell<Vec<Box<Chunk<T>>>>,
    len: std::cell::Cell<usize>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            chunks: UnsafeCell::new(Vec::new()),
            len: std::cell::Cell::new(0),
        }
    }

    pub fn alloc(&self, value: T) -> Id<T> {
        // SAFETY: single-threaded mutation (layout is single-threaded per
        // document, §5); this is the only place that resizes `chunks`, and
        // it never touches an existing chunk's contents, only appends a new
        // `Box<Chunk<T>>` when the last one is full.
        let chunks = unsafe { &mut *self.chunks.get() };
        let needs_new_chunk = match chunks.last() {
            Some(chunk) => chunk.slots.len() >= ARENA_CHUNK_LEN,
            None => true,
        };
        if needs_new_chunk {
            chunks.push(Box::new(Chunk::new()));
        }
        let chunk = chunks.last_mut().expect("chunk just pushed");
        chunk.slots.push(AtomicRefCell::new(value));

        let index = self.len.get();
        self.len.set(index + 1);
        Id {
            index: index as u32,
            _marker: std::marker::PhantomData,
        }
    }

    fn locate(&self, index: usize) -> (usize, usize) {
        (index / ARENA_CHUNK_LEN, index % ARENA_CHUNK_LEN)
    }

    pub fn get(&self, id: Id<T>) -> AtomicRef<'_, T> {
        let (chunk, slot) = self.locate(id.index());
        // SAFETY: chunk contents never move or get dropped while the arena
        // is alive; this borrow is checked dynamically by `AtomicRefCell`.
        let chunks = unsafe { &*self.chunks.get() };
        chunks[chunk].slots[slot].borrow()
    }

    pub fn get_mut(&self, id: Id<T>) -> AtomicRefMut<'_, T> {
        let (chunk, slot) = self.locate(id.index());
        let chunks = unsafe { &*self.chunks.get() };
        chunks[chunk].slots[slot].borrow_mut()
    }

    pub fn len(&self) -> usize {
        self.len.get()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter_ids(&self) -> impl Iterator<Item = Id<T>> {
        (0..self.len()).map(|index| Id {
            index: index as u32,
            _marker: std::marker::PhantomData,
        })
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_arena_preserves_bytes_across_growth() {
        let mut arena = StringArena::new();
        arena.chunk_size = 8;
        let a = arena.alloc_str("hello");
        let b = arena.alloc_str("world-long-enough-to-force-a-new-chunk");
        assert_eq!(a, "hello");
        assert_eq!(b, "world-long-enough-to-force-a-new-chunk");
    }

    #[test]
    fn typed_arena_ids_are_stable() {
        let arena: Arena<i32> = Arena::new();
        let a = arena.alloc(1);
        let b = arena.alloc(2);
        *arena.get_mut(a) += 10;
        assert_eq!(*arena.get(a), 11);
        assert_eq!(*arena.get(b), 2);
    }

    /// A borrow taken before `alloc` crosses a chunk rollover must still see
    /// the same entry afterward — the chunk it points into never moves,
    /// unlike a flat `Vec<T>` that `alloc` would otherwise reallocate.
    #[test]
    fn entries_survive_allocation_past_a_chunk_boundary() {
        let arena: Arena<i32> = Arena::new();
        let first = arena.alloc(1);
        for i in 0..(ARENA_CHUNK_LEN * 2) as i32 {
            arena.alloc(i);
        }
        let borrowed = arena.get(first);
        assert_eq!(*borrowed, 1);
    }

    #[test]
    #[should_panic]
    fn aliased_mutable_borrows_of_the_same_entry_panic() {
        let arena: Arena<i32> = Arena::new();
        let id = arena.alloc(1);
        let _first = arena.get_mut(id);
        let _second = arena.get_mut(id);
    }
}
