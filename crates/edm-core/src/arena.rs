//! Append-only node storage
//!
//! Every resolved node lives in an [`Arena`] and is addressed by a typed
//! [`Id`]. Nodes refer to each other by id rather than by `Arc`, so cyclic
//! schemas (a type whose navigation property targets itself, two types that
//! reference each other) never form reference cycles.
//!
//! A [`Table`] pairs an arena with a key index. Lookups lock only the key's
//! map entry, which makes concurrent first access converge on one node.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

/// Index of a node of type `T` inside its arena
pub struct Id<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }

    pub fn index(self) -> usize {
        self.index
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index)
    }
}

/// Dense, append-only vector of shared nodes
pub struct Arena<T> {
    items: RwLock<Vec<Arc<T>>>,
}

impl<T> Arena<T> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }

    /// Store a node and return its id
    pub fn alloc(&self, value: T) -> Id<T> {
        let mut items = self.items.write();
        items.push(Arc::new(value));
        Id::new(items.len() - 1)
    }

    pub fn get(&self, id: Id<T>) -> Option<Arc<T>> {
        self.items.read().get(id.index).cloned()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena").field("len", &self.len()).finish()
    }
}

/// Arena plus a key index; each key maps to at most one node
pub struct Table<K, T>
where
    K: Eq + Hash,
{
    arena: Arena<T>,
    index: DashMap<K, Id<T>>,
}

impl<K, T> Table<K, T>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            index: DashMap::new(),
        }
    }

    /// Id already stored under `key`, if any
    pub fn id(&self, key: &K) -> Option<Id<T>> {
        self.index.get(key).map(|entry| *entry.value())
    }

    pub fn get(&self, id: Id<T>) -> Option<Arc<T>> {
        self.arena.get(id)
    }

    /// Return the node stored under `key`, building it on first access
    ///
    /// `build` runs while the key's entry is locked, so it must not look up
    /// anything in the same table. It answers `Ok(None)` when no definition
    /// exists; nothing is stored in that case, nor when it fails.
    pub fn get_or_try_insert<E>(
        &self,
        key: K,
        build: impl FnOnce() -> Result<Option<T>, E>,
    ) -> Result<Option<Id<T>>, E> {
        match self.index.entry(key) {
            Entry::Occupied(entry) => Ok(Some(*entry.get())),
            Entry::Vacant(entry) => match build()? {
                Some(node) => {
                    let id = self.arena.alloc(node);
                    entry.insert(id);
                    Ok(Some(id))
                }
                None => Ok(None),
            },
        }
    }

    /// Store a node unless the key is already taken; returns the winning id
    pub fn insert_if_absent(&self, key: K, build: impl FnOnce() -> T) -> Id<T> {
        *self
            .index
            .entry(key)
            .or_insert_with(|| self.arena.alloc(build()))
            .value()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl<K, T> Default for Table<K, T>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> fmt::Debug for Table<K, T>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table").field("len", &self.len()).finish()
    }
}
