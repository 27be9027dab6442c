/*!
 * In-memory datastore.
 *
 * Typed collections keyed by UUID. Every entry carries a monotonic insertion
 * sequence so listings are deterministic and insertion-ordered; the derived
 * dashboards depend on encounter order for their tie-breaking rules, so the
 * unordered iteration of the underlying map must never leak out. Replacing or
 * updating an entry keeps its original position.
 *
 * Nothing here persists: a restart starts empty.
 */

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{Feedback, Order, Product, User};

/// A single keyed collection with insertion-ordered listing.
pub struct Collection<T> {
    entries: DashMap<Uuid, Entry<T>>,
    next_seq: AtomicU64,
}

struct Entry<T> {
    seq: u64,
    value: T,
}

impl<T: Clone> Collection<T> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Insert or replace. A replaced entry keeps its insertion position.
    pub fn insert(&self, id: Uuid, value: T) {
        match self.entries.get_mut(&id) {
            Some(mut entry) => {
                entry.value = value;
            }
            None => {
                let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
                self.entries.insert(id, Entry { seq, value });
            }
        }
    }

    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.entries.get(id).map(|entry| entry.value.clone())
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.entries.contains_key(id)
    }

    /// All values in insertion order.
    pub fn list(&self) -> Vec<T> {
        let mut pairs: Vec<(u64, T)> = self
            .entries
            .iter()
            .map(|entry| (entry.seq, entry.value.clone()))
            .collect();
        pairs.sort_by_key(|(seq, _)| *seq);
        pairs.into_iter().map(|(_, value)| value).collect()
    }

    /// Apply `f` to the stored value, returning the updated copy.
    pub fn update<F>(&self, id: &Uuid, f: F) -> Option<T>
    where
        F: FnOnce(&mut T),
    {
        self.entries.get_mut(id).map(|mut entry| {
            f(&mut entry.value);
            entry.value.clone()
        })
    }

    /// Remove an entry, reporting whether it existed.
    pub fn remove(&self, id: &Uuid) -> bool {
        self.entries.remove(id).is_some()
    }

    /// First value matching `pred`, scanning in insertion order.
    pub fn find<P>(&self, pred: P) -> Option<T>
    where
        P: Fn(&T) -> bool,
    {
        self.list().into_iter().find(|value| pred(value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl<T: Clone> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The application's collections, shared behind an `Arc`.
#[derive(Default)]
pub struct Datastore {
    pub orders: Collection<Order>,
    pub products: Collection<Product>,
    pub users: Collection<User>,
    pub feedback: Collection<Feedback>,
}

impl Datastore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn list_preserves_insertion_order() {
        let collection: Collection<String> = Collection::new();
        let keys = ids(3);
        collection.insert(keys[0], "first".into());
        collection.insert(keys[1], "second".into());
        collection.insert(keys[2], "third".into());

        assert_eq!(collection.list(), vec!["first", "second", "third"]);
    }

    #[test]
    fn replacing_keeps_position() {
        let collection: Collection<String> = Collection::new();
        let keys = ids(3);
        collection.insert(keys[0], "a".into());
        collection.insert(keys[1], "b".into());
        collection.insert(keys[2], "c".into());

        collection.insert(keys[0], "a2".into());
        assert_eq!(collection.list(), vec!["a2", "b", "c"]);
    }

    #[test]
    fn update_mutates_in_place() {
        let collection: Collection<u32> = Collection::new();
        let keys = ids(2);
        collection.insert(keys[0], 1);
        collection.insert(keys[1], 2);

        let updated = collection.update(&keys[0], |v| *v += 10);
        assert_eq!(updated, Some(11));
        assert_eq!(collection.list(), vec![11, 2]);

        assert_eq!(collection.update(&Uuid::new_v4(), |v| *v = 0), None);
    }

    #[test]
    fn remove_reports_existence() {
        let collection: Collection<u32> = Collection::new();
        let keys = ids(1);
        collection.insert(keys[0], 7);

        assert!(collection.remove(&keys[0]));
        assert!(!collection.remove(&keys[0]));
        assert!(collection.is_empty());
    }

    #[test]
    fn find_scans_in_insertion_order() {
        let collection: Collection<u32> = Collection::new();
        let keys = ids(3);
        collection.insert(keys[0], 10);
        collection.insert(keys[1], 20);
        collection.insert(keys[2], 25);

        assert_eq!(collection.find(|v| *v >= 20), Some(20));
        assert_eq!(collection.find(|v| *v > 100), None);
    }
}
