//! ChainedHashTable: fixed bucket array with singly linked chains of entries.

use crate::error::{CreateError, InsertError};
use crate::hashing::{bucket_index, Djb2, KeyHasher};
use core::fmt;
use log::{debug, trace};
use slotmap::{new_key_type, SlotMap};
use std::collections::TryReserveError;

new_key_type! {
    /// Arena index of a live entry; used as the chain link.
    struct EntryKey;
}

#[derive(Debug)]
struct Entry<V> {
    key: Box<str>,
    value: V,
    next: Option<EntryKey>,
}

pub struct ChainedHashTable<V, H = Djb2> {
    hasher: H,
    // Chain heads; the length is the capacity and never changes.
    buckets: Vec<Option<EntryKey>>,
    slots: SlotMap<EntryKey, Entry<V>>, // entry records, one per live key
}

impl<V> ChainedHashTable<V> {
    /// Create a table with exactly `capacity` empty buckets, hashed with DJB2.
    pub fn create(capacity: usize) -> Result<Self, CreateError> {
        Self::with_hasher(capacity, Djb2)
    }
}

fn copy_key(key: &str) -> Result<Box<str>, TryReserveError> {
    let mut owned = String::new();
    owned.try_reserve_exact(key.len())?;
    owned.push_str(key);
    Ok(owned.into_boxed_str())
}

impl<V, H> ChainedHashTable<V, H>
where
    H: KeyHasher,
{
    pub fn with_hasher(capacity: usize, hasher: H) -> Result<Self, CreateError> {
        if capacity == 0 {
            return Err(CreateError::ZeroCapacity);
        }
        let mut buckets = Vec::new();
        buckets
            .try_reserve_exact(capacity)
            .map_err(|source| CreateError::AllocationFailed { capacity, source })?;
        buckets.resize(capacity, None);
        debug!("created chained hash table with {} buckets", capacity);
        Ok(Self {
            hasher,
            buckets,
            slots: SlotMap::with_key(),
        })
    }

    /// Number of buckets (the fixed capacity), not the number of entries.
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    /// Number of live entries.
    pub fn count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// `count / size`, computed on every call.
    pub fn load_factor(&self) -> f32 {
        self.count() as f32 / self.size() as f32
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Bucket index `key` maps to.
    pub fn bucket_of(&self, key: &str) -> usize {
        bucket_index(self.hasher.hash_key(key), self.buckets.len())
    }

    // Linear scan of one chain; keys are unique so the first match is the only one.
    fn locate(&self, bucket: usize, key: &str) -> Option<EntryKey> {
        let mut cursor = self.buckets[bucket];
        while let Some(k) = cursor {
            let entry = &self.slots[k];
            if &*entry.key == key {
                return Some(k);
            }
            cursor = entry.next;
        }
        None
    }

    /// Value stored under `key`, still owned by the table.
    pub fn find(&self, key: &str) -> Option<&V> {
        let k = self.locate(self.bucket_of(key), key)?;
        Some(&self.slots[k].value)
    }

    pub fn find_mut(&mut self, key: &str) -> Option<&mut V> {
        let k = self.locate(self.bucket_of(key), key)?;
        Some(&mut self.slots[k].value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.locate(self.bucket_of(key), key).is_some()
    }

    /// Insert `value` under a copy of `key`.
    ///
    /// - New key: the entry is linked at the head of its bucket's chain and
    ///   `Ok(None)` is returned.
    /// - Existing key, `replace == false`: nothing changes and the value comes
    ///   back in `InsertError::DuplicateKey`.
    /// - Existing key, `replace == true`: the stored value is swapped in place
    ///   and the previous one is returned as `Ok(Some(previous))`. Chain
    ///   position and count are unchanged.
    ///
    /// If the entry record or the key copy cannot be allocated the table is
    /// left untouched and the value comes back in `InsertError::AllocationFailed`.
    pub fn insert(
        &mut self,
        key: &str,
        value: V,
        replace: bool,
    ) -> Result<Option<V>, InsertError<V>> {
        let bucket = self.bucket_of(key);
        if let Some(k) = self.locate(bucket, key) {
            if !replace {
                trace!("insert of {:?} rejected: key present in bucket {}", key, bucket);
                return Err(InsertError::DuplicateKey(value));
            }
            trace!("replacing value of {:?} in bucket {}", key, bucket);
            return Ok(Some(core::mem::replace(&mut self.slots[k].value, value)));
        }

        // Both allocations happen before any link changes, so a failure
        // leaves the table as it was.
        if let Err(source) = self.slots.try_reserve(1) {
            return Err(InsertError::AllocationFailed { value, source });
        }
        let owned = match copy_key(key) {
            Ok(owned) => owned,
            Err(source) => return Err(InsertError::AllocationFailed { value, source }),
        };
        let next = self.buckets[bucket];
        let k = self.slots.insert(Entry {
            key: owned,
            value,
            next,
        });
        self.buckets[bucket] = Some(k);
        trace!("inserted {:?} at head of bucket {}", key, bucket);
        Ok(None)
    }

    /// Like [`insert`](Self::insert), but a replaced value is passed to
    /// `destructor` (called exactly once, and only on replacement) instead of
    /// being returned.
    pub fn insert_with_destructor<F>(
        &mut self,
        key: &str,
        value: V,
        replace: bool,
        destructor: F,
    ) -> Result<(), InsertError<V>>
    where
        F: FnOnce(V),
    {
        if let Some(previous) = self.insert(key, value, replace)? {
            destructor(previous);
        }
        Ok(())
    }

    // Unlink the entry for `key`, fixing either the bucket head or the
    // predecessor's link, and hand back the detached record.
    fn unlink(&mut self, key: &str) -> Option<Entry<V>> {
        let bucket = self.bucket_of(key);
        let mut prev: Option<EntryKey> = None;
        let mut cursor = self.buckets[bucket];
        while let Some(k) = cursor {
            let entry = &self.slots[k];
            if &*entry.key == key {
                let next = entry.next;
                match prev {
                    None => self.buckets[bucket] = next,
                    Some(p) => self.slots[p].next = next,
                }
                trace!("removed {:?} from bucket {}", key, bucket);
                return self.slots.remove(k);
            }
            prev = Some(k);
            cursor = entry.next;
        }
        None
    }

    /// Remove `key` and return ownership of its value to the caller.
    pub fn remove(&mut self, key: &str) -> Option<V> {
        self.unlink(key).map(|entry| entry.value)
    }

    /// Remove `key` and pass its value to `destructor`. Returns whether the
    /// key was present; `destructor` is not called otherwise.
    pub fn remove_with_destructor<F>(&mut self, key: &str, destructor: F) -> bool
    where
        F: FnOnce(V),
    {
        match self.unlink(key) {
            Some(entry) => {
                destructor(entry.value);
                true
            }
            None => false,
        }
    }

    /// Tear the table down, dropping every key and value.
    pub fn destroy(self) {
        debug!(
            "destroying chained hash table ({} buckets, {} entries)",
            self.size(),
            self.count()
        );
        drop(self);
    }

    /// Tear the table down, passing every value to `destructor` exactly once.
    ///
    /// Buckets are visited in index order and each chain head to tail.
    pub fn destroy_with_destructor<F>(mut self, mut destructor: F)
    where
        F: FnMut(V),
    {
        let entries = self.count();
        for head in self.buckets.iter_mut() {
            let mut cursor = head.take();
            while let Some(k) = cursor {
                let Some(entry) = self.slots.remove(k) else {
                    break;
                };
                cursor = entry.next;
                destructor(entry.value);
            }
        }
        debug!(
            "destroyed chained hash table ({} buckets, {} entries released)",
            self.buckets.len(),
            entries
        );
    }

    /// Entries of one bucket, head to tail (most recently inserted first).
    ///
    /// Panics if `bucket >= self.size()`.
    pub fn chain(&self, bucket: usize) -> Chain<'_, V> {
        Chain {
            slots: &self.slots,
            cursor: self.buckets[bucket],
        }
    }

    /// Number of entries in one bucket's chain.
    ///
    /// Panics if `bucket >= self.size()`.
    pub fn chain_len(&self, bucket: usize) -> usize {
        self.chain(bucket).count()
    }

    /// All entries, bucket by bucket, each chain head to tail.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            slots: &self.slots,
            heads: self.buckets.iter(),
            chain: None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }

    /// Mutable access to every value, in no particular order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.slots.values_mut().map(|e| &mut e.value)
    }
}

/// Iterator over a single chain.
pub struct Chain<'a, V> {
    slots: &'a SlotMap<EntryKey, Entry<V>>,
    cursor: Option<EntryKey>,
}

impl<'a, V> Iterator for Chain<'a, V> {
    type Item = (&'a str, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.slots.get(self.cursor?)?;
        self.cursor = entry.next;
        Some((&*entry.key, &entry.value))
    }
}

/// Iterator over every entry in bucket order.
pub struct Iter<'a, V> {
    slots: &'a SlotMap<EntryKey, Entry<V>>,
    heads: core::slice::Iter<'a, Option<EntryKey>>,
    chain: Option<Chain<'a, V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.chain.as_mut().and_then(Iterator::next) {
                return Some(item);
            }
            let head = *self.heads.next()?;
            self.chain = Some(Chain {
                slots: self.slots,
                cursor: head,
            });
        }
    }
}

impl<V: fmt::Debug, H: KeyHasher> fmt::Debug for ChainedHashTable<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
