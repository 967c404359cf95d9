//! chained-hash-table: a fixed-capacity hash table mapping string keys to
//! values, resolving collisions by separate chaining.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: one small structure whose bucket placement is fully determined
//!   by the key bytes and the bucket count chosen at creation.
//! - Layers:
//!   - `hashing`: the `KeyHasher` seam and the default DJB2 hasher
//!     (32-bit wrapping recurrence seeded with 5381).
//!   - `ChainedHashTable<V, H>`: a `Vec` of chain heads plus an arena of
//!     entry records; each record owns a copy of its key, the value and
//!     the link to the next record in its chain.
//!   - `diagnostics`: read-only distribution and allocation reports.
//!
//! Constraints
//! - Fixed capacity: there is no resize or rehash. `load_factor` is
//!   observational only.
//! - Unique keys: every insert scans the target chain first, so two
//!   entries with the same key never coexist.
//! - New entries go to the head of their chain; chain order is most
//!   recently inserted first.
//! - Keys are copied on insert; the caller's string is never retained.
//!
//! Ownership of values
//! - The table owns a value while it is stored. Every path that discards
//!   a value either hands it back by move (`remove`, a replacing `insert`,
//!   the rejected value inside `InsertError`) or passes it to a destructor
//!   closure chosen by the caller for that call (`insert_with_destructor`,
//!   `remove_with_destructor`, `destroy_with_destructor`).
//! - Destructors run while the table is exclusively borrowed and cannot
//!   re-enter it.
//!
//! Failure model
//! - `create` either returns a complete table or an error; the bucket array
//!   is reserved fallibly.
//! - `insert` copies the key with a fallible reservation. On failure the
//!   table is unchanged and the value comes back in the error.
//! - Missing keys are `None`/`false`, not errors.
//!
//! Concurrency
//! - No internal synchronization. The table is `Send`/`Sync` when its value
//!   and hasher types are; share it across threads behind one `Mutex` held
//!   for the whole operation.

pub mod chained_hash_table;
mod chained_hash_table_proptest;
pub mod diagnostics;
pub mod error;
pub mod hashing;

// Public surface
pub use chained_hash_table::{Chain, ChainedHashTable, Iter};
pub use diagnostics::{Allocation, Distribution};
pub use error::{CreateError, InsertError};
pub use hashing::{djb2, Djb2, KeyHasher};
