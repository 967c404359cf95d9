//! Read-only dumps of how entries are spread over the buckets.
//!
//! Both reports borrow the table and render through `Display`; nothing here
//! mutates the structure.

use crate::chained_hash_table::ChainedHashTable;
use crate::hashing::KeyHasher;
use core::fmt;
use std::io::{self, Write};

/// Entry histogram over bands of `group` consecutive buckets.
///
/// Renders one line per band, `buckets {start} - {end}: ` followed by one `*`
/// per entry stored in `start..end`.
pub struct Distribution<'a, V, H> {
    table: &'a ChainedHashTable<V, H>,
    group: usize,
}

/// Per non-empty bucket: index, chain length and the keys in chain order.
pub struct Allocation<'a, V, H> {
    table: &'a ChainedHashTable<V, H>,
}

impl<V, H: KeyHasher> ChainedHashTable<V, H> {
    /// Band report; a `group` of 0 is treated as 1.
    pub fn distribution(&self, group: usize) -> Distribution<'_, V, H> {
        Distribution {
            table: self,
            group: group.max(1),
        }
    }

    pub fn allocation(&self) -> Allocation<'_, V, H> {
        Allocation { table: self }
    }

    pub fn write_distribution<W: Write>(&self, out: &mut W, group: usize) -> io::Result<()> {
        write!(out, "{}", self.distribution(group))
    }

    pub fn write_allocation<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self.allocation())
    }

    pub fn print_distribution(&self, group: usize) -> io::Result<()> {
        self.write_distribution(&mut io::stdout().lock(), group)
    }

    pub fn print_allocation(&self) -> io::Result<()> {
        self.write_allocation(&mut io::stdout().lock())
    }
}

impl<V, H: KeyHasher> fmt::Display for Distribution<'_, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.table.size();
        writeln!(f)?;
        let mut start = 0;
        while start < n {
            let end = (start + self.group).min(n);
            write!(f, "buckets {:4} - {:4}: ", start, end)?;
            for bucket in start..end {
                for _ in self.table.chain(bucket) {
                    f.write_str("*")?;
                }
            }
            writeln!(f)?;
            start = end;
        }
        writeln!(f)
    }
}

impl<V, H: KeyHasher> fmt::Display for Allocation<'_, V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for bucket in 0..self.table.size() {
            let count = self.table.chain_len(bucket);
            if count == 0 {
                continue;
            }
            write!(f, "bucket {}: {} (", bucket, count)?;
            for (i, (key, _)) in self.table.chain(bucket).enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(key)?;
            }
            writeln!(f, ")")?;
        }
        writeln!(f)
    }
}
