//! Key hashing and bucket selection.

/// Seed of the DJB2 accumulator.
pub const DJB2_SEED: u32 = 5381;

/// Hashes string keys for bucket selection.
///
/// The table only ever reduces the result modulo its bucket count, so an
/// implementation is free to return any width that fits in `u64`.
pub trait KeyHasher {
    fn hash_key(&self, key: &str) -> u64;
}

/// DJB2-style rolling hash over the key bytes.
///
/// The recurrence is `state = (state << 5) - state + byte` on a wrapping
/// `u32`, seeded with [`DJB2_SEED`]. Bucket placement produced by this hasher
/// is stable across runs and platforms.
///
/// Each byte is added as an unsigned value. A C build that adds a signed
/// `char` (x86 gcc) agrees on ASCII keys only; keys containing bytes of 0x80
/// and above can land in different buckets there.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Djb2;

impl KeyHasher for Djb2 {
    #[inline]
    fn hash_key(&self, key: &str) -> u64 {
        u64::from(djb2(key.as_bytes()))
    }
}

/// Raw 32-bit DJB2 accumulator for `bytes`.
#[inline]
pub fn djb2(bytes: &[u8]) -> u32 {
    bytes.iter().fold(DJB2_SEED, |state, &c| {
        (state << 5).wrapping_sub(state).wrapping_add(u32::from(c))
    })
}

/// Reduces a hash to a bucket index in `0..n_buckets`.
///
/// `n_buckets` must be non-zero; tables enforce this at creation.
#[inline]
pub fn bucket_index(hash: u64, n_buckets: usize) -> usize {
    // usize -> u64 is lossless on every supported target, and the remainder
    // is below n_buckets so it fits back into usize.
    (hash % n_buckets as u64) as usize
}
