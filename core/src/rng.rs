//! Seeded pseudo-random stream shared by map generation and wave scheduling.

use rand::{Error, RngCore};

const HASH_BASIS: u32 = 1_779_033_703;
const HASH_MULTIPLIER: u32 = 3_432_918_353;
const AVALANCHE_FIRST: u32 = 2_246_822_507;
const AVALANCHE_SECOND: u32 = 3_266_489_909;
const STATE_INCREMENT: u32 = 0x6d2b_79f5;
const UNIT_SCALE: f64 = 1.0 / 4_294_967_296.0;

/// Deterministic generator derived from a seed string.
///
/// The seed text is hashed over its UTF-16 code units into a 32-bit state
/// (xmur3), and each draw advances that state by a fixed increment before
/// scrambling it (mulberry32). Two generators created from byte-identical
/// strings produce identical streams; no other entropy is consulted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedRng {
    state: u32,
}

impl SeedRng {
    /// Creates a generator whose stream is fully determined by `seed`.
    #[must_use]
    pub fn new(seed: &str) -> Self {
        Self {
            state: hash_seed(seed),
        }
    }

    /// Draws a float in `[0, max)`.
    pub fn range(&mut self, max: f64) -> f64 {
        self.next_unit() * max
    }

    /// Draws an integer in `[min, max_exclusive)`.
    ///
    /// Returns `min` without consuming a draw when the span is empty or
    /// negative.
    pub fn int(&mut self, min: i32, max_exclusive: i32) -> i32 {
        if max_exclusive <= min {
            return min;
        }
        let span = i64::from(max_exclusive) - i64::from(min);
        let offset = self.range(span as f64).floor() as i64;
        (i64::from(min) + offset.min(span - 1)) as i32
    }

    /// Draws an integer in `[0, max_exclusive)`.
    pub fn below(&mut self, max_exclusive: i32) -> i32 {
        self.int(0, max_exclusive)
    }

    /// Returns `true` with probability `p`.
    ///
    /// `p <= 0` is always false and `p >= 1` always true; neither consumes a
    /// draw.
    pub fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.range(1.0) < p
    }

    /// Picks one element uniformly, or `None` for an empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.index(items.len());
        items.get(index)
    }

    /// Shuffles `items` in place (Fisher–Yates) and hands the slice back.
    pub fn shuffle<'a, T>(&mut self, items: &'a mut [T]) -> &'a mut [T] {
        for upper in (1..items.len()).rev() {
            let swap = self.index(upper + 1);
            items.swap(upper, swap);
        }
        items
    }

    fn index(&mut self, len: usize) -> usize {
        let drawn = self.range(len as f64).floor() as usize;
        drawn.min(len.saturating_sub(1))
    }

    fn next_unit(&mut self) -> f64 {
        f64::from(self.next_word()) * UNIT_SCALE
    }

    fn next_word(&mut self) -> u32 {
        self.state = self.state.wrapping_add(STATE_INCREMENT);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }
}

impl RngCore for SeedRng {
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.next_word());
        let low = u64::from(self.next_word());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_word().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

fn hash_seed(seed: &str) -> u32 {
    let length = seed.encode_utf16().count() as u32;
    let mut hash = HASH_BASIS ^ length;
    for unit in seed.encode_utf16() {
        hash = (hash ^ u32::from(unit)).wrapping_mul(HASH_MULTIPLIER);
        hash = hash.rotate_left(13);
    }
    hash = (hash ^ (hash >> 16)).wrapping_mul(AVALANCHE_FIRST);
    hash = (hash ^ (hash >> 13)).wrapping_mul(AVALANCHE_SECOND);
    hash ^ (hash >> 16)
}
