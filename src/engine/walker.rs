//! Deterministic cursor walk over the pixel grid.
//!
//! Each step adds the hex value of the next x (or y) digest character and the
//! next salt digest character to the current position, scales by the seed
//! multiplier, and wraps into the canvas. A multiplier of zero pins the cursor
//! to the origin after the first step.

use crate::engine::seed::Seed;
use crate::types::Coordinate;

/// Cursor state owned by one derivation run.
#[derive(Clone, Debug)]
pub struct Walker<'a> {
    seed: &'a Seed,
    width: u64,
    height: u64,
    current: Coordinate,
    count: u32,
    period: usize,
}

impl<'a> Walker<'a> {
    /// Places the cursor at the seed start scaled by the multiplier.
    pub fn new(seed: &'a Seed, width: u32, height: u32) -> Self {
        let (width, height) = (u64::from(width), u64::from(height));
        let current = Coordinate::new((seed.start.x * seed.multiplier) % width, (seed.start.y * seed.multiplier) % height);
        let period = seed.x_digest.len().min(seed.y_digest.len()).min(seed.salt_digest.len());
        Self { seed, width, height, current, count: 0, period }
    }

    /// Advances the cursor one step and returns the new position.
    pub fn step(&mut self) -> Coordinate {
        let c = self.count as usize % self.period;
        let salt = nibble(&self.seed.salt_digest, c);
        let m = self.seed.multiplier;

        self.current.x = ((self.current.x + nibble(&self.seed.x_digest, c) + salt) * m) % self.width;
        self.current.y = ((self.current.y + nibble(&self.seed.y_digest, c) + salt) * m) % self.height;
        self.count += 1;

        tracing::trace!(x = self.current.x, y = self.current.y, step = self.count, "cursor moved");
        self.current
    }

    /// Resets the step counter for a new fill; the position carries over.
    pub fn restart_count(&mut self) {
        self.count = 0;
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    #[inline]
    pub fn position(&self) -> Coordinate {
        self.current
    }
}

// Digests are lowercase hex produced by the seed, so every byte is a hex digit.
fn nibble(digest: &str, index: usize) -> u64 {
    digest.as_bytes().get(index).and_then(|&b| char::from(b).to_digit(16)).map_or(0, u64::from)
}
