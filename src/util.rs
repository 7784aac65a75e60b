//! Shared utilities

use std::f32::consts::TAU;

/// Simple deterministic RNG using xorshift64
/// Good for simulation code that needs reproducible randomness without external dependencies
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self { state: seed.max(1) } // Ensure non-zero
    }

    /// Get the next random u64
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Get a random f32 in [0, 1)
    #[inline]
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() & 0xFFFFFF) as f32 / 0x1000000 as f32
    }

    /// Get a random f32 in [min, max)
    #[inline]
    pub fn range_f32(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Get a random usize in [min, max)
    #[inline]
    pub fn range_usize(&mut self, min: usize, max: usize) -> usize {
        debug_assert!(min < max, "range_usize: min ({}) must be < max ({})", min, max);
        min + (self.next_u64() % (max - min) as u64) as usize
    }

    /// Random angle in [0, TAU)
    #[inline]
    pub fn angle(&mut self) -> f32 {
        self.next_f32() * TAU
    }

    /// True with probability p
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }

    /// Random value in [-spread, spread)
    #[inline]
    pub fn jitter(&mut self, spread: f32) -> f32 {
        (self.next_f32() * 2.0 - 1.0) * spread
    }
}

/// HSV to RGB color conversion
/// h: 0-360 (wraps), s: 0-1, v: 0-1
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = h.rem_euclid(360.0);
    let c = v * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = v - c;

    let (r1, g1, b1) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r1 + m) * 255.0) as u8,
        ((g1 + m) * 255.0) as u8,
        ((b1 + m) * 255.0) as u8,
    )
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
