//! Entity records and pools
//!
//! Three pooled entity kinds: rockets, spark particles, and smoke puffs.
//! Records are recycled rather than dropped; a pool `acquire` always hands back
//! a fully reset record so no field can leak from a previous occupant.

use crate::burst::BurstPattern;

/// Kinematic state shared by every entity kind. Previous position is kept for
/// motion-streak rendering.
#[derive(Debug, Clone, Copy, Default)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub px: f32,
    pub py: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Body {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            px: x,
            py: y,
            vx: 0.0,
            vy: 0.0,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

/// Visual/behavioral particle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParticleKind {
    /// Plain spark
    #[default]
    Spark,
    /// Slow-fading ember (glitter, ring cores)
    Ember,
    /// Self-spawning crackle particle
    Crackle,
    /// Cooling comet drawn as a streak
    Comet,
}

#[derive(Debug, Clone, Default)]
pub struct Rocket {
    pub body: Body,
    /// Height at which the shell detonates
    pub apex_y: f32,
    pub hue: f32,
    /// Wind captured at launch; rockets ignore later ambient changes
    pub wind: f32,
    pub pattern: BurstPattern,
    pub exploded: bool,
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub body: Body,
    /// Remaining life in frame units (decremented by 60*dt each tick)
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    pub hue: f32,
    pub kind: ParticleKind,
    // Per-instance physics variety
    pub drag_mul: f32,
    pub gravity_mul: f32,
    pub wind_mul: f32,
    // Flicker assigned at creation
    pub twinkle_phase: f32,
    pub twinkle_amp: f32,
    // Kind-specific timers
    pub crackle_timer: f32,
    pub heat: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            body: Body::default(),
            life: 0.0,
            max_life: 1.0,
            size: 1.0,
            hue: 0.0,
            kind: ParticleKind::Spark,
            drag_mul: 1.0,
            gravity_mul: 1.0,
            wind_mul: 1.0,
            twinkle_phase: 0.0,
            twinkle_amp: 0.0,
            crackle_timer: 0.0,
            heat: 0.0,
        }
    }
}

impl Particle {
    /// Remaining-life fraction, 1.0 at birth down to 0.0
    #[inline]
    pub fn life_frac(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Smoke {
    pub body: Body,
    pub life: f32,
    pub max_life: f32,
    pub radius: f32,
    pub opacity: f32,
}

impl Smoke {
    #[inline]
    pub fn life_frac(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// Unordered free-list pool. The pool itself is unbounded; live-entity caps are
/// enforced by whoever spawns, not here. A pool miss simply allocates fresh.
pub struct Pool<T: Default> {
    free: Vec<T>,
}

impl<T: Default> Pool<T> {
    pub fn new() -> Self {
        Self { free: Vec::new() }
    }

    /// Take a record off the free list and reset it in place, allocating a
    /// fresh default only when the pool is empty. The record handed back is
    /// always fully reset.
    pub fn acquire(&mut self) -> T {
        match self.free.pop() {
            Some(mut t) => {
                Self::reset(&mut t);
                t
            }
            None => T::default(),
        }
    }

    /// Overwrite a recycled record with default field values
    fn reset(slot: &mut T) {
        *slot = T::default();
    }

    /// Return a record to the free list
    pub fn release(&mut self, t: T) {
        self.free.push(t);
    }

    /// Number of records available for reuse
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

impl<T: Default> Default for Pool<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_recycles() {
        let mut pool: Pool<Particle> = Pool::new();
        assert_eq!(pool.available(), 0);
        let p = pool.acquire();
        pool.release(p);
        assert_eq!(pool.available(), 1);
        let _ = pool.acquire();
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_reacquired_record_has_no_stale_fields() {
        let mut pool: Pool<Particle> = Pool::new();
        let mut p = pool.acquire();
        p.life = 3.0;
        p.max_life = 80.0;
        p.kind = ParticleKind::Crackle;
        p.body.vx = 999.0;
        p.heat = 0.5;
        pool.release(p);

        let q = pool.acquire();
        assert_eq!(q.life, 0.0);
        assert_eq!(q.max_life, 1.0);
        assert_eq!(q.kind, ParticleKind::Spark);
        assert_eq!(q.body.vx, 0.0);
        assert_eq!(q.heat, 0.0);
    }

    #[test]
    fn test_acquire_prefers_released_records() {
        let mut pool: Pool<Smoke> = Pool::new();
        for _ in 0..3 {
            pool.release(Smoke {
                radius: 9.0,
                ..Smoke::default()
            });
        }
        // The three free slots are consumed first, each handed back reset
        for _ in 0..3 {
            let s = pool.acquire();
            assert_eq!(s.radius, 0.0);
        }
        assert_eq!(pool.available(), 0);
        // Empty pool falls back to fresh allocation
        let _ = pool.acquire();
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn test_life_frac_clamped() {
        let mut p = Particle::default();
        p.max_life = 60.0;
        p.life = 60.0;
        assert_eq!(p.life_frac(), 1.0);
        p.life = -5.0;
        assert_eq!(p.life_frac(), 0.0);
    }
}
