//! Burst Generator
//!
//! Turns a detonation point, hue, and pattern into a batch of particles,
//! clipped so the live particle count never exceeds the adaptive capacity.
//! Patterns compute an intended count first and admit `min(intended,
//! headroom)`; requests beyond capacity are silently dropped.

use std::f32::consts::TAU;

use crate::entity::{Body, Particle, ParticleKind};
use crate::show::{ScheduledBurst, Show};
use crate::util::Rng;

// Sphere ("peony")
const SPHERE_COUNT: (usize, usize) = (110, 160);
const SPHERE_SPEED: (f32, f32) = (280.0, 700.0);
const SPHERE_LIFE: (f32, f32) = (52.0, 92.0);
const SPHERE_HUE_JITTER: f32 = 10.0;
const SPHERE_COMET_RATIO: f32 = 0.10;
// Glitter pass riding on every sphere
const GLITTER_COUNT: (usize, usize) = (26, 52);
const GLITTER_SPEED: (f32, f32) = (80.0, 220.0);
const GLITTER_LIFE: (f32, f32) = (70.0, 110.0);
const GLITTER_HUE_JITTER: f32 = 6.0;

// Ring
const RING_COUNT: (usize, usize) = (90, 130);
const RING_SPEED: (f32, f32) = (360.0, 640.0);
const RING_LIFE: (f32, f32) = (56.0, 86.0);
const RING_JITTER_RAD: (f32, f32) = (0.08, 0.18);
const RING_CORE_COUNT: (usize, usize) = (18, 34);
const RING_CORE_SPEED: (f32, f32) = (80.0, 180.0);

// Radial arms ("palm")
const PALM_ARMS: (usize, usize) = (6, 10);
const PALM_PER_ARM: (usize, usize) = (14, 20);
const PALM_SPEED: (f32, f32) = (280.0, 680.0);
const PALM_ANGLE_SPREAD: f32 = 0.12;
const PALM_LIFE_BASE: (f32, f32) = (50.0, 72.0);

// Crackle
const CRACKLE_COUNT: (usize, usize) = (90, 140);
const CRACKLE_SPEED: (f32, f32) = (220.0, 620.0);
const CRACKLE_LIFE: (f32, f32) = (55.0, 90.0);
const CRACKLE_TIMER: (f32, f32) = (0.02, 0.07);

/// Spatial distribution of a burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BurstPattern {
    /// Uniform sphere with a glitter pass
    #[default]
    Sphere,
    /// Evenly spaced annulus with a faint slow core
    Ring,
    /// Radial comet arms
    Palm,
    /// Crackling sphere that keeps spitting micro-sparks
    Crackle,
}

impl BurstPattern {
    pub fn random(rng: &mut Rng) -> Self {
        match rng.range_usize(0, 4) {
            0 => Self::Sphere,
            1 => Self::Ring,
            2 => Self::Palm,
            _ => Self::Crackle,
        }
    }
}

impl Show {
    /// Detonate at a point. Spawns the pattern's particles (clipped to
    /// headroom), requests a pop sound, and probabilistically adds smoke and a
    /// delayed secondary sub-burst.
    pub fn explode_at(&mut self, x: f32, y: f32, hue: f32, pattern: BurstPattern) {
        match pattern {
            BurstPattern::Sphere => self.spawn_sphere(x, y, hue),
            BurstPattern::Ring => self.spawn_ring(x, y, hue),
            BurstPattern::Palm => self.spawn_palm(x, y, hue),
            BurstPattern::Crackle => self.spawn_crackle(x, y, hue),
        }

        let now = self.clock_ms;
        self.sfx.request_pop(now, &mut self.rng);

        let q = self.quality.value();
        if self.rng.chance(self.tuning.smoke_chance * q) {
            self.spawn_smoke(x, y);
        }
        if self.particle_headroom() > 24 && self.rng.chance(self.tuning.sub_burst_chance * q) {
            let delay = self
                .rng
                .range_f32(self.tuning.sub_burst_min_delay_ms, self.tuning.sub_burst_max_delay_ms);
            let event = ScheduledBurst {
                due_ms: now + delay,
                x: x + self.rng.jitter(24.0),
                y: y + self.rng.jitter(18.0),
                hue: hue + self.rng.jitter(14.0),
                pattern: BurstPattern::Sphere,
                smoke_chance: 0.5,
            };
            self.scheduled.push(event);
        }
    }

    /// Build one burst particle with the shared per-instance variety
    fn make_particle(&mut self, x: f32, y: f32, angle: f32, speed: f32, life: f32, hue: f32, kind: ParticleKind) -> Particle {
        let mut p = self.particle_pool.acquire();
        p.body = Body::at(x, y);
        p.body.vx = angle.cos() * speed;
        p.body.vy = angle.sin() * speed;
        p.max_life = life;
        p.life = life;
        p.hue = hue;
        p.kind = kind;
        p.size = match kind {
            ParticleKind::Comet => self.rng.range_f32(2.4, 3.4),
            ParticleKind::Ember => self.rng.range_f32(1.4, 2.2),
            _ => self.rng.range_f32(1.6, 2.8),
        };
        p.drag_mul = self.rng.range_f32(0.92, 1.10);
        p.gravity_mul = self.rng.range_f32(0.88, 1.08);
        p.wind_mul = self.rng.range_f32(0.85, 1.15);
        p.twinkle_phase = self.rng.angle();
        p.twinkle_amp = self.rng.range_f32(0.15, 0.55);
        if kind == ParticleKind::Comet {
            p.heat = 1.0;
        }
        if kind == ParticleKind::Crackle {
            p.crackle_timer = self.rng.range_f32(CRACKLE_TIMER.0, CRACKLE_TIMER.1);
        }
        p
    }

    fn spawn_sphere(&mut self, x: f32, y: f32, hue: f32) {
        let intended = self.rng.range_usize(SPHERE_COUNT.0, SPHERE_COUNT.1 + 1);
        let admitted = intended.min(self.particle_headroom());
        for _ in 0..admitted {
            let angle = self.rng.angle();
            let speed = self.rng.range_f32(SPHERE_SPEED.0, SPHERE_SPEED.1)
                * (1.0 + self.rng.jitter(0.15));
            let life = self.rng.range_f32(SPHERE_LIFE.0, SPHERE_LIFE.1);
            let h = hue + self.rng.jitter(SPHERE_HUE_JITTER);
            let kind = if self.rng.chance(SPHERE_COMET_RATIO) {
                ParticleKind::Comet
            } else {
                ParticleKind::Spark
            };
            let p = self.make_particle(x, y, angle, speed, life, h, kind);
            self.particles.push(p);
        }

        // Slower glitter pass
        let intended = self.rng.range_usize(GLITTER_COUNT.0, GLITTER_COUNT.1 + 1);
        let admitted = intended.min(self.particle_headroom());
        for _ in 0..admitted {
            let angle = self.rng.angle();
            let speed = self.rng.range_f32(GLITTER_SPEED.0, GLITTER_SPEED.1);
            let life = self.rng.range_f32(GLITTER_LIFE.0, GLITTER_LIFE.1);
            let h = hue + self.rng.jitter(GLITTER_HUE_JITTER);
            let p = self.make_particle(x, y, angle, speed, life, h, ParticleKind::Ember);
            self.particles.push(p);
        }
    }

    fn spawn_ring(&mut self, x: f32, y: f32, hue: f32) {
        let intended = self.rng.range_usize(RING_COUNT.0, RING_COUNT.1 + 1);
        let admitted = intended.min(self.particle_headroom());
        if admitted == 0 {
            return;
        }
        // Spacing stays even across however many particles were admitted
        let step = TAU / admitted as f32;
        let jitter = self.rng.range_f32(RING_JITTER_RAD.0, RING_JITTER_RAD.1);
        let base_speed = self.rng.range_f32(RING_SPEED.0, RING_SPEED.1);
        for i in 0..admitted {
            let angle = i as f32 * step + self.rng.jitter(jitter);
            let speed = base_speed * (1.0 + self.rng.jitter(0.06));
            let life = self.rng.range_f32(RING_LIFE.0, RING_LIFE.1);
            let h = hue + self.rng.jitter(SPHERE_HUE_JITTER);
            let p = self.make_particle(x, y, angle, speed, life, h, ParticleKind::Spark);
            self.particles.push(p);
        }

        // Faint slow core glow
        let intended = self.rng.range_usize(RING_CORE_COUNT.0, RING_CORE_COUNT.1 + 1);
        let admitted = intended.min(self.particle_headroom());
        for _ in 0..admitted {
            let angle = self.rng.angle();
            let speed = self.rng.range_f32(RING_CORE_SPEED.0, RING_CORE_SPEED.1);
            let life = self.rng.range_f32(GLITTER_LIFE.0, GLITTER_LIFE.1);
            let p = self.make_particle(x, y, angle, speed, life, hue, ParticleKind::Ember);
            self.particles.push(p);
        }
    }

    fn spawn_palm(&mut self, x: f32, y: f32, hue: f32) {
        let arms = self.rng.range_usize(PALM_ARMS.0, PALM_ARMS.1 + 1);
        let per_arm = self.rng.range_usize(PALM_PER_ARM.0, PALM_PER_ARM.1 + 1);
        let mut remaining = (arms * per_arm).min(self.particle_headroom());

        'arms: for arm in 0..arms {
            let base_angle = arm as f32 / arms as f32 * TAU + self.rng.jitter(0.05);
            let arm_speed = self.rng.range_f32(PALM_SPEED.0, PALM_SPEED.1);
            for i in 0..per_arm {
                if remaining == 0 {
                    break 'arms;
                }
                remaining -= 1;
                // Progression along the arm: faster and longer-lived toward the tip
                let t = i as f32 / (per_arm - 1).max(1) as f32;
                let angle = base_angle + self.rng.jitter(PALM_ANGLE_SPREAD);
                let speed = arm_speed * (0.8 + 0.4 * t);
                let life = self.rng.range_f32(PALM_LIFE_BASE.0, PALM_LIFE_BASE.1) + t * 24.0;
                let h = hue + self.rng.jitter(SPHERE_HUE_JITTER);
                let p = self.make_particle(x, y, angle, speed, life, h, ParticleKind::Comet);
                self.particles.push(p);
            }
        }
    }

    fn spawn_crackle(&mut self, x: f32, y: f32, hue: f32) {
        let intended = self.rng.range_usize(CRACKLE_COUNT.0, CRACKLE_COUNT.1 + 1);
        let admitted = intended.min(self.particle_headroom());
        for _ in 0..admitted {
            let angle = self.rng.angle();
            let speed = self.rng.range_f32(CRACKLE_SPEED.0, CRACKLE_SPEED.1);
            let life = self.rng.range_f32(CRACKLE_LIFE.0, CRACKLE_LIFE.1);
            let h = hue + self.rng.jitter(SPHERE_HUE_JITTER);
            let p = self.make_particle(x, y, angle, speed, life, h, ParticleKind::Crackle);
            self.particles.push(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Tuning;
    use crate::show::StartOptions;

    fn show_with_cap(cap: usize) -> Show {
        let mut tuning = Tuning::default();
        tuning.particle_cap = cap;
        let mut show = Show::with_seed(800.0, 600.0, tuning, false, 0xBEEF);
        show.start(StartOptions { celebrate: false });
        show
    }

    #[test]
    fn test_burst_never_exceeds_capacity() {
        let mut show = show_with_cap(200);
        for _ in 0..10 {
            show.explode_at(400.0, 300.0, 120.0, BurstPattern::Sphere);
            let (_, particles, _) = show.live_counts();
            assert!(particles <= show.particle_cap());
        }
    }

    #[test]
    fn test_headroom_clipping_is_exact() {
        // Ring intends 90-130 primaries; with headroom 50 exactly 50 are created
        let mut show = show_with_cap(50);
        show.explode_at(400.0, 300.0, 200.0, BurstPattern::Ring);
        let (_, particles, _) = show.live_counts();
        assert_eq!(particles, 50);
    }

    #[test]
    fn test_zero_headroom_creates_nothing() {
        let mut show = show_with_cap(120);
        show.explode_at(400.0, 300.0, 30.0, BurstPattern::Sphere);
        let before = show.live_counts().1;
        assert!(before >= 110);
        // Fill to the brim, then ask again
        while show.particle_headroom() > 0 {
            show.explode_at(400.0, 300.0, 30.0, BurstPattern::Sphere);
        }
        let full = show.live_counts().1;
        show.explode_at(400.0, 300.0, 30.0, BurstPattern::Crackle);
        assert_eq!(show.live_counts().1, full);
    }

    #[test]
    fn test_ring_spacing_even_across_admitted() {
        let mut show = show_with_cap(2000);
        show.explode_at(400.0, 300.0, 60.0, BurstPattern::Ring);

        // Primary annulus particles are the fast ones; the slow core is well
        // below the annulus speed band
        let mut angles: Vec<f32> = show
            .particles
            .iter()
            .filter(|p| p.body.speed() > 250.0)
            .map(|p| p.body.vy.atan2(p.body.vx).rem_euclid(TAU))
            .collect();
        assert!(angles.len() >= RING_COUNT.0);
        angles.sort_by(|a, b| a.partial_cmp(b).unwrap());

        let n = angles.len();
        let expected = TAU / n as f32;
        // Per-particle angular jitter is at most RING_JITTER_RAD.1 each way
        let slack = 2.0 * RING_JITTER_RAD.1 + 0.02;
        for i in 0..n {
            let next = angles[(i + 1) % n] + if i + 1 == n { TAU } else { 0.0 };
            let gap = next - angles[i];
            assert!(
                (gap - expected).abs() <= slack,
                "uneven ring gap {} (expected ~{})",
                gap,
                expected
            );
        }
    }

    #[test]
    fn test_sphere_mixes_comets_and_glitter() {
        let mut show = show_with_cap(2000);
        show.explode_at(400.0, 300.0, 10.0, BurstPattern::Sphere);
        let comets = show.particles.iter().filter(|p| p.kind == ParticleKind::Comet).count();
        let embers = show.particles.iter().filter(|p| p.kind == ParticleKind::Ember).count();
        assert!(comets > 0, "sphere should tag some primaries as comets");
        assert!((GLITTER_COUNT.0..=GLITTER_COUNT.1).contains(&embers));
    }

    #[test]
    fn test_palm_particles_are_comets_with_progressive_life() {
        let mut show = show_with_cap(2000);
        show.explode_at(400.0, 300.0, 40.0, BurstPattern::Palm);
        assert!(!show.particles.is_empty());
        assert!(show.particles.iter().all(|p| p.kind == ParticleKind::Comet));
        let max_life = show.particles.iter().map(|p| p.max_life).fold(0.0, f32::max);
        let min_life = show.particles.iter().map(|p| p.max_life).fold(f32::MAX, f32::min);
        assert!(max_life > min_life, "arm tips should outlive arm roots");
    }

    #[test]
    fn test_crackle_particles_carry_timers() {
        let mut show = show_with_cap(2000);
        show.explode_at(400.0, 300.0, 300.0, BurstPattern::Crackle);
        assert!(show
            .particles
            .iter()
            .all(|p| p.kind == ParticleKind::Crackle
                && p.crackle_timer >= CRACKLE_TIMER.0
                && p.crackle_timer <= CRACKLE_TIMER.1));
    }

    #[test]
    fn test_burst_particles_start_at_full_life() {
        let mut show = show_with_cap(2000);
        show.explode_at(100.0, 100.0, 0.0, BurstPattern::Sphere);
        assert!(show.particles.iter().all(|p| p.life == p.max_life));
    }
}
