//! Renderer
//!
//! Redraws the full live entity set once per tick. Instead of a hard clear,
//! each frame partially fades the previous one, which is what produces the
//! trailing light streaks. Everything bright is drawn additively so
//! overlapping sparks intensify; smoke goes through a separate plain-alpha
//! path. Glow and draw rates degrade with quality before anything visible
//! disappears.

use crate::display::PixelBuffer;
use crate::entity::ParticleKind;
use crate::show::{Show, ShowState};
use crate::util::hsv_to_rgb;

/// Glow halo intensity for rocket heads
const ROCKET_GLOW_INTENSITY: f32 = 0.38;
/// Glow halo intensity for large particles
const PARTICLE_GLOW_INTENSITY: f32 = 0.20;
/// Particles at least this large get a halo (when quality allows it)
const GLOW_SIZE_THRESHOLD: f32 = 2.4;
/// Smoke tint
const SMOKE_RGB: (u8, u8, u8) = (72, 76, 84);

impl Show {
    /// Draw the current state into the buffer. Call once per `tick`.
    pub fn render(&mut self, buf: &mut PixelBuffer) {
        if !self.enabled {
            return;
        }
        if self.pending_clear {
            buf.clear(0, 0, 0);
            self.pending_clear = false;
        }
        // Hosts may keep presenting while paused; the last frame stays intact
        if self.state != ShowState::Running {
            return;
        }

        let q = self.quality.value();
        // More aggressive clearing under load cuts overdraw cost
        let fade_alpha = (self.tuning.fade_base + (1.0 - q) * self.tuning.fade_load_boost)
            .clamp(self.tuning.fade_min, self.tuning.fade_max);
        buf.fade(1.0 - fade_alpha);

        let glow_scale = q * self.quality.resolution_scale() * if self.narrow() { 0.5 } else { 1.0 };

        self.draw_rockets(buf, q, glow_scale);
        self.draw_particles(buf, q, glow_scale);
        self.draw_smoke(buf, q);
    }

    fn draw_rockets(&self, buf: &mut PixelBuffer, q: f32, glow_scale: f32) {
        let glow = q >= self.tuning.rocket_glow_quality;
        for r in &self.rockets {
            let (cr, cg, cb) = hsv_to_rgb(r.hue, 0.45, 0.95);
            // Tail streak from the previous position
            buf.line_additive(
                r.body.px as i32,
                r.body.py as i32,
                r.body.x as i32,
                r.body.y as i32,
                (cr as f32 * 0.8) as u8,
                (cg as f32 * 0.8) as u8,
                (cb as f32 * 0.8) as u8,
            );
            buf.blend_pixel_additive(r.body.x as i32, r.body.y as i32, cr, cg, cb);
            if glow {
                buf.soft_disc_additive(
                    r.body.x,
                    r.body.y,
                    3.2 * glow_scale,
                    cr,
                    cg,
                    cb,
                    ROCKET_GLOW_INTENSITY,
                );
            }
        }
    }

    fn draw_particles(&self, buf: &mut PixelBuffer, q: f32, glow_scale: f32) {
        let glow_ok = q >= self.tuning.particle_glow_quality;
        let t = self.clock_ms * 0.02;
        for p in &self.particles {
            let life = p.life_frac();
            // Sinusoidal twinkle so sparks flicker instead of fading linearly
            let twinkle = 1.0 - p.twinkle_amp * 0.5 + p.twinkle_amp * 0.5 * (p.twinkle_phase + t).sin();
            let brightness = (life * twinkle).clamp(0.0, 1.0);
            if brightness <= 0.01 {
                continue;
            }

            let (sat, val) = match p.kind {
                // Comets cool from white-hot toward their hue as heat decays
                ParticleKind::Comet => (0.85 * (1.0 - p.heat * 0.7), 0.75 + 0.25 * p.heat),
                ParticleKind::Ember => (0.9, 0.85),
                _ => (0.95, 1.0),
            };
            let (cr, cg, cb) = hsv_to_rgb(p.hue, sat, val * brightness);

            let streak = p.kind == ParticleKind::Comet || p.body.speed() > self.tuning.streak_speed;
            if streak {
                buf.line_additive(
                    p.body.px as i32,
                    p.body.py as i32,
                    p.body.x as i32,
                    p.body.y as i32,
                    cr,
                    cg,
                    cb,
                );
            } else {
                // Filled square: cheaper than an arc, no visible difference
                buf.fill_square_additive(
                    p.body.x as i32,
                    p.body.y as i32,
                    p.size.round().max(1.0) as i32,
                    cr,
                    cg,
                    cb,
                );
            }

            if glow_ok && p.size >= GLOW_SIZE_THRESHOLD {
                buf.soft_disc_additive(
                    p.body.x,
                    p.body.y,
                    p.size * 2.0 * glow_scale,
                    cr,
                    cg,
                    cb,
                    PARTICLE_GLOW_INTENSITY * brightness,
                );
            }
        }
    }

    fn draw_smoke(&self, buf: &mut PixelBuffer, q: f32) {
        // Under load smoke draws on alternating frames (matching its update rate)
        if q < self.tuning.smoke_half_rate_quality && self.frame % 2 != 0 {
            return;
        }
        for s in &self.smoke {
            let life = s.life_frac();
            // Radius grows as the puff ages while opacity thins out
            let radius = s.radius * (1.0 + (1.0 - life) * 0.6);
            let alpha = s.opacity * life;
            buf.soft_disc_blend(s.body.x, s.body.y, radius, SMOKE_RGB.0, SMOKE_RGB.1, SMOKE_RGB.2, alpha);
        }
    }
}
