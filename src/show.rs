//! Show context and lifecycle
//!
//! All mutable simulation state lives in one `Show` object: pools, live
//! collections, quality governor, ambient wind, the scheduled-event queue, and
//! the lifecycle state machine. The host drives it with `tick(dt)` and
//! `render(buffer)` once per frame; everything else is an explicit operation.
//!
//! If the context is constructed against a zero-area surface or with a
//! reduced-motion preference, it is permanently disabled and every public
//! operation becomes a harmless no-op.

use crate::burst::BurstPattern;
use crate::config::Tuning;
use crate::entity::{Body, Particle, ParticleKind, Pool, Rocket, Smoke};
use crate::physics::{self, Forces};
use crate::quality::{QualityGovernor, QUALITY_MAX, QUALITY_MIN};
use crate::sfx::{SfxCommand, SfxQueue};
use crate::util::{lerp, Rng};

const DEFAULT_SEED: u64 = 0x5B1A57;
/// Rockets detonate once they have slowed to this vertical speed near apex
const APEX_STALL_VY: f32 = -40.0;
/// Entities this far outside the surface are retired
const OFFSCREEN_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowState {
    Stopped,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy)]
pub struct StartOptions {
    /// Fire three preset celebratory bursts shortly after start
    pub celebrate: bool,
}

impl Default for StartOptions {
    fn default() -> Self {
        Self { celebrate: true }
    }
}

/// A burst queued for future delivery on the simulation clock. Replaces the
/// timer-callback approach: the queue is drained each tick, so "is the show
/// still running" is an ordinary guard instead of a captured-closure check.
#[derive(Debug, Clone)]
pub(crate) struct ScheduledBurst {
    pub due_ms: f32,
    pub x: f32,
    pub y: f32,
    pub hue: f32,
    pub pattern: BurstPattern,
    pub smoke_chance: f32,
}

pub struct Show {
    pub(crate) state: ShowState,
    pub(crate) enabled: bool,
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) tuning: Tuning,
    pub(crate) rng: Rng,
    pub(crate) quality: QualityGovernor,
    /// Ambient horizontal wind acceleration, sampled on start / blended on resume
    pub(crate) wind: f32,
    /// Simulation clock in ms; advances only while running
    pub(crate) clock_ms: f32,
    pub(crate) frame: u64,

    pub(crate) rockets: Vec<Rocket>,
    pub(crate) particles: Vec<Particle>,
    pub(crate) smoke: Vec<Smoke>,
    pub(crate) rocket_pool: Pool<Rocket>,
    pub(crate) particle_pool: Pool<Particle>,
    pub(crate) smoke_pool: Pool<Smoke>,

    pub(crate) scheduled: Vec<ScheduledBurst>,
    pub(crate) sfx: SfxQueue,

    pub(crate) launch_timer_ms: f32,
    pub(crate) click_ignore_until_ms: f32,
    /// Render performs one full clear on the next frame
    pub(crate) pending_clear: bool,
}

impl Show {
    /// Create a show context. A zero-area surface or an active reduced-motion
    /// preference disables the context for its whole lifetime.
    pub fn new(width: f32, height: f32, tuning: Tuning, reduced_motion: bool) -> Self {
        Self::with_seed(width, height, tuning, reduced_motion, DEFAULT_SEED)
    }

    /// Like `new` but with an explicit RNG seed (reproducible shows)
    pub fn with_seed(
        width: f32,
        height: f32,
        tuning: Tuning,
        reduced_motion: bool,
        seed: u64,
    ) -> Self {
        let enabled = width > 0.0 && height > 0.0 && !reduced_motion;
        let sfx = SfxQueue::new(tuning.sfx_asset_count, tuning.sfx_min_gap_ms);
        Self {
            state: ShowState::Stopped,
            enabled,
            width,
            height,
            tuning,
            rng: Rng::new(seed),
            quality: QualityGovernor::new(),
            wind: 0.0,
            clock_ms: 0.0,
            frame: 0,
            rockets: Vec::new(),
            particles: Vec::new(),
            smoke: Vec::new(),
            rocket_pool: Pool::new(),
            particle_pool: Pool::new(),
            smoke_pool: Pool::new(),
            scheduled: Vec::new(),
            sfx,
            launch_timer_ms: 0.0,
            click_ignore_until_ms: 0.0,
            pending_clear: false,
        }
    }

    // ========================================================================
    // Observers
    // ========================================================================

    pub fn state(&self) -> ShowState {
        self.state
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn quality(&self) -> f32 {
        self.quality.value()
    }

    /// Smoothed FPS estimate feeding the quality governor
    pub fn fps(&self) -> f32 {
        self.quality.fps()
    }

    pub fn clock_ms(&self) -> f32 {
        self.clock_ms
    }

    pub fn wind(&self) -> f32 {
        self.wind
    }

    /// Live (rockets, particles, smoke puffs)
    pub fn live_counts(&self) -> (usize, usize, usize) {
        (self.rockets.len(), self.particles.len(), self.smoke.len())
    }

    /// Pooled records available for reuse (rockets, particles, smoke puffs)
    pub fn pooled_counts(&self) -> (usize, usize, usize) {
        (
            self.rocket_pool.available(),
            self.particle_pool.available(),
            self.smoke_pool.available(),
        )
    }

    pub(crate) fn narrow(&self) -> bool {
        self.width < self.tuning.narrow_width
    }

    // Adaptive capacities: scaled by quality each time they are read
    pub fn particle_cap(&self) -> usize {
        (self.tuning.particle_cap as f32 * self.quality.value()).round() as usize
    }

    pub fn rocket_cap(&self) -> usize {
        ((self.tuning.rocket_cap as f32 * self.quality.value()).round() as usize).max(1)
    }

    pub fn smoke_cap(&self) -> usize {
        (self.tuning.smoke_cap as f32 * self.quality.value()).round() as usize
    }

    pub(crate) fn particle_headroom(&self) -> usize {
        self.particle_cap().saturating_sub(self.particles.len())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    pub fn start(&mut self, opts: StartOptions) {
        if !self.enabled {
            return;
        }
        self.quality.reset();
        self.wind = self.rng.range_f32(-self.tuning.wind_spread, self.tuning.wind_spread);
        self.clock_ms = 0.0;
        self.frame = 0;
        self.scheduled.clear();
        self.pending_clear = true;
        self.launch_timer_ms = self.next_launch_interval_ms();
        self.click_ignore_until_ms = self.tuning.click_ignore_start_ms;
        self.state = ShowState::Running;

        if opts.celebrate {
            let spots = [
                (self.width * 0.28, self.height * 0.32),
                (self.width * 0.72, self.height * 0.28),
                (self.width * 0.50, self.height * 0.22),
            ];
            for (i, &(x, y)) in spots.iter().enumerate() {
                let hue = self.rng.range_f32(0.0, 360.0);
                let pattern = BurstPattern::random(&mut self.rng);
                self.scheduled.push(ScheduledBurst {
                    due_ms: self.tuning.celebrate_offsets_ms[i],
                    x,
                    y,
                    hue,
                    pattern,
                    // explode_at rolls its own smoke chance on delivery; only
                    // sub-bursts carry an extra independent roll
                    smoke_chance: 0.0,
                });
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state == ShowState::Running {
            self.state = ShowState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if !self.enabled || self.state != ShowState::Paused {
            return;
        }
        // Partially decay wind toward a fresh sample (60/40 blend)
        let fresh = self.rng.range_f32(-self.tuning.wind_spread, self.tuning.wind_spread);
        self.wind = self.wind * 0.6 + fresh * 0.4;
        self.quality.reset();
        self.click_ignore_until_ms = self.clock_ms + self.tuning.click_ignore_resume_ms;
        self.state = ShowState::Running;
    }

    pub fn stop(&mut self) {
        if !self.enabled {
            return;
        }
        self.pause();
        self.state = ShowState::Stopped;
        self.release_all();
        self.scheduled.clear();
        self.pending_clear = true;
    }

    /// Adopt a new surface size (host window resized)
    pub fn resize(&mut self, width: f32, height: f32) {
        if !self.enabled || width <= 0.0 || height <= 0.0 {
            return;
        }
        self.width = width;
        self.height = height;
    }

    fn release_all(&mut self) {
        for r in self.rockets.drain(..) {
            self.rocket_pool.release(r);
        }
        for p in self.particles.drain(..) {
            self.particle_pool.release(p);
        }
        for s in self.smoke.drain(..) {
            self.smoke_pool.release(s);
        }
    }

    // ========================================================================
    // Sound effects
    // ========================================================================

    /// Prime sound playback (platforms requiring a user gesture first)
    pub fn unlock_sfx(&mut self) {
        if !self.enabled {
            return;
        }
        self.sfx.unlock();
    }

    pub fn set_sfx_muted(&mut self, muted: bool) {
        self.sfx.set_muted(muted);
    }

    /// Take pending sound-effect commands for the host to act on
    pub fn drain_sfx(&mut self) -> Vec<SfxCommand> {
        self.sfx.drain()
    }

    // ========================================================================
    // User input
    // ========================================================================

    /// Manual burst request. Accepted whenever the surface has nonzero area;
    /// bypasses the launch scheduler entirely.
    pub fn burst(&mut self, x: Option<f32>, y: Option<f32>) {
        if !self.enabled || self.width <= 0.0 || self.height <= 0.0 {
            return;
        }
        let bx = x.unwrap_or_else(|| self.width * 0.5 + self.rng.jitter(self.width * 0.08));
        let by = y.unwrap_or_else(|| self.height * 0.62 + self.rng.jitter(self.height * 0.05));
        let hue = self.rng.range_f32(0.0, 360.0);
        let pattern = BurstPattern::random(&mut self.rng);
        self.explode_at(bx, by, hue, pattern);
    }

    /// A click on the host surface launches a rocket from the bottom at the
    /// click's horizontal position, but only while running and outside the
    /// post-start / post-resume ignore windows.
    pub fn click(&mut self, x: f32, _y: f32) {
        if !self.enabled || self.state != ShowState::Running {
            return;
        }
        if self.clock_ms < self.click_ignore_until_ms {
            return;
        }
        let x = x.clamp(10.0, self.width - 10.0);
        self.spawn_rocket(x);
        // Quality-scaled chance of a nearby buddy rocket
        if self.rng.chance(0.4 * self.quality.value()) {
            let offset = self.rng.range_f32(36.0, 90.0) * if self.rng.chance(0.5) { 1.0 } else { -1.0 };
            self.spawn_rocket((x + offset).clamp(10.0, self.width - 10.0));
        }
    }

    // ========================================================================
    // Frame drive
    // ========================================================================

    /// Advance the simulation by `dt` seconds of real time. The integrated
    /// step is clamped to the stability ceiling, so a long pause never turns
    /// into one giant physics step.
    pub fn tick(&mut self, dt: f32) {
        if !self.enabled || self.state != ShowState::Running {
            return;
        }
        self.quality.tick(dt * 1000.0);
        let dt = dt.clamp(0.0, self.tuning.max_dt);
        self.clock_ms += dt * 1000.0;
        self.frame += 1;

        self.deliver_due_bursts();
        self.drive_launcher(dt);
        self.update_rockets(dt);
        self.update_particles(dt);
        self.update_smoke(dt);
    }

    fn deliver_due_bursts(&mut self) {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.scheduled.len() {
            if self.scheduled[i].due_ms <= self.clock_ms {
                due.push(self.scheduled.swap_remove(i));
            } else {
                i += 1;
            }
        }
        for ev in due {
            // Queue processing doubles as the still-running guard for delayed bursts
            if self.state != ShowState::Running {
                break;
            }
            self.explode_at(ev.x, ev.y, ev.hue, ev.pattern);
            if self.rng.chance(ev.smoke_chance * self.quality.value()) {
                self.spawn_smoke(ev.x, ev.y);
            }
        }
    }

    fn drive_launcher(&mut self, dt: f32) {
        self.launch_timer_ms -= dt * 1000.0;
        if self.launch_timer_ms > 0.0 {
            return;
        }
        let x = self.rng.range_f32(self.width * 0.15, self.width * 0.85);
        self.spawn_rocket(x);
        self.launch_timer_ms = self.next_launch_interval_ms();
    }

    fn next_launch_interval_ms(&mut self) -> f32 {
        let base = if self.narrow() {
            self.tuning.launch_base_narrow_ms
        } else {
            self.tuning.launch_base_ms
        };
        let t = (self.quality.value() - QUALITY_MIN) / (QUALITY_MAX - QUALITY_MIN);
        let factor = lerp(0.78, 1.0, t);
        base / factor * self.rng.range_f32(1.0, 2.0)
    }

    pub(crate) fn spawn_rocket(&mut self, x: f32) {
        if self.rockets.len() >= self.rocket_cap() {
            return;
        }
        let mut r = self.rocket_pool.acquire();
        let launch_y = self.height + 4.0;
        r.apex_y = self.rng.range_f32(self.height * 0.18, self.height * 0.42);
        // Launch speed chosen so the shell just reaches its apex under gravity
        let climb = (launch_y - r.apex_y).max(1.0);
        let vy = -(2.0 * self.tuning.gravity * climb).sqrt() * self.rng.range_f32(0.98, 1.06);
        r.body = Body::at(x, launch_y);
        r.body.vx = self.rng.jitter(18.0);
        r.body.vy = vy;
        r.hue = self.rng.range_f32(0.0, 360.0);
        r.wind = self.wind;
        r.pattern = BurstPattern::random(&mut self.rng);
        self.rockets.push(r);
    }

    pub(crate) fn spawn_smoke(&mut self, x: f32, y: f32) {
        if self.smoke.len() >= self.smoke_cap() {
            return;
        }
        let mut s = self.smoke_pool.acquire();
        s.body = Body::at(x, y);
        s.body.vx = self.rng.jitter(8.0);
        s.body.vy = -self.rng.range_f32(6.0, 16.0);
        s.max_life = self.rng.range_f32(120.0, 200.0);
        s.life = s.max_life;
        s.radius = self.rng.range_f32(6.0, 12.0);
        s.opacity = self.rng.range_f32(0.16, 0.30);
        self.smoke.push(s);
    }

    fn update_rockets(&mut self, dt: f32) {
        let (w, h) = (self.width, self.height);
        let mut bursts = Vec::new();
        let mut i = 0;
        while i < self.rockets.len() {
            let r = &mut self.rockets[i];
            physics::step(&mut r.body, dt, &self.tuning, &Forces::uniform(r.wind));

            let detonate = !r.exploded && (r.body.y <= r.apex_y || r.body.vy >= APEX_STALL_VY);
            let offscreen = r.body.y > h + OFFSCREEN_MARGIN
                || r.body.x < -OFFSCREEN_MARGIN
                || r.body.x > w + OFFSCREEN_MARGIN;

            if detonate {
                r.exploded = true;
                bursts.push((r.body.x, r.body.y, r.hue, r.pattern));
            }
            if detonate || offscreen {
                let r = self.rockets.swap_remove(i);
                self.rocket_pool.release(r);
            } else {
                i += 1;
            }
        }
        for (x, y, hue, pattern) in bursts {
            self.explode_at(x, y, hue, pattern);
        }
    }

    fn update_particles(&mut self, dt: f32) {
        let (w, h) = (self.width, self.height);
        let q = self.quality.value();
        // Children spawned by crackle particles are collected first, then
        // admitted after the pass so headroom is checked against the live set
        let mut crackle_spawns: Vec<(f32, f32, f32, f32, f32, usize)> = Vec::new();

        let mut i = 0;
        while i < self.particles.len() {
            let p = &mut self.particles[i];
            let forces = Forces {
                wind: self.wind,
                drag_mul: p.drag_mul,
                gravity_mul: p.gravity_mul,
                wind_mul: p.wind_mul,
            };
            physics::step(&mut p.body, dt, &self.tuning, &forces);
            p.life -= 60.0 * dt;

            match p.kind {
                ParticleKind::Crackle => {
                    p.crackle_timer -= dt;
                    if p.crackle_timer <= 0.0 && p.life > 0.0 {
                        let n = if self.rng.chance(q) { 2 } else { 1 };
                        crackle_spawns.push((p.body.x, p.body.y, p.body.vx, p.body.vy, p.hue, n));
                        p.crackle_timer = self.rng.range_f32(0.02, 0.07);
                    }
                }
                ParticleKind::Comet => {
                    p.heat = (p.heat - dt * 1.2).max(0.0);
                }
                _ => {}
            }

            let gone = p.life <= 0.0
                || p.body.x < -OFFSCREEN_MARGIN
                || p.body.x > w + OFFSCREEN_MARGIN
                || p.body.y < -OFFSCREEN_MARGIN
                || p.body.y > h + OFFSCREEN_MARGIN;
            if gone {
                let p = self.particles.swap_remove(i);
                self.particle_pool.release(p);
            } else {
                i += 1;
            }
        }

        for (x, y, vx, vy, hue, n) in crackle_spawns {
            for _ in 0..n {
                // Crackle children only spawn while there is comfortable headroom
                if self.particle_headroom() <= 6 {
                    return;
                }
                let mut p = self.particle_pool.acquire();
                let kick = self.rng.range_f32(40.0, 130.0);
                let a = self.rng.angle();
                p.body = Body::at(x, y);
                p.body.vx = vx * 0.35 + a.cos() * kick;
                p.body.vy = vy * 0.35 + a.sin() * kick;
                p.max_life = self.rng.range_f32(14.0, 26.0);
                p.life = p.max_life;
                p.size = 1.2;
                p.hue = hue + self.rng.jitter(8.0);
                p.twinkle_phase = self.rng.angle();
                p.twinkle_amp = self.rng.range_f32(0.2, 0.5);
                self.particles.push(p);
            }
        }
    }

    fn update_smoke(&mut self, dt: f32) {
        // Under load smoke advances on alternating frames with a doubled step
        let halved = self.quality.value() < self.tuning.smoke_half_rate_quality;
        if halved && self.frame % 2 != 0 {
            return;
        }
        let dt = if halved { dt * 2.0 } else { dt };
        let (w, h) = (self.width, self.height);

        let mut i = 0;
        while i < self.smoke.len() {
            let s = &mut self.smoke[i];
            let damp = (1.0 - 1.6 * dt).max(0.0);
            s.body.vx *= damp;
            s.body.vy = s.body.vy * damp - 10.0 * dt; // gentle buoyant rise
            s.body.px = s.body.x;
            s.body.py = s.body.y;
            s.body.x += s.body.vx * dt;
            s.body.y += s.body.vy * dt;
            s.life -= 60.0 * dt;
            s.radius += 7.0 * dt;

            let gone = s.life <= 0.0
                || s.body.x < -OFFSCREEN_MARGIN
                || s.body.x > w + OFFSCREEN_MARGIN
                || s.body.y < -OFFSCREEN_MARGIN
                || s.body.y > h + OFFSCREEN_MARGIN;
            if gone {
                let s = self.smoke.swap_remove(i);
                self.smoke_pool.release(s);
            } else {
                i += 1;
            }
        }
    }
}
