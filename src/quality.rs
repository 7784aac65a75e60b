//! Quality Governor
//!
//! Tracks a smoothed FPS estimate and derives a single quality scalar in
//! [0.55, 1.0] that scales everything expensive: particle caps, glow strength,
//! resolution scale, and launch cadence. Quality moves toward its target slowly
//! so the picture never visibly oscillates between quality levels.

/// Quality floor; below this the effect looks broken, so we never go lower
pub const QUALITY_MIN: f32 = 0.55;
pub const QUALITY_MAX: f32 = 1.0;

/// EMA smoothing for the instantaneous FPS signal
const FPS_SMOOTHING: f32 = 0.08;
/// Damping applied when moving live quality toward its target
const QUALITY_SMOOTHING: f32 = 0.045;
/// Target quality is recomputed at most this often (ms)
const RETUNE_INTERVAL_MS: f32 = 220.0;
/// Resolution scale is re-derived at most this often (ms); changing it is expensive
const RESCALE_INTERVAL_MS: f32 = 1200.0;
/// Frame deltas outside this window (ms) are treated as outliers
const DELTA_MIN_MS: f32 = 6.0;
const DELTA_MAX_MS: f32 = 120.0;

pub struct QualityGovernor {
    fps_ema: f32,
    quality: f32,
    target: f32,
    retune_elapsed_ms: f32,
    rescale_elapsed_ms: f32,
    resolution_scale: f32,
}

/// Map a smoothed FPS reading to a quality target
pub fn quality_from_fps(fps: f32) -> f32 {
    (fps.min(62.0) / 60.0).powf(0.78).clamp(QUALITY_MIN, QUALITY_MAX)
}

impl QualityGovernor {
    pub fn new() -> Self {
        Self {
            fps_ema: 60.0,
            quality: QUALITY_MAX,
            target: QUALITY_MAX,
            retune_elapsed_ms: 0.0,
            rescale_elapsed_ms: 0.0,
            resolution_scale: 1.0,
        }
    }

    /// Reset smoothing to a neutral state (used by start/resume so a long
    /// absence does not read as a performance collapse)
    pub fn reset(&mut self) {
        self.fps_ema = 60.0;
        self.quality = QUALITY_MAX;
        self.target = QUALITY_MAX;
        self.retune_elapsed_ms = 0.0;
        self.rescale_elapsed_ms = 0.0;
    }

    /// Feed the wall-clock delta since the previous tick
    pub fn tick(&mut self, delta_ms: f32) {
        let clamped = delta_ms.clamp(DELTA_MIN_MS, DELTA_MAX_MS);
        let instant_fps = 1000.0 / clamped;
        self.fps_ema += (instant_fps - self.fps_ema) * FPS_SMOOTHING;

        self.retune_elapsed_ms += delta_ms;
        if self.retune_elapsed_ms >= RETUNE_INTERVAL_MS {
            self.retune_elapsed_ms = 0.0;
            self.target = quality_from_fps(self.fps_ema);
            self.quality += (self.target - self.quality) * QUALITY_SMOOTHING;
            self.quality = self.quality.clamp(QUALITY_MIN, QUALITY_MAX);
        }

        self.rescale_elapsed_ms += delta_ms;
        if self.rescale_elapsed_ms >= RESCALE_INTERVAL_MS {
            self.rescale_elapsed_ms = 0.0;
            self.resolution_scale = (0.68 + 0.32 * self.quality).min(1.0);
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.quality
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps_ema
    }

    /// Display-resolution scale cap derived from quality (re-derived slowly)
    #[inline]
    pub fn resolution_scale(&self) -> f32 {
        self.resolution_scale
    }
}

impl Default for QualityGovernor {
    fn default() -> Self {
        Self::new()
    }
}
