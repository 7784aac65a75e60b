//! Tuning configuration
//!
//! All perceptual constants of the simulation live here so a show can be
//! re-tuned from a JSON file without recompiling. Missing fields fall back to
//! the defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // Physics
    /// Downward acceleration in px/s^2
    pub gravity: f32,
    /// Quadratic drag coefficient
    pub drag: f32,
    /// Per-tick time step ceiling in seconds
    pub max_dt: f32,
    /// Ambient wind acceleration sampled from [-wind_spread, wind_spread]
    pub wind_spread: f32,

    // Live-entity capacities at quality 1.0 (scaled down under load)
    pub particle_cap: usize,
    pub rocket_cap: usize,
    pub smoke_cap: usize,

    // Trail fade (partial clear per frame)
    pub fade_base: f32,
    pub fade_load_boost: f32,
    pub fade_min: f32,
    pub fade_max: f32,

    // Renderer thresholds
    /// Particles faster than this render as motion streaks (px/s)
    pub streak_speed: f32,
    /// Glow on rocket heads only at or above this quality
    pub rocket_glow_quality: f32,
    /// Glow on particles only at or above this quality
    pub particle_glow_quality: f32,
    /// Below this quality, smoke steps and draws on alternating frames
    pub smoke_half_rate_quality: f32,
    /// Surfaces narrower than this get halved glow and slower launches
    pub narrow_width: f32,

    // Autonomous launch scheduling (milliseconds)
    pub launch_base_ms: f32,
    pub launch_base_narrow_ms: f32,

    // Click debounce windows (milliseconds of simulation time)
    pub click_ignore_start_ms: f32,
    pub click_ignore_resume_ms: f32,

    // Burst extras
    /// Chance of a smoke puff accompanying a burst, scaled by quality
    pub smoke_chance: f32,
    /// Chance of a delayed secondary sub-burst, scaled by quality
    pub sub_burst_chance: f32,
    pub sub_burst_min_delay_ms: f32,
    pub sub_burst_max_delay_ms: f32,

    // Sound effects
    /// Minimum spacing between pop sounds (milliseconds)
    pub sfx_min_gap_ms: f32,
    /// Number of pop sound assets played round-robin
    pub sfx_asset_count: usize,

    // Celebration bursts fired by start() at these offsets (milliseconds)
    pub celebrate_offsets_ms: [f32; 3],
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 650.0,
            drag: 0.0009,
            max_dt: 0.033,
            wind_spread: 28.0,

            particle_cap: 560,
            rocket_cap: 4,
            smoke_cap: 28,

            fade_base: 0.26,
            fade_load_boost: 0.10,
            fade_min: 0.22,
            fade_max: 0.38,

            streak_speed: 240.0,
            rocket_glow_quality: 0.72,
            particle_glow_quality: 0.70,
            smoke_half_rate_quality: 0.92,
            narrow_width: 720.0,

            launch_base_ms: 1050.0,
            launch_base_narrow_ms: 1600.0,

            click_ignore_start_ms: 600.0,
            click_ignore_resume_ms: 250.0,

            smoke_chance: 0.85,
            sub_burst_chance: 0.45,
            sub_burst_min_delay_ms: 70.0,
            sub_burst_max_delay_ms: 140.0,

            sfx_min_gap_ms: 120.0,
            sfx_asset_count: 3,

            celebrate_offsets_ms: [90.0, 170.0, 240.0],
        }
    }
}

impl Tuning {
    /// Save tuning to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, json).map_err(|e| e.to_string())
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let json = fs::read_to_string(path).map_err(|e| e.to_string())?;
        serde_json::from_str(&json).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let t: Tuning = serde_json::from_str(r#"{"gravity": 900.0}"#).unwrap();
        assert_eq!(t.gravity, 900.0);
        assert_eq!(t.particle_cap, Tuning::default().particle_cap);
        assert_eq!(t.fade_base, Tuning::default().fade_base);
    }

    #[test]
    fn test_round_trip() {
        let t = Tuning::default();
        let json = serde_json::to_string(&t).unwrap();
        let back: Tuning = serde_json::from_str(&json).unwrap();
        assert_eq!(back.launch_base_ms, t.launch_base_ms);
        assert_eq!(back.celebrate_offsets_ms, t.celebrate_offsets_ms);
    }
}
