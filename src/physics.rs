//! Physics integrator
//!
//! One update rule for everything that flies: quadratic drag applied per axis,
//! a horizontal wind term, and constant gravity. Rockets and particles go
//! through the same path; only the per-instance multipliers differ.

use crate::config::Tuning;
use crate::entity::Body;

/// Per-entity force inputs for one integration step
#[derive(Debug, Clone, Copy)]
pub struct Forces {
    /// Horizontal wind acceleration (ambient for particles, captured at launch for rockets)
    pub wind: f32,
    pub drag_mul: f32,
    pub gravity_mul: f32,
    pub wind_mul: f32,
}

impl Forces {
    /// Uniform forces with no per-instance variety (rockets)
    pub fn uniform(wind: f32) -> Self {
        Self {
            wind,
            drag_mul: 1.0,
            gravity_mul: 1.0,
            wind_mul: 1.0,
        }
    }
}

/// Advance one body by `dt` seconds. Caller is responsible for clamping `dt`
/// to the stability ceiling before integrating.
pub fn step(body: &mut Body, dt: f32, tuning: &Tuning, forces: &Forces) {
    let drag = tuning.drag * forces.drag_mul;

    let ax = -drag * body.vx * body.vx.abs() + forces.wind * forces.wind_mul;
    let ay = -drag * body.vy * body.vy.abs() + tuning.gravity * forces.gravity_mul;

    body.vx += ax * dt;
    body.vy += ay * dt;

    body.px = body.x;
    body.py = body.y;
    body.x += body.vx * dt;
    body.y += body.vy * dt;
}
