//! Skyburst: an adaptive fireworks particle show
//!
//! A self-contained simulation core plus a software renderer. The host owns
//! the window and the clock; the library owns everything else. Typical use:
//!
//! ```no_run
//! use skyburst::{PixelBuffer, Show, StartOptions, Tuning};
//!
//! let mut show = Show::new(960.0, 600.0, Tuning::default(), false);
//! let mut buffer = PixelBuffer::with_size(960, 600);
//! show.start(StartOptions::default());
//! loop {
//!     show.tick(1.0 / 60.0);
//!     show.render(&mut buffer);
//!     // stream buffer.as_bytes() to a texture, play show.drain_sfx(), ...
//! }
//! ```
//!
//! The show scales itself to the host machine: a quality governor tracks the
//! delivered frame rate and trims particle budgets, glow, and smoke before
//! anything visibly stutters.

pub mod burst;
pub mod config;
pub mod control;
pub mod display;
pub mod entity;
pub mod physics;
pub mod quality;
pub mod render;
pub mod sfx;
pub mod show;
pub mod util;

pub use burst::BurstPattern;
pub use config::Tuning;
pub use control::{MqttControl, ShowCommand};
pub use display::{Display, InputEvent, PixelBuffer, RenderTarget};
pub use sfx::SfxCommand;
pub use show::{Show, ShowState, StartOptions};
