//! Falling Words - text tokens that pile up under gravity and go boom
//!
//! Core modules:
//! - `sim`: Deterministic orchestration (world, spawner, selector, blast, choreography)
//! - `config`: Tunables resolved once per viewport
//! - `surface`: Presentation/audio capability traits the core talks to
//! - `headless`: In-memory surfaces for the native runner and tests
//! - `web`: wasm-bindgen export for a browser host

pub mod config;
pub mod error;
pub mod headless;
pub mod sim;
pub mod surface;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{Config, ConfigFile, ConfigOverrides, Viewport};
pub use error::CapabilityError;

/// Engine constants that are not worth exposing as tunables
pub mod consts {
    /// Fixed simulation timestep in milliseconds (60 Hz)
    pub const SIM_DT_MS: f64 = 1000.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Boundary geometry
    pub const WALL_THICKNESS: f32 = 80.0;
    pub const GROUND_HEIGHT: f32 = 60.0;
    /// Ground center sits this far below the bottom edge
    pub const GROUND_DROP: f32 = 20.0;
    /// Boundaries never get shorter than this, so small viewports still hold the pile
    pub const MIN_BOUNDARY_SPAN: f32 = 1200.0;
    /// Side length of the center sensor
    pub const SENSOR_SIZE: f32 = 1.0;

    /// Distance at which blast falloff is exactly 1
    pub const FALLOFF_REFERENCE_PX: f32 = 160.0;
    /// Falloff denominator floor (caps the near-body boost at 1/0.6)
    pub const FALLOFF_FLOOR: f32 = 0.6;
    /// Impulse and wind treat anything closer than these as this far away
    pub const IMPULSE_MIN_DISTANCE: f32 = 8.0;
    pub const WIND_MIN_DISTANCE: f32 = 20.0;
    /// Per-body impulse jitter
    pub const IMPULSE_JITTER_MIN: f32 = 0.85;
    pub const IMPULSE_JITTER_MAX: f32 = 1.25;

    /// Blink never runs faster than this
    pub const MIN_BLINK_MS: f64 = 150.0;
    /// Blink period when no red transition is configured
    pub const FALLBACK_BLINK_MS: f64 = 400.0;
    /// Dimmed opacity during the armed blink
    pub const BLINK_DIM_OPACITY: f32 = 0.35;

    /// Effect lifetimes
    pub const SHOCKWAVE_LIFETIME_MS: f64 = 700.0;
    pub const PARTICLE_LIFETIME_MS: f64 = 800.0;
    pub const PARTICLE_MIN_TRAVEL: f32 = 180.0;
    pub const PARTICLE_ANGLE_JITTER: f32 = 0.35;
}

/// Degrees to radians
#[inline]
pub fn deg_to_rad(deg: f32) -> f32 {
    deg * (std::f32::consts::PI / 180.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deg_to_rad() {
        assert!((deg_to_rad(180.0) - std::f32::consts::PI).abs() < 1e-6);
        assert!((deg_to_rad(-60.0) + std::f32::consts::FRAC_PI_3).abs() < 1e-6);
    }
}
