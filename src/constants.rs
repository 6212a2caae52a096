/// Interaction tuning constants.
///
/// Durations are in milliseconds on the effect timeline; distances are CSS
/// pixels in client (viewport) coordinates.
// Proximity glow
pub const DEFAULT_SPOTLIGHT_RADIUS: f32 = 300.0;
pub const PROXIMITY_FRACTION: f32 = 0.5; // full glow inside radius * fraction
pub const FADE_FRACTION: f32 = 0.75; // zero glow beyond radius * fraction
pub const DEFAULT_GLOW_COLOR: &str = "132, 0, 255";

// Spotlight overlay
pub const SPOTLIGHT_MAX_OPACITY: f32 = 0.8;
pub const SPOTLIGHT_SIZE_PX: f32 = 800.0;
pub const SPOTLIGHT_FOLLOW_MS: f64 = 100.0;
pub const SPOTLIGHT_FADE_IN_MS: f64 = 200.0;
pub const SPOTLIGHT_FADE_OUT_MS: f64 = 500.0;
pub const SPOTLIGHT_EXIT_MS: f64 = 300.0; // pointer left the region

// Particles
pub const DEFAULT_PARTICLE_COUNT: usize = 12;
pub const SPAWN_STAGGER_MS: f64 = 100.0;
pub const PARTICLE_SIZE_PX: f32 = 4.0;
pub const PARTICLE_ENTER_MS: f64 = 300.0;
pub const PARTICLE_EXIT_MS: f64 = 300.0;
pub const PARTICLE_DRIFT_PX: f32 = 100.0; // drift target range is +/- this
pub const PARTICLE_DRIFT_MIN_MS: f64 = 2000.0;
pub const PARTICLE_DRIFT_SPAN_MS: f64 = 2000.0;
pub const PARTICLE_PULSE_OPACITY: f32 = 0.3;
pub const PARTICLE_PULSE_MS: f64 = 1500.0;

// Tilt and magnetism
pub const TILT_MAX_DEG: f32 = 10.0;
pub const TILT_FOLLOW_MS: f64 = 100.0;
pub const MAGNETISM_FACTOR: f32 = 0.05;
pub const MAGNETISM_FOLLOW_MS: f64 = 300.0;
pub const TILT_RESET_MS: f64 = 300.0;
pub const TILT_PERSPECTIVE_PX: f32 = 1000.0;

// Click ripple
pub const RIPPLE_MS: f64 = 800.0;

// Frame loop
pub const MAX_FRAME_DT_MS: f64 = 100.0; // clamp after tab resume

// Mobile heuristic: at or below this viewport width animations are disabled
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

// DOM wiring
pub const DEFAULT_CARD_SELECTOR: &str = ".movie-item";
pub const DEFAULT_REGION_SELECTOR: &str = "#movie-list";
pub const CARD_ID_ATTR: &str = "data-fx-card";
