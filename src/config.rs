use crate::constants::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
    #[error("setting `{key}` has invalid value `{value}`")]
    InvalidValue { key: String, value: String },
    #[error("setting `{key}` is out of range: {value}")]
    OutOfRange { key: String, value: String },
}

/// Tunables for the card effects.
///
/// Defaults come from `constants.rs`; the page can override any of them with
/// `data-fx-<key>` attributes on the tracked region element.
#[derive(Clone, Debug, PartialEq)]
pub struct FxParams {
    pub radius: f32,
    pub particle_count: usize,
    pub spawn_stagger_ms: f64,
    pub glow_color: String,
    pub spotlight_max_opacity: f32,
    pub tilt_max_deg: f32,
    pub magnetism_factor: f32,
    pub enable_particles: bool,
    pub enable_tilt: bool,
    pub enable_magnetism: bool,
    pub enable_ripple: bool,
    pub enable_spotlight: bool,
    /// Master switch for the motion effects (particles, tilt, magnetism, ripple).
    pub disable_animations: bool,
    pub card_selector: String,
    pub region_selector: String,
}

impl Default for FxParams {
    fn default() -> Self {
        Self {
            radius: DEFAULT_SPOTLIGHT_RADIUS,
            particle_count: DEFAULT_PARTICLE_COUNT,
            spawn_stagger_ms: SPAWN_STAGGER_MS,
            glow_color: DEFAULT_GLOW_COLOR.to_string(),
            spotlight_max_opacity: SPOTLIGHT_MAX_OPACITY,
            tilt_max_deg: TILT_MAX_DEG,
            magnetism_factor: MAGNETISM_FACTOR,
            enable_particles: true,
            enable_tilt: true,
            enable_magnetism: true,
            enable_ripple: true,
            enable_spotlight: true,
            disable_animations: false,
            card_selector: DEFAULT_CARD_SELECTOR.to_string(),
            region_selector: DEFAULT_REGION_SELECTOR.to_string(),
        }
    }
}

impl FxParams {
    /// Keys accepted by [`FxParams::apply_override`].
    pub const KEYS: &'static [&'static str] = &[
        "radius",
        "particle-count",
        "stagger",
        "glow-color",
        "spotlight-opacity",
        "tilt-degrees",
        "magnetism-factor",
        "particles",
        "tilt",
        "magnetism",
        "ripple",
        "spotlight",
        "animations",
        "card-selector",
    ];

    pub fn particles_active(&self) -> bool {
        self.enable_particles && !self.disable_animations && self.particle_count > 0
    }

    pub fn tilt_active(&self) -> bool {
        self.enable_tilt && !self.disable_animations
    }

    pub fn magnetism_active(&self) -> bool {
        self.enable_magnetism && !self.disable_animations
    }

    pub fn ripple_active(&self) -> bool {
        self.enable_ripple && !self.disable_animations
    }

    pub fn spotlight_active(&self) -> bool {
        self.enable_spotlight
    }

    pub fn apply_override(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key {
            "radius" => {
                let r: f32 = parse(key, value)?;
                if !(r.is_finite() && r > 0.0) {
                    return Err(out_of_range(key, value));
                }
                self.radius = r;
            }
            "particle-count" => self.particle_count = parse(key, value)?,
            "stagger" => {
                let ms: f64 = parse(key, value)?;
                if !(ms.is_finite() && ms >= 0.0) {
                    return Err(out_of_range(key, value));
                }
                self.spawn_stagger_ms = ms;
            }
            "glow-color" => {
                if value.is_empty() {
                    return Err(invalid(key, value));
                }
                self.glow_color = value.to_string();
            }
            "spotlight-opacity" => {
                let o: f32 = parse(key, value)?;
                if !(0.0..=1.0).contains(&o) {
                    return Err(out_of_range(key, value));
                }
                self.spotlight_max_opacity = o;
            }
            "tilt-degrees" => {
                let d: f32 = parse(key, value)?;
                if !(0.0..=90.0).contains(&d) {
                    return Err(out_of_range(key, value));
                }
                self.tilt_max_deg = d;
            }
            "magnetism-factor" => {
                let f: f32 = parse(key, value)?;
                if !(0.0..=1.0).contains(&f) {
                    return Err(out_of_range(key, value));
                }
                self.magnetism_factor = f;
            }
            "particles" => self.enable_particles = parse_flag(key, value)?,
            "tilt" => self.enable_tilt = parse_flag(key, value)?,
            "magnetism" => self.enable_magnetism = parse_flag(key, value)?,
            "ripple" => self.enable_ripple = parse_flag(key, value)?,
            "spotlight" => self.enable_spotlight = parse_flag(key, value)?,
            "animations" => self.disable_animations = !parse_flag(key, value)?,
            "card-selector" => {
                if value.is_empty() {
                    return Err(invalid(key, value));
                }
                self.card_selector = value.to_string();
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    /// Apply a batch of overrides, keeping defaults for entries that fail.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> (Self, Vec<ConfigError>)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut errors = Vec::new();
        for (key, value) in overrides {
            if let Err(e) = self.apply_override(key, value) {
                errors.push(e);
            }
        }
        (self, errors)
    }
}

fn parse<V: std::str::FromStr>(key: &str, value: &str) -> Result<V, ConfigError> {
    value.parse().map_err(|_| invalid(key, value))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "" | "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn out_of_range(key: &str, value: &str) -> ConfigError {
    ConfigError::OutOfRange {
        key: key.to_string(),
        value: value.to_string(),
    }
}
