//! Slider-driven reconfiguration with debounced regeneration.

use heightfield_core::{lookup_field, ConfigError, FieldKind, TerrainConfig};
use heightfield_terrain::{GenerationReport, GeneratorError, RenderSink, TerrainGenerator};
use tracing::{debug, warn};

/// Seconds a slider must stay still before the terrain is rebuilt.
pub const DEFAULT_DEBOUNCE_SECS: f32 = 0.3;

/// One slider bound to a named config field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Setting {
    /// Config field name.
    pub field: &'static str,
    /// Lower clamp, before the multiplier.
    pub min: f64,
    /// Upper clamp and full-scale slider value, before the multiplier.
    pub max: f64,
    /// Applied after clamping.
    pub multiplier: f64,
    /// Reframe the camera after the rebuild.
    pub reframe: bool,
}

impl Setting {
    /// Slider with unit multiplier.
    pub const fn new(field: &'static str, min: f64, max: f64) -> Self {
        Self {
            field,
            min,
            max,
            multiplier: 1.0,
            reframe: false,
        }
    }

    /// Same slider, reframing the camera after each rebuild.
    pub const fn reframing(mut self) -> Self {
        self.reframe = true;
        self
    }

    /// Field value for normalized slider position `t`.
    pub fn value_for(&self, t: f64) -> Result<f64, ConfigError> {
        let field =
            lookup_field(self.field).ok_or_else(|| ConfigError::UnknownField(self.field.into()))?;
        let raw = match field.kind {
            FieldKind::Integer => (t * self.max).ceil(),
            FieldKind::Float => t * self.max,
        };
        Ok(raw.clamp(self.min, self.max) * self.multiplier)
    }

    /// Slider position that displays `value`.
    pub fn slider_position(&self, value: f64) -> f64 {
        value / ((self.max - self.min) * self.multiplier)
    }
}

/// Sliders exposed by the headless app.
pub const DEFAULT_SETTINGS: &[Setting] = &[
    Setting::new("width", 1.0, 200.0).reframing(),
    Setting::new("length", 1.0, 200.0).reframing(),
    Setting::new("height", 0.0, 50.0),
    Setting::new("scale", 0.01, 1.0),
    Setting::new("octaves", 1.0, 8.0),
    Setting::new("lacunarity", 0.0, 4.0),
    Setting::new("persistence", 0.0, 1.0),
    Setting::new("detail", 1.0, 8.0),
    Setting::new("chunk_size", 1.0, 64.0),
];

/// Find the default slider for `field`.
pub fn lookup_setting(field: &str) -> Option<&'static Setting> {
    DEFAULT_SETTINGS.iter().find(|setting| setting.field == field)
}

/// Collects slider edits and rebuilds the terrain once they settle.
pub struct SettingsPanel {
    pending: TerrainConfig,
    delay: f32,
    timer: f32,
    dirty: bool,
    reframe: bool,
}

impl SettingsPanel {
    /// Panel starting from `config`.
    pub fn new(config: &TerrainConfig) -> Self {
        Self {
            pending: config.clone(),
            delay: DEFAULT_DEBOUNCE_SECS,
            timer: 0.0,
            dirty: false,
            reframe: false,
        }
    }

    /// Override the debounce delay.
    pub fn with_delay(mut self, seconds: f32) -> Self {
        self.delay = seconds;
        self
    }

    /// Config the next rebuild will use.
    pub fn pending(&self) -> &TerrainConfig {
        &self.pending
    }

    /// True while an edit is waiting for the debounce to elapse.
    pub fn is_pending(&self) -> bool {
        self.dirty
    }

    /// Current slider position of `setting`.
    pub fn slider_position(&self, setting: &Setting) -> Result<f64, ConfigError> {
        Ok(setting.slider_position(self.pending.field(setting.field)?))
    }

    /// Move `setting` to position `t` and re-arm the debounce timer.
    ///
    /// Rejected values leave the pending config untouched.
    pub fn slide(&mut self, setting: &Setting, t: f64) -> Result<f64, ConfigError> {
        let applied = setting.value_for(t).and_then(|value| {
            self.pending
                .with_field(setting.field, value)
                .map(|config| (value, config))
        });
        match applied {
            Ok((value, config)) => {
                debug!(field = setting.field, value, "setting changed");
                self.pending = config;
                self.timer = self.delay;
                self.dirty = true;
                self.reframe |= setting.reframe;
                Ok(value)
            }
            Err(err) => {
                warn!(field = setting.field, t, %err, "rejected setting");
                Err(err)
            }
        }
    }

    /// Advance the debounce timer and rebuild once it elapses.
    ///
    /// On failure the pending config is reset to the generator's. A rebuild
    /// that succeeds is always reported, even if reframing the camera fails.
    pub fn tick<R: RenderSink>(
        &mut self,
        dt: f32,
        generator: &mut TerrainGenerator<R>,
    ) -> Result<Option<GenerationReport>, GeneratorError> {
        if !self.dirty {
            return Ok(None);
        }
        self.timer -= dt;
        if self.timer > 0.0 {
            return Ok(None);
        }

        self.dirty = false;
        let reframe = std::mem::take(&mut self.reframe);
        let report = match generator.regenerate(self.pending.clone()) {
            Ok(report) => report,
            Err(err) => {
                self.pending = generator.config().clone();
                return Err(err);
            }
        };
        if reframe {
            if let Err(err) = generator.update_size() {
                warn!(%err, "terrain rebuilt but camera was not reframed");
            }
        }
        Ok(Some(report))
    }
}
