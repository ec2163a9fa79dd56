//! Named accessors for the reconfigurable terrain fields.
//!
//! UI layers address settings by name. Each entry pairs a getter and setter
//! with the invariant check for that field; [`TerrainConfig::validate`] runs
//! every check in table order.

use crate::config::{ConfigError, TerrainConfig, MAX_OCTAVES};

/// Numeric flavour of a field, used for slider rounding and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole numbers; incoming values are rounded up.
    Integer,
    /// Real numbers.
    Float,
}

/// Accessor triple for one reconfigurable field.
pub struct ConfigField {
    /// Field name as exposed to UI bindings.
    pub name: &'static str,
    /// Integer or float.
    pub kind: FieldKind,
    get: fn(&TerrainConfig) -> f64,
    set: fn(&mut TerrainConfig, f64),
    check: fn(&TerrainConfig) -> Result<(), ConfigError>,
}

impl ConfigField {
    /// Read the field from `config`.
    pub fn get(&self, config: &TerrainConfig) -> f64 {
        (self.get)(config)
    }

    /// Check this field's invariant on `config`.
    pub fn validate(&self, config: &TerrainConfig) -> Result<(), ConfigError> {
        (self.check)(config)
    }

    /// Write `value` into `config` without validating.
    ///
    /// Integer fields round up; negative and NaN values saturate to zero.
    fn apply(&self, config: &mut TerrainConfig, value: f64) {
        let value = match self.kind {
            FieldKind::Integer => value.ceil(),
            FieldKind::Float => value,
        };
        (self.set)(config, value);
    }
}

impl std::fmt::Debug for ConfigField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigField")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

fn positive(field: &'static str, value: u32) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NonPositive { field });
    }
    Ok(())
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite {
            field,
            value: f64::from(value),
        });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::OutOfRange {
            field,
            value: f64::from(value),
            min: 0.0,
            max: f64::MAX,
        });
    }
    Ok(())
}

/// Every reconfigurable field, in display order.
pub static CONFIG_FIELDS: &[ConfigField] = &[
    ConfigField {
        name: "width",
        kind: FieldKind::Integer,
        get: |c| f64::from(c.width),
        set: |c, v| c.width = v as u32,
        check: |c| positive("width", c.width),
    },
    ConfigField {
        name: "length",
        kind: FieldKind::Integer,
        get: |c| f64::from(c.length),
        set: |c, v| c.length = v as u32,
        check: |c| positive("length", c.length),
    },
    ConfigField {
        name: "height",
        kind: FieldKind::Float,
        get: |c| f64::from(c.height),
        set: |c, v| c.height = v as f32,
        check: |c| non_negative("height", c.height),
    },
    ConfigField {
        name: "scale",
        kind: FieldKind::Float,
        get: |c| f64::from(c.scale),
        set: |c, v| c.scale = v as f32,
        check: |c| {
            finite("scale", c.scale)?;
            if c.scale <= 0.0 {
                return Err(ConfigError::OutOfRange {
                    field: "scale",
                    value: f64::from(c.scale),
                    min: f64::from(f32::MIN_POSITIVE),
                    max: f64::MAX,
                });
            }
            Ok(())
        },
    },
    ConfigField {
        name: "octaves",
        kind: FieldKind::Integer,
        get: |c| f64::from(c.octaves),
        set: |c, v| c.octaves = v as u32,
        check: |c| {
            positive("octaves", c.octaves)?;
            if c.octaves > MAX_OCTAVES {
                return Err(ConfigError::OutOfRange {
                    field: "octaves",
                    value: f64::from(c.octaves),
                    min: 1.0,
                    max: f64::from(MAX_OCTAVES),
                });
            }
            Ok(())
        },
    },
    ConfigField {
        name: "lacunarity",
        kind: FieldKind::Float,
        get: |c| f64::from(c.lacunarity),
        set: |c, v| c.lacunarity = v as f32,
        check: |c| non_negative("lacunarity", c.lacunarity),
    },
    ConfigField {
        name: "persistence",
        kind: FieldKind::Float,
        get: |c| f64::from(c.persistence),
        set: |c, v| c.persistence = v as f32,
        check: |c| non_negative("persistence", c.persistence),
    },
    ConfigField {
        name: "detail",
        kind: FieldKind::Integer,
        get: |c| f64::from(c.detail),
        set: |c, v| c.detail = v as u32,
        check: |c| positive("detail", c.detail),
    },
    ConfigField {
        name: "chunk_size",
        kind: FieldKind::Integer,
        get: |c| f64::from(c.chunk_size),
        set: |c, v| c.chunk_size = v as u32,
        check: |c| positive("chunk_size", c.chunk_size),
    },
    ConfigField {
        name: "seed",
        kind: FieldKind::Integer,
        get: |c| f64::from(c.seed),
        set: |c, v| c.seed = v as u32,
        check: |_| Ok(()),
    },
];

/// Find a field by name.
pub fn lookup_field(name: &str) -> Option<&'static ConfigField> {
    CONFIG_FIELDS.iter().find(|field| field.name == name)
}

impl TerrainConfig {
    /// Read a field by name.
    pub fn field(&self, name: &str) -> Result<f64, ConfigError> {
        lookup_field(name)
            .map(|field| field.get(self))
            .ok_or_else(|| ConfigError::UnknownField(name.to_string()))
    }

    /// Produce a new validated config with one field replaced.
    ///
    /// `self` is left untouched when the result is an error.
    pub fn with_field(&self, name: &str, value: f64) -> Result<TerrainConfig, ConfigError> {
        let field = lookup_field(name).ok_or_else(|| ConfigError::UnknownField(name.to_string()))?;
        let mut next = self.clone();
        field.apply(&mut next, value);
        next.validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_round_trips_through_the_table() {
        let config = TerrainConfig::default();
        for field in CONFIG_FIELDS {
            let value = field.get(&config);
            let updated = config
                .with_field(field.name, value)
                .unwrap_or_else(|err| panic!("{} rejected its own value: {err}", field.name));
            assert_eq!(updated, config, "field {} did not round-trip", field.name);
        }
    }

    #[test]
    fn field_names_are_unique() {
        for (i, a) in CONFIG_FIELDS.iter().enumerate() {
            for b in &CONFIG_FIELDS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn integer_fields_round_up() {
        let config = TerrainConfig::default()
            .with_field("octaves", 2.2)
            .expect("octaves 3 is valid");
        assert_eq!(config.octaves, 3);
    }

    #[test]
    fn float_fields_are_set_verbatim() {
        let config = TerrainConfig::default()
            .with_field("persistence", 0.75)
            .expect("persistence 0.75 is valid");
        assert_eq!(config.persistence, 0.75);
    }

    #[test]
    fn invalid_value_leaves_config_untouched() {
        let config = TerrainConfig::default();
        let err = config
            .with_field("chunk_size", 0.0)
            .expect_err("chunk size 0 is invalid");
        assert_eq!(
            err,
            ConfigError::NonPositive {
                field: "chunk_size"
            }
        );
        assert_eq!(config.chunk_size, 10);
    }

    #[test]
    fn negative_integer_saturates_and_is_rejected() {
        let err = TerrainConfig::default()
            .with_field("width", -5.0)
            .expect_err("negative width is invalid");
        assert_eq!(err, ConfigError::NonPositive { field: "width" });
    }

    #[test]
    fn unknown_field_is_reported() {
        let config = TerrainConfig::default();
        assert_eq!(
            config.field("roughness"),
            Err(ConfigError::UnknownField("roughness".into()))
        );
        assert!(matches!(
            config.with_field("roughness", 1.0),
            Err(ConfigError::UnknownField(_))
        ));
    }

    #[test]
    fn lookup_reports_kind() {
        assert_eq!(lookup_field("detail").map(|f| f.kind), Some(FieldKind::Integer));
        assert_eq!(lookup_field("scale").map(|f| f.kind), Some(FieldKind::Float));
        assert!(lookup_field("Scale").is_none());
    }
}
