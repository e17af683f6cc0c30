//! World settings
//!
//! Tunable simulation parameters, persisted as JSON.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// How two bodies' restitution coefficients combine into one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RestitutionPolicy {
    /// The less bouncy body wins
    #[default]
    Min,
    Max,
    Product,
    Average,
}

impl RestitutionPolicy {
    pub fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            RestitutionPolicy::Min => a.min(b),
            RestitutionPolicy::Max => a.max(b),
            RestitutionPolicy::Product => a * b,
            RestitutionPolicy::Average => (a + b) * 0.5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RestitutionPolicy::Min => "min",
            RestitutionPolicy::Max => "max",
            RestitutionPolicy::Product => "product",
            RestitutionPolicy::Average => "average",
        }
    }
}

/// How two bodies' friction coefficients combine into one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FrictionPolicy {
    #[default]
    GeometricMean,
    Min,
}

impl FrictionPolicy {
    pub fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            FrictionPolicy::GeometricMean => (a.max(0.0) * b.max(0.0)).sqrt(),
            FrictionPolicy::Min => a.min(b),
        }
    }
}

/// Settings errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Simulation parameters for a [`crate::World`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSettings {
    /// Constant acceleration applied to dynamic bodies
    pub gravity: DVec2,

    // === Time ===
    /// Fixed step used by `World::advance`
    pub fixed_dt: f64,
    /// Most fixed steps `advance` may run per call
    pub max_substeps: u32,
    /// `World::step` clamps larger `dt` to this
    pub max_dt: f64,

    // === Contacts ===
    pub restitution: RestitutionPolicy,
    pub friction: FrictionPolicy,
    /// Fraction of penetration removed per step (0..=1)
    pub correction_percent: f64,
    /// Penetration tolerated without correction
    pub correction_slop: f64,
    /// Relative normal speed below which restitution is ignored
    pub bounce_threshold: f64,

    // === Broad phase ===
    /// Grid cell size; `None` derives it from the average body size each step
    pub cell_size: Option<f64>,

    // === Shapes ===
    /// Vertices per tessellated circle
    pub hull_sides: usize,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            gravity: DVec2::ZERO,

            fixed_dt: SIM_DT,
            max_substeps: MAX_SUBSTEPS,
            max_dt: MAX_DT,

            restitution: RestitutionPolicy::default(),
            friction: FrictionPolicy::default(),
            correction_percent: CORRECTION_PERCENT,
            correction_slop: CORRECTION_SLOP,
            bounce_threshold: BOUNCE_THRESHOLD,

            cell_size: None,

            hull_sides: HULL_SIDES,
        }
    }
}

impl WorldSettings {
    /// Default settings with the given gravity
    pub fn with_gravity(gravity: DVec2) -> Self {
        Self {
            gravity,
            ..Self::default()
        }
    }

    /// Reject values the stepper can't work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.gravity.is_finite() {
            return Err(SettingsError::Invalid("gravity must be finite".into()));
        }
        for (name, value) in [("fixed_dt", self.fixed_dt), ("max_dt", self.max_dt)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SettingsError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        if self.max_substeps == 0 {
            return Err(SettingsError::Invalid("max_substeps must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.correction_percent) {
            return Err(SettingsError::Invalid(format!(
                "correction_percent must be in 0..=1, got {}",
                self.correction_percent
            )));
        }
        if !self.correction_slop.is_finite() || self.correction_slop < 0.0 {
            return Err(SettingsError::Invalid("correction_slop must be >= 0".into()));
        }
        if !self.bounce_threshold.is_finite() || self.bounce_threshold < 0.0 {
            return Err(SettingsError::Invalid("bounce_threshold must be >= 0".into()));
        }
        if let Some(size) = self.cell_size {
            if !size.is_finite() || size <= 0.0 {
                return Err(SettingsError::Invalid(format!(
                    "cell_size must be positive, got {size}"
                )));
            }
        }
        if self.hull_sides < 3 {
            return Err(SettingsError::Invalid(format!(
                "hull_sides must be at least 3, got {}",
                self.hull_sides
            )));
        }
        Ok(())
    }

    /// Parse and validate settings from JSON text
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&contents)?;
        log::info!("Loaded world settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a JSON file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("World settings saved to {}", path.display());
        Ok(())
    }
}
