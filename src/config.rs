use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Environment prefix, e.g. `CENSUS_MATCH__MATCHING__THRESHOLD__BASE=0.65`
pub const ENV_PREFIX: &str = "CENSUS_MATCH";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub matching: MatchConfig,
}

/// Everything the engine needs to score, threshold and classify one household.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub weights: ScoreWeights,
    /// Relationship sub-score when the categories differ but are compatible.
    pub relationship_partial: f64,
    /// Added to the name sub-score when a surname matches exactly after folding.
    pub exact_surname_bonus: f64,
    pub age: AgeConfig,
    pub threshold: ThresholdConfig,
    /// Minimum best name sub-score that counts as corroborating household presence.
    pub witness_name_floor: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            relationship_partial: 0.6,
            exact_surname_bonus: 0.05,
            age: AgeConfig::default(),
            threshold: ThresholdConfig::default(),
            witness_name_floor: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub name: f64,
    pub relationship: f64,
    pub age: f64,
    pub sex: f64,
    pub position: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            name: 0.40,
            relationship: 0.25,
            age: 0.20,
            sex: 0.075,
            position: 0.075,
        }
    }
}

impl ScoreWeights {
    fn all(&self) -> [(&'static str, f64); 5] {
        [
            ("name", self.name),
            ("relationship", self.relationship),
            ("age", self.age),
            ("sex", self.sex),
            ("position", self.position),
        ]
    }
}

/// Age drift windows. Censuses before `early_era_before` get the wider window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgeConfig {
    pub tolerance_years: u32,
    pub max_drift_years: u32,
    pub early_era_before: i32,
    pub early_tolerance_years: u32,
    pub early_max_drift_years: u32,
    /// Extra tolerance when the candidate's birth year is itself an estimate.
    pub approximate_birth_slack: u32,
}

impl Default for AgeConfig {
    fn default() -> Self {
        Self {
            tolerance_years: 2,
            max_drift_years: 10,
            early_era_before: 1850,
            early_tolerance_years: 5,
            early_max_drift_years: 15,
            approximate_birth_slack: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub base: f64,
    pub min: f64,
    pub max: f64,
    /// Raise per extra candidate per household member.
    pub density_step: f64,
    pub density_cap: f64,
    /// Largest reduction, applied at zero completeness.
    pub completeness_relief: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            base: 0.6,
            min: 0.40,
            max: 0.85,
            density_step: 0.05,
            density_cap: 0.15,
            completeness_relief: 0.20,
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with `CENSUS_MATCH__*` environment variables.
    pub fn from_env() -> Result<Self, MatchError> {
        Self::load(None)
    }

    /// Defaults, then an optional TOML file, then `CENSUS_MATCH__*` variables.
    pub fn load(path: Option<&str>) -> Result<Self, MatchError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let loaded: AppConfig = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        loaded.matching.validate()?;
        Ok(loaded)
    }

    /// Parse an inline TOML document, mainly for fixtures.
    pub fn from_toml(text: &str) -> Result<Self, MatchError> {
        let loaded: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        loaded.matching.validate()?;
        Ok(loaded)
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        let weights = self.weights.all();
        if let Some((name, w)) = weights.iter().find(|(_, w)| !w.is_finite() || *w < 0.0) {
            return Err(MatchError::Config(format!("weight '{name}' must be >= 0, got {w}")));
        }
        if weights.iter().all(|(_, w)| *w == 0.0) {
            return Err(MatchError::Config("at least one weight must be positive".into()));
        }

        for (name, v) in [
            ("relationship_partial", self.relationship_partial),
            ("exact_surname_bonus", self.exact_surname_bonus),
            ("witness_name_floor", self.witness_name_floor),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(MatchError::Config(format!("{name} must be within [0, 1], got {v}")));
            }
        }

        let age = &self.age;
        if age.tolerance_years > age.max_drift_years
            || age.early_tolerance_years > age.early_max_drift_years
        {
            return Err(MatchError::Config("age tolerance exceeds max drift".into()));
        }

        let t = &self.threshold;
        if !(t.min > 0.0 && t.max < 1.0 && t.min < t.max) {
            return Err(MatchError::Config(format!(
                "threshold bounds must satisfy 0 < min < max < 1, got [{}, {}]",
                t.min, t.max
            )));
        }
        if t.density_step < 0.0 || t.density_cap < 0.0 || t.completeness_relief < 0.0 {
            return Err(MatchError::Config("threshold adjustments must be >= 0".into()));
        }

        Ok(())
    }
}
