use crate::error::{KaResult, KeyAdaptError};
use clap::{parser::ValueSource, ArgMatches, Args};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Args, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerConfig {
    // === CONFIDENCE ===
    /// A key (or row) must have strictly more samples than this before it is adapted.
    #[arg(long, default_value_t = 5)]
    pub min_frequency: u32,

    /// Upper bound on the total samples kept per keyboard.
    #[arg(long, default_value_t = 7500)]
    pub data_cap: u32,

    // === GEOMETRY ===
    #[arg(long, default_value_t = 18.0)]
    pub min_width_dp: f32,
    #[arg(long, default_value_t = 24.0)]
    pub min_height_dp: f32,
    #[arg(long, default_value_t = 1.0)]
    pub density: f32,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            min_frequency: 5,
            data_cap: 7500,
            min_width_dp: 18.0,
            min_height_dp: 24.0,
            density: 1.0,
        }
    }
}

impl LearnerConfig {
    #[inline(always)]
    pub fn min_width_px(&self) -> i32 {
        (self.min_width_dp * self.density).round() as i32
    }

    #[inline(always)]
    pub fn min_height_px(&self) -> i32 {
        (self.min_height_dp * self.density).round() as i32
    }

    pub fn validate(&self) -> KaResult<()> {
        let checks = [
            ("density", self.density),
            ("min_width_dp", self.min_width_dp),
            ("min_height_dp", self.min_height_dp),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(KeyAdaptError::Config(format!(
                    "{} must be a finite, non-negative number (got {})",
                    name, value
                )));
            }
        }
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> KaResult<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            KeyAdaptError::Config(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        let config: LearnerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn merge_from_cli(&mut self, cli_config: &LearnerConfig, matches: &ArgMatches) {
        macro_rules! update_if_present {
            ($field:ident, $arg_name:expr) => {
                if matches.value_source($arg_name) == Some(ValueSource::CommandLine) {
                    self.$field = cli_config.$field.clone();
                }
            };
        }

        update_if_present!(min_frequency, "min_frequency");
        update_if_present!(data_cap, "data_cap");
        update_if_present!(min_width_dp, "min_width_dp");
        update_if_present!(min_height_dp, "min_height_dp");
        update_if_present!(density, "density");
    }
}
