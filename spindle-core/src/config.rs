use crate::dsp::check_sample_rate;
use crate::dsp::epoch::samples_per_epoch;
use crate::error::SpindleError;
use crate::types::{FrequencyBand, SpindleParams, DEFAULT_SAMPLE_RATE};
use serde::{Deserialize, Serialize};

/// Every tunable of an analysis run, passed explicitly into each task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Sampling rate assigned to loaded tables (Hz).
    pub sample_rate: f64,
    pub spindle: SpindleParams,
    pub band: FrequencyBand,
    pub epoch_secs: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            spindle: SpindleParams::default(),
            band: FrequencyBand::ALPHA,
            epoch_secs: 10.0,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), SpindleError> {
        check_sample_rate(self.sample_rate)?;
        self.spindle.validate()?;
        self.band.validate()?;
        samples_per_epoch(self.sample_rate, self.epoch_secs)?;
        Ok(())
    }
}
