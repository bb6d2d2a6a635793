use crate::error::{SpindleError, TableError};
use serde::{Deserialize, Serialize};

/// Sampling rate of the amplifier exports the defaults are tuned for.
pub const DEFAULT_SAMPLE_RATE: f64 = 512.0;

/// A contiguous above-threshold run, as a half-open sample range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpindleEvent {
    pub start: usize,
    pub end: usize,
}

impl SpindleEvent {
    pub fn sample_count(&self) -> usize {
        self.end - self.start
    }

    pub fn start_secs(&self, sample_rate: f64) -> f64 {
        self.start as f64 / sample_rate
    }

    pub fn end_secs(&self, sample_rate: f64) -> f64 {
        self.end as f64 / sample_rate
    }

    pub fn duration_secs(&self, sample_rate: f64) -> f64 {
        self.sample_count() as f64 / sample_rate
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpindleParams {
    /// Threshold as a multiple of the envelope's standard deviation.
    pub threshold_factor: f64,
    /// Shortest run kept, in seconds.
    pub min_duration_secs: f64,
}

impl Default for SpindleParams {
    fn default() -> Self {
        Self {
            threshold_factor: 2.5,
            min_duration_secs: 0.5,
        }
    }
}

impl SpindleParams {
    pub fn validate(&self) -> Result<(), SpindleError> {
        if !self.threshold_factor.is_finite() || self.threshold_factor < 0.0 {
            return Err(SpindleError::InvalidParameter {
                name: "threshold_factor",
                value: self.threshold_factor,
            });
        }
        if !self.min_duration_secs.is_finite() || self.min_duration_secs < 0.0 {
            return Err(SpindleError::InvalidParameter {
                name: "min_duration_secs",
                value: self.min_duration_secs,
            });
        }
        Ok(())
    }
}

/// Closed frequency interval `[low_hz, high_hz]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrequencyBand {
    pub low_hz: f64,
    pub high_hz: f64,
}

impl FrequencyBand {
    pub const ALPHA: FrequencyBand = FrequencyBand {
        low_hz: 8.0,
        high_hz: 13.0,
    };

    pub fn new(low_hz: f64, high_hz: f64) -> Result<Self, SpindleError> {
        let band = Self { low_hz, high_hz };
        band.validate()?;
        Ok(band)
    }

    pub fn contains(&self, freq_hz: f64) -> bool {
        freq_hz >= self.low_hz && freq_hz <= self.high_hz
    }

    pub fn validate(&self) -> Result<(), SpindleError> {
        let ok = self.low_hz.is_finite()
            && self.high_hz.is_finite()
            && self.low_hz >= 0.0
            && self.low_hz <= self.high_hz;
        if ok {
            Ok(())
        } else {
            Err(SpindleError::InvalidBand {
                low_hz: self.low_hz,
                high_hz: self.high_hz,
            })
        }
    }
}

impl Default for FrequencyBand {
    fn default() -> Self {
        Self::ALPHA
    }
}

/// Band-limited wavelet coefficients.
///
/// `coefficients[r]` is the row for `scales[r]`, whose mapped frequency is
/// `frequencies[r]`. Rows run from the highest frequency to the lowest.
/// Every row holds `n_samples` raw (signed) coefficients; callers take the
/// magnitude themselves.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scaleogram {
    pub coefficients: Vec<Vec<f64>>,
    pub frequencies: Vec<f64>,
    pub scales: Vec<f64>,
    pub n_samples: usize,
    pub sample_rate: f64,
}

impl Scaleogram {
    pub fn rows(&self) -> usize {
        self.coefficients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty() || self.n_samples == 0
    }

    pub fn duration_secs(&self) -> f64 {
        self.n_samples as f64 / self.sample_rate
    }

    /// Largest absolute coefficient in the grid (0 when empty).
    pub fn max_magnitude(&self) -> f64 {
        self.coefficients
            .iter()
            .flat_map(|row| row.iter())
            .fold(0.0f64, |acc, c| acc.max(c.abs()))
    }

    /// Mean absolute coefficient of each row.
    pub fn mean_magnitudes(&self) -> Vec<f64> {
        self.coefficients
            .iter()
            .map(|row| {
                if row.is_empty() {
                    0.0
                } else {
                    row.iter().map(|c| c.abs()).sum::<f64>() / row.len() as f64
                }
            })
            .collect()
    }

    /// Frequency of the row with the largest mean magnitude.
    pub fn peak_frequency(&self) -> Option<f64> {
        let means = self.mean_magnitudes();
        let mut best: Option<(usize, f64)> = None;
        for (row, &m) in means.iter().enumerate() {
            match best {
                Some((_, b)) if m <= b => {}
                _ => best = Some((row, m)),
            }
        }
        best.map(|(row, _)| self.frequencies[row])
    }
}

/// One fixed-length window of a signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Epoch<'a> {
    /// 0-based position in the epoch sequence.
    pub index: usize,
    /// Sample offset of the first sample within the source signal.
    pub offset: usize,
    pub samples: &'a [f64],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub samples: Vec<f64>,
}

/// Named channels sharing one sampling rate, in source column order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    sample_rate: f64,
    channels: Vec<Channel>,
}

impl Recording {
    /// Validate and assemble a recording: unique names, equal lengths.
    pub fn new(sample_rate: f64, channels: Vec<Channel>) -> Result<Self, TableError> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(TableError::InvalidSampleRate(sample_rate));
        }
        if channels.is_empty() {
            return Err(TableError::NoChannels);
        }
        let expected = channels[0].samples.len();
        for (i, ch) in channels.iter().enumerate() {
            if channels[..i].iter().any(|other| other.name == ch.name) {
                return Err(TableError::DuplicateChannel(ch.name.clone()));
            }
            if ch.samples.len() != expected {
                return Err(TableError::LengthMismatch {
                    channel: ch.name.clone(),
                    len: ch.samples.len(),
                    expected,
                });
            }
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|ch| ch.name == name)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|ch| ch.name.as_str())
    }

    /// Samples per channel.
    pub fn len(&self) -> usize {
        self.channels.first().map_or(0, |ch| ch.samples.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn duration_secs(&self) -> f64 {
        self.len() as f64 / self.sample_rate
    }

    /// The first `rows` time points across all channels, row-major.
    pub fn head(&self, rows: usize) -> Vec<Vec<f64>> {
        (0..rows.min(self.len()))
            .map(|i| self.channels.iter().map(|ch| ch.samples[i]).collect())
            .collect()
    }

    pub fn summary(&self) -> RecordingSummary {
        RecordingSummary {
            channel_count: self.channels.len(),
            samples_per_channel: self.len(),
            sample_rate: self.sample_rate,
            duration_secs: self.duration_secs(),
            channel_names: self.channel_names().map(str::to_owned).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordingSummary {
    pub channel_count: usize,
    pub samples_per_channel: usize,
    pub sample_rate: f64,
    pub duration_secs: f64,
    pub channel_names: Vec<String>,
}
