//! Per-channel orchestration of detection, wavelet, and epoch analysis.
//!
//! Nothing here computes anything new; it sequences the DSP calls and shapes
//! their results for a presentation layer.

use crate::config::AnalysisConfig;
use crate::dsp::epoch::epochs;
use crate::dsp::spindle_detect::detect_spindles;
use crate::dsp::wavelet::compute_wavelet;
use crate::error::Error;
use crate::types::{Channel, Recording, Scaleogram, SpindleEvent};
use serde::{Deserialize, Serialize};

/// The four analyses offered to the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    TotalCount,
    ChannelCounts,
    Wavelet,
    Epochs,
}

impl Task {
    pub const ALL: [Task; 4] = [Task::TotalCount, Task::ChannelCounts, Task::Wavelet, Task::Epochs];

    pub fn label(self) -> &'static str {
        match self {
            Task::TotalCount => "1. Total Alpha Spindle Count",
            Task::ChannelCounts => "2. Electrode-wise Spindle Count",
            Task::Wavelet => "3. Wavelet Power Visualization",
            Task::Epochs => "4. Epoch-based Spindle Detection",
        }
    }

    pub fn needs_channel(self) -> bool {
        matches!(self, Task::Wavelet | Task::Epochs)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelSpindles {
    pub channel: String,
    pub count: usize,
    pub events: Vec<SpindleEvent>,
}

/// Analysis of one epoch. Event indices are relative to the epoch start.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EpochAnalysis {
    pub index: usize,
    pub offset: usize,
    pub samples: Vec<f64>,
    pub spindles: Vec<SpindleEvent>,
    pub scaleogram: Scaleogram,
}

impl EpochAnalysis {
    pub fn start_secs(&self, sample_rate: f64) -> f64 {
        self.offset as f64 / sample_rate
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "snake_case")]
pub enum TaskReport {
    TotalCount {
        total: usize,
    },
    ChannelCounts {
        channels: Vec<ChannelSpindles>,
    },
    Wavelet {
        channel: String,
        scaleogram: Scaleogram,
    },
    Epochs {
        channel: String,
        sample_rate: f64,
        epochs: Vec<EpochAnalysis>,
    },
}

/// Runs tasks over one recording with one validated configuration.
pub struct ChannelPipeline<'r> {
    recording: &'r Recording,
    config: AnalysisConfig,
}

impl<'r> ChannelPipeline<'r> {
    pub fn new(recording: &'r Recording, config: AnalysisConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self { recording, config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn sample_rate(&self) -> f64 {
        self.recording.sample_rate()
    }

    fn channel(&self, name: &str) -> Result<&'r Channel, Error> {
        self.recording
            .channel(name)
            .ok_or_else(|| Error::UnknownChannel(name.to_string()))
    }

    pub fn spindles(&self, name: &str) -> Result<Vec<SpindleEvent>, Error> {
        let ch = self.channel(name)?;
        Ok(detect_spindles(&ch.samples, self.sample_rate(), &self.config.spindle)?)
    }

    /// Spindle events for every channel, in recording order.
    pub fn spindle_counts(&self) -> Result<Vec<ChannelSpindles>, Error> {
        self.recording
            .channels()
            .iter()
            .map(|ch| {
                let events = detect_spindles(&ch.samples, self.sample_rate(), &self.config.spindle)?;
                Ok(ChannelSpindles {
                    channel: ch.name.clone(),
                    count: events.len(),
                    events,
                })
            })
            .collect()
    }

    pub fn total_spindle_count(&self) -> Result<usize, Error> {
        Ok(self.spindle_counts()?.iter().map(|c| c.count).sum())
    }

    pub fn channel_wavelet(&self, name: &str) -> Result<Scaleogram, Error> {
        let ch = self.channel(name)?;
        Ok(compute_wavelet(&ch.samples, self.sample_rate(), &self.config.band)?)
    }

    /// Epochs of one channel, each with its spindles and scaleogram.
    pub fn channel_epochs(&self, name: &str) -> Result<Vec<EpochAnalysis>, Error> {
        let ch = self.channel(name)?;
        let sr = self.sample_rate();
        let mut out = Vec::new();
        for epoch in epochs(&ch.samples, sr, self.config.epoch_secs)? {
            let spindles = detect_spindles(epoch.samples, sr, &self.config.spindle)?;
            let scaleogram = compute_wavelet(epoch.samples, sr, &self.config.band)?;
            out.push(EpochAnalysis {
                index: epoch.index,
                offset: epoch.offset,
                samples: epoch.samples.to_vec(),
                spindles,
                scaleogram,
            });
        }
        log::debug!("channel {name}: {} epochs analysed", out.len());
        Ok(out)
    }

    pub fn run(&self, task: Task, channel: Option<&str>) -> Result<TaskReport, Error> {
        let selected = || channel.ok_or(Error::NoChannelSelected);
        match task {
            Task::TotalCount => Ok(TaskReport::TotalCount {
                total: self.total_spindle_count()?,
            }),
            Task::ChannelCounts => Ok(TaskReport::ChannelCounts {
                channels: self.spindle_counts()?,
            }),
            Task::Wavelet => {
                let name = selected()?;
                Ok(TaskReport::Wavelet {
                    channel: name.to_string(),
                    scaleogram: self.channel_wavelet(name)?,
                })
            }
            Task::Epochs => {
                let name = selected()?;
                Ok(TaskReport::Epochs {
                    channel: name.to_string(),
                    sample_rate: self.sample_rate(),
                    epochs: self.channel_epochs(name)?,
                })
            }
        }
    }
}

/// One-shot entry point shared by the presentation layers.
pub fn run_task(
    recording: &Recording,
    config: &AnalysisConfig,
    task: Task,
    channel: Option<&str>,
) -> Result<TaskReport, Error> {
    ChannelPipeline::new(recording, config.clone())?.run(task, channel)
}
