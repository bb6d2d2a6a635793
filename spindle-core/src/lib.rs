//! Alpha spindle analysis for multichannel EEG.
//!
//! Detection runs on the Hilbert envelope of each channel; time-frequency
//! views come from a Morlet wavelet transform restricted to a band; long
//! recordings are cut into fixed-length epochs and analysed one by one.

pub mod config;
pub mod dsp;
pub mod error;
pub mod pipeline;
pub mod table;
pub mod types;

pub use config::AnalysisConfig;
pub use dsp::envelope::envelope;
pub use dsp::epoch::{epochs, samples_per_epoch};
pub use dsp::spindle_detect::detect_spindles;
pub use dsp::wavelet::compute_wavelet;
pub use error::{Error, SpindleError, TableError};
pub use pipeline::{run_task, ChannelPipeline, ChannelSpindles, EpochAnalysis, Task, TaskReport};
pub use table::{is_workbook_name, load_recording, parse_delimited, parse_workbook, workbook_sheets, TableSource};
pub use types::{
    Channel, Epoch, FrequencyBand, Recording, RecordingSummary, Scaleogram, SpindleEvent, SpindleParams,
    DEFAULT_SAMPLE_RATE,
};
