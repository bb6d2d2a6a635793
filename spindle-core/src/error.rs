use thiserror::Error;

/// Rejection of malformed input to one of the DSP operations.
///
/// Degenerate but well-formed input (an empty or constant signal) is never an
/// error; it produces empty results instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpindleError {
    #[error("sampling rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),

    #[error("sample {index} is not a finite number")]
    NonFiniteSample { index: usize },

    #[error("parameter `{name}` is out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("invalid frequency band {low_hz}..={high_hz} Hz")]
    InvalidBand { low_hz: f64, high_hz: f64 },

    #[error("an epoch of {duration_secs} s at {sample_rate} Hz holds no samples")]
    EmptyEpoch { duration_secs: f64, sample_rate: f64 },

    #[error("FFT failed: {0}")]
    Fft(String),
}

/// Failure to shape a table into a [`Recording`](crate::Recording).
///
/// For workbooks, `line` is the 1-based spreadsheet row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("input contains no header line")]
    Empty,

    #[error("no channel columns follow the leading time column")]
    NoChannels,

    #[error("duplicate channel name `{0}`")]
    DuplicateChannel(String),

    #[error("line {line}: expected {expected} fields, found {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}, channel `{channel}`: cannot read `{text}` as a finite number")]
    BadCell {
        line: usize,
        channel: String,
        text: String,
    },

    #[error("channel `{channel}` has {len} samples, expected {expected}")]
    LengthMismatch {
        channel: String,
        len: usize,
        expected: usize,
    },

    #[error("line {line}: unterminated quoted field")]
    UnclosedQuote { line: usize },

    #[error("sampling rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),

    #[error("workbook has no sheet `{name}` (available: {})", .available.join(", "))]
    UnknownSheet { name: String, available: Vec<String> },

    #[error("cannot read workbook: {0}")]
    Workbook(String),
}

/// Pipeline-level error: either class propagates unchanged.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Dsp(#[from] SpindleError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error("unknown channel `{0}`")]
    UnknownChannel(String),

    #[error("this task needs a channel to be selected")]
    NoChannelSelected,
}
