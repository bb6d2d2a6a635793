/// Perceptual colour maps used for wavelet magnitude images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMap {
    /// Whole-recording scaleograms.
    #[default]
    Viridis,
    /// Per-epoch scaleograms.
    Plasma,
}

// Five evenly spaced stops of the matplotlib maps, interpolated linearly.
const VIRIDIS: [[u8; 3]; 5] = [
    [68, 1, 84],
    [59, 82, 139],
    [33, 145, 140],
    [94, 201, 98],
    [253, 231, 37],
];

const PLASMA: [[u8; 3]; 5] = [
    [13, 8, 135],
    [126, 3, 168],
    [204, 71, 120],
    [248, 149, 64],
    [240, 249, 33],
];

impl ColorMap {
    /// Map a normalised value (0-1) to RGB. Out-of-range input is clamped.
    pub fn map(self, value: f64) -> [u8; 3] {
        let stops = match self {
            ColorMap::Viridis => &VIRIDIS,
            ColorMap::Plasma => &PLASMA,
        };
        let t = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let pos = t * (stops.len() - 1) as f64;
        let lo = (pos.floor() as usize).min(stops.len() - 2);
        let frac = pos - lo as f64;
        let (a, b) = (stops[lo], stops[lo + 1]);
        [0, 1, 2].map(|i| (a[i] as f64 + (b[i] as f64 - a[i] as f64) * frac).round() as u8)
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorMap::Viridis => "viridis",
            ColorMap::Plasma => "plasma",
        }
    }
}

/// Linear magnitude scaling against the image maximum.
pub fn magnitude_to_unit(mag: f64, max_mag: f64) -> f64 {
    if max_mag <= 0.0 || !max_mag.is_finite() {
        return 0.0;
    }
    (mag.abs() / max_mag).clamp(0.0, 1.0)
}

/// CSS colour for shading detected spindles on the waveform.
pub const SPINDLE_SHADE: &str = "rgba(220, 40, 40, 0.3)";
