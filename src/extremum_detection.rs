/// Altitude Extremum Detection - peaks above a ceiling, valleys below a floor
/// Peak finding mirrors scipy.signal.find_peaks: plateau-aware local maxima, then a
/// height filter, then a prominence filter. Valleys are peaks of the negated signal.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremumKind {
    Max,
    Min,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extremum {
    pub index: usize,
    pub kind: ExtremumKind,
}

#[derive(Debug, Clone)]
pub struct ExtremumConfig {
    /// Peaks must reach at least this altitude (m)
    pub peak_height_threshold: f64,
    /// Valleys must stay at or below this altitude (m)
    pub valley_height_threshold: f64,
    /// Minimum prominence for both peaks and valleys (m)
    pub prominence: f64,
}

impl Default for ExtremumConfig {
    fn default() -> Self {
        ExtremumConfig {
            peak_height_threshold: 800.0,
            valley_height_threshold: 100.0,
            prominence: 50.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectedExtrema {
    pub peaks: Vec<usize>,
    pub valleys: Vec<usize>,
}

impl DetectedExtrema {
    pub fn is_empty(&self) -> bool {
        self.peaks.is_empty() && self.valleys.is_empty()
    }
}

pub fn detect_extrema(altitude: &[f64], config: &ExtremumConfig) -> DetectedExtrema {
    let peaks = find_peaks(altitude, config.peak_height_threshold, config.prominence);

    let negated: Vec<f64> = altitude.iter().map(|&a| -a).collect();
    let valleys = find_peaks(&negated, -config.valley_height_threshold, config.prominence);

    DetectedExtrema { peaks, valleys }
}

/// Indices of local maxima with `x[i] >= min_height` and prominence `>= min_prominence`.
pub fn find_peaks(x: &[f64], min_height: f64, min_prominence: f64) -> Vec<usize> {
    local_maxima(x)
        .into_iter()
        .filter(|&peak| x[peak] >= min_height)
        .filter(|&peak| peak_prominence(x, peak) >= min_prominence)
        .collect()
}

/// Local maxima including flat plateaus; a plateau reports its midpoint (rounded down).
/// Boundary samples are never maxima.
pub fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if x.len() < 3 {
        return maxima;
    }

    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut i_ahead = i + 1;
            while i_ahead < i_max && x[i_ahead] == x[i] {
                i_ahead += 1;
            }

            if x[i_ahead] < x[i] {
                let left_edge = i;
                let right_edge = i_ahead - 1;
                maxima.push((left_edge + right_edge) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }

    maxima
}

/// Vertical distance between the peak and the higher of its two bases. Each base is the
/// lowest sample between the peak and the first strictly higher sample (or the boundary).
pub fn peak_prominence(x: &[f64], peak: usize) -> f64 {
    let height = x[peak];

    let mut left_min = height;
    for &value in x[..=peak].iter().rev() {
        if value > height {
            break;
        }
        left_min = left_min.min(value);
    }

    let mut right_min = height;
    for &value in &x[peak..] {
        if value > height {
            break;
        }
        right_min = right_min.min(value);
    }

    height - left_min.max(right_min)
}
