/// Flight-wide mean wind direction
///
/// The mean is a plain arithmetic average of the raw direction column. It is NOT a
/// circular mean, so flights with winds on both sides of north average towards south.
/// That behaviour is kept for compatibility with existing reports; a warning is
/// logged when the data straddles north.
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindDirectionSummary {
    pub mean_degrees: f64,
    pub valid_samples: usize,
    pub straddles_north: bool,
}

impl WindDirectionSummary {
    pub fn rounded_degrees(&self) -> i64 {
        self.mean_degrees.round() as i64
    }

    /// Zero-padded three digit form, e.g. `007` or `245`.
    pub fn formatted(&self) -> String {
        format!("{:03}", self.rounded_degrees())
    }
}

pub fn summarize_wind_direction(raw_wind_direction: &[f64]) -> Option<WindDirectionSummary> {
    let valid: Vec<f64> = raw_wind_direction
        .iter()
        .copied()
        .filter(|d| d.is_finite())
        .collect();

    if valid.is_empty() {
        warn!("No finite wind direction samples, mean wind direction unavailable");
        return None;
    }

    let mean_degrees = valid.iter().sum::<f64>() / valid.len() as f64;
    let straddles_north = valid.iter().any(|&d| d < 90.0) && valid.iter().any(|&d| d > 270.0);

    if straddles_north {
        warn!(
            "Wind directions lie on both sides of north; arithmetic mean {:.1}° is not a circular mean",
            mean_degrees
        );
    }

    Some(WindDirectionSummary {
        mean_degrees,
        valid_samples: valid.len(),
        straddles_north,
    })
}
