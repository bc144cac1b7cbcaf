/// Aligned Sensor Series - the six per-sample flight measurements
/// Construction enforces equal lengths; `filter_finite` drops every sample where any
/// sensor reported NaN/Inf, applying one shared mask so the series stay aligned.
use crate::error::{ProfileError, Result};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    pub altitude: Vec<f64>,
    pub latitude: Vec<f64>,
    pub longitude: Vec<f64>,
    pub time: Vec<f64>,
    pub wind_direction: Vec<f64>,
    pub wind_speed: Vec<f64>,
}

impl SampleSeries {
    pub fn new(
        altitude: Vec<f64>,
        latitude: Vec<f64>,
        longitude: Vec<f64>,
        time: Vec<f64>,
        wind_direction: Vec<f64>,
        wind_speed: Vec<f64>,
    ) -> Result<Self> {
        let expected = altitude.len();
        let others = [
            ("latitude", latitude.len()),
            ("longitude", longitude.len()),
            ("time", time.len()),
            ("wind_direction", wind_direction.len()),
            ("wind_speed", wind_speed.len()),
        ];

        for (field, actual) in others {
            if actual != expected {
                return Err(ProfileError::LengthMismatch { field, expected, actual });
            }
        }

        Ok(SampleSeries {
            altitude,
            latitude,
            longitude,
            time,
            wind_direction,
            wind_speed,
        })
    }

    pub fn len(&self) -> usize {
        self.altitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.altitude.is_empty()
    }

    /// Mask of samples where all six sensors are finite.
    pub fn finite_mask(&self) -> Vec<bool> {
        (0..self.len())
            .map(|i| {
                self.altitude[i].is_finite()
                    && self.latitude[i].is_finite()
                    && self.longitude[i].is_finite()
                    && self.time[i].is_finite()
                    && self.wind_direction[i].is_finite()
                    && self.wind_speed[i].is_finite()
            })
            .collect()
    }

    pub fn filter_finite(&self) -> SampleSeries {
        let mask = self.finite_mask();
        let kept = mask.iter().filter(|&&keep| keep).count();
        let dropped = self.len() - kept;

        if dropped > 0 {
            info!(
                "Validity filter dropped {} of {} samples with non-finite values",
                dropped,
                self.len()
            );
        } else {
            debug!("Validity filter kept all {} samples", kept);
        }

        SampleSeries {
            altitude: apply_mask(&self.altitude, &mask),
            latitude: apply_mask(&self.latitude, &mask),
            longitude: apply_mask(&self.longitude, &mask),
            time: apply_mask(&self.time, &mask),
            wind_direction: apply_mask(&self.wind_direction, &mask),
            wind_speed: apply_mask(&self.wind_speed, &mask),
        }
    }
}

fn apply_mask(values: &[f64], mask: &[bool]) -> Vec<f64> {
    values
        .iter()
        .zip(mask)
        .filter(|(_, &keep)| keep)
        .map(|(&value, _)| value)
        .collect()
}
