/// Flight Profile Extractor - pair alternating altitude extrema into ascent/descent legs
/// Uses extremum_detection.rs for the peaks and valleys, then keeps the legs shorter than
/// the mean leg and averages position and wind over each of them.
use crate::extremum_detection::{detect_extrema, DetectedExtrema, Extremum, ExtremumConfig, ExtremumKind};
use crate::sample_series::SampleSeries;
use geo::{point, HaversineDistance};
use std::io::{self, Write};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentShape {
    MinToMax,
    MaxToMin,
}

impl SegmentShape {
    pub fn label(&self) -> &'static str {
        match self {
            SegmentShape::MinToMax => "ascent",
            SegmentShape::MaxToMin => "descent",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtremumPair {
    pub start_index: usize,
    pub end_index: usize,
    pub shape: SegmentShape,
}

impl ExtremumPair {
    pub fn span(&self) -> usize {
        self.end_index - self.start_index
    }
}

/// Which candidate legs survive into the output.
///
/// `BelowMeanSpan` keeps legs strictly shorter (in samples) than the mean over all
/// candidates. It is a crude outlier cut, not a statistical test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationFilter {
    #[default]
    BelowMeanSpan,
    KeepAll,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionConfig {
    pub extremum: ExtremumConfig,
    pub duration_filter: DurationFilter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub sequence: usize,
    pub shape: SegmentShape,
    pub start_index: usize,
    pub end_index: usize,
    pub start_time: f64,
    pub end_time: f64,
    pub mean_latitude: f64,
    pub mean_longitude: f64,
    pub mean_wind_speed: f64,
    pub mean_wind_direction: f64,
    pub track_length_km: f64,
}

#[derive(Debug, Clone)]
pub struct ProfileExtraction {
    pub series: SampleSeries,
    pub extrema: DetectedExtrema,
    pub candidate_pairs: Vec<ExtremumPair>,
    pub mean_span: Option<f64>,
    pub segments: Vec<Segment>,
}

pub fn extract_profiles_default(raw: &SampleSeries) -> ProfileExtraction {
    extract_profiles(raw, &ExtractionConfig::default())
}

pub fn extract_profiles(raw: &SampleSeries, config: &ExtractionConfig) -> ProfileExtraction {
    let series = raw.filter_finite();

    let extrema = detect_extrema(&series.altitude, &config.extremum);
    info!(
        "Detected {} peaks and {} valleys in {} samples",
        extrema.peaks.len(),
        extrema.valleys.len(),
        series.len()
    );

    let candidate_pairs = pair_alternating_extrema(&extrema.peaks, &extrema.valleys);
    let mean_span = mean_pair_span(&candidate_pairs);
    let retained = apply_duration_filter(&candidate_pairs, config.duration_filter);

    match mean_span {
        Some(mean) => info!(
            "Kept {} of {} alternating pairs (mean span {:.1} samples)",
            retained.len(),
            candidate_pairs.len(),
            mean
        ),
        None => info!("No alternating extremum pairs found"),
    }

    let segments = aggregate_segments(&retained, &series);

    ProfileExtraction {
        series,
        extrema,
        candidate_pairs,
        mean_span,
        segments,
    }
}

/// Merge peaks and valleys by index and keep each neighbouring pair of opposite kind.
pub fn pair_alternating_extrema(peaks: &[usize], valleys: &[usize]) -> Vec<ExtremumPair> {
    let mut merged: Vec<Extremum> = peaks
        .iter()
        .map(|&index| Extremum { index, kind: ExtremumKind::Max })
        .chain(valleys.iter().map(|&index| Extremum { index, kind: ExtremumKind::Min }))
        .collect();
    // stable: ties keep peaks ahead of valleys
    merged.sort_by_key(|e| e.index);

    merged
        .windows(2)
        .filter(|w| w[0].kind != w[1].kind)
        .map(|w| ExtremumPair {
            start_index: w[0].index,
            end_index: w[1].index,
            shape: match w[0].kind {
                ExtremumKind::Min => SegmentShape::MinToMax,
                ExtremumKind::Max => SegmentShape::MaxToMin,
            },
        })
        .collect()
}

pub fn mean_pair_span(pairs: &[ExtremumPair]) -> Option<f64> {
    if pairs.is_empty() {
        return None;
    }
    let total: usize = pairs.iter().map(ExtremumPair::span).sum();
    Some(total as f64 / pairs.len() as f64)
}

pub fn apply_duration_filter(pairs: &[ExtremumPair], filter: DurationFilter) -> Vec<ExtremumPair> {
    match filter {
        DurationFilter::KeepAll => pairs.to_vec(),
        DurationFilter::BelowMeanSpan => match mean_pair_span(pairs) {
            Some(mean) => pairs
                .iter()
                .filter(|pair| (pair.span() as f64) < mean)
                .copied()
                .collect(),
            None => Vec::new(),
        },
    }
}

pub fn aggregate_segments(pairs: &[ExtremumPair], series: &SampleSeries) -> Vec<Segment> {
    pairs
        .iter()
        .enumerate()
        .map(|(sequence, pair)| create_segment(sequence, pair, series))
        .collect()
}

/// Pairs come from extrema of `series.altitude`, so `start < end < len` always holds.
fn create_segment(sequence: usize, pair: &ExtremumPair, series: &SampleSeries) -> Segment {
    let s = pair.start_index;
    let e = pair.end_index;
    debug_assert!(s < e && e < series.len(), "pair {}..{} outside of {} samples", s, e, series.len());

    Segment {
        sequence,
        shape: pair.shape,
        start_index: s,
        end_index: e,
        start_time: series.time[s],
        end_time: series.time[e],
        mean_latitude: mean(&series.latitude[s..e]),
        mean_longitude: mean(&series.longitude[s..e]),
        mean_wind_speed: mean(&series.wind_speed[s..e]),
        mean_wind_direction: mean(&series.wind_direction[s..e]),
        track_length_km: track_length_km(&series.latitude[s..=e], &series.longitude[s..=e]),
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn track_length_km(latitudes: &[f64], longitudes: &[f64]) -> f64 {
    let meters: f64 = latitudes
        .windows(2)
        .zip(longitudes.windows(2))
        .map(|(lat, lon)| {
            let a = point!(x: lon[0], y: lat[0]);
            let b = point!(x: lon[1], y: lat[1]);
            a.haversine_distance(&b)
        })
        .sum();
    meters / 1000.0
}

pub fn write_extraction_summary<W: Write>(out: &mut W, extraction: &ProfileExtraction) -> io::Result<()> {
    writeln!(out, "\n=== FLIGHT PROFILE EXTRACTION ===")?;
    writeln!(
        out,
        "Samples: {}, Peaks: {}, Valleys: {}, Candidate legs: {}",
        extraction.series.len(),
        extraction.extrema.peaks.len(),
        extraction.extrema.valleys.len(),
        extraction.candidate_pairs.len()
    )?;

    if extraction.segments.is_empty() {
        writeln!(out, "⚠️  No profile segments retained")?;
    }

    for segment in &extraction.segments {
        writeln!(
            out,
            "  #{:<3} {:<7} {:>9.0}s → {:>9.0}s  lat {:.4} lon {:.4}  {:.1}km  wind {:.1}m/s @ {:.0}°",
            segment.sequence,
            segment.shape.label(),
            segment.start_time,
            segment.end_time,
            segment.mean_latitude,
            segment.mean_longitude,
            segment.track_length_km,
            segment.mean_wind_speed,
            segment.mean_wind_direction
        )?;
    }
    writeln!(out, "=== EXTRACTION COMPLETE ===\n")
}
