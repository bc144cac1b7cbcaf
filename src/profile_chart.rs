/// Profile chart - altitude over time with the retained segments highlighted
/// Ascents are drawn yellow with their label below the trace, descents cyan with the
/// label above it, matching the layout of the quick-look plots used for flight review.
use crate::error::{ProfileError, Result};
use crate::profile_extractor::{ProfileExtraction, SegmentShape};
use chrono::NaiveTime;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::info;

const CHART_SIZE: (u32, u32) = (1160, 820);
const ASCENT_COLOR: RGBColor = RGBColor(191, 191, 0);
const DESCENT_COLOR: RGBColor = RGBColor(0, 191, 191);
const TRACE_COLOR: RGBColor = RGBColor(31, 119, 180);

pub fn chart_path(output_base: &Path) -> PathBuf {
    let mut path = OsString::from(output_base.as_os_str());
    path.push("_cart.svg");
    PathBuf::from(path)
}

pub fn render_chart(path: &Path, extraction: &ProfileExtraction, title: &str) -> Result<()> {
    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    draw_profile_chart(&root, extraction, title).map_err(|e| ProfileError::Render(e.to_string()))?;
    root.present().map_err(|e| ProfileError::Render(e.to_string()))?;
    info!("Wrote chart: {}", path.display());
    Ok(())
}

fn segment_color(shape: SegmentShape) -> RGBColor {
    match shape {
        SegmentShape::MinToMax => ASCENT_COLOR,
        SegmentShape::MaxToMin => DESCENT_COLOR,
    }
}

fn draw_profile_chart<DB>(
    root: &DrawingArea<DB, Shift>,
    extraction: &ProfileExtraction,
    title: &str,
) -> std::result::Result<(), Box<dyn std::error::Error>>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let series = &extraction.series;
    root.fill(&WHITE)?;

    let (mut x_min, mut x_max) = value_range(&series.time).unwrap_or((0.0, 1.0));
    if x_max <= x_min {
        x_min -= 1.0;
        x_max += 1.0;
    }

    let (alt_min, alt_max) = value_range(&series.altitude).unwrap_or((0.0, 1.0));
    let label_low = alt_min - 0.02 * alt_min;
    let label_high = alt_max + 0.02 * alt_max;
    let y_min = alt_min.min(label_low);
    let y_max = alt_max.max(label_high) + 50.0;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 32).into_font())
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    chart
        .configure_mesh()
        .x_desc("time")
        .y_desc("height [m]")
        .x_label_formatter(&|v| format_clock(*v))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    chart.draw_series(LineSeries::new(
        series.time.iter().copied().zip(series.altitude.iter().copied()),
        &TRACE_COLOR,
    ))?;

    for segment in &extraction.segments {
        let color = segment_color(segment.shape);
        chart.draw_series(LineSeries::new(
            (segment.start_index..segment.end_index).map(|i| (series.time[i], series.altitude[i])),
            color.stroke_width(3),
        ))?;

        let label_y = match segment.shape {
            SegmentShape::MinToMax => label_low,
            SegmentShape::MaxToMin => label_high,
        };
        let label = segment.sequence.to_string();
        let box_width = 14 * label.len() as i32 + 8;
        chart.draw_series(std::iter::once(
            EmptyElement::at((segment.start_time, label_y))
                + Rectangle::new([(-4, -4), (box_width, 26)], color.mix(0.5).filled())
                + Text::new(label, (0, 0), ("sans-serif", 24).into_font().color(&BLACK)),
        ))?;
    }

    Ok(())
}

fn value_range(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min.is_finite() && max.is_finite() {
        Some((min, max))
    } else {
        None
    }
}

/// `H:MM` clock label for a time in seconds, prefixed with whole days when needed.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() {
        return String::new();
    }

    let total = seconds.floor() as i64;
    let days = total.div_euclid(86_400);
    let secs_of_day = total.rem_euclid(86_400) as u32;
    let clock = NaiveTime::from_num_seconds_from_midnight_opt(secs_of_day, 0)
        .map(|t| t.format("%-H:%M").to_string())
        .unwrap_or_default();

    match days {
        0 => clock,
        1 | -1 => format!("{} day, {}", days, clock),
        _ => format!("{} days, {}", days, clock),
    }
}

/// Chart title from an input name like `xwakes_20190807_flug2.mat` -> `2019.08.07 flug2`.
pub fn chart_title(input: &Path) -> String {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let tokens: Vec<&str> = stem.split('_').collect();

    let date = tokens
        .iter()
        .find(|t| t.len() == 8 && t.contains("20"))
        .and_then(|t| format_date_token(t))
        .unwrap_or_else(|| "Date?".to_string());
    let flight = tokens.iter().find(|t| t.contains("flug")).copied().unwrap_or("");

    format!("{} {}", date, flight).trim_end().to_string()
}

/// `YYYYMMDD` -> `YYYY.MM.DD`. The token is split 4/2/2 without checking it is a real date.
fn format_date_token(token: &str) -> Option<String> {
    Some(format!("{}.{}.{}", token.get(..4)?, token.get(4..6)?, token.get(6..)?))
}
