/// Segment report output - one tab-separated line per retained profile segment
/// The layout matches numpy.savetxt defaults (`# ` header, `%.18e` values) so existing
/// downstream scripts keep reading the files unchanged.
use crate::error::Result;
use crate::profile_extractor::Segment;
use csv::{Terminator, WriterBuilder};
use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const REPORT_HEADER: &str =
    "sys_time:start and finish of each data segment, mean lats, lons, wspd, wdir";

pub fn report_path(output_base: &Path) -> PathBuf {
    let mut path = OsString::from(output_base.as_os_str());
    path.push(".txt");
    PathBuf::from(path)
}

pub fn write_report<W: Write>(mut out: W, segments: &[Segment]) -> Result<()> {
    writeln!(out, "# {}", REPORT_HEADER)?;

    let mut wtr = WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);

    for segment in segments {
        let row = [
            segment.start_time,
            segment.end_time,
            segment.mean_latitude,
            segment.mean_longitude,
            segment.mean_wind_speed,
            segment.mean_wind_direction,
        ];
        wtr.write_record(row.iter().map(|&v| format_scientific(v)))?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_report_file(path: &Path, segments: &[Segment]) -> Result<()> {
    let file = File::create(path)?;
    write_report(BufWriter::new(file), segments)?;
    info!("Wrote {} segments to {}", segments.len(), path.display());
    Ok(())
}

/// Format like C's `%.18e`: 18 fractional digits and a signed, two-digit exponent.
pub fn format_scientific(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }

    let formatted = format!("{:.18e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile_extractor::SegmentShape;

    fn segment(sequence: usize, start_time: f64) -> Segment {
        Segment {
            sequence,
            shape: SegmentShape::MinToMax,
            start_index: 0,
            end_index: 10,
            start_time,
            end_time: start_time + 600.0,
            mean_latitude: 54.5,
            mean_longitude: 7.25,
            mean_wind_speed: 8.0,
            mean_wind_direction: 245.0,
            track_length_km: 12.0,
        }
    }

    #[test]
    fn test_scientific_format_matches_numpy() {
        assert_eq!(format_scientific(1.0), "1.000000000000000000e+00");
        assert_eq!(format_scientific(0.0), "0.000000000000000000e+00");
        assert_eq!(format_scientific(-0.25), "-2.500000000000000000e-01");
        assert_eq!(format_scientific(36000.0), "3.600000000000000000e+04");
        assert_eq!(format_scientific(1e-120), "9.999999999999999786e-121");
        assert_eq!(format_scientific(0.1), "1.000000000000000056e-01");
        assert_eq!(format_scientific(f64::NAN), "nan");
    }

    #[test]
    fn test_report_path_keeps_base_name() {
        assert_eq!(report_path(Path::new("out/20190807.flug2")), PathBuf::from("out/20190807.flug2.txt"));
    }

    #[test]
    fn test_empty_report_is_header_only() {
        let mut buffer = Vec::new();
        write_report(&mut buffer, &[]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert_eq!(text, format!("# {}\n", REPORT_HEADER));
    }

    #[test]
    fn test_report_rows_are_tab_separated() {
        let mut buffer = Vec::new();
        write_report(&mut buffer, &[segment(0, 36000.0), segment(1, 40000.0)]).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("# sys_time"));
        let columns: Vec<&str> = lines[1].split('\t').collect();
        assert_eq!(
            columns,
            vec![
                "3.600000000000000000e+04",
                "3.660000000000000000e+04",
                "5.450000000000000000e+01",
                "7.250000000000000000e+00",
                "8.000000000000000000e+00",
                "2.450000000000000000e+02",
            ]
        );
    }

    #[test]
    fn test_report_file_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        let segments = vec![segment(0, 100.0), segment(1, 900.0)];

        write_report_file(&first, &segments).unwrap();
        write_report_file(&second, &segments).unwrap();

        let a = std::fs::read(&first).unwrap();
        let b = std::fs::read(&second).unwrap();
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }
}
