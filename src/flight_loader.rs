/// Flight data loading - MATLAB `.mat` exports and delimited text tables
///
/// Both formats must expose the six sensor fields under the names used by the
/// aircraft data export: `Alt`, `Lat`, `Lon`, `sys_time`, `DD` (wind direction) and
/// `FF` (wind speed).
use crate::error::{ProfileError, Result};
use crate::sample_series::SampleSeries;
use csv::{ReaderBuilder, Trim};
use matfile::{MatFile, NumericData};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

pub const FIELD_ALTITUDE: &str = "Alt";
pub const FIELD_LATITUDE: &str = "Lat";
pub const FIELD_LONGITUDE: &str = "Lon";
pub const FIELD_TIME: &str = "sys_time";
pub const FIELD_WIND_DIRECTION: &str = "DD";
pub const FIELD_WIND_SPEED: &str = "FF";

pub const REQUIRED_FIELDS: [&str; 6] = [
    FIELD_ALTITUDE,
    FIELD_LATITUDE,
    FIELD_LONGITUDE,
    FIELD_TIME,
    FIELD_WIND_DIRECTION,
    FIELD_WIND_SPEED,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Mat,
    Delimited(u8),
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "mat" => Ok(InputFormat::Mat),
            "csv" | "txt" => Ok(InputFormat::Delimited(b',')),
            "tsv" => Ok(InputFormat::Delimited(b'\t')),
            _ => Err(ProfileError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

pub fn load_flight(path: &Path) -> Result<SampleSeries> {
    let series = match InputFormat::from_path(path)? {
        InputFormat::Mat => load_mat_file(path)?,
        InputFormat::Delimited(delimiter) => load_delimited_file(path, delimiter)?,
    };
    info!("Loaded {} samples from {}", series.len(), path.display());
    Ok(series)
}

pub fn load_mat_file(path: &Path) -> Result<SampleSeries> {
    let file = File::open(path)?;
    let mat = MatFile::parse(BufReader::new(file)).map_err(|e| ProfileError::Mat(format!("{:?}", e)))?;

    debug!(
        "MAT variables: {:?}",
        mat.arrays().iter().map(|a| a.name()).collect::<Vec<_>>()
    );

    SampleSeries::new(
        mat_variable(&mat, FIELD_ALTITUDE)?,
        mat_variable(&mat, FIELD_LATITUDE)?,
        mat_variable(&mat, FIELD_LONGITUDE)?,
        mat_variable(&mat, FIELD_TIME)?,
        mat_variable(&mat, FIELD_WIND_DIRECTION)?,
        mat_variable(&mat, FIELD_WIND_SPEED)?,
    )
}

/// Flattened contents of a numeric MAT variable, widened to f64.
fn mat_variable(mat: &MatFile, name: &str) -> Result<Vec<f64>> {
    let array = mat
        .find_by_name(name)
        .ok_or_else(|| ProfileError::MissingField(name.to_string()))?;

    macro_rules! widen {
        ($real:expr, $imag:expr) => {{
            if $imag.is_some() {
                return Err(ProfileError::UnsupportedField {
                    name: name.to_string(),
                    reason: "complex values".to_string(),
                });
            }
            $real.iter().map(|&v| v as f64).collect()
        }};
    }

    let values: Vec<f64> = match array.data() {
        NumericData::Double { real, imag } => widen!(real, imag),
        NumericData::Single { real, imag } => widen!(real, imag),
        NumericData::Int8 { real, imag } => widen!(real, imag),
        NumericData::UInt8 { real, imag } => widen!(real, imag),
        NumericData::Int16 { real, imag } => widen!(real, imag),
        NumericData::UInt16 { real, imag } => widen!(real, imag),
        NumericData::Int32 { real, imag } => widen!(real, imag),
        NumericData::UInt32 { real, imag } => widen!(real, imag),
        NumericData::Int64 { real, imag } => widen!(real, imag),
        NumericData::UInt64 { real, imag } => widen!(real, imag),
    };

    debug!("MAT variable {} {:?} -> {} values", name, array.size(), values.len());
    Ok(values)
}

#[derive(Debug, Deserialize)]
struct FlightRecord {
    #[serde(rename = "Alt", deserialize_with = "csv::invalid_option")]
    altitude: Option<f64>,
    #[serde(rename = "Lat", deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(rename = "Lon", deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
    #[serde(rename = "sys_time", deserialize_with = "csv::invalid_option")]
    time: Option<f64>,
    #[serde(rename = "DD", deserialize_with = "csv::invalid_option")]
    wind_direction: Option<f64>,
    #[serde(rename = "FF", deserialize_with = "csv::invalid_option")]
    wind_speed: Option<f64>,
}

/// Header row with the six field names; empty or unparseable cells load as NaN.
pub fn load_delimited_file(path: &Path, delimiter: u8) -> Result<SampleSeries> {
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_path(path)?;

    let headers = rdr.headers()?.clone();
    for field in REQUIRED_FIELDS {
        if !headers.iter().any(|h| h == field) {
            return Err(ProfileError::MissingField(field.to_string()));
        }
    }

    let mut altitude = Vec::new();
    let mut latitude = Vec::new();
    let mut longitude = Vec::new();
    let mut time = Vec::new();
    let mut wind_direction = Vec::new();
    let mut wind_speed = Vec::new();

    for result in rdr.deserialize::<FlightRecord>() {
        let record = result?;
        altitude.push(record.altitude.unwrap_or(f64::NAN));
        latitude.push(record.latitude.unwrap_or(f64::NAN));
        longitude.push(record.longitude.unwrap_or(f64::NAN));
        time.push(record.time.unwrap_or(f64::NAN));
        wind_direction.push(record.wind_direction.unwrap_or(f64::NAN));
        wind_speed.push(record.wind_speed.unwrap_or(f64::NAN));
    }

    SampleSeries::new(altitude, latitude, longitude, time, wind_direction, wind_speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    /// Minimal little-endian level 5 MAT file with uncompressed 1xN double variables.
    fn mat_bytes(variables: &[(&str, Vec<f64>)]) -> Vec<u8> {
        fn pad8(len: usize) -> usize {
            (len + 7) / 8 * 8
        }

        let mut bytes = Vec::new();
        let mut text = b"MATLAB 5.0 MAT-file, Platform: GLNXA64, Created by: test".to_vec();
        text.resize(116, b' ');
        bytes.extend_from_slice(&text);
        bytes.extend_from_slice(&[0u8; 8]);
        bytes.extend_from_slice(&0x0100u16.to_le_bytes());
        bytes.extend_from_slice(b"IM");

        for (name, values) in variables {
            let name_len = name.len();
            let body_len = 16 + 16 + 8 + pad8(name_len) + 8 + values.len() * 8;

            bytes.extend_from_slice(&14u32.to_le_bytes());
            bytes.extend_from_slice(&(body_len as u32).to_le_bytes());

            // array flags: mxDOUBLE_CLASS
            bytes.extend_from_slice(&6u32.to_le_bytes());
            bytes.extend_from_slice(&8u32.to_le_bytes());
            bytes.extend_from_slice(&6u32.to_le_bytes());
            bytes.extend_from_slice(&0u32.to_le_bytes());

            // dimensions 1 x n
            bytes.extend_from_slice(&5u32.to_le_bytes());
            bytes.extend_from_slice(&8u32.to_le_bytes());
            bytes.extend_from_slice(&1i32.to_le_bytes());
            bytes.extend_from_slice(&(values.len() as i32).to_le_bytes());

            bytes.extend_from_slice(&1u32.to_le_bytes());
            bytes.extend_from_slice(&(name_len as u32).to_le_bytes());
            let mut padded_name = name.as_bytes().to_vec();
            padded_name.resize(pad8(name_len), 0);
            bytes.extend_from_slice(&padded_name);

            bytes.extend_from_slice(&9u32.to_le_bytes());
            bytes.extend_from_slice(&((values.len() * 8) as u32).to_le_bytes());
            for v in values {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
        }

        bytes
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(InputFormat::from_path(Path::new("a/b_flug1.mat")).unwrap(), InputFormat::Mat);
        assert_eq!(InputFormat::from_path(Path::new("x.CSV")).unwrap(), InputFormat::Delimited(b','));
        assert_eq!(InputFormat::from_path(Path::new("x.tsv")).unwrap(), InputFormat::Delimited(b'\t'));
        assert!(matches!(
            InputFormat::from_path(Path::new("x.nc")),
            Err(ProfileError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_load_csv_with_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(
            &dir,
            "flight.csv",
            b"sys_time,Alt,Lat,Lon,DD,FF\n\
              0,10,54.1,7.1,200,5\n\
              1,,54.2,7.2,210,6\n\
              2,30,54.3,7.3,NaN,7\n",
        );

        let series = load_flight(&path).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.time, vec![0.0, 1.0, 2.0]);
        assert_eq!(series.altitude[0], 10.0);
        assert!(series.altitude[1].is_nan());
        assert!(series.wind_direction[2].is_nan());
        assert_eq!(series.filter_finite().len(), 1);
    }

    #[test]
    fn test_csv_missing_field_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_temp(&dir, "flight.csv", b"sys_time,Alt,Lat,Lon,DD\n0,10,54,7,200\n");

        match load_flight(&path) {
            Err(ProfileError::MissingField(name)) => assert_eq!(name, "FF"),
            other => panic!("expected missing field, got {:?}", other),
        }
    }

    #[test]
    fn test_load_mat_variables() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = mat_bytes(&[
            ("Alt", vec![10.0, 900.0, 20.0]),
            ("Lat", vec![54.0, 54.1, 54.2]),
            ("Lon", vec![7.0, 7.1, 7.2]),
            ("sys_time", vec![100.0, 101.0, 102.0]),
            ("DD", vec![180.0, 190.0, f64::NAN]),
            ("FF", vec![4.0, 5.0, 6.0]),
        ]);
        let path = write_temp(&dir, "20190807_flug2.mat", &bytes);

        let series = load_flight(&path).unwrap();
        assert_eq!(series.altitude, vec![10.0, 900.0, 20.0]);
        assert_eq!(series.time, vec![100.0, 101.0, 102.0]);
        assert!(series.wind_direction[2].is_nan());
    }

    #[test]
    fn test_mat_missing_variable_is_named() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = mat_bytes(&[
            ("Alt", vec![1.0]),
            ("Lat", vec![1.0]),
            ("Lon", vec![1.0]),
            ("DD", vec![1.0]),
            ("FF", vec![1.0]),
        ]);
        let path = write_temp(&dir, "flight.mat", &bytes);

        match load_flight(&path) {
            Err(ProfileError::MissingField(name)) => assert_eq!(name, "sys_time"),
            other => panic!("expected missing field, got {:?}", other),
        }
    }

    #[test]
    fn test_mat_length_mismatch_fails() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = mat_bytes(&[
            ("Alt", vec![1.0, 2.0]),
            ("Lat", vec![1.0, 2.0]),
            ("Lon", vec![1.0]),
            ("sys_time", vec![1.0, 2.0]),
            ("DD", vec![1.0, 2.0]),
            ("FF", vec![1.0, 2.0]),
        ]);
        let path = write_temp(&dir, "flight.mat", &bytes);

        assert!(matches!(
            load_flight(&path),
            Err(ProfileError::LengthMismatch { field: "longitude", expected: 2, actual: 1 })
        ));
    }
}
