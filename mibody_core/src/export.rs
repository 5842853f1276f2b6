//! CSV and JSON export of parsed weigh-ins.
//!
//! Options are validated up front (`FromStr` on every selection), so an
//! unsupported format or unit never produces partial output. CSV written in
//! any unit combination can be read back with [`read_csv`].

use crate::record::validate;
use crate::row::{FieldValue, DATE_TIME_FORMAT};
use crate::{
    BodyData, BodyDataRow, Error, ExportFormat, FeetInches, Gender, HeightUnit, RawRecord,
    Result, StonesLbs, WeightUnit,
};
use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::io::{Read, Write};

/// Export selections, validated before any output is produced
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub height_unit: HeightUnit,
    pub weight_unit: WeightUnit,
}

impl ExportOptions {
    /// Build options from their textual names (`csv`, `ft_in`, `st_lbs`, ...)
    pub fn parse(format: &str, height_unit: &str, weight_unit: &str) -> Result<Self> {
        Ok(Self {
            format: format.parse()?,
            height_unit: height_unit.parse()?,
            weight_unit: weight_unit.parse()?,
        })
    }

    /// Column headers in output order
    pub fn headers(&self) -> Vec<&'static str> {
        vec![
            "Date/time",
            "Gender",
            "Age (years)",
            self.height_unit.header(),
            "Fitness level",
            self.weight_unit.header(),
            "BMI",
            "Body fat (%)",
            "Muscle mass (%)",
            "Visceral fat",
            "BMR",
            "Classification",
        ]
    }

    /// Values for one row, aligned with [`headers`](Self::headers)
    pub fn values(&self, row: &BodyDataRow) -> Vec<FieldValue> {
        let height = match self.height_unit {
            HeightUnit::Cm => FieldValue::Int(i64::from(row.height())),
            HeightUnit::FtIn => row.height_feet_inches().into(),
        };
        let weight = match self.weight_unit {
            WeightUnit::Kg => FieldValue::Float(row.weight_kg()),
            WeightUnit::Lbs => FieldValue::Float(row.weight_lbs()),
            WeightUnit::StLbs => row.weight_stones_lbs().into(),
        };

        vec![
            FieldValue::DateTime(row.date_time()),
            FieldValue::Text(row.gender().to_string()),
            FieldValue::Int(i64::from(row.age())),
            height,
            FieldValue::Int(i64::from(row.fitness_level())),
            weight,
            FieldValue::Float(row.bmi()),
            FieldValue::Float(row.body_fat()),
            FieldValue::Float(row.muscle_mass()),
            FieldValue::Int(i64::from(row.visceral_fat())),
            FieldValue::Int(row.bmr()),
            FieldValue::Text(row.classification().to_string()),
        ]
    }
}

/// Write `data` to `out` in the selected format
pub fn write<W: Write>(data: &BodyData, options: &ExportOptions, out: W) -> Result<()> {
    match options.format {
        ExportFormat::Csv => write_csv(data, options, out),
        ExportFormat::Json => write_json(data, options, out),
    }
}

/// Export into a `String`
pub fn export_to_string(data: &BodyData, options: &ExportOptions) -> Result<String> {
    let mut buffer = Vec::new();
    write(data, options, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Header row followed by one row per weigh-in
pub fn write_csv<W: Write>(data: &BodyData, options: &ExportOptions, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(options.headers())?;

    for row in data {
        let cells: Vec<String> = options.values(row).iter().map(FieldValue::to_cell).collect();
        writer.write_record(&cells)?;
    }

    writer.flush()?;
    tracing::debug!("Wrote {} rows as CSV", data.len());
    Ok(())
}

/// JSON array of objects keyed by column header
pub fn write_json<W: Write>(data: &BodyData, options: &ExportOptions, mut out: W) -> Result<()> {
    let headers = options.headers();
    let rows: Vec<JsonRow<'_>> = data
        .iter()
        .map(|row| JsonRow {
            headers: &headers,
            values: options.values(row),
        })
        .collect();

    serde_json::to_writer(&mut out, &rows)?;
    out.flush()?;
    tracing::debug!("Wrote {} rows as JSON", rows.len());
    Ok(())
}

/// Serializes as a map so column order survives
struct JsonRow<'a> {
    headers: &'a [&'static str],
    values: Vec<FieldValue>,
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.headers.len()))?;
        for (header, value) in self.headers.iter().zip(&self.values) {
            map.serialize_entry(header, value)?;
        }
        map.end()
    }
}

// ============================================================================
// CSV re-ingestion
// ============================================================================

/// CSV row format for reading exported weigh-ins
#[derive(Debug, Deserialize)]
struct CsvRow {
    date_time: String,
    gender: String,
    age: u8,
    height: String,
    fitness_level: u8,
    weight: String,
    // Derived columns are read and discarded
    _bmi: String,
    body_fat: f64,
    muscle_mass: f64,
    visceral_fat: u8,
    _bmr: String,
    _classification: String,
}

/// Read records back from CSV produced by [`write_csv`]
///
/// Units are detected from the header row. Derived columns are ignored;
/// stored fields come back within the rounding of the unit conversion.
pub fn read_csv<R: Read>(input: R) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(input);

    let headers = reader.headers()?.clone();
    let height_unit = headers
        .get(3)
        .and_then(HeightUnit::from_header)
        .ok_or_else(|| Error::Import(format!("unrecognised height column {:?}", headers.get(3))))?;
    let weight_unit = headers
        .get(5)
        .and_then(WeightUnit::from_header)
        .ok_or_else(|| Error::Import(format!("unrecognised weight column {:?}", headers.get(5))))?;

    let mut records = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let row: CsvRow = record.deserialize(None)?;
        let record = row
            .into_record(height_unit, weight_unit)
            .map_err(|e| Error::Import(format!("row {}: {}", line + 1, e)))?;
        records.push(record);
    }

    tracing::debug!("Read {} records from CSV", records.len());
    Ok(records)
}

impl CsvRow {
    fn into_record(self, height_unit: HeightUnit, weight_unit: WeightUnit) -> Result<RawRecord> {
        let date_time = NaiveDateTime::parse_from_str(&self.date_time, DATE_TIME_FORMAT)
            .map_err(|e| Error::Import(format!("invalid date '{}': {}", self.date_time, e)))?;
        let gender: Gender = self.gender.parse()?;

        let height_cm = match height_unit {
            HeightUnit::Cm => parse_number(&self.height)?,
            HeightUnit::FtIn => {
                let (feet, inches) = parse_pair(&self.height)?;
                FeetInches { feet, inches }.to_cm()
            }
        };
        let weight = match weight_unit {
            WeightUnit::Kg => parse_number(&self.weight)?,
            WeightUnit::Lbs => parse_number(&self.weight)? / crate::types::LBS_PER_KG,
            WeightUnit::StLbs => {
                let (stones, lbs) = parse_pair(&self.weight)?;
                StonesLbs { stones, lbs }.to_kg()
            }
        };

        let height = height_cm.round();
        if !(1.0..=255.0).contains(&height) {
            return Err(Error::Import(format!("height {} out of range", height_cm)));
        }

        let record = RawRecord {
            date_time,
            gender,
            age: self.age,
            height: height as u8,
            fitness_level: self.fitness_level,
            weight,
            body_fat: self.body_fat,
            muscle_mass: self.muscle_mass,
            visceral_fat: self.visceral_fat,
        };
        validate(&record).map_err(|e| Error::Import(e.to_string()))?;
        Ok(record)
    }
}

fn parse_number(cell: &str) -> Result<f64> {
    cell.trim()
        .parse::<f64>()
        .map_err(|e| Error::Import(format!("invalid number '{}': {}", cell, e)))
}

fn parse_pair(cell: &str) -> Result<(u32, f64)> {
    let (whole, rest) = cell
        .split_once(',')
        .ok_or_else(|| Error::Import(format!("expected 'whole, remainder', got '{}'", cell)))?;
    let whole = whole
        .trim()
        .parse::<u32>()
        .map_err(|e| Error::Import(format!("invalid number '{}': {}", whole, e)))?;
    Ok((whole, parse_number(rest)?))
}
