//! Decoding of the scale's `BODYDATA.TXT` export.
//!
//! The export is a headerless run of fixed 18-byte blocks, one per memory
//! slot on the scale:
//!
//! | offset | field |
//! |--------|-------|
//! | 0-1    | year, big-endian |
//! | 2-6    | month, day, hour, minute, second |
//! | 7      | bit 7 set for male, low 7 bits age |
//! | 8      | height (cm) |
//! | 9      | fitness level |
//! | 10-11  | weight, big-endian tenths of kg |
//! | 12-13  | body fat, big-endian tenths of a percent |
//! | 14     | unused |
//! | 15-16  | muscle mass, big-endian tenths |
//! | 17     | visceral fat rating |
//!
//! Slots whose first byte is zero have never been written and are skipped
//! without a diagnostic. Blocks that fail validation are rejected whole and
//! reported in the [`ParseReport`]; decoding carries on with the next block.

use crate::error::DecodeError;
use crate::{Gender, RawRecord};
use chrono::NaiveDate;

/// Size of one record block in bytes
pub const BLOCK_SIZE: usize = 18;

const MALE_FLAG: u8 = 0x80;

/// A block that could not be decoded
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedRecord {
    /// Zero-based block position in the file
    pub index: usize,
    /// Byte offset of the block
    pub offset: usize,
    pub reason: DecodeError,
}

/// Summary of a decode pass
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParseReport {
    /// Blocks seen, including empty slots and a truncated tail
    pub blocks: usize,
    pub empty_slots: usize,
    pub skipped: Vec<SkippedRecord>,
}

impl ParseReport {
    /// True when no block was rejected
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Decoded records plus the report for the pass
#[derive(Clone, Debug, Default)]
pub struct ParseOutcome {
    pub records: Vec<RawRecord>,
    pub report: ParseReport,
}

/// Decode every block in `data`
pub fn parse_records(data: &[u8]) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let mut chunks = data.chunks_exact(BLOCK_SIZE);

    for (index, block) in chunks.by_ref().enumerate() {
        outcome.report.blocks += 1;
        let offset = index * BLOCK_SIZE;

        if block[0] == 0 {
            outcome.report.empty_slots += 1;
            continue;
        }

        match decode_block(block) {
            Ok(record) => outcome.records.push(record),
            Err(reason) => {
                tracing::debug!(
                    "Skipping record {} at byte {}: {}",
                    index,
                    offset,
                    reason
                );
                outcome.report.skipped.push(SkippedRecord {
                    index,
                    offset,
                    reason,
                });
            }
        }
    }

    let tail = chunks.remainder();
    if !tail.is_empty() {
        let index = outcome.report.blocks;
        outcome.report.blocks += 1;
        let reason = DecodeError::Truncated { len: tail.len() };
        tracing::debug!("Skipping record {}: {}", index, reason);
        outcome.report.skipped.push(SkippedRecord {
            index,
            offset: index * BLOCK_SIZE,
            reason,
        });
    }

    tracing::debug!(
        "Decoded {} records from {} blocks ({} empty, {} skipped)",
        outcome.records.len(),
        outcome.report.blocks,
        outcome.report.empty_slots,
        outcome.report.skipped.len()
    );

    outcome
}

/// Decode a single block
pub fn decode_block(block: &[u8]) -> Result<RawRecord, DecodeError> {
    if block.len() != BLOCK_SIZE {
        return Err(DecodeError::Truncated { len: block.len() });
    }

    let year = u16::from_be_bytes([block[0], block[1]]);
    let (month, day, hour, minute, second) = (block[2], block[3], block[4], block[5], block[6]);
    let date_time = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .and_then(|date| {
            date.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second))
        })
        .ok_or(DecodeError::InvalidTimestamp {
            year,
            month,
            day,
            hour,
            minute,
            second,
        })?;

    let gender = if block[7] & MALE_FLAG == 0 {
        Gender::Female
    } else {
        Gender::Male
    };

    let record = RawRecord {
        date_time,
        gender,
        age: block[7] & !MALE_FLAG,
        height: block[8],
        fitness_level: block[9],
        weight: tenths(block[10], block[11]),
        body_fat: tenths(block[12], block[13]),
        muscle_mass: tenths(block[15], block[16]),
        visceral_fat: block[17],
    };
    validate(&record)?;
    Ok(record)
}

/// Check the invariants every record must hold, whatever it was read from
pub fn validate(record: &RawRecord) -> Result<(), DecodeError> {
    if record.age == 0 {
        return Err(DecodeError::ZeroAge);
    }
    if record.height == 0 {
        return Err(DecodeError::ZeroHeight);
    }
    // Written so NaN fails too
    if !(record.weight > 0.0 && record.weight.is_finite()) {
        return Err(DecodeError::ZeroWeight);
    }
    if !(0.0..=100.0).contains(&record.body_fat) {
        return Err(DecodeError::BodyFatOutOfRange(record.body_fat));
    }
    if !(record.muscle_mass >= 0.0 && record.muscle_mass.is_finite()) {
        return Err(DecodeError::MuscleMassOutOfRange(record.muscle_mass));
    }
    Ok(())
}

fn tenths(high: u8, low: u8) -> f64 {
    f64::from(u16::from_be_bytes([high, low])) / 10.0
}

/// Encode a record back into its block layout. Used to build fixtures.
#[cfg(test)]
pub(crate) fn encode_block(record: &RawRecord) -> [u8; BLOCK_SIZE] {
    use chrono::{Datelike, Timelike};

    let to_tenths = |value: f64| ((value * 10.0).round() as u16).to_be_bytes();
    let year = (record.date_time.year() as u16).to_be_bytes();
    let weight = to_tenths(record.weight);
    let body_fat = to_tenths(record.body_fat);
    let muscle = to_tenths(record.muscle_mass);
    let gender_age = match record.gender {
        Gender::Male => record.age | MALE_FLAG,
        Gender::Female => record.age,
    };

    [
        year[0],
        year[1],
        record.date_time.month() as u8,
        record.date_time.day() as u8,
        record.date_time.hour() as u8,
        record.date_time.minute() as u8,
        record.date_time.second() as u8,
        gender_age,
        record.height,
        record.fitness_level,
        weight[0],
        weight[1],
        body_fat[0],
        body_fat[1],
        0,
        muscle[0],
        muscle[1],
        record.visceral_fat,
    ]
}

#[cfg(test)]
pub(crate) fn sample_record() -> RawRecord {
    RawRecord {
        date_time: NaiveDate::from_ymd_opt(2012, 2, 10)
            .and_then(|d| d.and_hms_opt(19, 9, 11))
            .unwrap(),
        gender: Gender::Male,
        age: 21,
        height: 175,
        fitness_level: 0,
        weight: 66.7,
        body_fat: 14.5,
        muscle_mass: 46.6,
        visceral_fat: 3,
    }
}
