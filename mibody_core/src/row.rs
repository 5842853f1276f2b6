//! Read-only view over a decoded weigh-in with derived metrics.
//!
//! Every derived value is computed on access from the stored fields; a row
//! never changes after parsing.

use crate::types::{LBS_PER_KG, OZ_PER_KG, STONES_PER_KG};
use crate::{BmiCategory, FeetInches, Gender, LbsOz, ObesityClass, RawRecord, StonesLbs};
use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use std::fmt;

/// Timestamp layout used for text output
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single weigh-in
#[derive(Clone, Debug, PartialEq)]
pub struct BodyDataRow {
    record: RawRecord,
}

impl BodyDataRow {
    pub fn new(record: RawRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &RawRecord {
        &self.record
    }

    pub fn date_time(&self) -> NaiveDateTime {
        self.record.date_time
    }

    pub fn gender(&self) -> Gender {
        self.record.gender
    }

    pub fn age(&self) -> u8 {
        self.record.age
    }

    pub fn height(&self) -> u8 {
        self.record.height
    }

    pub fn fitness_level(&self) -> u8 {
        self.record.fitness_level
    }

    pub fn weight(&self) -> f64 {
        self.record.weight
    }

    pub fn body_fat(&self) -> f64 {
        self.record.body_fat
    }

    pub fn muscle_mass(&self) -> f64 {
        self.record.muscle_mass
    }

    pub fn visceral_fat(&self) -> u8 {
        self.record.visceral_fat
    }

    // ------------------------------------------------------------------------
    // Weight conversions
    // ------------------------------------------------------------------------

    pub fn weight_kg(&self) -> f64 {
        self.record.weight
    }

    pub fn weight_lbs(&self) -> f64 {
        self.weight_kg() * LBS_PER_KG
    }

    pub fn weight_oz(&self) -> f64 {
        self.weight_kg() * OZ_PER_KG
    }

    /// Whole pounds and the remainder in ounces
    pub fn weight_lbs_oz(&self) -> LbsOz {
        LbsOz::from_kg(self.weight_kg())
    }

    pub fn weight_stones(&self) -> f64 {
        self.weight_kg() * STONES_PER_KG
    }

    pub fn weight_stones_lbs(&self) -> StonesLbs {
        StonesLbs::from_kg(self.weight_kg())
    }

    // ------------------------------------------------------------------------
    // Height conversions
    // ------------------------------------------------------------------------

    pub fn height_cm(&self) -> f64 {
        f64::from(self.record.height)
    }

    pub fn height_m(&self) -> f64 {
        self.height_cm() / 100.0
    }

    pub fn height_inches(&self) -> f64 {
        self.height_cm() / crate::types::CM_PER_INCH
    }

    pub fn height_feet(&self) -> f64 {
        self.height_cm() / crate::types::CM_PER_FOOT
    }

    pub fn height_feet_inches(&self) -> FeetInches {
        FeetInches::from_cm(self.height_cm())
    }

    // ------------------------------------------------------------------------
    // Health metrics
    // ------------------------------------------------------------------------

    /// Body mass index, rounded half-to-even to two decimal places
    pub fn bmi(&self) -> f64 {
        let raw = self.weight_kg() / self.height_m().powi(2);
        (raw * 100.0).round_ties_even() / 100.0
    }

    /// Basal metabolic rate (Mifflin-St Jeor), kcal/day
    pub fn bmr(&self) -> i64 {
        let base =
            10.0 * self.weight_kg() + 6.25 * self.height_cm() - 5.0 * f64::from(self.record.age);
        let adjusted = match self.record.gender {
            Gender::Male => base + 5.0,
            Gender::Female => base - 161.0,
        };
        adjusted.round_ties_even() as i64
    }

    pub fn classification(&self) -> BmiCategory {
        BmiCategory::from_bmi(self.bmi())
    }

    pub fn obesity_class(&self) -> Option<ObesityClass> {
        ObesityClass::from_bmi(self.bmi())
    }

    /// Stored and derived fields, keyed by field name
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        vec![
            ("gender", FieldValue::Text(self.gender().to_string())),
            ("body_fat", FieldValue::Float(self.body_fat())),
            ("age", FieldValue::Int(i64::from(self.age()))),
            ("visceral_fat", FieldValue::Int(i64::from(self.visceral_fat()))),
            ("height", FieldValue::Int(i64::from(self.height()))),
            (
                "fitness_level",
                FieldValue::Int(i64::from(self.fitness_level())),
            ),
            ("date_time", FieldValue::DateTime(self.date_time())),
            ("weight", FieldValue::Float(self.weight())),
            ("muscle_mass", FieldValue::Float(self.muscle_mass())),
            ("bmi", FieldValue::Float(self.bmi())),
            ("bmr", FieldValue::Int(self.bmr())),
            (
                "classification",
                FieldValue::Text(self.classification().to_string()),
            ),
            (
                "height_feet_inches",
                FieldValue::from(self.height_feet_inches()),
            ),
            (
                "weight_stones_lbs",
                FieldValue::from(self.weight_stones_lbs()),
            ),
        ]
    }

    /// Look up one entry of [`fields`](Self::fields) by name
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        self.fields()
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }
}

impl From<RawRecord> for BodyDataRow {
    fn from(record: RawRecord) -> Self {
        Self::new(record)
    }
}

impl fmt::Display for BodyDataRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} age {} {}cm {}kg fat {}% muscle {}% visceral {} fitness {}",
            self.date_time().format(DATE_TIME_FORMAT),
            self.gender().code(),
            self.age(),
            self.height(),
            self.weight(),
            self.body_fat(),
            self.muscle_mass(),
            self.visceral_fat(),
            self.fitness_level()
        )
    }
}

/// One exportable value
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    /// Whole unit plus fractional remainder, e.g. feet and inches
    Pair(u32, f64),
}

impl FieldValue {
    /// Text used for a CSV cell
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Int(v) => v.to_string(),
            FieldValue::Float(v) => v.to_string(),
            FieldValue::Text(v) => v.clone(),
            FieldValue::DateTime(v) => v.format(DATE_TIME_FORMAT).to_string(),
            FieldValue::Pair(whole, rest) => format!("{}, {}", whole, rest),
        }
    }
}

impl From<FeetInches> for FieldValue {
    fn from(value: FeetInches) -> Self {
        FieldValue::Pair(value.feet, value.inches)
    }
}

impl From<StonesLbs> for FieldValue {
    fn from(value: StonesLbs) -> Self {
        FieldValue::Pair(value.stones, value.lbs)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Int(v) => serializer.serialize_i64(*v),
            FieldValue::Float(v) => serializer.serialize_f64(*v),
            FieldValue::Text(v) => serializer.serialize_str(v),
            FieldValue::DateTime(v) => v.serialize(serializer),
            FieldValue::Pair(whole, rest) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(whole)?;
                seq.serialize_element(rest)?;
                seq.end()
            }
        }
    }
}
