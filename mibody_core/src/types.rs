//! Core domain types for MiBody weigh-ins.
//!
//! This module defines the value types shared by the parser, the row model
//! and the export layer:
//! - The decoded record itself
//! - Gender and BMI buckets
//! - Imperial unit pairs
//! - Export format and unit selections

use crate::{Error, Result};
use chrono::NaiveDateTime;
use std::fmt;
use std::str::FromStr;

/// Centimetres per inch
pub const CM_PER_INCH: f64 = 2.54;
/// Centimetres per foot
pub const CM_PER_FOOT: f64 = 30.48;
/// Pounds per kilogram
pub const LBS_PER_KG: f64 = 2.2046226218;
/// Ounces per kilogram
pub const OZ_PER_KG: f64 = 35.27396195;
/// Stones per kilogram, as used by the scale software
pub const STONES_PER_KG: f64 = 0.15747;

// ============================================================================
// Record Types
// ============================================================================

/// Gender recorded with the weigh-in
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Single-letter code (`M` / `F`)
    pub fn code(self) -> char {
        match self {
            Gender::Male => 'M',
            Gender::Female => 'F',
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => f.write_str("Male"),
            Gender::Female => f.write_str("Female"),
        }
    }
}

impl FromStr for Gender {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "M" | "m" | "Male" | "male" => Ok(Gender::Male),
            "F" | "f" | "Female" | "female" => Ok(Gender::Female),
            other => Err(Error::Import(format!("unknown gender '{}'", other))),
        }
    }
}

/// One decoded weigh-in, exactly as stored by the scale
#[derive(Clone, Debug, PartialEq)]
pub struct RawRecord {
    pub date_time: NaiveDateTime,
    pub gender: Gender,
    /// Years
    pub age: u8,
    /// Centimetres
    pub height: u8,
    pub fitness_level: u8,
    /// Kilograms
    pub weight: f64,
    /// Percent
    pub body_fat: f64,
    pub muscle_mass: f64,
    pub visceral_fat: u8,
}

// ============================================================================
// Classification Types
// ============================================================================

/// BMI bucket using WHO-style thresholds
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BmiCategory {
    Underweight,
    HealthyWeight,
    Overweight,
    Obese,
}

impl BmiCategory {
    /// Bucket for an already-rounded BMI value. Boundaries belong to the higher bucket.
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::HealthyWeight
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "underweight",
            BmiCategory::HealthyWeight => "healthy weight",
            BmiCategory::Overweight => "overweight",
            BmiCategory::Obese => "obese",
        }
    }
}

impl fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Finer split of the obese bucket
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObesityClass {
    ClassI,
    ClassII,
    ClassIII,
}

impl ObesityClass {
    /// `None` below a BMI of 30
    pub fn from_bmi(bmi: f64) -> Option<Self> {
        if bmi < 30.0 {
            None
        } else if bmi < 35.0 {
            Some(ObesityClass::ClassI)
        } else if bmi < 40.0 {
            Some(ObesityClass::ClassII)
        } else {
            Some(ObesityClass::ClassIII)
        }
    }
}

impl fmt::Display for ObesityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObesityClass::ClassI => f.write_str("class I obesity"),
            ObesityClass::ClassII => f.write_str("class II obesity"),
            ObesityClass::ClassIII => f.write_str("class III obesity"),
        }
    }
}

// ============================================================================
// Imperial Unit Pairs
// ============================================================================

/// Height split into whole feet and remaining inches
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeetInches {
    pub feet: u32,
    pub inches: f64,
}

impl FeetInches {
    pub fn from_cm(cm: f64) -> Self {
        let feet = cm / CM_PER_FOOT;
        let whole = feet.floor();
        Self {
            feet: whole as u32,
            inches: (feet - whole) * 12.0,
        }
    }

    pub fn to_cm(self) -> f64 {
        f64::from(self.feet) * CM_PER_FOOT + self.inches * CM_PER_INCH
    }
}

impl fmt::Display for FeetInches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.feet, self.inches)
    }
}

/// Weight split into whole stones and remaining pounds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StonesLbs {
    pub stones: u32,
    pub lbs: f64,
}

impl StonesLbs {
    pub fn from_kg(kg: f64) -> Self {
        let stones = kg * STONES_PER_KG;
        let whole = stones.floor();
        Self {
            stones: whole as u32,
            lbs: (stones - whole) * 14.0,
        }
    }

    pub fn to_kg(self) -> f64 {
        (f64::from(self.stones) + self.lbs / 14.0) / STONES_PER_KG
    }
}

impl fmt::Display for StonesLbs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.stones, self.lbs)
    }
}

/// Weight split into whole pounds and remaining ounces
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LbsOz {
    pub lbs: u32,
    pub oz: f64,
}

impl LbsOz {
    pub fn from_kg(kg: f64) -> Self {
        let lbs = kg * LBS_PER_KG;
        let whole = lbs.floor();
        Self {
            lbs: whole as u32,
            oz: (lbs - whole) * 16.0,
        }
    }

    pub fn to_kg(self) -> f64 {
        (f64::from(self.lbs) + self.oz / 16.0) / LBS_PER_KG
    }
}

impl fmt::Display for LbsOz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lbs, self.oz)
    }
}

// ============================================================================
// Export Selections
// ============================================================================

/// Output format for exported weigh-ins
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Csv,
    #[default]
    Json,
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(Error::unsupported("Format", other)),
        }
    }
}

/// Unit used for the height column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum HeightUnit {
    #[default]
    Cm,
    FtIn,
}

impl HeightUnit {
    pub fn header(self) -> &'static str {
        match self {
            HeightUnit::Cm => "Height (CM)",
            HeightUnit::FtIn => "Height (feet, inches)",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        [HeightUnit::Cm, HeightUnit::FtIn]
            .into_iter()
            .find(|unit| unit.header() == header)
    }
}

impl FromStr for HeightUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cm" => Ok(HeightUnit::Cm),
            "ft_in" => Ok(HeightUnit::FtIn),
            other => Err(Error::unsupported("Height unit", other)),
        }
    }
}

/// Unit used for the weight column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum WeightUnit {
    #[default]
    Kg,
    Lbs,
    StLbs,
}

impl WeightUnit {
    pub fn header(self) -> &'static str {
        match self {
            WeightUnit::Kg => "Weight (KG)",
            WeightUnit::Lbs => "Weight (lbs)",
            WeightUnit::StLbs => "Weight (stones, lbs)",
        }
    }

    pub fn from_header(header: &str) -> Option<Self> {
        [WeightUnit::Kg, WeightUnit::Lbs, WeightUnit::StLbs]
            .into_iter()
            .find(|unit| unit.header() == header)
    }
}

impl FromStr for WeightUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kg" => Ok(WeightUnit::Kg),
            "lbs" => Ok(WeightUnit::Lbs),
            "st_lbs" => Ok(WeightUnit::StLbs),
            other => Err(Error::unsupported("Weight unit", other)),
        }
    }
}
