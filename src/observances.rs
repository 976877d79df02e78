//! Hijri observance tables
//!
//! The calendar's highlighted dates are editorial content, not logic, so
//! they live here as data: a serde-loadable table with a built-in default,
//! keyed by Hijri month and day.

use crate::error::MihrabError;
use serde::{Deserialize, Serialize};

/// One observance on the Hijri calendar
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observance {
    /// Hijri month, 1-12
    pub hijri_month: u8,
    /// Hijri day, 1-30
    pub hijri_day: u8,
    pub name_en: String,
    pub name_ar: String,
}

impl Observance {
    fn new(hijri_month: u8, hijri_day: u8, name_en: &str, name_ar: &str) -> Self {
        Self {
            hijri_month,
            hijri_day,
            name_en: name_en.to_string(),
            name_ar: name_ar.to_string(),
        }
    }
}

/// Table of observances, loadable from configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservanceTable {
    entries: Vec<Observance>,
}

impl Default for ObservanceTable {
    fn default() -> Self {
        Self {
            entries: vec![
                Observance::new(1, 1, "Islamic New Year", "رأس السنة الهجرية"),
                Observance::new(1, 10, "Day of Ashura", "يوم عاشوراء"),
                Observance::new(3, 12, "Mawlid al-Nabi", "المولد النبوي"),
                Observance::new(7, 27, "Isra and Mi'raj", "الإسراء والمعراج"),
                Observance::new(9, 1, "First of Ramadan", "أول رمضان"),
                Observance::new(9, 27, "Laylat al-Qadr", "ليلة القدر"),
                Observance::new(10, 1, "Eid al-Fitr", "عيد الفطر"),
                Observance::new(12, 9, "Day of Arafah", "يوم عرفة"),
                Observance::new(12, 10, "Eid al-Adha", "عيد الأضحى"),
            ],
        }
    }
}

impl ObservanceTable {
    pub fn new(entries: Vec<Observance>) -> Result<Self, MihrabError> {
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Check every entry has an in-range Hijri date
    pub fn validate(&self) -> Result<(), MihrabError> {
        for entry in &self.entries {
            if !(1..=12).contains(&entry.hijri_month) || !(1..=30).contains(&entry.hijri_day) {
                return Err(MihrabError::ConfigError(format!(
                    "observance {:?} has invalid hijri date {}/{}",
                    entry.name_en, entry.hijri_month, entry.hijri_day
                )));
            }
        }
        Ok(())
    }

    /// Observances falling on a given Hijri day
    pub fn on_day(&self, hijri_month: u8, hijri_day: u8) -> Vec<&Observance> {
        self.entries
            .iter()
            .filter(|o| o.hijri_month == hijri_month && o.hijri_day == hijri_day)
            .collect()
    }

    /// Observances within a given Hijri month, in day order
    pub fn in_month(&self, hijri_month: u8) -> Vec<&Observance> {
        let mut found: Vec<&Observance> = self
            .entries
            .iter()
            .filter(|o| o.hijri_month == hijri_month)
            .collect();
        found.sort_by_key(|o| o.hijri_day);
        found
    }

    pub fn entries(&self) -> &[Observance] {
        &self.entries
    }

    /// Load a table from JSON
    pub fn from_json(json: &str) -> Result<Self, MihrabError> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Serialize the table to JSON
    pub fn to_json(&self) -> Result<String, MihrabError> {
        Ok(serde_json::to_string(self)?)
    }
}
