//! Regional public holiday calendars.

use std::collections::HashSet;
use std::path::Path;

use chrono::{Datelike, Duration, NaiveDate};

use crate::types::{ForecastError, ForecastResult};

/// Answers whether a calendar date is a public holiday.
pub trait HolidayCalendar: Send + Sync {
    fn is_holiday(&self, date: NaiveDate) -> bool;
}

/// A fixed set of holiday dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HolidaySet {
    dates: HashSet<NaiveDate>,
}

impl HolidaySet {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(dates: I) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Load a JSON array of `YYYY-MM-DD` strings.
    pub fn from_json_file(path: &Path) -> ForecastResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let dates: Vec<NaiveDate> = serde_json::from_str(&raw).map_err(|e| {
            ForecastError::InvalidInput(format!(
                "Holiday file {} is not a JSON array of dates: {e}",
                path.display()
            ))
        })?;
        tracing::debug!("Loaded {} holiday dates from {}", dates.len(), path.display());
        Ok(Self::new(dates))
    }

    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.dates.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl HolidayCalendar for HolidaySet {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }
}

/// Regions with a built-in national calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    Spain,
}

/// National public holidays for a region, plus optional extra dates.
#[derive(Debug, Clone)]
pub struct NationalCalendar {
    region: Region,
    extra: HolidaySet,
}

impl NationalCalendar {
    /// Build the calendar for an ISO 3166 country code. Only `ES` is supported.
    pub fn for_region(code: &str) -> ForecastResult<Self> {
        let region = match code.trim().to_ascii_uppercase().as_str() {
            "ES" => Region::Spain,
            other => return Err(ForecastError::UnsupportedRegion(other.to_string())),
        };
        Ok(Self {
            region,
            extra: HolidaySet::default(),
        })
    }

    /// Add regional or one-off holidays on top of the national ones.
    pub fn with_extra_dates<I: IntoIterator<Item = NaiveDate>>(mut self, dates: I) -> Self {
        self.extra.dates.extend(dates);
        self
    }

    pub fn region_code(&self) -> &'static str {
        match self.region {
            Region::Spain => "ES",
        }
    }

    fn is_national_holiday(&self, date: NaiveDate) -> bool {
        match self.region {
            Region::Spain => is_spanish_holiday(date),
        }
    }
}

impl HolidayCalendar for NationalCalendar {
    fn is_holiday(&self, date: NaiveDate) -> bool {
        self.is_national_holiday(date) || self.extra.is_holiday(date)
    }
}

fn is_spanish_holiday(date: NaiveDate) -> bool {
    let fixed = matches!(
        (date.month(), date.day()),
        (1, 1)      // Año Nuevo
            | (1, 6)   // Epifanía del Señor
            | (5, 1)   // Fiesta del Trabajo
            | (8, 15)  // Asunción de la Virgen
            | (10, 12) // Fiesta Nacional de España
            | (11, 1)  // Todos los Santos
            | (12, 6)  // Día de la Constitución
            | (12, 8)  // Inmaculada Concepción
            | (12, 25) // Navidad
    );
    if fixed {
        return true;
    }

    // Viernes Santo
    easter_sunday(date.year())
        .map(|easter| date == easter - Duration::days(2))
        .unwrap_or(false)
}

/// Western (Gregorian) Easter Sunday, by the anonymous Gregorian algorithm.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}
