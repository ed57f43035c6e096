#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Arbovirus alert types.
//!
//! Defines the diseases tracked by the surveillance feed, the four-step
//! alert scale, the weekly [`AlertRecord`] observation and the
//! epidemiological-week calendar used to address them.

pub mod epiweek;
pub mod summary;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use epiweek::{EpiWeek, EpiWeekError, EpiWeekRange};
pub use summary::SeriesSummary;

/// A disease published by the case-alert feed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Disease {
    /// Dengue fever.
    #[default]
    Dengue,
    /// Chikungunya fever.
    Chikungunya,
    /// Zika virus disease.
    Zika,
}

impl Disease {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Dengue, Self::Chikungunya, Self::Zika]
    }
}

/// Alert level, from 1 (green) to 4 (red).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertLevel {
    /// Level 1: favourable conditions, low transmission.
    Green = 1,
    /// Level 2: conditions favour transmission.
    Attention = 2,
    /// Level 3: sustained transmission.
    Alert = 3,
    /// Level 4: incidence above the epidemic threshold.
    Emergency = 4,
}

impl AlertLevel {
    /// Returns the numeric value of this level.
    #[must_use]
    pub const fn value(self) -> u8 {
        self as u8
    }

    /// Creates a level from its numeric value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not in the range 1-4.
    pub const fn from_value(value: i64) -> Result<Self, InvalidAlertLevelError> {
        match value {
            1 => Ok(Self::Green),
            2 => Ok(Self::Attention),
            3 => Ok(Self::Alert),
            4 => Ok(Self::Emergency),
            _ => Err(InvalidAlertLevelError { value }),
        }
    }

    /// Like [`Self::from_value`], but anything outside 1-4 becomes
    /// [`Self::Green`], the least severe level.
    #[must_use]
    pub const fn from_value_or_green(value: i64) -> Self {
        match Self::from_value(value) {
            Ok(level) => level,
            Err(_) => Self::Green,
        }
    }

    /// Human-readable label shown in legends.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Green => "Green",
            Self::Attention => "Attention",
            Self::Alert => "Alert",
            Self::Emergency => "Emergency",
        }
    }

    /// Returns all variants in ascending severity.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Green, Self::Attention, Self::Alert, Self::Emergency]
    }
}

/// Error returned for an alert level outside 1-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid alert level {value}: expected 1-4")]
pub struct InvalidAlertLevelError {
    /// The rejected value.
    pub value: i64,
}

/// One epidemiological-week observation for a municipality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    /// Epidemiological week of the observation.
    pub week: EpiWeek,
    /// Notified cases in the week.
    pub cases: u64,
    /// Effective reproduction number, when estimated.
    pub rt: Option<f64>,
    /// Incidence per 100,000 inhabitants, when published.
    pub incidence_100k: Option<f64>,
    /// Notifications accumulated since the start of the year, when
    /// published.
    pub cumulative_year_notifications: Option<u64>,
    /// Raw alert level as published (expected 1-4).
    pub level: i64,
}

impl AlertRecord {
    /// The published level, falling back to green when out of range.
    #[must_use]
    pub const fn alert_level(&self) -> AlertLevel {
        AlertLevel::from_value_or_green(self.level)
    }
}

/// Sorts a series ascending by week and collapses repeated weeks.
///
/// Missing weeks are left missing.
#[must_use]
pub fn sort_series(mut records: Vec<AlertRecord>) -> Vec<AlertRecord> {
    records.sort_by_key(|r| r.week);
    records.dedup_by_key(|r| r.week);
    records
}
