//! Sewage collection and treatment coverage per UF (SNIS indicators).

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::UfCode;

/// Which sewage indicator a map layer shows.
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
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SanitationMetric {
    /// Share of the population served by sewage collection.
    SewageCollection,
    /// Share of generated sewage that is treated.
    SewageTreatment,
}

/// Coverage percentages for one UF, both in `0.0..=100.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sanitation {
    /// Sewage collection coverage (%).
    pub collection: f64,
    /// Sewage treatment coverage (%).
    pub treatment: f64,
}

impl Sanitation {
    /// Returns the percentage for the given indicator.
    #[must_use]
    pub const fn percent(&self, metric: SanitationMetric) -> f64 {
        match metric {
            SanitationMetric::SewageCollection => self.collection,
            SanitationMetric::SewageTreatment => self.treatment,
        }
    }
}

const fn coverage(collection: f64, treatment: f64) -> Option<Sanitation> {
    Some(Sanitation {
        collection,
        treatment,
    })
}

/// Static coverage figures for a UF.
#[must_use]
pub const fn sanitation(uf: UfCode) -> Option<Sanitation> {
    match uf.value() {
        11 => coverage(7.1, 8.2),
        12 => coverage(11.2, 9.4),
        13 => coverage(13.9, 22.3),
        14 => coverage(52.4, 68.9),
        15 => coverage(7.6, 9.0),
        16 => coverage(7.7, 20.2),
        17 => coverage(31.4, 30.5),
        21 => coverage(13.9, 13.5),
        22 => coverage(14.6, 19.6),
        23 => coverage(29.8, 38.1),
        24 => coverage(26.9, 36.0),
        25 => coverage(37.7, 40.6),
        26 => coverage(32.1, 33.9),
        27 => coverage(23.2, 24.3),
        28 => coverage(30.9, 28.0),
        29 => coverage(41.5, 52.0),
        31 => coverage(75.6, 45.9),
        32 => coverage(60.0, 46.7),
        33 => coverage(67.1, 36.6),
        35 => coverage(90.2, 70.5),
        41 => coverage(75.9, 80.0),
        42 => coverage(28.3, 33.8),
        43 => coverage(35.2, 28.5),
        50 => coverage(61.2, 56.4),
        51 => coverage(39.6, 41.4),
        52 => coverage(63.5, 61.0),
        53 => coverage(91.9, 84.8),
        _ => None,
    }
}
