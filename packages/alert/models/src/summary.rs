//! Summary-card statistics derived from an alert series.

use serde::{Deserialize, Serialize};

use crate::{AlertLevel, AlertRecord, EpiWeek};

/// Figures shown on a location's summary cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSummary {
    /// Most recent week with data.
    pub latest_week: EpiWeek,
    /// Cases in the most recent week.
    pub latest_cases: u64,
    /// Alert level in the most recent week.
    pub latest_level: AlertLevel,
    /// Rt in the most recent week, when estimated.
    pub latest_rt: Option<f64>,
    /// Incidence per 100k in the most recent week.
    pub latest_incidence_100k: Option<f64>,
    /// Cases summed over every week in the series.
    pub total_cases: u64,
    /// Week with the most cases (earliest on ties).
    pub peak_week: EpiWeek,
    /// Cases in the peak week.
    pub peak_cases: u64,
    /// Number of weeks present in the series.
    pub weeks_observed: usize,
}

impl SeriesSummary {
    /// Summarises a series sorted ascending by week.
    ///
    /// Returns `None` for an empty series; callers render that as "no
    /// data", never as zero.
    #[must_use]
    pub fn from_series(series: &[AlertRecord]) -> Option<Self> {
        let latest = series.last()?;
        let peak = series
            .iter()
            .reduce(|best, r| if r.cases > best.cases { r } else { best })?;

        Some(Self {
            latest_week: latest.week,
            latest_cases: latest.cases,
            latest_level: latest.alert_level(),
            latest_rt: latest.rt,
            latest_incidence_100k: latest.incidence_100k,
            total_cases: series.iter().map(|r| r.cases).sum(),
            peak_week: peak.week,
            peak_cases: peak.cases,
            weeks_observed: series.len(),
        })
    }
}
