//! `InfoDengue` `alertcity` endpoint.

use epi_map_alert_models::{AlertRecord, EpiWeek, sort_series};

use serde::Deserialize;

use crate::AlertQuery;

/// One week as published by `alertcity`. Numeric fields arrive as JSON
/// numbers that may be floats or `null`.
#[derive(Debug, Deserialize)]
pub struct AlertCityRow {
    /// Encoded epidemiological week (`YYYYWW`).
    #[serde(rename = "SE")]
    pub se: u32,
    /// Notified cases.
    #[serde(default)]
    pub casos: Option<f64>,
    /// Reproduction number estimate.
    #[serde(rename = "Rt", default)]
    pub rt: Option<f64>,
    /// Incidence per 100k inhabitants.
    #[serde(default)]
    pub p_inc100k: Option<f64>,
    /// Notifications accumulated in the year.
    #[serde(default)]
    pub notif_accum_year: Option<f64>,
    /// Alert level.
    #[serde(default)]
    pub nivel: Option<i64>,
}

impl AlertCityRow {
    /// Converts to an [`AlertRecord`], or `None` if the week is invalid or
    /// the row has no case count or no alert level.
    #[must_use]
    pub fn into_record(self) -> Option<AlertRecord> {
        let week = match EpiWeek::from_encoded(self.se) {
            Ok(week) => week,
            Err(e) => {
                log::warn!("Skipping alertcity row: {e}");
                return None;
            }
        };

        let (Some(cases), Some(level)) = (count(self.casos), self.nivel) else {
            log::debug!("Skipping alertcity row {week}: no case count or level");
            return None;
        };

        Some(AlertRecord {
            week,
            cases,
            rt: self.rt.filter(|rt| rt.is_finite()),
            incidence_100k: self.p_inc100k.filter(|v| v.is_finite()),
            cumulative_year_notifications: count(self.notif_accum_year),
            level,
        })
    }
}

/// Converts a page of rows into a sorted, de-duplicated series.
#[must_use]
pub fn into_series(rows: Vec<AlertCityRow>) -> Vec<AlertRecord> {
    sort_series(rows.into_iter().filter_map(AlertCityRow::into_record).collect())
}

/// `alertcity` URL for `query`.
#[must_use]
pub fn alertcity_url(base: &str, query: &AlertQuery) -> String {
    let start = query.range.start;
    let end = query.range.end;
    format!(
        "{}/alertcity?geocode={}&disease={}&format=json&ew_start={}&ew_end={}&ey_start={}&ey_end={}",
        base.trim_end_matches('/'),
        query.geocode,
        query.disease,
        start.week(),
        end.week(),
        start.year(),
        end.year(),
    )
}

/// A published count, rounded. Negative counts clamp to zero; missing or
/// non-finite ones are `None`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(value: Option<f64>) -> Option<u64> {
    value
        .filter(|v| v.is_finite())
        .map(|v| v.max(0.0).round() as u64)
}
