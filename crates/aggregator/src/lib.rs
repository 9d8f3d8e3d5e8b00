use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use common::{ForecastError, Result, TimeSeriesPoint, WeeklyPoint, WeeklySeries};
use tracing::{debug, info};

/// ISO (year, week) of a date.
pub fn iso_year_week(date: NaiveDate) -> (i32, u32) {
    let iso = date.iso_week();
    (iso.year(), iso.week())
}

/// Canonical start (Monday) of an ISO week.
pub fn iso_week_start(iso_year: i32, iso_week: u32) -> Option<NaiveDate> {
    NaiveDate::from_isoywd_opt(iso_year, iso_week, Weekday::Mon)
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> Result<NaiveDate> {
    let (year, week) = iso_year_week(date);
    iso_week_start(year, week).ok_or_else(|| {
        ForecastError::InputFormat(format!("date {date} has no ISO week start"))
    })
}

/// Group dated quantities by ISO week and sum them.
///
/// Output is sorted by week start with a zero-based contiguous week index.
/// Fails with `InsufficientHistory` when fewer than `min_weeks` distinct
/// weeks are present.
pub fn aggregate_weekly(records: &[TimeSeriesPoint], min_weeks: usize) -> Result<WeeklySeries> {
    let mut weeks: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for record in records {
        let start = week_start(record.timestamp.date())?;
        *weeks.entry(start).or_insert(0.0) += record.quantity;
    }

    if weeks.len() < min_weeks {
        return Err(ForecastError::InsufficientHistory(format!(
            "at least {min_weeks} weeks of data are required, got {}",
            weeks.len()
        )));
    }

    let points: Vec<WeeklyPoint> = weeks
        .into_iter()
        .enumerate()
        .map(|(week_index, (week_start, quantity))| WeeklyPoint {
            week_start,
            quantity,
            week_index,
        })
        .collect();

    if let (Some(first), Some(last)) = (points.first(), points.last()) {
        info!(
            records = records.len(),
            weeks = points.len(),
            first = %first.week_start,
            last = %last.week_start,
            "Aggregated weekly series"
        );
    }
    debug!(weeks = ?points.iter().map(|p| p.quantity).collect::<Vec<_>>(), "Weekly totals");

    WeeklySeries::new(points)
}
