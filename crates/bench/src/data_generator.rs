use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use common::TimeSeriesPoint;

/// Weeks of ground truth kept after the history of every fixture.
pub const FUTURE_WEEKS: usize = 12;

/// Synthetic weekly demand with its true continuation.
#[derive(Debug, Clone)]
pub struct WeeklyFixture {
    pub name: String,
    /// Weekly totals fed to the pipeline.
    pub history: Vec<f64>,
    /// The next `FUTURE_WEEKS` totals, never shown to the pipeline.
    pub future: Vec<f64>,
    /// Seasonal period used for MASE scaling.
    pub seasonal_period: Option<usize>,
}

impl WeeklyFixture {
    fn from_series(name: String, series: Vec<f64>, seasonal_period: Option<usize>) -> Self {
        let split = series.len() - FUTURE_WEEKS;
        Self {
            name,
            history: series[..split].to_vec(),
            future: series[split..].to_vec(),
            seasonal_period,
        }
    }

    /// Expand the history into one record per day, the weekly total spread
    /// evenly over the seven days of each ISO week.
    pub fn records(&self) -> Vec<TimeSeriesPoint> {
        let base = first_monday();
        self.history
            .iter()
            .enumerate()
            .flat_map(|(week, &total)| {
                (0..7).map(move |day| {
                    let ts = base + TimeDelta::days((week * 7 + day) as i64);
                    TimeSeriesPoint::new(ts, total / 7.0)
                })
            })
            .collect()
    }
}

fn first_monday() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

/// Generate all standard benchmark fixtures.
pub fn generate_all_fixtures() -> Vec<WeeklyFixture> {
    vec![
        trend(30),
        seasonal(40),
        flat(20),
        noisy(30),
        intermittent(30),
        trend(5),
        noisy(8),
    ]
}

/// Deterministic pseudo-random: simple LCG-based noise in [-amplitude, amplitude].
fn noise(seed: u64, n: usize, amplitude: f64) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            // LCG parameters (Numerical Recipes)
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let frac = ((state >> 33) as f64) / (u32::MAX as f64);
            (frac * 2.0 - 1.0) * amplitude
        })
        .collect()
}

pub fn trend(weeks: usize) -> WeeklyFixture {
    let series = (0..weeks + FUTURE_WEEKS)
        .map(|i| 120.0 + 6.0 * i as f64)
        .collect();
    WeeklyFixture::from_series(format!("trend_{weeks}"), series, None)
}

/// Four-week cycle (month-end peaks) on a stable level.
pub fn seasonal(weeks: usize) -> WeeklyFixture {
    let cycle = [80.0, 95.0, 110.0, 170.0];
    let series = (0..weeks + FUTURE_WEEKS).map(|i| cycle[i % 4]).collect();
    WeeklyFixture::from_series(format!("seasonal_{weeks}"), series, Some(4))
}

pub fn flat(weeks: usize) -> WeeklyFixture {
    let series = vec![250.0; weeks + FUTURE_WEEKS];
    WeeklyFixture::from_series(format!("flat_{weeks}"), series, None)
}

pub fn noisy(weeks: usize) -> WeeklyFixture {
    let n = weeks + FUTURE_WEEKS;
    let ns = noise(42, n, 30.0);
    let series = (0..n).map(|i| 200.0 + 1.5 * i as f64 + ns[i]).collect();
    WeeklyFixture::from_series(format!("noisy_{weeks}"), series, None)
}

/// Mostly empty weeks with occasional bulk orders.
pub fn intermittent(weeks: usize) -> WeeklyFixture {
    let n = weeks + FUTURE_WEEKS;
    let ns = noise(7, n, 1.0);
    let series = (0..n)
        .map(|i| if ns[i] > 0.5 { 60.0 + 40.0 * ns[i] } else { 0.0 })
        .collect();
    WeeklyFixture::from_series(format!("intermittent_{weeks}"), series, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_split() {
        let fixture = trend(30);
        assert_eq!(fixture.history.len(), 30);
        assert_eq!(fixture.future.len(), FUTURE_WEEKS);
        assert_eq!(fixture.future[0], 120.0 + 6.0 * 30.0);
    }

    #[test]
    fn test_records_cover_each_week() {
        let fixture = flat(20);
        let records = fixture.records();
        assert_eq!(records.len(), 20 * 7);
        let total: f64 = records.iter().map(|r| r.quantity).sum();
        assert!((total - 20.0 * 250.0).abs() < 1e-6);
    }

    #[test]
    fn test_noise_deterministic_and_bounded() {
        assert_eq!(noise(1, 10, 2.0), noise(1, 10, 2.0));
        assert!(noise(3, 100, 2.0).iter().all(|v| v.abs() <= 2.0));
    }

    #[test]
    fn test_all_fixtures_have_enough_weeks() {
        for f in generate_all_fixtures() {
            assert!(f.history.len() >= 5, "{}", f.name);
            assert!(f.history.iter().all(|v| *v >= 0.0), "{}", f.name);
        }
    }
}
