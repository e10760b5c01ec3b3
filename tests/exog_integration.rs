//! End-to-end covariate tests: raw tables through alignment into the
//! regression-with-errors forecast.

use chrono::{Duration, NaiveDate};
use graincast::core::{align, normalize, RawTable};
use graincast::engine::forecast_with_exog;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn price_table(start: NaiveDate, n: usize) -> RawTable {
    let mut table = RawTable::new(vec!["Date", "Price"]);
    for i in 0..n {
        let d = start + Duration::days(i as i64);
        let price = 300.0 + 0.4 * i as f64 + 3.0 * ((i % 7) as f64);
        table.push_row(vec![d.format("%Y-%m-%d").to_string(), format!("{price}")]);
    }
    table
}

fn weather_table(start: NaiveDate, n: usize, offset: usize) -> RawTable {
    let mut table = RawTable::new(vec!["date", "temp", "rainfall"]);
    for i in 0..n {
        let d = start + Duration::days(i as i64);
        let t = offset + i;
        table.push_row(vec![
            d.format("%Y-%m-%d").to_string(),
            format!("{}", 18.0 + ((t % 7) as f64)),
            format!("{}", (t % 3) as f64),
        ]);
    }
    table
}

#[test]
fn aligned_covariates_feed_the_forecast() {
    let start = date(2024, 1, 1);
    let n = 60;
    let horizon = 14;

    let target = price_table(start, n);
    let past_weather = weather_table(start, n, 0);
    let future_weather = weather_table(start + Duration::days(n as i64), horizon, n);

    let (past, future) = align(&target, &[past_weather], &[future_weather], horizon).unwrap();
    assert_eq!(past.len(), n);
    assert_eq!(future.len(), horizon);
    assert_eq!(past.names(), future.names());

    let series = normalize(&target);
    let table = forecast_with_exog(&series, &past, &future, horizon).unwrap();

    assert_eq!(table.len(), horizon);
    assert_eq!(table.start(), Some(start + Duration::days(n as i64)));
    assert!(table.has_intervals());

    let (mean, lower, upper) = (table.mean(), table.lower().unwrap(), table.upper().unwrap());
    for i in 0..horizon {
        assert!(mean[i].is_finite());
        assert!(lower[i] <= mean[i]);
        assert!(mean[i] <= upper[i]);
    }
}

#[test]
fn sentiment_without_future_source_reads_as_zero() {
    let start = date(2024, 1, 1);
    let target = price_table(start, 30);
    let weather = weather_table(start, 30, 0);

    let mut sentiment = RawTable::new(vec!["date", "sentiment"]);
    for i in 0..30 {
        let d = start + Duration::days(i as i64);
        table_row(&mut sentiment, d, if i % 2 == 0 { 0.4 } else { -0.2 });
    }

    let future_weather = weather_table(start + Duration::days(30), 7, 30);
    let (past, future) = align(&target, &[weather, sentiment], &[future_weather], 7).unwrap();

    assert!(past.names().contains(&"sentiment".to_string()));
    assert_eq!(future.column("sentiment").unwrap(), &[0.0; 7]);

    let series = normalize(&target);
    let table = forecast_with_exog(&series, &past, &future, 7).unwrap();
    assert_eq!(table.len(), 7);
}

fn table_row(table: &mut RawTable, d: NaiveDate, value: f64) {
    table.push_row(vec![d.format("%Y-%m-%d").to_string(), format!("{value}")]);
}

#[test]
fn empty_target_yields_empty_matrices_and_table() {
    let empty = RawTable::new(vec!["Date", "Price"]);
    let weather = weather_table(date(2024, 1, 1), 10, 0);

    let (past, future) = align(&empty, &[weather], &[], 7).unwrap();
    assert!(past.is_empty());
    assert!(future.is_empty());

    let series = normalize(&empty);
    let table = forecast_with_exog(&series, &past, &future, 7).unwrap();
    assert!(table.is_empty());
}

#[test]
fn short_history_with_covariates_stays_flat_and_unbounded() {
    let start = date(2024, 1, 1);
    let target = price_table(start, 10);
    let weather = weather_table(start, 10, 0);
    let future_weather = weather_table(start + Duration::days(10), 7, 10);

    let (past, future) = align(&target, &[weather], &[future_weather], 7).unwrap();
    let series = normalize(&target);

    let table = forecast_with_exog(&series, &past, &future, 7).unwrap();
    let last = series.last_value().unwrap();
    assert!(table.mean().iter().all(|&v| v == last));
    assert!(!table.has_intervals());
}

#[test]
fn short_future_data_repeats_the_last_known_row() {
    let start = date(2024, 1, 1);
    let target = price_table(start, 30);
    let weather = weather_table(start, 30, 0);
    // Only 3 days of future weather for a 10-day horizon.
    let future_weather = weather_table(start + Duration::days(30), 3, 30);

    let (_, future) = align(&target, &[weather], &[future_weather], 10).unwrap();
    assert_eq!(future.len(), 10);

    let temp = future.column("temp").unwrap();
    for &v in &temp[3..] {
        assert_eq!(v, temp[2]);
    }
}
