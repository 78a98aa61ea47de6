mod common;

use assert_matches::assert_matches;
use chrono::NaiveDate;

use common::write_temp_csv;
use latest_snapshot::analytics::{gerber_cor_cov, monthly_returns, AnalyticsError, DEFAULT_THRESHOLD};
use latest_snapshot::data_ingestion::PriceCsvReader;

const PRICES: &str = "date,SPY,TLT,GLD\n\
2023-01-31,100,100,100\n\
2023-02-28,110,90,101\n\
2023-03-31,99,99,100\n\
2023-04-28,108.9,89.1,101\n\
2023-05-31,98.01,98.01,100\n\
2023-06-30,107.811,88.209,101\n";

#[test]
fn test_prices_to_gerber_matrices() {
    let file = write_temp_csv(PRICES);
    let prices = PriceCsvReader::default().read_file(file.path()).unwrap();
    assert_eq!(prices.tickers(), &["SPY", "TLT", "GLD"]);

    let returns = monthly_returns(&prices).unwrap();
    assert_eq!(returns.months.len(), 5);
    assert_eq!(returns.months[0], NaiveDate::from_ymd_opt(2023, 2, 28).unwrap());

    let m = gerber_cor_cov(&returns.values, DEFAULT_THRESHOLD).unwrap();
    // SPY 與 TLT 每月反向變動 10%
    assert!((m.correlation[[0, 1]] + 1.0).abs() < 1e-9);
    for i in 0..3 {
        assert!((m.correlation[[i, i]] - 1.0).abs() < 1e-9);
    }
    assert_eq!(m.correlation, m.correlation.t());
    assert!(m.covariance[[0, 1]] < 0.0);
}

#[test]
fn test_too_few_months() {
    let file = write_temp_csv("date,SPY\n2023-01-31,100\n2023-02-28,101\n");
    let prices = PriceCsvReader::default().read_file(file.path()).unwrap();
    let returns = monthly_returns(&prices).unwrap();

    assert_matches!(
        gerber_cor_cov(&returns.values, DEFAULT_THRESHOLD),
        Err(AnalyticsError::InsufficientData { required: 2, actual: 1 })
    );
}
