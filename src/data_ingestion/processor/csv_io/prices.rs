//! 價格 CSV 讀取器
//!
//! 格式：一個日期欄，其餘每欄為一個代碼的收盤價；空白儲存格視為缺值。

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use super::error::{CsvError, CsvResult};
use crate::analytics::{PriceSeries, PriceTable};
use crate::utils::time_utils::parse_date;

#[derive(Debug, Clone)]
pub struct PriceCsvReader {
    delimiter: u8,
    date_column: String,
}

impl Default for PriceCsvReader {
    fn default() -> Self {
        Self {
            delimiter: b',',
            date_column: "date".to_string(),
        }
    }
}

impl PriceCsvReader {
    pub fn new(date_column: impl Into<String>) -> Self {
        Self {
            date_column: date_column.into(),
            ..Default::default()
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn read_file<P: AsRef<Path>>(&self, path: P) -> CsvResult<PriceTable> {
        let path = path.as_ref();
        debug!("讀取價格檔案: {}", path.display());
        let file = std::fs::File::open(path)?;
        self.read_from(file)
    }

    pub fn read_string(&self, data: &str) -> CsvResult<PriceTable> {
        self.read_from(data.as_bytes())
    }

    pub fn read_from<R: Read>(&self, source: R) -> CsvResult<PriceTable> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .from_reader(source);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let date_index = headers
            .iter()
            .position(|h| *h == self.date_column)
            .ok_or_else(|| CsvError::MissingColumn(self.date_column.clone()))?;

        let mut series: Vec<PriceSeries> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_index)
            .map(|(_, ticker)| PriceSeries::new(ticker.clone(), Vec::new()))
            .collect();

        let mut record = StringRecord::new();
        while reader.read_record(&mut record)? {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let raw_date = record.get(date_index).unwrap_or_default().trim();
            let date = parse_date(raw_date).map_err(|e| CsvError::InvalidFormat {
                line,
                column: self.date_column.clone(),
                value: raw_date.to_string(),
                reason: e.to_string(),
            })?;

            let cells = record.iter().enumerate().filter(|(i, _)| *i != date_index);
            for (s, (_, cell)) in series.iter_mut().zip(cells) {
                let cell = cell.trim();
                if cell.is_empty() {
                    continue;
                }
                let price: f64 = cell.parse().map_err(|e: std::num::ParseFloatError| CsvError::InvalidFormat {
                    line,
                    column: s.ticker.clone(),
                    value: cell.to_string(),
                    reason: e.to_string(),
                })?;
                s.points.push((date, price));
            }
        }

        let table = PriceTable::outer_merge(series)?;
        debug!("價格表: {} 個日期 × {} 個代碼", table.dates().len(), table.tickers().len());
        Ok(table)
    }
}
