#![allow(dead_code)]

use std::io::Write;

use latest_snapshot::domain_types::SnapshotTable;
use tempfile::NamedTempFile;

pub const HEADER: [&str; 3] = ["portfolio", "as_of_date", "holding"];

/// 以預設欄位 (portfolio, as_of_date, holding) 建立資料表
pub fn snapshot(rows: &[(&str, &str, &str)]) -> SnapshotTable {
    SnapshotTable::from_rows(HEADER, rows.iter().map(|(p, d, h)| vec![*p, *d, *h]))
        .expect("valid snapshot rows")
}

/// 取出每列原始文字，方便比較
pub fn rows_of(table: &SnapshotTable) -> Vec<(String, String, String)> {
    table
        .records()
        .iter()
        .map(|r| (r.values[0].clone(), r.values[1].clone(), r.values[2].clone()))
        .collect()
}

pub fn owned(rows: &[(&str, &str, &str)]) -> Vec<(String, String, String)> {
    rows.iter()
        .map(|(p, d, h)| (p.to_string(), d.to_string(), h.to_string()))
        .collect()
}

/// 寫入暫存 CSV 檔案
pub fn write_temp_csv(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(content.as_bytes()).expect("write temp file");
    file
}
