#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;

fn expense(id: i64, description: &str, amount: Decimal, category: &str, on: &str) -> Expense {
    Expense {
        id,
        description: description.into(),
        amount,
        category: category.into(),
        date: NaiveDate::parse_from_str(on, "%Y-%m-%d").unwrap(),
    }
}

fn to_string(records: &[Expense]) -> String {
    let mut buf = Vec::new();
    write_csv(&mut buf, records).unwrap();
    String::from_utf8(buf).unwrap()
}

// ── write_csv ─────────────────────────────────────────────────

#[test]
fn test_write_csv_header_only_when_empty() {
    assert_eq!(to_string(&[]), "id,date,description,category,amount\n");
}

#[test]
fn test_write_csv_rows_in_given_order() {
    let out = to_string(&[
        expense(2, "Bus ticket", dec!(2.75), "Transport", "2025-07-11"),
        expense(1, "Groceries", dec!(24.5), "Food", "2025-07-10"),
    ]);
    assert_eq!(
        out,
        "id,date,description,category,amount\n\
         2,2025-07-11,Bus ticket,Transport,2.75\n\
         1,2025-07-10,Groceries,Food,24.50\n"
    );
}

#[test]
fn test_write_csv_pads_whole_amounts() {
    let out = to_string(&[expense(3, "Rent", dec!(60), "Housing", "2025-07-01")]);
    assert!(out.ends_with("3,2025-07-01,Rent,Housing,60.00\n"));
}

#[test]
fn test_write_csv_quotes_special_characters() {
    let out = to_string(&[expense(
        4,
        "Dinner, \"fancy\"",
        dec!(80.00),
        "Eating Out",
        "2025-07-12",
    )]);
    assert!(out.contains("4,2025-07-12,\"Dinner, \"\"fancy\"\"\",Eating Out,80.00"));
}

#[test]
fn test_write_csv_readable_by_csv_reader() {
    let records = vec![
        expense(1, "Groceries, weekly", dec!(24.50), "Food", "2025-07-10"),
        expense(2, "Bus ticket", dec!(2.75), "Transport", "2025-07-11"),
    ];
    let out = to_string(&records);

    let mut rdr = csv::Reader::from_reader(out.as_bytes());
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), HEADER.to_vec());
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][2], "Groceries, weekly");
    assert_eq!(&rows[1][4], "2.75");
}

// ── export_to_path ────────────────────────────────────────────

#[test]
fn test_export_to_path_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    let records = vec![expense(1, "Groceries", dec!(24.50), "Food", "2025-07-10")];

    let count = export_to_path(&path, &records).unwrap();
    assert_eq!(count, 1);
    let content = std::fs::read_to_string(&path).unwrap();
    assert_eq!(content.lines().count(), 2);
    assert!(content.starts_with("id,date,description,category,amount"));
}

#[test]
fn test_export_to_path_creates_parent_dirs() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("out.csv");
    assert_eq!(export_to_path(&path, &[]).unwrap(), 0);
    assert!(path.exists());
}

#[test]
fn test_export_to_path_overwrites() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    std::fs::write(&path, "stale contents that are longer than the new file\n".repeat(10))
        .unwrap();
    export_to_path(&path, &[]).unwrap();
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "id,date,description,category,amount\n"
    );
}

#[test]
fn test_export_to_path_reports_unwritable_path() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let path = blocker.join("out.csv");

    let err = export_to_path(&path, &[]).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }));
    assert!(err.to_string().contains("out.csv"));
}
