mod common;

use common::{add_tx, run_ok_out};
use std::fs;

fn seed(home: &tempfile::TempDir) {
    add_tx(home, "expense", "50", "1", "2024-03-10", "Groceries");
    add_tx(home, "expense", "30", "2", "2024-03-11", "Fuel");
    add_tx(home, "expense", "20", "1", "2024-03-11", "Lunch, with \"team\"");
    add_tx(home, "income", "1000", "9", "2024-03-01", "Payroll");
    add_tx(home, "expense", "999", "1", "2024-04-01", "Next month");
}

#[test]
fn summary_prints_cards_and_category_totals() {
    let home = tempfile::tempdir().expect("tempdir");
    seed(&home);

    let out = run_ok_out(&home, &["summary"]);
    assert!(out.contains("range\t2024-03-01..2024-03-31"));
    assert!(out.contains("income\t$1000.00"));
    assert!(out.contains("expense\t$100.00"));
    assert!(out.contains("balance\t$900.00"));
    assert!(out.contains("transactions\t4"));
    assert!(out.contains("average expense\t$33.33"));
    assert!(out.contains("Food & Dining\t70.00\t2\t70.0%"));
    assert!(out.contains("Transportation\t30.00\t1\t30.0%"));
    assert!(!out.contains("Salary\t"));

    let out = run_ok_out(&home, &["summary", "--kind", "income"]);
    assert!(out.contains("Salary\t1000.00\t1\t100.0%"));
}

#[test]
fn series_has_a_point_for_every_day() {
    let home = tempfile::tempdir().expect("tempdir");
    seed(&home);

    let out = run_ok_out(&home, &["series", "--from", "2024-03-09", "--to", "2024-03-12"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "date\tincome\texpense\tnet");
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1], "2024-03-09\t0.00\t0.00\t0.00");
    assert_eq!(lines[3], "2024-03-11\t0.00\t50.00\t-50.00");

    let out = run_ok_out(&home, &["series", "--from", "2024-03-01", "--to", "2024-03-11", "--cumulative"]);
    let last = out.lines().last().expect("last point");
    assert_eq!(last, "2024-03-11\t1000.00\t100.00\t900.00");
}

#[test]
fn export_writes_quoted_csv_for_filtered_range() {
    let home = tempfile::tempdir().expect("tempdir");
    seed(&home);
    let dir = tempfile::tempdir().expect("export dir");

    let out = run_ok_out(
        &home,
        &["export", "--dir", dir.path().to_str().expect("utf8 path"), "--type", "expense"],
    );
    assert!(out.contains("Exported 3 transaction(s)"));

    let path = dir.path().join("expenses_2024-03-15.csv");
    let text = fs::read_to_string(&path).expect("csv written");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], r#""Date","Category","Description","Type","Amount""#);
    assert_eq!(lines.len(), 4);
    assert!(lines.contains(&r#""2024-03-10","Food & Dining","Groceries","Expense","50.00""#));
    assert!(lines.contains(&r#""2024-03-11","Food & Dining","Lunch, with ""team""","Expense","20.00""#));
    assert!(!text.contains("Payroll"));
    assert!(!text.contains("Next month"));
}
