use crate::domain::{Category, Transaction, category_name};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{QuoteStyle, WriterBuilder};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const HEADER: [&str; 5] = ["Date", "Category", "Description", "Type", "Amount"];

pub fn export_file_name(today: NaiveDate) -> String {
    format!("expenses_{}.csv", today.format("%Y-%m-%d"))
}

/// Writes one fully quoted row per transaction after the header row.
pub fn write_csv<W: Write>(out: W, transactions: &[Transaction], categories: &[Category]) -> Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(out);

    writer.write_record(HEADER)?;
    for t in transactions {
        let date = t.date.format("%Y-%m-%d").to_string();
        let amount = money_2dp(t.amount);
        writer.write_record([
            date.as_str(),
            category_name(categories, &t.category_id),
            t.description.as_str(),
            t.kind.label(),
            amount.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Half-up rounding to cents, always printed with two decimals.
pub fn money_2dp(amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

pub fn export_to_dir(
    dir: &Path,
    today: NaiveDate,
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export dir {}", dir.display()))?;
    let path = dir.join(export_file_name(today));
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    write_csv(file, transactions, categories)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), rows = transactions.len(), "exported transactions");
    Ok(path)
}
