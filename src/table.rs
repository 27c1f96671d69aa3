use crate::domain::{Category, Transaction, category_name};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Date,
    Amount,
    Category,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(SortField::Date),
            "amount" => Ok(SortField::Amount),
            "category" => Ok(SortField::Category),
            other => Err(format!("unknown sort field '{other}' (expected date|amount|category)")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

/// Case-insensitive search over description and category name, then a stable
/// sort on `field`. Equal keys keep their input order.
pub fn search_and_sort(
    transactions: &[Transaction],
    categories: &[Category],
    query: &str,
    field: SortField,
    direction: SortDirection,
) -> Vec<Transaction> {
    let needle = query.trim().to_lowercase();
    let mut out: Vec<Transaction> = transactions
        .iter()
        .filter(|t| {
            needle.is_empty()
                || t.description.to_lowercase().contains(&needle)
                || category_name(categories, &t.category_id)
                    .to_lowercase()
                    .contains(&needle)
        })
        .cloned()
        .collect();

    out.sort_by(|a, b| {
        let ord = compare(a, b, categories, field);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    out
}

fn compare(a: &Transaction, b: &Transaction, categories: &[Category], field: SortField) -> Ordering {
    match field {
        SortField::Date => a.date.cmp(&b.date),
        SortField::Amount => a.amount.cmp(&b.amount),
        SortField::Category => {
            category_name(categories, &a.category_id).cmp(category_name(categories, &b.category_id))
        }
    }
}
