use crate::domain::{BudgetPeriod, TransactionKind, TypeFilter};
use crate::filter::DatePreset;
use crate::table::SortField;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "spendbook")]
#[command(about = "Local-first expense and budget tracker", long_about = None)]
pub struct Cli {
    /// Override spendbook home directory (config/data subdirs will be created inside it).
    #[arg(long, env = "SPENDBOOK_HOME", global = true)]
    pub home: Option<PathBuf>,

    /// Pin "today" (YYYY-MM-DD) for default ranges, budget windows and export names.
    #[arg(long, env = "SPENDBOOK_TODAY", global = true)]
    pub today: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record, change, remove and list transactions.
    Tx(TxArgs),
    Category(CategoryArgs),
    Budget(BudgetArgs),

    /// Income/expense cards and per-category totals for the filtered range.
    Summary(SummaryArgs),
    /// Daily income/expense points for the filtered range.
    Series(SeriesArgs),
    /// Write the filtered transactions to expenses_<date>.csv.
    Export(ExportArgs),
}

#[derive(Debug, Args, Clone)]
pub struct FilterFlags {
    /// Named range: this-month, last-month, last-7-days, last-30-days, this-year.
    #[arg(long)]
    pub preset: Option<DatePreset>,

    /// Range start (YYYY-MM-DD). Overrides the preset start.
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD). Overrides the preset end.
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Category id or name; repeat for several. None means all.
    #[arg(long = "category")]
    pub categories: Vec<String>,

    #[arg(long)]
    pub min: Option<Decimal>,

    #[arg(long)]
    pub max: Option<Decimal>,

    /// all, income or expense.
    #[arg(long = "type", default_value = "all")]
    pub type_filter: TypeFilter,
}

#[derive(Debug, Subcommand)]
pub enum TxCmd {
    Add {
        kind: TransactionKind,
        amount: Decimal,
        #[arg(long)]
        category: String,
        #[arg(long, short = 'm', alias = "note", default_value = "")]
        description: String,
        /// Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Replace fields of an existing transaction; omitted fields keep their value.
    Edit {
        id: String,
        #[arg(long)]
        kind: Option<TransactionKind>,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, short = 'm', alias = "note")]
        description: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Rm {
        id: String,
    },
    List {
        #[command(flatten)]
        filter: FilterFlags,
        /// Case-insensitive text matched against description and category name.
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "date")]
        sort: SortField,
        /// Sort ascending (default is descending).
        #[arg(long)]
        asc: bool,
    },
}

#[derive(Debug, Args)]
pub struct TxArgs {
    #[command(subcommand)]
    pub cmd: TxCmd,
}

#[derive(Debug, Subcommand)]
pub enum CategoryCmd {
    Add {
        name: String,
        #[arg(long, default_value = "#AEB6BF")]
        color: String,
        #[arg(long, default_value = "📦")]
        icon: String,
    },
    Edit {
        /// Category id or name.
        category: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    Rm {
        category: String,
    },
    List,
}

#[derive(Debug, Args)]
pub struct CategoryArgs {
    #[command(subcommand)]
    pub cmd: CategoryCmd,
}

#[derive(Debug, Subcommand)]
pub enum BudgetCmd {
    Add {
        /// Category id or name.
        category: String,
        amount: Decimal,
        #[arg(long, default_value = "monthly")]
        period: BudgetPeriod,
    },
    Edit {
        id: String,
        #[arg(long)]
        amount: Option<Decimal>,
        #[arg(long)]
        period: Option<BudgetPeriod>,
    },
    Rm {
        id: String,
    },
    /// Spend against every budget for the week or month containing today.
    Status,
}

#[derive(Debug, Args)]
pub struct BudgetArgs {
    #[command(subcommand)]
    pub cmd: BudgetCmd,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub filter: FilterFlags,

    /// Which kind the per-category totals are computed for.
    #[arg(long = "kind", default_value = "expense")]
    pub totals_for: TransactionKind,
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    #[command(flatten)]
    pub filter: FilterFlags,

    /// Print running totals instead of per-day values.
    #[arg(long)]
    pub cumulative: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub filter: FilterFlags,

    /// Target directory. Defaults to the configured export_dir, then the current directory.
    #[arg(long)]
    pub dir: Option<PathBuf>,
}
