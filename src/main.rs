mod cli;
mod config;
mod db;
mod domain;
mod export;
mod filter;
mod state;
mod stats;
mod table;

use anyhow::{Result, anyhow};
use chrono::NaiveDate;
use clap::Parser;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::cli::{
    BudgetCmd, CategoryCmd, Cli, Command, ExportArgs, FilterFlags, SeriesArgs, SummaryArgs, TxCmd,
};
use crate::config::{AppConfig, app_paths, load_or_init_config, today_or};
use crate::db::Db;
use crate::domain::FilterSpec;
use crate::export::money_2dp;
use crate::state::{AppState, CategoryInput, TransactionInput};
use crate::table::{SortDirection, search_and_sort};

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("SPENDBOOK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Everything a command handler needs for one invocation.
struct Session {
    cfg: AppConfig,
    today: NaiveDate,
    state: AppState,
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let paths = app_paths(cli.home.clone())?;
    let (cfg, _cfg_path) = load_or_init_config(&paths)?;
    let db = Db::open(&paths.db_path())?;

    let mut session = Session {
        today: today_or(cli.today),
        state: AppState::load(db)?,
        cfg,
    };
    tracing::debug!(today = %session.today, "session ready");

    match cli.command {
        Command::Tx(args) => handle_tx(&mut session, args.cmd),
        Command::Category(args) => handle_category(&mut session, args.cmd),
        Command::Budget(args) => handle_budget(&mut session, args.cmd),
        Command::Summary(args) => handle_summary(&session, args),
        Command::Series(args) => handle_series(&session, args),
        Command::Export(args) => handle_export(&session, args),
    }
}

fn handle_tx(session: &mut Session, cmd: TxCmd) -> Result<()> {
    match cmd {
        TxCmd::Add {
            kind,
            amount,
            category,
            description,
            date,
        } => {
            let category_id = session.state.resolve_category(&category)?.id.clone();
            let input = TransactionInput {
                kind,
                amount,
                category_id,
                description,
                date: date.unwrap_or(session.today),
            };
            let tx = session.state.add_transaction(input)?;
            println!(
                "Added {} {} on {} ({}).",
                tx.kind,
                money_2dp(tx.amount),
                tx.date,
                tx.id
            );
            Ok(())
        }
        TxCmd::Edit {
            id,
            kind,
            amount,
            category,
            description,
            date,
        } => {
            let current = session.state.find_transaction(&id)?.clone();
            let category_id = match category {
                Some(c) => session.state.resolve_category(&c)?.id.clone(),
                None => current.category_id,
            };
            let input = TransactionInput {
                kind: kind.unwrap_or(current.kind),
                amount: amount.unwrap_or(current.amount),
                category_id,
                description: description.unwrap_or(current.description),
                date: date.unwrap_or(current.date),
            };
            session.state.update_transaction(&id, input)?;
            println!("Updated transaction {id}.");
            Ok(())
        }
        TxCmd::Rm { id } => {
            session.state.delete_transaction(&id)?;
            println!("Deleted transaction {id}.");
            Ok(())
        }
        TxCmd::List {
            filter: flags,
            search,
            sort,
            asc,
        } => {
            let spec = build_filter_spec(&session.state, &flags, session.today)?;
            let visible = filter::filter(session.state.transactions(), &spec);
            let direction = if asc {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            };
            let rows = search_and_sort(&visible, session.state.categories(), &search, sort, direction);
            if rows.is_empty() {
                println!("(no transactions)");
                return Ok(());
            }

            let table_rows: Vec<Vec<String>> = rows
                .iter()
                .map(|t| {
                    vec![
                        t.date.to_string(),
                        session.state.category_name(&t.category_id).to_string(),
                        t.description.clone(),
                        t.kind.label().to_string(),
                        fmt_money(&session.cfg, t.amount),
                        t.id.clone(),
                    ]
                })
                .collect();
            print_table(
                &["DATE", "CATEGORY", "DESCRIPTION", "TYPE", "AMOUNT", "ID"],
                &table_rows,
            );
            Ok(())
        }
    }
}

fn handle_category(session: &mut Session, cmd: CategoryCmd) -> Result<()> {
    match cmd {
        CategoryCmd::Add { name, color, icon } => {
            let category = session
                .state
                .add_category(CategoryInput { name, color, icon })?;
            println!("Created category '{}' ({}).", category.name, category.id);
            Ok(())
        }
        CategoryCmd::Edit {
            category,
            name,
            color,
            icon,
        } => {
            let current = session.state.resolve_category(&category)?.clone();
            let input = CategoryInput {
                name: name.unwrap_or(current.name),
                color: color.unwrap_or(current.color),
                icon: icon.unwrap_or(current.icon),
            };
            let updated = session.state.update_category(&current.id, input)?;
            println!("Updated category '{}' ({}).", updated.name, updated.id);
            Ok(())
        }
        CategoryCmd::Rm { category } => {
            let id = session.state.resolve_category(&category)?.id.clone();
            let (removed, budgets_removed) = session.state.delete_category(&id)?;
            println!("Deleted category '{}'.", removed.name);
            if budgets_removed > 0 {
                println!("Removed {budgets_removed} budget(s) for it.");
            }
            Ok(())
        }
        CategoryCmd::List => {
            let rows: Vec<Vec<String>> = session
                .state
                .categories()
                .iter()
                .map(|c| vec![c.id.clone(), c.icon.clone(), c.name.clone(), c.color.clone()])
                .collect();
            if rows.is_empty() {
                println!("(no categories)");
                return Ok(());
            }
            print_table(&["ID", "ICON", "NAME", "COLOR"], &rows);
            Ok(())
        }
    }
}

fn handle_budget(session: &mut Session, cmd: BudgetCmd) -> Result<()> {
    match cmd {
        BudgetCmd::Add {
            category,
            amount,
            period,
        } => {
            let budget = session.state.add_budget(&category, amount, period)?;
            let id = budget.id.clone();
            let category_id = budget.category_id.clone();
            println!(
                "Created {} budget {} for '{}' ({}).",
                period,
                money_2dp(amount),
                session.state.category_name(&category_id),
                id
            );
            Ok(())
        }
        BudgetCmd::Edit { id, amount, period } => {
            let current = session.state.find_budget(&id)?.clone();
            session.state.update_budget(
                &id,
                amount.unwrap_or(current.amount),
                period.unwrap_or(current.period),
            )?;
            println!("Updated budget {id}.");
            Ok(())
        }
        BudgetCmd::Rm { id } => {
            session.state.delete_budget(&id)?;
            println!("Deleted budget {id}.");
            Ok(())
        }
        BudgetCmd::Status => {
            let budgets = session.state.budgets();
            if budgets.is_empty() {
                println!("(no budgets)");
                return Ok(());
            }

            let week_start = session.cfg.week_start.weekday();
            println!("category\tperiod\twindow\tbudget\tspent\tremaining\tused\tprogress\tstatus\tid");
            for b in budgets {
                let status =
                    stats::budget_status(b, session.state.transactions(), session.today, week_start);
                let used = status
                    .ratio
                    .map(|r| format!("{:.0}%", r.round_dp(0)))
                    .unwrap_or_else(|| "n/a".to_string());
                println!(
                    "{}\t{}\t{}..{}\t{}\t{}\t{}\t{}\t{:.0}%\t{}\t{}",
                    session.state.category_name(&b.category_id),
                    b.period,
                    status.window.0,
                    status.window.1,
                    money_2dp(b.amount),
                    money_2dp(status.spent),
                    money_2dp(status.remaining),
                    used,
                    status.progress.round_dp(0),
                    status.health,
                    b.id
                );
            }
            Ok(())
        }
    }
}

fn handle_summary(session: &Session, args: SummaryArgs) -> Result<()> {
    let spec = build_filter_spec(&session.state, &args.filter, session.today)?;
    let visible = filter::filter(session.state.transactions(), &spec);
    let summary = stats::summarize(&visible);

    println!("range\t{}..{}", spec.start, spec.end);
    println!("income\t{}", fmt_money(&session.cfg, summary.income));
    println!("expense\t{}", fmt_money(&session.cfg, summary.expense));
    println!("balance\t{}", fmt_money(&session.cfg, summary.balance));
    println!("transactions\t{}", summary.count);
    println!("average expense\t{}", fmt_money(&session.cfg, summary.average_expense));

    let totals = stats::category_totals(&visible, session.state.categories(), args.totals_for);
    println!();
    if totals.is_empty() {
        println!("(no {} by category)", args.totals_for);
        return Ok(());
    }
    println!("category\ttotal\tcount\tshare\tcolor");
    for row in totals {
        println!(
            "{} {}\t{}\t{}\t{:.1}%\t{}",
            row.icon,
            row.name,
            money_2dp(row.total),
            row.count,
            row.percentage.round_dp(1),
            row.color
        );
    }
    Ok(())
}

fn handle_series(session: &Session, args: SeriesArgs) -> Result<()> {
    let spec = build_filter_spec(&session.state, &args.filter, session.today)?;
    let visible = filter::filter(session.state.transactions(), &spec);
    let daily = stats::daily_series(&visible, spec.start, spec.end);
    if daily.is_empty() {
        println!("(empty range)");
        return Ok(());
    }

    if args.cumulative {
        println!("date\tincome\texpense\tbalance");
        for p in stats::cumulative_series(&daily) {
            println!(
                "{}\t{}\t{}\t{}",
                p.date,
                money_2dp(p.income),
                money_2dp(p.expense),
                money_2dp(p.balance)
            );
        }
    } else {
        println!("date\tincome\texpense\tnet");
        for p in daily {
            println!(
                "{}\t{}\t{}\t{}",
                p.date,
                money_2dp(p.income),
                money_2dp(p.expense),
                money_2dp(p.net)
            );
        }
    }
    Ok(())
}

fn handle_export(session: &Session, args: ExportArgs) -> Result<()> {
    let spec = build_filter_spec(&session.state, &args.filter, session.today)?;
    let visible = filter::filter(session.state.transactions(), &spec);
    let dir = args
        .dir
        .or_else(|| session.cfg.export_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let path = export::export_to_dir(&dir, session.today, &visible, session.state.categories())?;
    println!("Exported {} transaction(s) to {}", visible.len(), path.display());
    Ok(())
}

/// Preset (default: this month) first, then explicit bounds on top.
fn build_filter_spec(state: &AppState, flags: &FilterFlags, today: NaiveDate) -> Result<FilterSpec> {
    let (preset_start, preset_end) = flags.preset.unwrap_or_default().range(today);
    let mut spec = FilterSpec::for_range(
        flags.from.unwrap_or(preset_start),
        flags.to.unwrap_or(preset_end),
    );

    for raw in &flags.categories {
        let category = state.resolve_category(raw)?;
        spec.categories.insert(category.id.clone());
    }

    if let (Some(min), Some(max)) = (flags.min, flags.max) {
        if min > max {
            return Err(anyhow!("--min ({min}) is greater than --max ({max})"));
        }
    }
    spec.min = flags.min;
    spec.max = flags.max;
    spec.kind = flags.type_filter;
    Ok(spec)
}

fn fmt_money(cfg: &AppConfig, amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-{}{}", cfg.currency, money_2dp(-amount))
    } else {
        format!("{}{}", cfg.currency, money_2dp(amount))
    }
}

fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let cols = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();

    for row in rows {
        for (i, cell) in row.iter().take(cols).enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    fn print_row(cells: &[String], widths: &[usize]) {
        print!("|");
        for (i, w) in widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = w.saturating_sub(cell.chars().count());
            print!(" {}{} |", cell, " ".repeat(pad));
        }
        println!();
    }

    fn print_sep(widths: &[usize]) {
        print!("|");
        for w in widths {
            print!("{}|", "-".repeat(w + 2));
        }
        println!();
    }

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    print_row(&header_cells, &widths);
    print_sep(&widths);
    for row in rows {
        print_row(row, &widths);
    }
}
