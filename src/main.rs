use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use comfy_table::Table;
use configuration::Settings;
use engine::{Dashboard, ReconciliationEngine, Snapshot};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// The main entry point for the Keystone reconciliation tool.
fn main() -> anyhow::Result<()> {
    // Optional: a .env file may carry KEYSTONE__* overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => configuration::load_config_from(path),
        None => configuration::load_config(),
    }
    .context("Failed to load configuration")?;

    // Held until exit so the file writer flushes.
    let _guard = init_logging(&settings)?;

    let engine = ReconciliationEngine::from_settings(&settings)?;

    match cli.command {
        Commands::Dashboard(args) => handle_dashboard(&engine, args),
        Commands::Rankings(args) => handle_rankings(&engine, args),
        Commands::Portfolio(args) => handle_portfolio(&engine, args),
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Reconciles fund commitments against delivered trading performance.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file. Defaults to ./config.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every position and list the gaps that need action.
    Dashboard(DashboardArgs),
    /// Rank active managers by return.
    Rankings(SnapshotArgs),
    /// Aggregate managers into funds and the client portfolio.
    Portfolio(SnapshotArgs),
}

#[derive(Parser)]
struct DashboardArgs {
    #[command(flatten)]
    snapshot: SnapshotArgs,

    /// The instant to reconcile at (RFC 3339 or YYYY-MM-DD). Defaults to now.
    #[arg(long, value_parser = parse_as_of)]
    as_of: Option<DateTime<Utc>>,
}

#[derive(Parser)]
struct SnapshotArgs {
    /// JSON file with `positions`, `accounts`, `trades` and `managers`.
    #[arg(long)]
    snapshot: PathBuf,

    /// Print JSON instead of tables.
    #[arg(long)]
    json: bool,
}

fn parse_as_of(raw: &str) -> Result<DateTime<Utc>, String> {
    commitment::timeline::parse_timestamp(raw)
        .ok_or_else(|| format!("'{}' is not an RFC 3339 timestamp or a YYYY-MM-DD date", raw))
}

// ==============================================================================
// Logging
// ==============================================================================

/// Console logging filtered by `RUST_LOG` or `logging.level`, plus a daily-rolling
/// file when `logging.directory` is set.
fn init_logging(settings: &Settings) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.logging.level))
        .context("Invalid logging.level")?;

    let (file_layer, guard) = match &settings.logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "keystone.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()?;

    Ok(guard)
}

// ==============================================================================
// Command Logic
// ==============================================================================

fn read_snapshot(path: &Path) -> anyhow::Result<Snapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot = Snapshot::from_json(&raw)
        .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
    tracing::info!(
        positions = snapshot.positions.len(),
        accounts = snapshot.accounts.len(),
        trades = snapshot.trades.len(),
        managers = snapshot.managers.len(),
        "Snapshot loaded."
    );
    Ok(snapshot)
}

fn handle_dashboard(engine: &ReconciliationEngine, args: DashboardArgs) -> anyhow::Result<()> {
    let snapshot = read_snapshot(&args.snapshot.snapshot)?;
    let as_of = args.as_of.unwrap_or_else(Utc::now);
    let dashboard = engine.dashboard(&snapshot, as_of);

    if args.snapshot.json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
    } else {
        print_dashboard(&dashboard);
    }
    Ok(())
}

fn handle_rankings(engine: &ReconciliationEngine, args: SnapshotArgs) -> anyhow::Result<()> {
    let snapshot = read_snapshot(&args.snapshot)?;
    let ranked = engine.rankings(&snapshot);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ranked)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Rank", "Manager", "Pool", "Return %", "P&L", "Trades", "Win %", "Profit F.", "Sharpe",
        "Sortino", "Max DD %", "Calmar",
    ]);
    for manager in &ranked.rankings {
        let stats = &manager.statistics;
        table.add_row(vec![
            manager.rank.map(|r| r.to_string()).unwrap_or_default(),
            manager.name.clone(),
            manager.pool.to_string(),
            two_dp(manager.return_pct),
            two_dp(manager.profit_loss),
            stats.trade_count.to_string(),
            two_dp(stats.win_rate_pct),
            four_dp(stats.profit_factor),
            four_dp(stats.sharpe_ratio),
            four_dp(stats.sortino_ratio),
            two_dp(stats.max_drawdown_pct),
            four_dp(stats.calmar_ratio),
        ]);
    }
    println!("{table}");

    for failure in &ranked.failures {
        eprintln!("{}: {}", failure.manager_id, failure.error);
    }
    Ok(())
}

fn handle_portfolio(engine: &ReconciliationEngine, args: SnapshotArgs) -> anyhow::Result<()> {
    let snapshot = read_snapshot(&args.snapshot)?;
    let portfolio = engine.portfolio(&snapshot);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&portfolio)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Pool", "Managers", "Allocation", "Equity", "Withdrawals", "P&L", "Return %", "Best", "Worst",
    ]);
    for fund in &portfolio.funds {
        table.add_row(vec![
            fund.pool.to_string(),
            fund.manager_count.to_string(),
            two_dp(fund.allocation),
            two_dp(fund.current_equity),
            two_dp(fund.withdrawals),
            two_dp(fund.profit_loss),
            two_dp(fund.return_pct),
            fund.best_performer.clone().unwrap_or_default(),
            fund.worst_performer.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");
    println!(
        "Client AUM {} | client P&L {} | blended return {}% | extracted profit P&L {} | total P&L {}",
        two_dp(portfolio.client_aum),
        two_dp(portfolio.client_profit_loss),
        two_dp(portfolio.blended_return_pct),
        two_dp(portfolio.extracted_profit_pnl),
        two_dp(portfolio.total_profit_loss),
    );

    for fund in portfolio.funds.iter().filter(|f| !f.failures.is_empty()) {
        for failure in &fund.failures {
            eprintln!("[{}] {}: {}", fund.pool, failure.manager_id, failure.error);
        }
    }
    Ok(())
}

fn print_dashboard(dashboard: &Dashboard) {
    let summary = &dashboard.summary;

    let mut counts = Table::new();
    counts.set_header(vec!["Risk", "Positions"]);
    for (level, count) in &summary.counts {
        counts.add_row(vec![level.to_string(), count.to_string()]);
    }
    println!("Reconciliation as of {}", dashboard.as_of.to_rfc3339());
    println!("{counts}");
    println!(
        "Expected {} | delivered {} | gap {} | degraded inputs {}",
        two_dp(summary.total_expected),
        two_dp(summary.total_actual),
        two_dp(summary.total_gap),
        summary.degraded,
    );

    if dashboard.action_items.is_empty() {
        println!("No action required.");
        return;
    }

    let mut actions = Table::new();
    actions.set_header(vec!["Priority", "Risk", "Position", "Investor", "Fund", "Gap", "Gap %", "Recommendation"]);
    for item in &dashboard.action_items {
        actions.add_row(vec![
            item.priority.to_string(),
            item.risk_level.to_string(),
            item.position_id.clone(),
            item.investor_id.clone(),
            item.fund_code.clone(),
            two_dp(item.gap_amount),
            two_dp(item.gap_pct),
            item.recommendation.clone(),
        ]);
    }
    println!("{actions}");
}

fn two_dp(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn four_dp(value: Decimal) -> String {
    format!("{:.4}", value)
}
