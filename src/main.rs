mod batch;
mod engine;
mod feed;
mod tier;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};

use batch::BookAccount;
use engine::{AccountSnapshot, TradeStatus};

#[derive(Parser, Debug)]
#[command(author, version, about = "Tier-based stochastic trade outcome simulator")]
struct Cli {
    /// Seed for the random source; replaying a seed replays every draw.
    #[arg(long, default_value_t = 20250815)]
    seed: u64,
    /// Write the JSON report to this path instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct AccountArgs {
    /// Cumulative invested amount (drives the tier).
    #[arg(long, default_value_t = 0.0)]
    invested: f64,
    /// Cumulative signed profit to date.
    #[arg(long, default_value_t = 0.0)]
    profits: f64,
    /// Cumulative amount ever deposited.
    #[arg(long, default_value_t = 0.0)]
    deposited: f64,
}

impl AccountArgs {
    fn snapshot(&self) -> AccountSnapshot {
        AccountSnapshot::new(self.invested, self.profits, self.deposited)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate a single trade.
    Trade {
        #[arg(long, default_value_t = 100.0)]
        amount: f64,
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Run an auto-trade session (5-12 trades unless --trades is set).
    Auto {
        #[arg(long)]
        trades: Option<usize>,
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Run the 3-trade demo session for a freshly unlocked deposit.
    Demo {
        #[arg(long, default_value_t = 50.0)]
        deposit: f64,
        #[command(flatten)]
        account: AccountArgs,
    },
    /// Sweep a CSV book of accounts (id,invested,profits,deposited).
    Sweep {
        #[arg(long)]
        book: PathBuf,
    },
    /// Emit the synthetic dashboard feed.
    Feed {
        #[arg(long, default_value_t = 20)]
        points: usize,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let mut rng = StdRng::seed_from_u64(cli.seed);

    let payload = match &cli.command {
        Command::Trade { amount, account } => {
            run_trade(account.snapshot(), *amount, cli.seed, &mut rng)?
        }
        Command::Auto { trades, account } => {
            run_auto(account.snapshot(), *trades, cli.seed, &mut rng)?
        }
        Command::Demo { deposit, account } => {
            run_demo(account.snapshot(), *deposit, cli.seed, &mut rng)?
        }
        Command::Sweep { book } => run_sweep(book, cli.seed, &mut rng)?,
        Command::Feed { points } => run_feed(*points, cli.seed, &mut rng),
    };

    emit(&payload, cli.out.as_deref())
}

fn run_trade(account: AccountSnapshot, amount: f64, seed: u64, rng: &mut StdRng) -> Result<Value> {
    let outcome = engine::compute_outcome(&account, amount, rng)?;
    let summary = outcome.summary();
    let profit_percent = engine::round_to(outcome.profit_percent(), 1);
    println!("{summary}");

    Ok(json!({
        "seed": seed,
        "account": account,
        "tier": tier_info(&account),
        "outcome": outcome,
        "profit_percent": profit_percent,
        "summary": summary,
        "generated_at_utc": Utc::now().to_rfc3339(),
    }))
}

fn run_auto(
    mut account: AccountSnapshot,
    trades: Option<usize>,
    seed: u64,
    rng: &mut StdRng,
) -> Result<Value> {
    if trades == Some(0) {
        bail!("--trades must be >= 1");
    }
    let start = account;
    let report = batch::run_auto_session(&mut account, trades, rng)?;

    let total = report.trades.len();
    for (i, t) in report.trades.iter().enumerate() {
        println!(
            "[trade {}/{}] {} {} ${:.2} ({:+.1}%) on ${:.2}",
            i + 1,
            total,
            t.tier,
            status_label(t.status),
            t.profit.abs(),
            t.profit / t.amount * 100.0,
            t.amount
        );
    }
    let message = format!(
        "Auto trading completed! {} trades executed. Success rate: {:.1}%. Total: ${:.2}",
        total, report.success_rate_pct, report.total_profit
    );
    println!("{message}");

    Ok(json!({
        "seed": seed,
        "account_start": start,
        "account_end": account,
        "tier": tier_info(&start),
        "session": report,
        "message": message,
        "generated_at_utc": Utc::now().to_rfc3339(),
    }))
}

fn run_demo(
    mut account: AccountSnapshot,
    deposit: f64,
    seed: u64,
    rng: &mut StdRng,
) -> Result<Value> {
    let start = account;
    let report = batch::run_demo_session(&mut account, deposit, rng)?;

    for (i, t) in report.trades.iter().enumerate() {
        println!(
            "[demo {}/3] {} {} ${:.2} on ${:.2}",
            i + 1,
            t.tier,
            status_label(t.status),
            t.profit.abs(),
            t.amount
        );
    }
    let message = format!(
        "Demo trades completed with total profit: ${:.2}",
        report.total_profit
    );
    println!("{message}");

    Ok(json!({
        "seed": seed,
        "deposit": deposit,
        "account_start": start,
        "account_end": account,
        "session": report,
        "message": message,
        "generated_at_utc": Utc::now().to_rfc3339(),
    }))
}

fn run_sweep(book_path: &Path, seed: u64, rng: &mut StdRng) -> Result<Value> {
    let mut book = load_book_from_csv(book_path)?;
    info!("loaded {} accounts from {}", book.len(), book_path.display());

    let report = batch::run_book_sweep(&mut book, rng)?;
    for r in &report.records {
        println!(
            "[sweep] account {}: {} {} ${:.2} on ${:.2}",
            r.account_id,
            r.trade.tier,
            status_label(r.trade.status),
            r.trade.profit.abs(),
            r.trade.amount
        );
    }
    println!(
        "Sweep completed! {} trades across {} accounts. Total profit: ${:.2}",
        report.trades_executed, report.accounts, report.total_profit
    );

    Ok(json!({
        "seed": seed,
        "book": book_path,
        "sweep": report,
        "accounts_end": book,
        "generated_at_utc": Utc::now().to_rfc3339(),
    }))
}

fn run_feed(points: usize, seed: u64, rng: &mut StdRng) -> Value {
    let ticker = feed::ticker(rng);
    let chart = feed::chart_series(rng, points);
    println!(
        "feed: {} active traders, profit pool ${}, chart change {:+.2}%",
        ticker.active_traders, ticker.profit_pool, chart.change_pct
    );

    json!({
        "seed": seed,
        "ticker": ticker,
        "chart": chart,
        "generated_at_utc": Utc::now().to_rfc3339(),
    })
}

fn tier_info(account: &AccountSnapshot) -> Value {
    let p = tier::classify(account.invested_total);
    json!({
        "name": p.tier,
        "headline_return": p.headline_return,
        "badge": p.badge,
        "min_deposit": p.min_deposit,
    })
}

fn status_label(status: TradeStatus) -> &'static str {
    match status {
        TradeStatus::Profit => "PROFIT",
        TradeStatus::Loss => "LOSS",
    }
}

fn load_book_from_csv(path: &Path) -> Result<Vec<BookAccount>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to open book csv: {}", path.display()))?;

    let mut book = Vec::new();
    for rec in rdr.records() {
        let r = match rec {
            Ok(x) => x,
            Err(_) => continue,
        };
        let id = r.get(0).and_then(|x| x.parse::<u64>().ok());
        let invested = r.get(1).and_then(|x| x.parse::<f64>().ok());
        let profits = r.get(2).and_then(|x| x.parse::<f64>().ok());
        let deposited = r.get(3).and_then(|x| x.parse::<f64>().ok());
        if let (Some(id), Some(invested), Some(profits), Some(deposited)) =
            (id, invested, profits, deposited)
        {
            book.push(BookAccount {
                id,
                account: AccountSnapshot::new(invested, profits, deposited),
            });
        }
    }

    if book.is_empty() {
        bail!("no accounts parsed from {}", path.display());
    }
    Ok(book)
}

fn emit(payload: &Value, out: Option<&Path>) -> Result<()> {
    let text = serde_json::to_string_pretty(payload)?;
    match out {
        Some(path) => {
            fs::write(path, text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Saved report: {}", path.display());
        }
        None => println!("{text}"),
    }
    Ok(())
}
