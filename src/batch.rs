//! Serial session runners: a batch is a sequence of engine calls where
//! each trade's profit feeds the account's cumulative state before the
//! next draw.

use chrono::Utc;
use log::debug;
use rand::Rng;
use serde::Serialize;

use crate::engine::{self, AccountSnapshot, EngineError, TradeStatus};
use crate::tier::Tier;

/// Ledger-facing record of one executed trade.
#[derive(Clone, Debug, Serialize)]
pub struct TradeRecord {
    pub amount: f64,
    pub profit: f64,
    pub status: TradeStatus,
    pub tier: Tier,
    pub timestamp: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct SessionReport {
    pub trades: Vec<TradeRecord>,
    pub total_profit: f64,
    pub profitable_trades: usize,
    pub losing_trades: usize,
    pub success_rate_pct: f64,
}

impl SessionReport {
    fn from_records(trades: Vec<TradeRecord>) -> Self {
        let total_profit: f64 = trades.iter().map(|t| t.profit).sum();
        let profitable_trades = trades
            .iter()
            .filter(|t| t.status == TradeStatus::Profit)
            .count();
        let losing_trades = trades.len() - profitable_trades;
        let success_rate_pct = if trades.is_empty() {
            0.0
        } else {
            engine::round_to(profitable_trades as f64 / trades.len() as f64 * 100.0, 1)
        };
        Self {
            trades,
            total_profit: engine::round_to(total_profit, 2),
            profitable_trades,
            losing_trades,
            success_rate_pct,
        }
    }
}

fn execute(
    account: &mut AccountSnapshot,
    amount: f64,
    rng: &mut impl Rng,
) -> Result<TradeRecord, EngineError> {
    let outcome = engine::compute_outcome(account, amount, rng)?;
    account.profit_total += outcome.profit;
    debug!("{}", outcome.summary());
    Ok(TradeRecord {
        amount: outcome.amount,
        profit: outcome.profit,
        status: outcome.status,
        tier: outcome.tier,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Runs an auto-trade session: 5 to 12 trades (unless overridden),
/// each sized off the account's invested total with a bit of variation.
/// Unfunded accounts are sized as if 100 were invested; classification
/// still uses the real snapshot.
pub fn run_auto_session(
    account: &mut AccountSnapshot,
    trades: Option<usize>,
    rng: &mut impl Rng,
) -> Result<SessionReport, EngineError> {
    let count = match trades {
        Some(n) => n,
        None => rng.random_range(5..=12),
    };

    let invested_effective = if account.invested_total > 0.0 {
        account.invested_total
    } else {
        100.0
    };
    let base_amount = (invested_effective * 0.15).min(200.0);

    let mut records = Vec::with_capacity(count);
    for _ in 0..count {
        let amount = rng.random_range(base_amount * 0.7..=base_amount * 1.3);
        records.push(execute(account, amount, rng)?);
    }
    Ok(SessionReport::from_records(records))
}

/// A freshly unlocked deposit runs 3 equal demo trades.
pub fn run_demo_session(
    account: &mut AccountSnapshot,
    deposit: f64,
    rng: &mut impl Rng,
) -> Result<SessionReport, EngineError> {
    let mut records = Vec::with_capacity(3);
    for _ in 0..3 {
        records.push(execute(account, deposit / 3.0, rng)?);
    }
    Ok(SessionReport::from_records(records))
}

/// One account in a book sweep.
#[derive(Clone, Debug, Serialize)]
pub struct BookAccount {
    pub id: u64,
    pub account: AccountSnapshot,
}

#[derive(Clone, Debug, Serialize)]
pub struct SweepRecord {
    pub account_id: u64,
    #[serde(flatten)]
    pub trade: TradeRecord,
}

#[derive(Clone, Debug, Serialize)]
pub struct SweepReport {
    pub accounts: usize,
    pub trades_executed: usize,
    pub total_profit: f64,
    pub records: Vec<SweepRecord>,
}

/// Sweeps a book of accounts: each funded account trades with
/// probability 0.6, sized between 50 and 30% of its invested total
/// (capped at 500). The bounds are ordered before drawing so thin
/// accounts stay tradable.
pub fn run_book_sweep(
    book: &mut [BookAccount],
    rng: &mut impl Rng,
) -> Result<SweepReport, EngineError> {
    let mut records = Vec::new();
    for entry in book.iter_mut() {
        if entry.account.invested_total <= 0.0 {
            continue;
        }
        if !rng.random_bool(0.6) {
            continue;
        }
        let cap = (entry.account.invested_total * 0.3).min(500.0);
        let (lo, hi) = (50.0_f64.min(cap), 50.0_f64.max(cap));
        let amount = rng.random_range(lo..=hi);
        records.push(SweepRecord {
            account_id: entry.id,
            trade: execute(&mut entry.account, amount, rng)?,
        });
    }
    let total_profit: f64 = records.iter().map(|r| r.trade.profit).sum();
    Ok(SweepReport {
        accounts: book.len(),
        trades_executed: records.len(),
        total_profit: engine::round_to(total_profit, 2),
        records,
    })
}
