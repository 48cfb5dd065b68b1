//! Synthetic dashboard feed: randomized headline stats and a bounded
//! random-walk chart series. Presentation data only; nothing here
//! touches the outcome engine.

use rand::Rng;
use serde::Serialize;

use crate::engine::round_to;

#[derive(Clone, Debug, Serialize)]
pub struct TickerEntry {
    pub pair: &'static str,
    pub action: &'static str,
    pub profit: f64,
    pub age: &'static str,
}

#[derive(Clone, Debug, Serialize)]
pub struct Ticker {
    pub active_traders: u32,
    pub profit_pool: u64,
    pub entries: Vec<TickerEntry>,
}

pub fn ticker(rng: &mut impl Rng) -> Ticker {
    let entries = vec![
        TickerEntry {
            pair: "BTC/USD",
            action: "BUY",
            profit: rng.random_range(80..=600) as f64,
            age: "just now",
        },
        TickerEntry {
            pair: "ETH/USD",
            action: "SELL",
            profit: -(rng.random_range(15..=80) as f64),
            age: "2 min ago",
        },
        TickerEntry {
            pair: "XRP/USD",
            action: "BUY",
            profit: rng.random_range(40..=300) as f64,
            age: "5 min ago",
        },
        TickerEntry {
            pair: "ADA/USD",
            action: "BUY",
            profit: rng.random_range(25..=200) as f64,
            age: "8 min ago",
        },
        TickerEntry {
            pair: "SOL/USD",
            action: "SELL",
            profit: -(rng.random_range(10..=60) as f64),
            age: "10 min ago",
        },
    ];
    Ticker {
        active_traders: rng.random_range(1800..=3200),
        profit_pool: rng.random_range(750_000..=1_500_000),
        entries,
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub points: Vec<f64>,
    pub current: f64,
    pub change: f64,
    pub change_pct: f64,
}

/// Random walk from a Uniform(100, 500) start, +/-15 per step, floored
/// at 50.
pub fn chart_series(rng: &mut impl Rng, points: usize) -> ChartSeries {
    let mut value = rng.random_range(100.0..=500.0);
    let mut series = Vec::with_capacity(points);
    let mut labels = Vec::with_capacity(points);

    for i in 0..points {
        value = (value + rng.random_range(-15.0_f64..=15.0)).max(50.0);
        series.push(round_to(value, 2));
        labels.push(format!("{}h", i + 1));
    }

    let first = series.first().copied().unwrap_or(0.0);
    let last = series.last().copied().unwrap_or(0.0);
    let change = round_to(last - first, 2);
    let change_pct = if first > 0.0 {
        round_to(change / first * 100.0, 2)
    } else {
        0.0
    };

    ChartSeries {
        labels,
        points: series,
        current: last,
        change,
        change_pct,
    }
}
