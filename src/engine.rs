//! Stochastic trade outcome engine: pure given a random source, no
//! storage, no clock, no shared state.

use rand::Rng;
use serde::Serialize;
use thiserror::Error;

use crate::tier::{self, Bracket, LossBrackets, Tier, TierProfile, WinBrackets};

/// Jitter output is always clamped into this band, regardless of tier
/// or history.
pub const RATE_FLOOR: f64 = 0.4;
pub const RATE_CEIL: f64 = 0.9;
/// Experience can never push the pre-jitter rate above this.
pub const ADJUSTED_RATE_CAP: f64 = 0.85;
/// A win nets at least this fraction of the traded amount.
pub const MIN_WIN_FRACTION: f64 = 0.05;
/// A loss never exceeds this fraction of the traded amount.
pub const MAX_LOSS_FRACTION: f64 = 0.3;
/// Additive win-multiplier bonus, proportional to invested total.
pub const TIER_BONUS_CAP: f64 = 0.3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid trade input: {0}")]
    InvalidInput(&'static str),
}

/// Immutable view of an account's financial history for one call.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AccountSnapshot {
    pub invested_total: f64,
    pub profit_total: f64,
    pub deposited_total: f64,
}

impl AccountSnapshot {
    pub fn new(invested_total: f64, profit_total: f64, deposited_total: f64) -> Self {
        Self {
            invested_total,
            profit_total,
            deposited_total,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Profit,
    Loss,
}

/// Result of one simulated trade.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TradeOutcome {
    pub amount: f64,
    pub profit: f64,
    pub status: TradeStatus,
    pub tier: Tier,
}

impl TradeOutcome {
    /// Profit as a percentage of the traded amount.
    pub fn profit_percent(&self) -> f64 {
        self.profit / self.amount * 100.0
    }

    /// One-line rendering for the notification collaborator: tier,
    /// signed result, percentage, traded amount.
    pub fn summary(&self) -> String {
        let label = match self.status {
            TradeStatus::Profit => "PROFIT",
            TradeStatus::Loss => "LOSS",
        };
        format!(
            "{} trade: {} of ${:.2} ({:+.1}%) on ${:.2}",
            self.tier,
            label,
            self.profit.abs(),
            self.profit_percent(),
            self.amount
        )
    }
}

/// Simulates one trade against the account's current state. Same rng
/// sequence in, same outcome out.
pub fn compute_outcome(
    account: &AccountSnapshot,
    amount: f64,
    rng: &mut impl Rng,
) -> Result<TradeOutcome, EngineError> {
    validate(account, amount)?;

    let profile = tier::classify(account.invested_total);
    let adjusted = adjusted_success_rate(profile.base_success_rate, account);
    let final_rate = final_success_rate(adjusted, profile.volatility, rng);
    let (raw, status) = sample_raw(amount, account.invested_total, final_rate, profile, rng);
    let profit = round_to(enforce_bounds(raw, amount, status), 2);

    Ok(TradeOutcome {
        amount,
        profit,
        status,
        tier: profile.tier,
    })
}

fn validate(account: &AccountSnapshot, amount: f64) -> Result<(), EngineError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(EngineError::InvalidInput("trade amount must be positive"));
    }
    if account.invested_total < 0.0 {
        return Err(EngineError::InvalidInput(
            "invested total must be non-negative",
        ));
    }
    if account.deposited_total < 0.0 {
        return Err(EngineError::InvalidInput(
            "deposited total must be non-negative",
        ));
    }
    Ok(())
}

/// Nudges the base success rate by the account's historical
/// profit/deposit ratio and total deposit size, capped at 0.85 so no
/// history guarantees a win. Accounts that never deposited keep the
/// tier's base rate. `profit_total` may be negative; the ratio clamp
/// bounds its effect.
pub fn adjusted_success_rate(base_rate: f64, account: &AccountSnapshot) -> f64 {
    if account.deposited_total <= 0.0 {
        return base_rate;
    }
    let win_ratio = (account.profit_total / account.deposited_total + 0.5).clamp(0.3, 0.9);
    let experience_boost = account.deposited_total.max(100.0).ln() / 10.0;
    (base_rate * win_ratio + experience_boost).min(ADJUSTED_RATE_CAP)
}

/// Applies a uniform market-noise perturbation and clamps the result
/// into `[0.4, 0.9]`.
pub fn final_success_rate(adjusted: f64, volatility: f64, rng: &mut impl Rng) -> f64 {
    let trend = rng.random_range(-volatility..=volatility);
    (adjusted + trend).clamp(RATE_FLOOR, RATE_CEIL)
}

/// Win-bracket selection reuses the win/loss `quality` draw: the
/// cutoffs are fractions of the realized rate itself, so the bracket
/// mix among winning trades stays fixed.
pub fn win_bracket(quality: f64, final_rate: f64, wins: &WinBrackets) -> Bracket {
    if quality < final_rate * 0.3 {
        wins.big
    } else if quality < final_rate * 0.7 {
        wins.medium
    } else {
        wins.small
    }
}

pub fn loss_bracket(severity: f64, losses: &LossBrackets) -> Bracket {
    if severity < 0.3 {
        losses.small
    } else {
        losses.medium
    }
}

pub fn tier_bonus(invested_total: f64) -> f64 {
    (invested_total / 10_000.0).min(TIER_BONUS_CAP)
}

/// Draws the win/loss decision and the raw signed magnitude. One
/// `quality` draw decides both the branch and, on the win path, the
/// bracket; the loss path draws a separate severity.
pub fn sample_raw(
    amount: f64,
    invested_total: f64,
    final_rate: f64,
    profile: &TierProfile,
    rng: &mut impl Rng,
) -> (f64, TradeStatus) {
    let quality: f64 = rng.random();
    if quality < final_rate {
        let bracket = win_bracket(quality, final_rate, &profile.wins);
        let multiplier = rng.random_range(bracket.low..=bracket.high) + tier_bonus(invested_total);
        (amount * (multiplier - 1.0), TradeStatus::Profit)
    } else {
        let severity: f64 = rng.random();
        let bracket = loss_bracket(severity, &profile.losses);
        let multiplier = rng.random_range(bracket.low..=bracket.high);
        (-amount * multiplier, TradeStatus::Loss)
    }
}

/// Floor wins at 5% of the amount, soften losses to at most 30% of it.
pub fn enforce_bounds(raw: f64, amount: f64, status: TradeStatus) -> f64 {
    match status {
        TradeStatus::Profit => raw.max(amount * MIN_WIN_FRACTION),
        TradeStatus::Loss => raw.max(-amount * MAX_LOSS_FRACTION),
    }
}

pub fn round_to(v: f64, digits: i32) -> f64 {
    let f = 10_f64.powi(digits);
    (v * f).round() / f
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn starter() -> AccountSnapshot {
        AccountSnapshot::new(0.0, 0.0, 0.0)
    }

    #[test]
    fn no_deposits_keeps_base_rate() {
        assert_eq!(adjusted_success_rate(0.55, &starter()), 0.55);
    }

    #[test]
    fn rich_history_hits_the_adjusted_cap() {
        // winRatio = clamp(2000/4000 + 0.5, 0.3, 0.9) = 0.9
        // boost = ln(4000)/10 ~ 0.830, so the 0.85 cap binds.
        let account = AccountSnapshot::new(6000.0, 2000.0, 4000.0);
        let adjusted = adjusted_success_rate(0.82, &account);
        assert!((adjusted - ADJUSTED_RATE_CAP).abs() < 1e-12);
    }

    #[test]
    fn deep_losses_clamp_the_win_ratio() {
        // profit/deposit ratio of -10 bottoms out at winRatio = 0.3.
        let account = AccountSnapshot::new(0.0, -10_000.0, 1000.0);
        let adjusted = adjusted_success_rate(0.55, &account);
        let expected = (0.55 * 0.3 + 1000.0_f64.ln() / 10.0).min(ADJUSTED_RATE_CAP);
        assert!((adjusted - expected).abs() < 1e-12);
    }

    #[test]
    fn small_deposits_use_the_boost_floor() {
        // deposits under 100 still get ln(100)/10.
        let account = AccountSnapshot::new(0.0, 0.0, 50.0);
        let adjusted = adjusted_success_rate(0.55, &account);
        // winRatio = clamp(0/50 + 0.5, 0.3, 0.9) = 0.5
        let expected = (0.55 * 0.5 + 100.0_f64.ln() / 10.0).min(ADJUSTED_RATE_CAP);
        assert!((adjusted - expected).abs() < 1e-12);
    }

    #[test]
    fn final_rate_stays_in_band_for_every_tier() {
        for seed in 0..500_u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            for invested in [0.0, 150.0, 300.0, 700.0, 1500.0, 3000.0, 9000.0] {
                let profile = crate::tier::classify(invested);
                // Starter base 0.55 with volatility 0.4 exercises both
                // clamp edges.
                let rate = final_success_rate(
                    profile.base_success_rate,
                    profile.volatility,
                    &mut rng,
                );
                assert!((RATE_FLOOR..=RATE_CEIL).contains(&rate), "rate={rate}");
            }
        }
    }

    #[test]
    fn final_rate_clamps_the_extremes() {
        // Adjusted rates far outside the band pin to its edges no
        // matter what the jitter draws.
        for seed in 0..100_u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            assert_eq!(final_success_rate(2.0, 0.4, &mut rng), RATE_CEIL);
            assert_eq!(final_success_rate(-1.0, 0.4, &mut rng), RATE_FLOOR);
        }
    }

    #[test]
    fn quality_draw_picks_the_win_bracket() {
        let wins = crate::tier::classify(0.0).wins;
        // quality 0.50 at rate 0.55: not < 0.165 (big), not < 0.385
        // (medium), so small.
        assert_eq!(win_bracket(0.50, 0.55, &wins), wins.small);
        assert_eq!(win_bracket(0.10, 0.55, &wins), wins.big);
        assert_eq!(win_bracket(0.30, 0.55, &wins), wins.medium);
    }

    #[test]
    fn severity_draw_picks_the_loss_bracket() {
        let losses = crate::tier::classify(0.0).losses;
        assert_eq!(loss_bracket(0.1, &losses), losses.small);
        assert_eq!(loss_bracket(0.3, &losses), losses.medium);
        assert_eq!(loss_bracket(0.9, &losses), losses.medium);
    }

    #[test]
    fn tier_bonus_is_proportional_and_capped() {
        assert_eq!(tier_bonus(0.0), 0.0);
        assert!((tier_bonus(1500.0) - 0.15).abs() < 1e-12);
        assert_eq!(tier_bonus(10_000.0), TIER_BONUS_CAP);
        assert_eq!(tier_bonus(50_000.0), TIER_BONUS_CAP);
    }

    #[test]
    fn bounds_floor_wins_and_soften_losses() {
        assert_eq!(enforce_bounds(1.0, 100.0, TradeStatus::Profit), 5.0);
        assert_eq!(enforce_bounds(10.0, 100.0, TradeStatus::Profit), 10.0);
        assert_eq!(enforce_bounds(-50.0, 100.0, TradeStatus::Loss), -30.0);
        assert_eq!(enforce_bounds(-10.0, 100.0, TradeStatus::Loss), -10.0);
    }

    #[test]
    fn outcomes_respect_win_floor_and_loss_ceiling() {
        let accounts = [
            AccountSnapshot::new(0.0, 0.0, 0.0),
            AccountSnapshot::new(250.0, -40.0, 300.0),
            AccountSnapshot::new(1200.0, 350.0, 900.0),
            AccountSnapshot::new(6000.0, 2000.0, 4000.0),
        ];
        for seed in 0..1000_u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            for account in &accounts {
                let amount = 100.0;
                let outcome = compute_outcome(account, amount, &mut rng).unwrap();
                match outcome.status {
                    TradeStatus::Profit => {
                        assert!(outcome.profit > 0.0);
                        assert!(outcome.profit >= amount * MIN_WIN_FRACTION - 0.01);
                    }
                    TradeStatus::Loss => {
                        assert!(outcome.profit < 0.0);
                        assert!(outcome.profit >= -amount * MAX_LOSS_FRACTION - 0.01);
                    }
                }
                assert_eq!(outcome.profit, round_to(outcome.profit, 2));
                assert_eq!(outcome.amount, amount);
            }
        }
    }

    #[test]
    fn same_seed_replays_the_same_outcome() {
        let account = AccountSnapshot::new(750.0, 120.0, 600.0);
        let a = compute_outcome(&account, 333.33, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = compute_outcome(&account, 333.33, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn elite_losses_stay_computable_and_bounded() {
        // At the 0.85 cap with volatility 0.1 a loss is rare but must
        // still resolve within the ceiling.
        let account = AccountSnapshot::new(6000.0, 2000.0, 4000.0);
        let mut saw_loss = false;
        for seed in 0..5000_u64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = compute_outcome(&account, 1000.0, &mut rng).unwrap();
            if outcome.status == TradeStatus::Loss {
                saw_loss = true;
                assert!(outcome.profit >= -300.0 - 0.01);
            }
            assert_eq!(outcome.tier, Tier::Elite);
        }
        assert!(saw_loss, "expected at least one loss across 5000 seeds");
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            compute_outcome(&starter(), 0.0, &mut rng),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            compute_outcome(&starter(), -25.0, &mut rng),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            compute_outcome(&AccountSnapshot::new(-1.0, 0.0, 0.0), 100.0, &mut rng),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            compute_outcome(&AccountSnapshot::new(0.0, 0.0, -1.0), 100.0, &mut rng),
            Err(EngineError::InvalidInput(_))
        ));
        // Cumulative net loss is a legal state.
        assert!(compute_outcome(&AccountSnapshot::new(100.0, -40.0, 100.0), 100.0, &mut rng).is_ok());
    }

    #[test]
    fn summary_carries_tier_and_signed_percent() {
        let win = TradeOutcome {
            amount: 100.0,
            profit: 7.5,
            status: TradeStatus::Profit,
            tier: Tier::Starter,
        };
        assert_eq!(win.summary(), "Starter trade: PROFIT of $7.50 (+7.5%) on $100.00");

        let loss = TradeOutcome {
            amount: 200.0,
            profit: -30.0,
            status: TradeStatus::Loss,
            tier: Tier::Vip,
        };
        assert_eq!(loss.summary(), "VIP trade: LOSS of $30.00 (-15.0%) on $200.00");
    }
}
