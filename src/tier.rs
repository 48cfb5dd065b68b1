use serde::Serialize;

/// Account standing bracket, determined by cumulative invested amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Tier {
    Starter,
    Bronze,
    Silver,
    Gold,
    #[serde(rename = "VIP")]
    Vip,
    Diamond,
    Elite,
}

impl Tier {
    pub fn name(self) -> &'static str {
        match self {
            Tier::Starter => "Starter",
            Tier::Bronze => "Bronze",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Vip => "VIP",
            Tier::Diamond => "Diamond",
            Tier::Elite => "Elite",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A (low, high) multiplier range a trade magnitude is drawn from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bracket {
    pub low: f64,
    pub high: f64,
}

const fn b(low: f64, high: f64) -> Bracket {
    Bracket { low, high }
}

/// Win multiplier ranges, tagged by magnitude instead of positional
/// indexing.
#[derive(Clone, Copy, Debug)]
pub struct WinBrackets {
    pub small: Bracket,
    pub medium: Bracket,
    pub big: Bracket,
}

#[derive(Clone, Copy, Debug)]
pub struct LossBrackets {
    pub small: Bracket,
    pub medium: Bracket,
}

/// Static per-tier parameter bundle.
#[derive(Clone, Copy, Debug)]
pub struct TierProfile {
    pub tier: Tier,
    /// Inclusive lower bound on invested total for this tier.
    pub threshold: f64,
    pub base_success_rate: f64,
    pub wins: WinBrackets,
    pub losses: LossBrackets,
    pub volatility: f64,
    /// Dashboard metadata: advertised return, badge glyph, minimum
    /// qualifying deposit.
    pub headline_return: &'static str,
    pub badge: &'static str,
    pub min_deposit: f64,
}

// Ordered highest threshold first; classification walks top-down.
static PROFILES: [TierProfile; 7] = [
    TierProfile {
        tier: Tier::Elite,
        threshold: 5000.0,
        base_success_rate: 0.82,
        wins: WinBrackets {
            small: b(1.8, 3.0),
            medium: b(2.0, 3.5),
            big: b(2.2, 4.0),
        },
        losses: LossBrackets {
            small: b(0.01, 0.03),
            medium: b(0.02, 0.04),
        },
        volatility: 0.1,
        headline_return: "400%",
        badge: "crown",
        min_deposit: 5000.0,
    },
    TierProfile {
        tier: Tier::Diamond,
        threshold: 2000.0,
        base_success_rate: 0.78,
        wins: WinBrackets {
            small: b(1.6, 2.8),
            medium: b(1.8, 3.2),
            big: b(2.0, 3.6),
        },
        losses: LossBrackets {
            small: b(0.02, 0.05),
            medium: b(0.03, 0.06),
        },
        volatility: 0.15,
        headline_return: "350%",
        badge: "diamond",
        min_deposit: 2000.0,
    },
    TierProfile {
        tier: Tier::Vip,
        threshold: 1000.0,
        base_success_rate: 0.75,
        wins: WinBrackets {
            small: b(1.4, 2.5),
            medium: b(1.6, 2.8),
            big: b(1.8, 3.0),
        },
        losses: LossBrackets {
            small: b(0.03, 0.07),
            medium: b(0.04, 0.08),
        },
        volatility: 0.2,
        headline_return: "300%",
        badge: "star",
        min_deposit: 1000.0,
    },
    TierProfile {
        tier: Tier::Gold,
        threshold: 500.0,
        base_success_rate: 0.70,
        wins: WinBrackets {
            small: b(1.3, 2.2),
            medium: b(1.4, 2.4),
            big: b(1.5, 2.6),
        },
        losses: LossBrackets {
            small: b(0.04, 0.09),
            medium: b(0.05, 0.10),
        },
        volatility: 0.25,
        headline_return: "250%",
        badge: "gold",
        min_deposit: 500.0,
    },
    TierProfile {
        tier: Tier::Silver,
        threshold: 200.0,
        base_success_rate: 0.65,
        wins: WinBrackets {
            small: b(1.2, 1.8),
            medium: b(1.3, 2.0),
            big: b(1.4, 2.2),
        },
        losses: LossBrackets {
            small: b(0.05, 0.12),
            medium: b(0.06, 0.14),
        },
        volatility: 0.3,
        headline_return: "200%",
        badge: "silver",
        min_deposit: 200.0,
    },
    TierProfile {
        tier: Tier::Bronze,
        threshold: 100.0,
        base_success_rate: 0.60,
        wins: WinBrackets {
            small: b(1.1, 1.6),
            medium: b(1.2, 1.7),
            big: b(1.3, 1.8),
        },
        losses: LossBrackets {
            small: b(0.06, 0.15),
            medium: b(0.07, 0.18),
        },
        volatility: 0.35,
        headline_return: "150%",
        badge: "bronze",
        min_deposit: 100.0,
    },
    TierProfile {
        tier: Tier::Starter,
        threshold: 0.0,
        base_success_rate: 0.55,
        wins: WinBrackets {
            small: b(1.05, 1.4),
            medium: b(1.1, 1.5),
            big: b(1.15, 1.6),
        },
        losses: LossBrackets {
            small: b(0.08, 0.20),
            medium: b(0.10, 0.25),
        },
        volatility: 0.4,
        headline_return: "100%",
        badge: "rocket",
        min_deposit: 50.0,
    },
];

/// Maps a cumulative invested amount to its tier profile. Total over
/// non-negative inputs; thresholds are inclusive on the lower bound.
pub fn classify(invested_total: f64) -> &'static TierProfile {
    PROFILES
        .iter()
        .find(|p| invested_total >= p.threshold)
        .unwrap_or(&PROFILES[PROFILES.len() - 1])
}
