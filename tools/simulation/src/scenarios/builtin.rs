//! Built-in scenario table
//!
//! Authored content shipped with the sandbox. Each scenario's event table is
//! drawn from with equal weight, so the impact mix of a table is what sets
//! its market mood.

use types::ids::ScenarioId;
use types::scenario::{Difficulty, EventTemplate, Impact, Scenario, Volatility};

use Impact::{Negative, Neutral, Positive};

fn table(entries: &[(&str, Impact)]) -> Vec<EventTemplate> {
    entries
        .iter()
        .map(|(description, impact)| EventTemplate::new(*description, *impact))
        .collect()
}

/// All built-in scenarios, in display order.
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            id: ScenarioId::from("bull-run"),
            name: "Bull Run".to_string(),
            difficulty: Difficulty::Beginner,
            total_days: 60,
            volatility: Volatility::Low,
            event_table: table(&[
                ("Spot ETF sees record inflows", Positive),
                ("Major exchange lists new lending markets", Positive),
                ("Institutional treasury announces crypto allocation", Positive),
                ("Network upgrade ships without incident", Positive),
                ("Profit-taking cools the rally", Negative),
                ("Funding rates normalize", Neutral),
            ]),
        },
        Scenario {
            id: ScenarioId::from("bear-market-crash"),
            name: "Bear Market Crash".to_string(),
            difficulty: Difficulty::Intermediate,
            total_days: 90,
            volatility: Volatility::High,
            event_table: table(&[
                ("Large lender halts withdrawals", Negative),
                ("Regulator sues a top-10 exchange", Negative),
                ("Cascading liquidations across DeFi", Negative),
                ("Stablecoin briefly loses its peg", Negative),
                ("Miners capitulate and sell reserves", Negative),
                ("Relief rally on short covering", Positive),
                ("Markets trade sideways on low volume", Neutral),
            ]),
        },
        Scenario {
            id: ScenarioId::from("sideways-chop"),
            name: "Sideways Chop".to_string(),
            difficulty: Difficulty::Beginner,
            total_days: 30,
            volatility: Volatility::Low,
            event_table: table(&[
                ("Macro data comes in as expected", Neutral),
                ("Options expiry pins prices", Neutral),
                ("Whale rotates between majors", Neutral),
                ("Minor protocol partnership announced", Positive),
                ("Small exploit on an unrelated chain", Negative),
            ]),
        },
        Scenario {
            id: ScenarioId::from("rate-shock"),
            name: "Rate Shock".to_string(),
            difficulty: Difficulty::Intermediate,
            total_days: 45,
            volatility: Volatility::Medium,
            event_table: table(&[
                ("Central bank hikes rates unexpectedly", Negative),
                ("Bond yields spike to multi-year highs", Negative),
                ("Risk assets stabilize after guidance", Neutral),
                ("Inflation print comes in soft", Positive),
                ("Borrow demand dries up", Neutral),
                ("Dollar strengthens sharply", Negative),
            ]),
        },
        Scenario {
            id: ScenarioId::from("flash-crash"),
            name: "Flash Crash".to_string(),
            difficulty: Difficulty::Advanced,
            total_days: 14,
            volatility: Volatility::High,
            event_table: table(&[
                ("Oracle misprice triggers mass liquidations", Negative),
                ("Market maker pulls liquidity", Negative),
                ("Exchange outage freezes order books", Negative),
                ("Dip buyers step in aggressively", Positive),
                ("Circuit breakers pause trading", Neutral),
            ]),
        },
    ]
}
