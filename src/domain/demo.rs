//! Demo tickets inserted into an empty board when seeding is enabled.

use crate::domain::ticket::{TicketDraft, TicketPriority, TicketStatus};

pub fn demo_drafts() -> Vec<TicketDraft> {
    vec![
        TicketDraft::new("Set up YCA position alerts")
            .with_description(
                "Configure price alerts for YCA positions at key support/resistance levels",
            )
            .with_priority(TicketPriority::High)
            .with_tags(["yca", "alerts", "position"]),
        TicketDraft::new("Research Thales options expiry")
            .with_description(
                "Analyze upcoming Thales options expiry dates and prepare rollover strategy",
            )
            .with_priority(TicketPriority::Medium)
            .with_tags(["thales", "options", "research"]),
        TicketDraft::new("Monitor gold price resistance at $2,800")
            .with_description(
                "Watch XAU/USD for breakout above $2,800 resistance. Set alerts for volume spikes.",
            )
            .with_status(TicketStatus::InProgress)
            .with_priority(TicketPriority::High)
            .with_tags(["gold", "technical", "xauusd"]),
        TicketDraft::new("EUR/USD technical analysis")
            .with_description("Complete weekly TA on EUR/USD. Check RSI, MACD, and support levels.")
            .with_status(TicketStatus::InProgress)
            .with_priority(TicketPriority::Medium)
            .with_tags(["eurusd", "forex", "technical"]),
        TicketDraft::new("Awaiting FOMC announcement for USD positions")
            .with_description(
                "Hold USD positions until Fed announcement. Review dot plot projections.",
            )
            .with_status(TicketStatus::Hold)
            .with_priority(TicketPriority::High)
            .with_tags(["forex", "fomc", "fed", "usd"]),
        TicketDraft::new("Closed Q4 P&L review")
            .with_description(
                "Finalized quarterly profit/loss analysis and tax preparation documents.",
            )
            .with_status(TicketStatus::Done)
            .with_priority(TicketPriority::Low)
            .with_tags(["review", "pnl", "quarterly", "tax"]),
        TicketDraft::new("Updated risk management rules")
            .with_description("Revised max position sizing and stop-loss rules for 2025 trading.")
            .with_status(TicketStatus::Done)
            .with_priority(TicketPriority::Medium)
            .with_tags(["risk", "rules", "management"]),
    ]
}
