//! Prompt template for options-chain analysis.
//!
//! The prompt is one block of text: the trader role, the instrument and
//! dates, Markdown formatting rules, four fixed analysis sections and the
//! full option-chain snapshot as indented JSON.

use chainsight_market_data::OptionChainSnapshot;
use chrono::NaiveDate;

/// Date format used for the "current date" line.
pub const CURRENT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A fixed instruction block of the analysis prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSection {
    pub title: &'static str,
    pub content: &'static str,
}

/// Sections the model is asked to cover, in order.
pub const ANALYSIS_SECTIONS: [TemplateSection; 4] = [
    TemplateSection {
        title: "Top 3 Strategy Picks",
        content: "Identify and suggest the top 3 potential options trading strategies (e.g., Iron Condor, Strangle, Bull Call Spread, Bear Put Spread, Covered Call, Protective Put, Butterfly Spread, Calendar Spread) based on Open Interest (OI), Volume, and Implied Volatility (IV) trends. For each strategy, explain *why* it's suggested and its potential outlook.",
    },
    TemplateSection {
        title: "Unusual Activity Alert",
        content: "Detect any significant unusual activity, such as large OI buildups/reductions on specific strikes, unusual volume spikes, or sudden shifts in IV.",
    },
    TemplateSection {
        title: "Actionable Insights",
        content: "Suggest specific trading opportunities. This could include potential entry/exit conditions, target levels, or risk considerations.",
    },
    TemplateSection {
        title: "Credit Spreads Spotlight",
        content: "Summarize potential credit spreads (call + put) that show high liquidity and attractive premium capture opportunities.",
    },
];

/// Inputs of one analysis prompt.
#[derive(Debug, Clone)]
pub struct AnalysisPrompt<'a> {
    pub symbol: &'a str,
    pub expiry: &'a str,
    pub current_date: NaiveDate,
    pub snapshot: &'a OptionChainSnapshot,
}

impl AnalysisPrompt<'_> {
    /// Render the full prompt text.
    pub fn render(&self) -> String {
        let data = serde_json::to_string_pretty(self.snapshot)
            .unwrap_or_else(|_| "{}".to_string());

        let mut prompt = format!(
            "You are an expert options trader. Analyze the following NSE options chain data for **{symbol}** with an expiry date of **{expiry}**.\n\
The current date is {today}.\n\n\
Provide a concise, catchy, and highly readable analysis formatted using **Markdown**.\n\
Ensure there are clear paragraph breaks and use bolding for key terms.\n\n\
Specifically:\n\
*   Start with an engaging title, clearly stating the symbol and expiry date, and whether this is a near-term, mid-term, or long-dated expiry in relation to the current date.\n",
            symbol = self.symbol,
            expiry = self.expiry,
            today = self.current_date.format(CURRENT_DATE_FORMAT),
        );

        for section in ANALYSIS_SECTIONS.iter() {
            prompt.push_str(&format!("*   **{}:** {}\n", section.title, section.content));
        }

        prompt.push_str("\nData:\n");
        prompt.push_str(&data);
        prompt.push('\n');
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use serde_json::json;

    fn snapshot() -> OptionChainSnapshot {
        OptionChainSnapshot::stamp(
            json!({"records": {"expiryDates": ["28-Nov-2024"], "underlyingValue": 23518.5}}),
            Local.with_ymd_and_hms(2024, 11, 20, 10, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn render() -> String {
        let snapshot = snapshot();
        AnalysisPrompt {
            symbol: "NIFTY",
            expiry: "28-Nov-2024",
            current_date: NaiveDate::from_ymd_opt(2024, 11, 20).unwrap(),
            snapshot: &snapshot,
        }
        .render()
    }

    #[test]
    fn test_prompt_names_symbol_expiry_and_date() {
        let prompt = render();
        assert!(prompt.contains("**NIFTY** with an expiry date of **28-Nov-2024**"));
        assert!(prompt.contains("The current date is 2024-11-20."));
    }

    #[test]
    fn test_prompt_lists_every_section_in_order() {
        let prompt = render();
        let positions: Vec<usize> = ANALYSIS_SECTIONS
            .iter()
            .map(|s| prompt.find(s.title).expect("section missing"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_prompt_ends_with_pretty_printed_data() {
        let prompt = render();
        let data = prompt.split("\nData:\n").nth(1).unwrap();
        assert!(data.contains("  \"fetch_timestamp\": \"2024-11-20T10:00:00.000000\""));
        assert!(data.contains("\"underlyingValue\": 23518.5"));
    }
}
