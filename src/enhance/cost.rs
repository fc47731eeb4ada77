//! Token pricing and cost arithmetic
//!
//! Costs are held as whole micro-dollars so that six-decimal rendering is exact
//! and `total` always equals `input + output` digit for digit.

use crate::llm::TokenCounts;
use serde::{Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

/// Default price in USD per million input tokens
pub const DEFAULT_INPUT_PRICE_PER_MILLION: f64 = 3.00;

/// Default price in USD per million output tokens
pub const DEFAULT_OUTPUT_PRICE_PER_MILLION: f64 = 15.00;

/// A USD amount with micro-dollar resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Usd(u64);

impl Usd {
    pub const ZERO: Usd = Usd(0);

    pub fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Rounds a dollar amount to the nearest micro-dollar; negative and
    /// non-finite amounts become zero.
    pub fn from_dollars(dollars: f64) -> Self {
        if !dollars.is_finite() || dollars <= 0.0 {
            return Self::ZERO;
        }
        Self((dollars * 1_000_000.0).round() as u64)
    }

    pub fn micros(self) -> u64 {
        self.0
    }

    pub fn as_dollars(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Integer mean rounded half up; zero when `count` is zero
    pub fn average(self, count: u64) -> Self {
        if count == 0 {
            return Self::ZERO;
        }
        Self((self.0 + count / 2) / count)
    }
}

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.0 / 1_000_000, self.0 % 1_000_000)
    }
}

impl Serialize for Usd {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl Add for Usd {
    type Output = Usd;

    fn add(self, rhs: Usd) -> Usd {
        Usd(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Usd {
    fn sum<I: Iterator<Item = Usd>>(iter: I) -> Usd {
        iter.fold(Usd::ZERO, Add::add)
    }
}

/// Linear per-token pricing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

impl Default for Pricing {
    fn default() -> Self {
        Self {
            input_per_million: DEFAULT_INPUT_PRICE_PER_MILLION,
            output_per_million: DEFAULT_OUTPUT_PRICE_PER_MILLION,
        }
    }
}

impl Pricing {
    pub fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    /// A price per million tokens is exactly the price per token in micro-dollars.
    pub fn cost(&self, counts: TokenCounts) -> CostBreakdown {
        let input = Usd::from_dollars(counts.input_tokens as f64 * self.input_per_million / 1e6);
        let output =
            Usd::from_dollars(counts.output_tokens as f64 * self.output_per_million / 1e6);
        CostBreakdown {
            input,
            output,
            total: input + output,
        }
    }

    pub fn usage(&self, counts: TokenCounts) -> TokenUsage {
        TokenUsage {
            input_tokens: counts.input_tokens,
            output_tokens: counts.output_tokens,
            cost: self.cost(counts),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CostBreakdown {
    pub input: Usd,
    pub output: Usd,
    pub total: Usd,
}

/// Token counts reported by the API together with their priced cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: CostBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(input_tokens: u64, output_tokens: u64) -> TokenCounts {
        TokenCounts {
            input_tokens,
            output_tokens,
        }
    }

    #[test]
    fn test_default_pricing_cost() {
        let cost = Pricing::default().cost(counts(100, 50));
        assert_eq!(cost.input.to_string(), "0.000300");
        assert_eq!(cost.output.to_string(), "0.000750");
        assert_eq!(cost.total.to_string(), "0.001050");
    }

    #[test]
    fn test_zero_tokens_cost_nothing() {
        let cost = Pricing::default().cost(counts(0, 0));
        assert_eq!(cost.total, Usd::ZERO);
        assert_eq!(cost.total.to_string(), "0.000000");
    }

    #[test]
    fn test_total_is_sum_of_rounded_parts() {
        let pricing = Pricing::new(0.8, 4.0);
        let cost = pricing.cost(counts(3, 1));
        // 3 * 0.8 = 2.4 micro-dollars rounds to 2
        assert_eq!(cost.input.micros(), 2);
        assert_eq!(cost.output.micros(), 4);
        assert_eq!(cost.total.micros(), 6);
    }

    #[test]
    fn test_usd_display_over_one_dollar() {
        assert_eq!(Usd::from_micros(12_345_678).to_string(), "12.345678");
        assert_eq!(Usd::from_dollars(1.5).to_string(), "1.500000");
    }

    #[test]
    fn test_usd_from_dollars_rejects_garbage() {
        assert_eq!(Usd::from_dollars(-1.0), Usd::ZERO);
        assert_eq!(Usd::from_dollars(f64::NAN), Usd::ZERO);
        assert_eq!(Usd::from_dollars(0.0000104), Usd::from_micros(10));
    }

    #[test]
    fn test_usd_average() {
        assert_eq!(Usd::from_micros(15).average(3), Usd::from_micros(5));
        assert_eq!(Usd::from_micros(10).average(4), Usd::from_micros(3));
        assert_eq!(Usd::from_micros(10).average(0), Usd::ZERO);
    }

    #[test]
    fn test_usage_serializes_costs_as_strings() {
        let usage = Pricing::default().usage(counts(100, 50));
        let json = serde_json::to_value(usage).unwrap();
        assert_eq!(json["inputTokens"], 100);
        assert_eq!(json["outputTokens"], 50);
        assert_eq!(json["cost"]["total"], "0.001050");
    }
}
