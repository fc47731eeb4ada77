use super::LogRecord;
use crate::enhance::Usd;
use serde::Serialize;

const TOP_TECHNIQUES: usize = 5;

/// Summary of the cost log, derived on demand
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_enhancements: usize,
    pub average_confidence: f64,
    pub total_cost: Usd,
    pub average_cost: Usd,
    pub total_input_tokens: u64,
    pub total_output_tokens: u64,
    pub last_enhancement: Option<String>,
    pub top_techniques: Vec<TechniqueCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TechniqueCount {
    pub technique: String,
    pub count: usize,
}

impl Statistics {
    pub fn is_empty(&self) -> bool {
        self.total_enhancements == 0
    }

    pub fn total_tokens(&self) -> u64 {
        self.total_input_tokens + self.total_output_tokens
    }
}

/// Aggregates records in file order
///
/// Costs are summed in micro-dollars after rounding each record. Techniques
/// with equal counts keep the order in which they were first seen.
pub fn compute_stats(records: &[LogRecord]) -> Statistics {
    let total_enhancements = records.len();

    let total_cost: Usd = records.iter().map(|r| Usd::from_dollars(r.cost)).sum();
    let total_input_tokens = records.iter().map(|r| r.input_tokens).sum();
    let total_output_tokens = records.iter().map(|r| r.output_tokens).sum();

    let average_confidence = if records.is_empty() {
        0.0
    } else {
        records.iter().map(|r| f64::from(r.confidence)).sum::<f64>() / total_enhancements as f64
    };

    let mut counts: Vec<TechniqueCount> = Vec::new();
    for technique in records.iter().flat_map(|r| r.techniques.iter()) {
        match counts.iter_mut().find(|c| &c.technique == technique) {
            Some(existing) => existing.count += 1,
            None => counts.push(TechniqueCount {
                technique: technique.clone(),
                count: 1,
            }),
        }
    }
    // sort_by is stable, so ties stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_TECHNIQUES);

    Statistics {
        total_enhancements,
        average_confidence,
        total_cost,
        average_cost: total_cost.average(total_enhancements as u64),
        total_input_tokens,
        total_output_tokens,
        last_enhancement: records.last().map(|r| r.timestamp.clone()),
        top_techniques: counts,
    }
}
