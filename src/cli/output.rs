//! Output formatting for multiple formats
//!
//! Every displayable value can be rendered as Markdown (the console default),
//! JSON or YAML. The Markdown renderings are also embedded in protocol
//! responses, so they are exposed as free functions as well.
//!
//! # Example
//!
//! ```no_run
//! use prompt_enhancer::cli::output::{OutputFormat, OutputFormatter};
//! use prompt_enhancer::tracker::compute_stats;
//!
//! let formatter = OutputFormatter::new(OutputFormat::Json);
//! let output = formatter.format_stats(&compute_stats(&[])).unwrap();
//! println!("{}", output);
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::enhance::{Enhancement, EnhancementResult};
use crate::templates::TemplateSummary;
use crate::tracker::Statistics;
use crate::vagueness::VaguenessReport;

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Markdown for the console
    Markdown,
    /// JSON format (machine-readable)
    Json,
    /// YAML format
    Yaml,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn format_result(&self, result: &EnhancementResult) -> Result<String> {
        match self.format {
            OutputFormat::Markdown => Ok(render_result_markdown(result)),
            _ => self.serialize(result, "enhancement result"),
        }
    }

    pub fn format_stats(&self, stats: &Statistics) -> Result<String> {
        match self.format {
            OutputFormat::Markdown => Ok(render_stats_markdown(stats)),
            _ => self.serialize(stats, "statistics"),
        }
    }

    pub fn format_templates(&self, templates: &[TemplateSummary]) -> Result<String> {
        match self.format {
            OutputFormat::Markdown => Ok(render_templates_markdown(templates)),
            _ => self.serialize(templates, "template list"),
        }
    }

    pub fn format_check(&self, prompt: &str, report: &VaguenessReport) -> Result<String> {
        match self.format {
            OutputFormat::Markdown => Ok(render_check_markdown(prompt, report)),
            _ => self.serialize(report, "vagueness report"),
        }
    }

    fn serialize<T: Serialize + ?Sized>(&self, value: &T, what: &str) -> Result<String> {
        match self.format {
            OutputFormat::Yaml => serde_yaml::to_string(value)
                .with_context(|| format!("Failed to serialize {} to YAML", what)),
            _ => serde_json::to_string_pretty(value)
                .with_context(|| format!("Failed to serialize {} to JSON", what)),
        }
    }
}

pub fn render_result_markdown(result: &EnhancementResult) -> String {
    let mut md = String::from("# Prompt Enhancement Results\n\n");

    md.push_str("## Original Prompt\n");
    md.push_str(&format!("```\n{}\n```\n\n", result.original));

    let enhanced = match &result.enhancement {
        Enhancement::NeedsClarification { questions } => {
            md.push_str("## ⚠️ Clarification Needed\n\n");
            md.push_str("To provide the best enhancement, please answer:\n\n");
            for (i, question) in questions.iter().enumerate() {
                md.push_str(&format!("{}. {}\n", i + 1, question));
            }
            md.push('\n');
            return md;
        }
        Enhancement::Enhanced(enhanced) => enhanced,
    };

    md.push_str("## ✨ Enhanced Prompt\n");
    md.push_str(&format!("```\n{}\n```\n\n", enhanced.prompt));

    md.push_str("## 🎯 Techniques Applied\n\n");
    for technique in &enhanced.techniques {
        md.push_str(&format!("- {}\n", technique));
    }
    md.push('\n');

    md.push_str("## 💡 Key Improvements\n\n");
    for improvement in &enhanced.improvements {
        md.push_str(&format!("- {}\n", improvement));
    }
    md.push('\n');

    md.push_str(&format!("## 📊 Confidence Score: {}/10\n\n", enhanced.confidence));

    if let Some(explanation) = &result.explanation {
        md.push_str("## 📝 Explanation\n\n");
        md.push_str(&format!("{}\n\n", explanation));
    }

    md.push_str("---\n\n");
    md.push_str("**API Usage:**\n");
    md.push_str(&format!("- Input tokens: {}\n", result.usage.input_tokens));
    md.push_str(&format!("- Output tokens: {}\n", result.usage.output_tokens));
    md.push_str(&format!("- Estimated cost: ${}\n\n", result.usage.cost.total));

    md.push_str("*Powered by the Claude API*\n");
    md
}

pub fn render_stats_markdown(stats: &Statistics) -> String {
    if stats.is_empty() {
        return "\n📊 Enhancement Statistics\n\n\
                No enhancements logged yet. Run some enhancements to see stats!\n\n\
                Example:\n  \
                prompt-enhancer \"make a website\"\n"
            .to_string();
    }

    let mut out = String::from("\n📊 Enhancement Statistics\n\n");
    out.push_str(&format!("Total Enhancements: {}\n", stats.total_enhancements));
    out.push_str(&format!("Average Confidence: {:.1}/10\n\n", stats.average_confidence));

    out.push_str("💰 Cost Analysis\n");
    out.push_str(&format!("Total API Cost: ${}\n", stats.total_cost));
    out.push_str(&format!("Average Cost: ${} per enhancement\n\n", stats.average_cost));

    out.push_str("🎯 Token Usage\n");
    out.push_str(&format!("Input Tokens: {}\n", group_thousands(stats.total_input_tokens)));
    out.push_str(&format!("Output Tokens: {}\n", group_thousands(stats.total_output_tokens)));
    out.push_str(&format!("Total Tokens: {}\n\n", group_thousands(stats.total_tokens())));

    out.push_str("🔥 Top Techniques\n");
    for (i, item) in stats.top_techniques.iter().enumerate() {
        out.push_str(&format!("{}. {} ({}x)\n", i + 1, item.technique, item.count));
    }

    if let Some(last) = &stats.last_enhancement {
        out.push_str(&format!("\nLast Enhancement: {}", local_timestamp(last)));
    }

    out
}

pub fn render_templates_markdown(templates: &[TemplateSummary]) -> String {
    let mut out = String::from("\n📚 Available Templates\n\n");
    for template in templates {
        out.push_str(&format!("{:<15} - {}\n", template.key, template.description));
        out.push_str(&format!("{:<15}   Example: {}\n\n", "", template.example_use));
    }
    out
}

pub fn render_check_markdown(prompt: &str, report: &VaguenessReport) -> String {
    if report.bypassed {
        return format!(
            "⏭️  Check skipped: \"{}\" starts with a bypass prefix (*, / or #)\n",
            prompt
        );
    }

    let mut out = String::new();
    if report.is_vague {
        out.push_str(&format!(
            "⚠️  \"{}\" looks vague and would benefit from enhancement.\n\n",
            prompt
        ));
    } else {
        out.push_str(&format!("✅ \"{}\" looks specific enough.\n\n", prompt));
    }

    let starts_vague = if report.starts_with_vague_word { "yes" } else { "no" };
    out.push_str(&format!(
        "- Starts with a generic action word: {}\n",
        starts_vague
    ));
    if report.specific_terms.is_empty() {
        out.push_str("- Specific technical terms: none\n");
    } else {
        out.push_str(&format!(
            "- Specific technical terms: {}\n",
            report.specific_terms.join(", ")
        ));
    }
    out.push_str(&format!("- Word count: {}\n", report.word_count));

    if report.is_vague {
        out.push_str(&format!(
            "\n💡 Tip: Run prompt-enhancer \"{}\" to enhance it\n",
            prompt
        ));
    }
    out
}

/// Closing lines printed after a successful console enhancement
pub fn render_success_summary(result: &EnhancementResult) -> Option<String> {
    let enhanced = result.enhanced()?;
    let mut out = String::from("✅ Prompt enhanced successfully!\n");
    out.push_str(&format!("💰 Cost: ${}\n", result.usage.cost.total));
    out.push_str(&format!("📊 Confidence: {}/10\n", enhanced.confidence));
    if let Some(template) = &result.template {
        out.push_str(&format!("🎯 Template: {}\n", template));
    }
    out.push_str("\n💡 Tip: Run \"prompt-enhancer --stats\" to see your usage statistics\n");
    Some(out)
}

fn local_timestamp(timestamp: &str) -> String {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| timestamp.to_string())
}

/// `1234567` becomes `1,234,567`
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
