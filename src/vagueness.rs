//! Offline heuristic that flags prompts likely to benefit from enhancement
//!
//! A prompt is vague when all three hold:
//! - it begins with a generic action word such as "make" or "fix"
//! - it mentions fewer than two specific technical terms
//! - it is shorter than fifteen words
//!
//! Prompts starting with `*`, `/` or `#` are treated as deliberate and skipped.

use serde::Serialize;

const VAGUE_STARTERS: &[&str] = &[
    "make",
    "create",
    "build",
    "fix",
    "add",
    "help",
    "debug",
    "test",
    "write",
    "update",
    "change",
    "implement",
    "setup",
    "configure",
];

const SPECIFIC_INDICATORS: &[&str] = &[
    "class",
    "function",
    "method",
    "component",
    "api",
    "endpoint",
    "route",
    "model",
    "schema",
    "database",
    "query",
    "import",
    "export",
    "render",
    "fetch",
    "axios",
    "react",
    "vue",
    "angular",
    "node",
    "python",
    "java",
    "typescript",
    "javascript",
    "sql",
    "nosql",
    "authentication",
    "authorization",
    "jwt",
    "oauth",
    "redux",
    "vuex",
    "graphql",
    "rest",
    "server",
    "client",
    "backend",
    "frontend",
    "interface",
    "service",
    "controller",
    ".js",
    ".py",
    ".ts",
    ".tsx",
    ".jsx",
    ".java",
    ".go",
    ".rs",
    ".cpp",
];

const MIN_SPECIFIC_INDICATORS: usize = 2;
const MAX_VAGUE_WORDS: usize = 15;
const BYPASS_PREFIXES: &[char] = &['*', '/', '#'];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaguenessReport {
    pub is_vague: bool,
    /// The prompt opted out with a `*`, `/` or `#` prefix
    pub bypassed: bool,
    pub starts_with_vague_word: bool,
    /// Specific indicators found, in table order
    pub specific_terms: Vec<&'static str>,
    pub word_count: usize,
}

/// Substring matching on the lowercased prompt, so "nodejs" counts as "node"
/// and "fixing" starts with "fix".
pub fn assess(prompt: &str) -> VaguenessReport {
    let lower = prompt.to_lowercase();
    let word_count = prompt.split_whitespace().count();

    if prompt.starts_with(BYPASS_PREFIXES) {
        return VaguenessReport {
            is_vague: false,
            bypassed: true,
            starts_with_vague_word: false,
            specific_terms: Vec::new(),
            word_count,
        };
    }

    let starts_with_vague_word = VAGUE_STARTERS
        .iter()
        .any(|starter| lower.starts_with(starter));
    let specific_terms: Vec<&'static str> = SPECIFIC_INDICATORS
        .iter()
        .copied()
        .filter(|indicator| lower.contains(indicator))
        .collect();

    VaguenessReport {
        is_vague: starts_with_vague_word
            && specific_terms.len() < MIN_SPECIFIC_INDICATORS
            && word_count < MAX_VAGUE_WORDS,
        bypassed: false,
        starts_with_vague_word,
        specific_terms,
        word_count,
    }
}

pub fn is_vague(prompt: &str) -> bool {
    assess(prompt).is_vague
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_vague_prompt() {
        let report = assess("make a website");
        assert!(report.is_vague);
        assert!(report.starts_with_vague_word);
        assert!(report.specific_terms.is_empty());
        assert_eq!(report.word_count, 3);
    }

    #[test]
    fn test_specific_prompt_is_not_vague() {
        assert!(!is_vague("implement OAuth authentication using JWT"));
    }

    #[test]
    fn test_one_indicator_is_still_vague() {
        let report = assess("make a simple server");
        assert_eq!(report.specific_terms, vec!["server"]);
        assert!(report.is_vague);
    }

    #[test]
    fn test_long_prompt_is_not_vague() {
        let prompt = "make a page that shows a list of my favourite books with covers and short \
                      reviews for each one";
        assert!(prompt.split_whitespace().count() >= 15);
        assert!(!is_vague(prompt));
    }

    #[test]
    fn test_non_action_start_is_not_vague() {
        assert!(!is_vague("why does this loop never end"));
    }

    #[test]
    fn test_case_insensitive_start() {
        assert!(is_vague("Fix it"));
    }

    #[test]
    fn test_bypass_prefixes() {
        for prompt in ["*make a website", "/make a website", "#make a website"] {
            let report = assess(prompt);
            assert!(report.bypassed);
            assert!(!report.is_vague);
        }
    }

    #[test]
    fn test_file_extensions_count() {
        let report = assess("fix main.rs and lib.py");
        assert!(report.specific_terms.contains(&".rs"));
        assert!(report.specific_terms.contains(&".py"));
        assert!(!report.is_vague);
    }
}
