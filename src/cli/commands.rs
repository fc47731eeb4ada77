use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Claude-powered prompt enhancement with templates and cost tracking
#[derive(Parser, Debug)]
#[command(
    name = "prompt-enhancer",
    about = "Claude-powered prompt enhancement with templates and cost tracking",
    version,
    author,
    long_about = "prompt-enhancer rewrites vague prompts into effective ones by applying prompt \
                  engineering techniques through the Claude API. Every enhancement is priced \
                  and recorded in a local cost log.",
    after_help = "Examples:\n  \
                  prompt-enhancer \"make a website\"\n  \
                  prompt-enhancer --template debug \"fix the error\"\n  \
                  prompt-enhancer --template code-review \"review this code\"\n  \
                  prompt-enhancer --check \"make a website\"\n  \
                  prompt-enhancer --stats\n\n\
                  Environment:\n  \
                  ANTHROPIC_API_KEY    Your Anthropic API key (required to enhance)\n\n\
                  With no arguments and piped input, reads one JSON request from stdin:\n  \
                  echo '{\"method\":\"enhance\",\"params\":{\"prompt\":\"make a website\"},\"id\":1}' | prompt-enhancer"
)]
pub struct CliArgs {
    #[arg(value_name = "PROMPT", help = "Prompt to enhance (words are joined with spaces)")]
    pub prompt: Vec<String>,

    #[arg(
        short = 't',
        long,
        value_name = "NAME",
        help = "Use a specific template (debug, code-review, refactor, etc.)"
    )]
    pub template: Option<String>,

    #[arg(long, value_name = "GOAL", help = "Your goal (learning, production, debugging, ...)")]
    pub goal: Option<String>,

    #[arg(
        long,
        value_name = "LEVEL",
        help = "Your experience level (junior, mid-level, senior, expert)"
    )]
    pub experience_level: Option<String>,

    #[arg(long, value_name = "DOMAIN", help = "Domain (web-development, backend, devops, ...)")]
    pub domain: Option<String>,

    #[arg(long, help = "Show enhancement statistics")]
    pub stats: bool,

    #[arg(
        long = "list-templates",
        visible_alias = "templates",
        help = "List all available templates"
    )]
    pub list_templates: bool,

    #[arg(long, help = "Delete every record from the cost log")]
    pub clear_stats: bool,

    #[arg(long, help = "Check whether the prompt is vague without calling the API")]
    pub check: bool,

    #[arg(long, help = "Run as an MCP tool server on stdin/stdout")]
    pub mcp: bool,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "markdown",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'm',
        long,
        value_name = "MODEL",
        help = "Model id to use (overrides PROMPT_ENHANCER_MODEL)"
    )]
    pub model: Option<String>,

    #[arg(
        long,
        value_name = "FILE",
        help = "Cost log file (overrides PROMPT_ENHANCER_LOG_FILE)"
    )]
    pub log_file: Option<PathBuf>,

    #[arg(long, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, help = "Verbose diagnostics on stderr")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

impl CliArgs {
    /// Positional words joined with single spaces
    pub fn prompt_text(&self) -> String {
        self.prompt.join(" ")
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Markdown,
    Json,
    Yaml,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Markdown => super::output::OutputFormat::Markdown,
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_prompt_words_are_joined() {
        let args = CliArgs::parse_from(["prompt-enhancer", "make", "a", "website"]);
        assert_eq!(args.prompt_text(), "make a website");
        assert_eq!(args.format, OutputFormatArg::Markdown);
        assert!(args.template.is_none());
        assert!(!args.stats);
    }

    #[test]
    fn test_template_flag_before_and_after_prompt() {
        let args = CliArgs::parse_from(["prompt-enhancer", "-t", "debug", "fix", "the", "error"]);
        assert_eq!(args.template.as_deref(), Some("debug"));
        assert_eq!(args.prompt_text(), "fix the error");

        let args = CliArgs::parse_from(["prompt-enhancer", "fix", "it", "--template", "debug"]);
        assert_eq!(args.template.as_deref(), Some("debug"));
        assert_eq!(args.prompt_text(), "fix it");
    }

    #[test]
    fn test_templates_alias() {
        let args = CliArgs::parse_from(["prompt-enhancer", "--templates"]);
        assert!(args.list_templates);
        let args = CliArgs::parse_from(["prompt-enhancer", "--list-templates"]);
        assert!(args.list_templates);
    }

    #[test]
    fn test_context_flags() {
        let args = CliArgs::parse_from([
            "prompt-enhancer",
            "--goal",
            "production",
            "--experience-level",
            "senior",
            "--domain",
            "backend",
            "design an api",
        ]);
        assert_eq!(args.goal.as_deref(), Some("production"));
        assert_eq!(args.experience_level.as_deref(), Some("senior"));
        assert_eq!(args.domain.as_deref(), Some("backend"));
        assert_eq!(args.prompt_text(), "design an api");
    }

    #[test]
    fn test_overrides_and_format() {
        let args = CliArgs::parse_from([
            "prompt-enhancer",
            "--stats",
            "--format",
            "json",
            "--log-file",
            "/tmp/log.jsonl",
            "--model",
            "claude-haiku",
        ]);
        assert!(args.stats);
        assert_eq!(args.format, OutputFormatArg::Json);
        assert_eq!(args.log_file, Some(PathBuf::from("/tmp/log.jsonl")));
        assert_eq!(args.model.as_deref(), Some("claude-haiku"));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["prompt-enhancer", "-v", "-q", "--stats"]).is_err());
    }

    #[test]
    fn test_log_level_flag() {
        let args = CliArgs::parse_from(["prompt-enhancer", "--log-level", "debug", "--stats"]);
        assert_eq!(args.log_level, Some("debug".to_string()));
    }
}
