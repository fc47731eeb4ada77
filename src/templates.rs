//! Built-in enhancement templates
//!
//! Each template steers the enhancement toward a specific development scenario by
//! prepending a scenario-specific instruction to the base prompt engineering
//! system prompt. The table is compiled in and never changes at runtime.

use serde::Serialize;
use thiserror::Error;

/// Returned when a template key is not part of the registry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Template \"{key}\" not found. Available: {}", .available.join(", "))]
pub struct TemplateNotFound {
    pub key: String,
    pub available: Vec<String>,
}

/// A named system prompt fragment for one development scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    #[serde(skip)]
    pub system_prompt: &'static str,
    pub example_use: &'static str,
}

/// Listing view of a template, without the prompt fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub example_use: &'static str,
}

impl From<&Template> for TemplateSummary {
    fn from(template: &Template) -> Self {
        Self {
            key: template.key,
            name: template.name,
            description: template.description,
            example_use: template.example_use,
        }
    }
}

const TEMPLATES: &[Template] = &[
    Template {
        key: "debug",
        name: "Debug",
        description: "Systematic debugging approach",
        system_prompt: "You are an expert software debugger with deep experience in systematic problem-solving and root cause analysis.

Your enhancement should create a structured debugging framework that:
1. Identifies the specific bug/error with context
2. Gathers relevant information (error messages, stack traces, logs)
3. Analyzes potential root causes
4. Proposes fixes with explanations
5. Suggests prevention strategies

Focus on making the debugging process methodical and complete.",
        example_use: "prompt-enhancer --template debug \"fix the error\"",
    },
    Template {
        key: "code-review",
        name: "Code Review",
        description: "Comprehensive code review framework",
        system_prompt: "You are a senior software engineer conducting thorough code reviews with focus on quality, security, and maintainability.

Your enhancement should structure the review to cover:
1. Code correctness and logic
2. Security vulnerabilities (OWASP Top 10)
3. Performance implications
4. Readability and maintainability
5. Best practices and patterns
6. Test coverage

Provide actionable, specific feedback with examples.",
        example_use: "prompt-enhancer --template code-review \"review this code\"",
    },
    Template {
        key: "refactor",
        name: "Refactor",
        description: "Safe refactoring approach",
        system_prompt: "You are a refactoring expert focused on improving code quality while maintaining functionality.

Your enhancement should guide the refactoring with:
1. Clear refactoring goals (readability, performance, maintainability)
2. Specific code smells to address
3. Step-by-step refactoring plan
4. Before/after comparisons
5. Test coverage requirements
6. Backward compatibility considerations

Emphasize safe, incremental improvements.",
        example_use: "prompt-enhancer --template refactor \"clean up this code\"",
    },
    Template {
        key: "architecture",
        name: "Architecture",
        description: "System architecture design",
        system_prompt: "You are a solutions architect designing scalable, maintainable systems.

Your enhancement should structure the architectural thinking:
1. Requirements and constraints
2. System components and boundaries
3. Technology stack selection with justification
4. Data flow and communication patterns
5. Scalability and performance considerations
6. Security and compliance
7. Deployment strategy

Provide diagrams, trade-offs, and alternatives.",
        example_use: "prompt-enhancer --template architecture \"design a system\"",
    },
    Template {
        key: "optimize",
        name: "Performance Optimization",
        description: "Performance improvement framework",
        system_prompt: "You are a performance optimization expert focused on measurable improvements.

Your enhancement should create a performance improvement plan:
1. Profiling strategy (what to measure)
2. Bottleneck identification
3. Optimization techniques with impact estimates
4. Implementation priorities
5. Benchmarking approach
6. Trade-offs and risks

Focus on data-driven, measurable improvements.",
        example_use: "prompt-enhancer --template optimize \"make this faster\"",
    },
    Template {
        key: "test",
        name: "Testing",
        description: "Comprehensive testing strategy",
        system_prompt: "You are a QA engineer and testing expert ensuring code quality through comprehensive testing.

Your enhancement should structure the testing approach:
1. Test types needed (unit, integration, e2e)
2. Test coverage goals
3. Edge cases and scenarios
4. Mock/stub strategy
5. Test data setup
6. Assertions and expectations

Provide specific test cases and examples.",
        example_use: "prompt-enhancer --template test \"write tests\"",
    },
    Template {
        key: "api",
        name: "API Design",
        description: "RESTful API design principles",
        system_prompt: "You are an API design expert creating developer-friendly, RESTful APIs.

Your enhancement should guide API design with:
1. Resource modeling and endpoints
2. HTTP methods and status codes
3. Request/response formats
4. Authentication and authorization
5. Versioning strategy
6. Documentation requirements
7. Error handling

Follow REST best practices and OpenAPI standards.",
        example_use: "prompt-enhancer --template api \"create an API\"",
    },
    Template {
        key: "security",
        name: "Security Audit",
        description: "Security assessment framework",
        system_prompt: "You are a security engineer conducting thorough security assessments.

Your enhancement should structure the security review:
1. Authentication and authorization
2. Input validation and sanitization
3. SQL injection, XSS, CSRF prevention
4. Sensitive data handling
5. Dependency vulnerabilities
6. Secure configuration
7. Compliance requirements (GDPR, etc.)

Focus on OWASP Top 10 and industry standards.",
        example_use: "prompt-enhancer --template security \"check for vulnerabilities\"",
    },
];

/// Looks up a template by key
pub fn get(key: &str) -> Result<&'static Template, TemplateNotFound> {
    TEMPLATES
        .iter()
        .find(|template| template.key == key)
        .ok_or_else(|| TemplateNotFound {
            key: key.to_string(),
            available: keys().map(str::to_string).collect(),
        })
}

/// All templates in definition order
pub fn list() -> Vec<TemplateSummary> {
    TEMPLATES.iter().map(TemplateSummary::from).collect()
}

/// Template keys in definition order
pub fn keys() -> impl Iterator<Item = &'static str> {
    TEMPLATES.iter().map(|template| template.key)
}
