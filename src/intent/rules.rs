//! Recognition rules, in priority order.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::models::Params;
use crate::tools::{DEFAULT_GAME, DEFAULT_LOCATION};

/// What a rule routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Tool(&'static str),
    Protocol {
        server: &'static str,
        operation: &'static str,
    },
}

impl Target {
    /// Registry name of the capability
    pub fn name(&self) -> &'static str {
        match self {
            Target::Tool(name) => name,
            Target::Protocol { server, .. } => server,
        }
    }
}

type Extractor = fn(&Captures<'_>, &str) -> Params;

/// A single `(pattern, target, extractor)` entry
pub struct Rule {
    pub name: &'static str,
    pub pattern: Regex,
    pub target: Target,
    pub extract: Extractor,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("pattern", &self.pattern.as_str())
            .field("target", &self.target)
            .finish()
    }
}

fn rule(name: &'static str, pattern: &str, target: Target, extract: Extractor) -> Rule {
    Rule {
        name,
        // Patterns are literals below
        pattern: Regex::new(&format!("(?i){}", pattern)).expect("Invalid intent pattern"),
        target,
        extract,
    }
}

fn single(key: &str, value: &str) -> Params {
    let mut params = Params::new();
    params.insert(key.to_string(), value.to_string());
    params
}

fn group_or<'t>(caps: &Captures<'t>, idx: usize, default: &'t str) -> &'t str {
    caps.get(idx).map(|m| m.as_str()).unwrap_or(default)
}

static FENCED_PYTHON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```python\s*(.*?)\s*```").unwrap());

/// Every rule, protocol intents first, then tool intents
pub fn default_rules() -> Vec<Rule> {
    vec![
        rule(
            "filesystem",
            r"\b(file|read|write|list)\s+(.+?)\b",
            Target::Protocol {
                server: "filesystem",
                operation: "file_read",
            },
            |caps, _| single("path", group_or(caps, 2, "")),
        ),
        rule(
            "git",
            r"\bgit\s+(status|commit|push)\b",
            Target::Protocol {
                server: "git",
                operation: "git_status",
            },
            |caps, _| single("action", &group_or(caps, 1, "status").to_lowercase()),
        ),
        rule(
            "http",
            r"\bhttp\s+(get|post)\s+(https?://\S+)",
            Target::Protocol {
                server: "http",
                operation: "http_get",
            },
            |caps, _| single("url", group_or(caps, 2, "")),
        ),
        rule(
            "database",
            r"\b(database|db|query)\s+(.+?)\b",
            Target::Protocol {
                server: "database",
                operation: "db_query",
            },
            |caps, _| single("query", group_or(caps, 2, "")),
        ),
        rule(
            "weather",
            r"\bweather\b(?:.*\b(\w+(?:\s+\w+)*))?",
            Target::Tool("weather"),
            |caps, _| single("location", group_or(caps, 1, DEFAULT_LOCATION)),
        ),
        rule(
            "search",
            r"\bsearch\b(?:.*\b(\w+(?:\s+\w+)*))?",
            Target::Tool("search"),
            |caps, text| single("query", group_or(caps, 1, text)),
        ),
        rule(
            "code_execute",
            r"\bexecute\b.*\bcode\b",
            Target::Tool("code_execute"),
            |_, text| match FENCED_PYTHON.captures(text).and_then(|c| c.get(1)) {
                Some(code) => single("code", code.as_str()),
                None => Params::new(),
            },
        ),
        rule(
            "time",
            r"\btime\b|\bdate\b",
            Target::Tool("time"),
            |_, _| Params::new(),
        ),
        rule(
            "joke",
            r"\bjoke\b|\bfunny\b|\bhumor\b",
            Target::Tool("joke"),
            |_, _| Params::new(),
        ),
        rule(
            "quote",
            r"\bquote\b|\binspiration\b|\bmotivation\b",
            Target::Tool("quote"),
            |_, _| Params::new(),
        ),
        rule(
            "play",
            r"\bplay\b.*\b(game|rps|rock|paper|scissors|number|guess|word|hangman)\b",
            Target::Tool("play"),
            |caps, _| single("game_type", &group_or(caps, 1, DEFAULT_GAME).to_lowercase()),
        ),
    ]
}
