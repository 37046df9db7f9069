#[cfg(test)]
#[path = "detector_test.rs"]
mod tests;

use eyre::{Context, Result};
use regex::{Regex, RegexBuilder};

use crate::config::CrisisPatternConfig;

/// Built-in trigger list, in evaluation order.
const DEFAULT_PATTERNS: &[(&str, &str)] = &[
    ("self_harm", r"\b(kill|hurt|harm)\s+(myself|my\s*self)\b"),
    ("suicidal", r"\bsuicid(e|al)\b"),
    ("desire_to_die", r"\bwant\s+to\s+die\b"),
    ("ending_life", r"\bend(ing)?\s+(it|everything|my\s+life)\b"),
    ("no_reason_to_live", r"\bno\s+reason\s+to\s+live\b"),
    ("cannot_go_on", r"\bcan'?t\s+go\s+on\b"),
    ("better_off_dead", r"\bbetter\s+off\s+dead\b"),
];

#[derive(Debug, Clone)]
pub struct CrisisPattern {
    intent: String,
    regex: Regex,
}

impl CrisisPattern {
    /// Compiles `pattern` case-insensitively.
    pub fn new(intent: impl Into<String>, pattern: &str) -> Result<Self> {
        let intent = intent.into();
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .wrap_err(format!("compiling crisis pattern {}", intent))?;
        Ok(Self { intent, regex })
    }

    pub fn intent(&self) -> &str {
        &self.intent
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Best-effort trigger list over self-harm phrasing.
///
/// There is no negation handling: "I don't want to kill myself" matches the
/// same way "I want to kill myself" does. The list over-triggers on purpose
/// and is not a clinical classifier.
#[derive(Debug, Clone)]
pub struct CrisisDetector {
    patterns: Vec<CrisisPattern>,
}

impl CrisisDetector {
    pub fn new(patterns: Vec<CrisisPattern>) -> Self {
        Self { patterns }
    }

    /// Builds the detector from config, falling back to the built-in list
    /// when no patterns are configured.
    pub fn from_config(patterns: &[CrisisPatternConfig]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }

        let patterns = patterns
            .iter()
            .map(|p| CrisisPattern::new(&p.intent, &p.pattern))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(patterns))
    }

    pub fn patterns(&self) -> &[CrisisPattern] {
        &self.patterns
    }

    pub fn detect(&self, text: &str) -> bool {
        self.first_match(text).is_some()
    }

    pub fn first_match(&self, text: &str) -> Option<&CrisisPattern> {
        self.patterns.iter().find(|p| p.is_match(text))
    }
}

impl Default for CrisisDetector {
    fn default() -> Self {
        let patterns = DEFAULT_PATTERNS
            .iter()
            .map(|(intent, pattern)| CrisisPattern {
                intent: intent.to_string(),
                regex: RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .expect("built-in crisis pattern is valid"),
            })
            .collect();
        Self { patterns }
    }
}
