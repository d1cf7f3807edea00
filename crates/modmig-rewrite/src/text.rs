//! Text rewrite rules
//!
//! A [`TextRule`] pairs a matcher (file-name suffix) with a pure
//! content-to-content [`Substitution`]. Rules are plain values, so each
//! migration step lists the rules it needs instead of redefining helpers.

use crate::error::RewriteError;
use regex::Regex;
use std::borrow::Cow;
use std::path::Path;

/// Pure content transformation
#[derive(Debug, Clone)]
pub enum Substitution {
    /// Replace every occurrence of a literal string
    Literal {
        /// Text to find
        from: String,
        /// Replacement text
        to: String,
    },
    /// Replace every regex match; `replacement` may use `$1`-style groups
    Pattern {
        /// Compiled pattern
        regex: Regex,
        /// Replacement template
        replacement: String,
    },
    /// Append `suffix` after every match not already followed by it
    EnsureSuffix {
        /// Compiled pattern
        regex: Regex,
        /// Text that must follow each match
        suffix: String,
    },
}

impl Substitution {
    /// Literal replacement
    #[must_use]
    pub fn literal(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::Literal {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Regex replacement
    ///
    /// # Errors
    /// `RewriteError::InvalidPattern` if the pattern does not compile.
    pub fn pattern(pattern: &str, replacement: impl Into<String>) -> Result<Self, RewriteError> {
        Ok(Self::Pattern {
            regex: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// Suffix insertion after each match
    ///
    /// # Errors
    /// `RewriteError::InvalidPattern` if the pattern does not compile.
    pub fn ensure_suffix(pattern: &str, suffix: impl Into<String>) -> Result<Self, RewriteError> {
        Ok(Self::EnsureSuffix {
            regex: Regex::new(pattern)?,
            suffix: suffix.into(),
        })
    }

    /// Apply to content, borrowing when nothing changes
    #[must_use]
    pub fn apply<'a>(&self, content: &'a str) -> Cow<'a, str> {
        match self {
            Self::Literal { from, to } => {
                if from.is_empty() || !content.contains(from.as_str()) {
                    Cow::Borrowed(content)
                } else {
                    Cow::Owned(content.replace(from.as_str(), to))
                }
            }
            Self::Pattern { regex, replacement } => regex.replace_all(content, replacement.as_str()),
            Self::EnsureSuffix { regex, suffix } => {
                let mut out = String::new();
                let mut last = 0;
                let mut changed = false;
                for found in regex.find_iter(content) {
                    if content[found.end()..].starts_with(suffix.as_str()) {
                        continue;
                    }
                    out.push_str(&content[last..found.end()]);
                    out.push_str(suffix);
                    last = found.end();
                    changed = true;
                }
                if !changed {
                    return Cow::Borrowed(content);
                }
                out.push_str(&content[last..]);
                Cow::Owned(out)
            }
        }
    }
}

/// Named substitution restricted to files with a given name suffix
#[derive(Debug, Clone)]
pub struct TextRule {
    name: String,
    suffix: String,
    substitution: Substitution,
}

impl TextRule {
    /// Create rule
    #[must_use]
    pub fn new(name: impl Into<String>, suffix: impl Into<String>, substitution: Substitution) -> Self {
        Self {
            name: name.into(),
            suffix: suffix.into(),
            substitution,
        }
    }

    /// Rule name, used in logs
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// File-name suffix this rule applies to
    #[inline]
    #[must_use]
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Whether the rule applies to a path
    #[must_use]
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(&self.suffix))
    }

    /// Apply the substitution
    #[inline]
    #[must_use]
    pub fn apply<'a>(&self, content: &'a str) -> Cow<'a, str> {
        self.substitution.apply(content)
    }
}

/// Apply rules in order, returning the final content
#[must_use]
pub fn apply_all<'a>(rules: &[&TextRule], content: &'a str) -> Cow<'a, str> {
    let mut current = Cow::Borrowed(content);
    for rule in rules {
        let next = match rule.apply(&current) {
            Cow::Owned(changed) => Some(changed),
            Cow::Borrowed(_) => None,
        };
        if let Some(changed) = next {
            current = Cow::Owned(changed);
        }
    }
    current
}
