use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;

/// `local@domain.tld`: no whitespace, one `@`, at least one `.` after it.
/// Accepts oddities such as consecutive dots in the domain.
pub static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex")
});

pub type Rule<E> = Arc<dyn Fn(&str) -> Result<(), E> + Send + Sync>;

/// Ordered rules over a trimmed text value. The first failing rule decides
/// the error. Trimming strips whitespace and the byte order mark, matching
/// what a browser strips from a form value.
#[derive(Clone)]
pub struct FieldRules<E> {
    rules: Vec<Rule<E>>,
}

impl<E> Default for FieldRules<E> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<E> fmt::Debug for FieldRules<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRules")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl<E> FieldRules<E>
where
    E: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self, error: E) -> Self {
        self.rule(move |value: &str| {
            if value.is_empty() {
                Err(error.clone())
            } else {
                Ok(())
            }
        })
    }

    /// Minimum length in UTF-16 code units, the unit browsers report for
    /// input values. A character outside the BMP counts twice.
    pub fn min_length(self, min: usize, error: E) -> Self {
        self.rule(move |value: &str| {
            if value.encode_utf16().count() < min {
                Err(error.clone())
            } else {
                Ok(())
            }
        })
    }

    pub fn pattern(self, pattern: &'static LazyLock<Regex>, error: E) -> Self {
        self.rule(move |value: &str| {
            if pattern.is_match(value) {
                Ok(())
            } else {
                Err(error.clone())
            }
        })
    }

    pub fn rule(mut self, rule: impl Fn(&str) -> Result<(), E> + Send + Sync + 'static) -> Self {
        self.rules.push(Arc::new(rule));
        self
    }

    pub fn check(&self, value: &str) -> Result<(), E> {
        let value = trim_blank(value);
        for rule in &self.rules {
            rule(value)?;
        }
        Ok(())
    }
}

fn trim_blank(value: &str) -> &str {
    value.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}')
}
