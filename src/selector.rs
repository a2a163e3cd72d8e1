//! Class selectors used to pick out header rows, fake rows and excluded columns

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::SortError;

fn compound_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z]+)?((?:\.[A-Za-z0-9_-]+)*)$").expect("valid selector pattern")
    })
}

/// One alternative of a selector: an optional element name plus required classes
#[derive(Debug, Clone, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
}

impl Compound {
    fn matches(&self, tag: &str, classes: &[String]) -> bool {
        if let Some(t) = &self.tag {
            if !t.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.classes.iter().all(|c| classes.iter().any(|have| have == c))
    }
}

/// A comma separated list of `tag.class.class` alternatives
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Selector {
    source: String,
    alternatives: Vec<Compound>,
}

impl Selector {
    pub fn parse(s: &str) -> Result<Self, SortError> {
        let mut alternatives = Vec::new();

        for part in s.split(',') {
            let part = part.trim();
            let caps = compound_pattern()
                .captures(part)
                .ok_or_else(|| SortError::InvalidSelector(s.to_string()))?;

            let tag = caps.get(1).map(|m| m.as_str().to_lowercase());
            let classes: Vec<String> = caps
                .get(2)
                .map(|m| m.as_str())
                .unwrap_or("")
                .split('.')
                .filter(|c| !c.is_empty())
                .map(|c| c.to_string())
                .collect();

            // an empty alternative would match everything
            if tag.is_none() && classes.is_empty() {
                return Err(SortError::InvalidSelector(s.to_string()));
            }

            alternatives.push(Compound { tag, classes });
        }

        Ok(Self { source: s.trim().to_string(), alternatives })
    }

    /// Shorthand for a selector matching a single class
    pub fn class(name: &str) -> Self {
        Self {
            source: format!(".{}", name),
            alternatives: vec![Compound { tag: None, classes: vec![name.to_string()] }],
        }
    }

    pub fn matches(&self, tag: &str, classes: &[String]) -> bool {
        self.alternatives.iter().any(|alt| alt.matches(tag, classes))
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl TryFrom<String> for Selector {
    type Error = SortError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
